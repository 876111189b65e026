//! SQLite store implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::db::model::{
    AttendanceRow, CourseRow, NewAttendanceRow, NewCourseRow, NewStudentRow, NewTemplateRow,
    StudentCourseRow, StudentRow, TemplateRow,
};
use super::db::schema::{
    attendance_records, courses, fingerprint_templates, student_courses, students,
};
use super::db::DbPool;
use crate::domain::{
    AttendanceRecord, AttendanceStatus, BiometricTemplate, Course, CourseId, FingerSlot,
    NewAttendance, NewTemplate, StatsFilter, StatusCounts, Student, StudentId, TemplateId,
};
use crate::error::{Error, Result};
use crate::port::AttendanceStore;

diesel::define_sql_function! {
    fn last_insert_rowid() -> diesel::sql_types::Integer;
}

/// SQLite-backed attendance store.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store over an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Parse(e.to_string()))
    }

    fn student_from_row(row: StudentRow) -> Result<Student> {
        Ok(Student {
            id: StudentId(row.id),
            external_id: row.external_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            created_at: Self::parse_timestamp(&row.created_at)?,
        })
    }

    fn course_from_row(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: CourseId(row.id),
            code: row.code,
            title: row.title,
            description: row.description,
            created_at: Self::parse_timestamp(&row.created_at)?,
        })
    }

    fn template_from_row(row: TemplateRow) -> Result<BiometricTemplate> {
        let finger_slot = u8::try_from(row.finger_slot)
            .ok()
            .and_then(FingerSlot::new)
            .ok_or_else(|| Error::Parse(format!("finger slot out of range: {}", row.finger_slot)))?;
        let sensor_template_id = u32::try_from(row.sensor_template_id)
            .map_err(|_| Error::Parse(format!("negative template id: {}", row.sensor_template_id)))?;

        Ok(BiometricTemplate {
            id: row.id,
            student_id: StudentId(row.student_id),
            finger_slot,
            sensor_template_id: TemplateId(sensor_template_id),
            template_data: row.template_data,
            created_at: Self::parse_timestamp(&row.created_at)?,
        })
    }

    fn attendance_from_row(row: AttendanceRow) -> Result<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: row.id,
            student_id: StudentId(row.student_id),
            course_id: CourseId(row.course_id),
            timestamp: Self::parse_timestamp(&row.timestamp)?,
            status: AttendanceStatus::normalize(&row.status),
            synced: row.synced,
        })
    }
}

#[async_trait]
impl AttendanceStore for SqliteStore {
    async fn student(&self, id: StudentId) -> Result<Option<Student>> {
        let mut conn = self.conn()?;
        let row: Option<StudentRow> = students::table
            .find(id.0)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::student_from_row).transpose()
    }

    async fn student_by_external_id(&self, external_id: &str) -> Result<Option<Student>> {
        let mut conn = self.conn()?;
        let row: Option<StudentRow> = students::table
            .filter(students::external_id.eq(external_id))
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::student_from_row).transpose()
    }

    async fn course(&self, id: CourseId) -> Result<Option<Course>> {
        let mut conn = self.conn()?;
        let row: Option<CourseRow> = courses::table
            .find(id.0)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::course_from_row).transpose()
    }

    async fn is_enrolled(&self, student_id: StudentId, course_id: CourseId) -> Result<bool> {
        let mut conn = self.conn()?;
        let count: i64 = student_courses::table
            .filter(student_courses::student_id.eq(student_id.0))
            .filter(student_courses::course_id.eq(course_id.0))
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn template_for_slot(
        &self,
        student_id: StudentId,
        slot: FingerSlot,
    ) -> Result<Option<BiometricTemplate>> {
        let mut conn = self.conn()?;
        let row: Option<TemplateRow> = fingerprint_templates::table
            .filter(fingerprint_templates::student_id.eq(student_id.0))
            .filter(fingerprint_templates::finger_slot.eq(i32::from(slot.index())))
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::template_from_row).transpose()
    }

    async fn template_owner(&self, template_id: TemplateId) -> Result<Option<BiometricTemplate>> {
        let sensor_id = i32::try_from(template_id.0)
            .map_err(|_| Error::Parse(format!("template id out of range: {}", template_id.0)))?;
        let mut conn = self.conn()?;
        let row: Option<TemplateRow> = fingerprint_templates::table
            .filter(fingerprint_templates::sensor_template_id.eq(sensor_id))
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::template_from_row).transpose()
    }

    async fn upsert_template(&self, template: &NewTemplate) -> Result<BiometricTemplate> {
        let sensor_id = i32::try_from(template.sensor_template_id.0).map_err(|_| {
            Error::Parse(format!(
                "template id out of range: {}",
                template.sensor_template_id.0
            ))
        })?;
        let mut conn = self.conn()?;

        let row = conn
            .transaction::<TemplateRow, diesel::result::Error, _>(|conn| {
                // Clear both uniqueness dimensions before inserting:
                // the (student, slot) pair being re-enrolled, and any stale
                // row still claiming this sensor template id.
                diesel::delete(
                    fingerprint_templates::table
                        .filter(fingerprint_templates::student_id.eq(template.student_id.0))
                        .filter(
                            fingerprint_templates::finger_slot
                                .eq(i32::from(template.finger_slot.index())),
                        ),
                )
                .execute(conn)?;
                diesel::delete(
                    fingerprint_templates::table
                        .filter(fingerprint_templates::sensor_template_id.eq(sensor_id)),
                )
                .execute(conn)?;

                diesel::insert_into(fingerprint_templates::table)
                    .values(NewTemplateRow {
                        student_id: template.student_id.0,
                        finger_slot: i32::from(template.finger_slot.index()),
                        sensor_template_id: sensor_id,
                        template_data: template.template_data.clone(),
                        created_at: Utc::now().to_rfc3339(),
                    })
                    .execute(conn)?;

                let id: i32 = diesel::select(last_insert_rowid()).get_result(conn)?;
                fingerprint_templates::table.find(id).first(conn)
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Self::template_from_row(row)
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<AttendanceRecord> {
        let mut conn = self.conn()?;

        let row = conn
            .transaction::<AttendanceRow, diesel::result::Error, _>(|conn| {
                diesel::insert_into(attendance_records::table)
                    .values(NewAttendanceRow {
                        student_id: record.student_id.0,
                        course_id: record.course_id.0,
                        timestamp: record.timestamp.to_rfc3339(),
                        status: record.status.as_str().to_string(),
                        synced: record.synced,
                    })
                    .execute(conn)?;

                let id: i32 = diesel::select(last_insert_rowid()).get_result(conn)?;
                attendance_records::table.find(id).first(conn)
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Self::attendance_from_row(row)
    }

    async fn unsynced_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        let mut conn = self.conn()?;
        let rows: Vec<AttendanceRow> = attendance_records::table
            .filter(attendance_records::synced.eq(false))
            .order(attendance_records::timestamp.asc())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::attendance_from_row).collect()
    }

    async fn mark_synced(&self, ids: &[i32]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::update(attendance_records::table.filter(attendance_records::id.eq_any(ids)))
                .set(attendance_records::synced.eq(true))
                .execute(conn)
        })
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn status_counts(&self, filter: &StatsFilter) -> Result<StatusCounts> {
        let mut conn = self.conn()?;

        let count_for = |conn: &mut SqliteConnection, status: AttendanceStatus| -> QueryResult<i64> {
            let mut query = attendance_records::table
                .filter(attendance_records::status.eq(status.as_str()))
                .into_boxed();
            if let Some(course_id) = filter.course_id {
                query = query.filter(attendance_records::course_id.eq(course_id.0));
            }
            if let Some(start) = filter.start {
                query = query.filter(attendance_records::timestamp.ge(start.to_rfc3339()));
            }
            if let Some(end) = filter.end {
                query = query.filter(attendance_records::timestamp.le(end.to_rfc3339()));
            }
            query.count().get_result(conn)
        };

        let present = count_for(&mut conn, AttendanceStatus::Present)
            .map_err(|e| Error::Database(e.to_string()))?;
        let late = count_for(&mut conn, AttendanceStatus::Late)
            .map_err(|e| Error::Database(e.to_string()))?;
        let absent = count_for(&mut conn, AttendanceStatus::Absent)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(StatusCounts {
            present,
            late,
            absent,
        })
    }

    async fn recent_attendance(
        &self,
        filter: &StatsFilter,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut conn = self.conn()?;

        let mut query = attendance_records::table.into_boxed();
        if let Some(course_id) = filter.course_id {
            query = query.filter(attendance_records::course_id.eq(course_id.0));
        }
        if let Some(start) = filter.start {
            query = query.filter(attendance_records::timestamp.ge(start.to_rfc3339()));
        }
        if let Some(end) = filter.end {
            query = query.filter(attendance_records::timestamp.le(end.to_rfc3339()));
        }

        let rows: Vec<AttendanceRow> = query
            .order(attendance_records::timestamp.desc())
            .limit(limit)
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::attendance_from_row).collect()
    }
}

/// Registration helpers used by the seed command and test setup. Student
/// and course CRUD otherwise lives outside this crate.
impl SqliteStore {
    /// Insert a student, returning the stored value.
    pub fn insert_student(
        &self,
        external_id: &str,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> Result<Student> {
        let mut conn = self.conn()?;
        let row = conn
            .transaction::<StudentRow, diesel::result::Error, _>(|conn| {
                diesel::insert_into(students::table)
                    .values(NewStudentRow {
                        external_id: external_id.to_string(),
                        first_name: first_name.to_string(),
                        last_name: last_name.to_string(),
                        email: email.map(str::to_string),
                        created_at: Utc::now().to_rfc3339(),
                    })
                    .execute(conn)?;
                let id: i32 = diesel::select(last_insert_rowid()).get_result(conn)?;
                students::table.find(id).first(conn)
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Self::student_from_row(row)
    }

    /// Insert a course, returning the stored value.
    pub fn insert_course(
        &self,
        code: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Course> {
        let mut conn = self.conn()?;
        let row = conn
            .transaction::<CourseRow, diesel::result::Error, _>(|conn| {
                diesel::insert_into(courses::table)
                    .values(NewCourseRow {
                        code: code.to_string(),
                        title: title.to_string(),
                        description: description.map(str::to_string),
                        created_at: Utc::now().to_rfc3339(),
                    })
                    .execute(conn)?;
                let id: i32 = diesel::select(last_insert_rowid()).get_result(conn)?;
                courses::table.find(id).first(conn)
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Self::course_from_row(row)
    }

    /// Look up a course by its code.
    pub fn course_by_code(&self, code: &str) -> Result<Option<Course>> {
        let mut conn = self.conn()?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::code.eq(code))
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::course_from_row).transpose()
    }

    /// Enroll a student in a course. Idempotent.
    pub fn enroll_student(&self, student_id: StudentId, course_id: CourseId) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(student_courses::table)
            .values(StudentCourseRow {
                student_id: student_id.0,
                course_id: course_id.0,
            })
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}
