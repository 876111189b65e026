//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{attendance_records, courses, fingerprint_templates, student_courses, students};

/// Database row for a student.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentRow {
    pub id: i32,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: String,
}

/// Database row for a student (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = students)]
pub struct NewStudentRow {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: String,
}

/// Database row for a course.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseRow {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Database row for a course (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = courses)]
pub struct NewCourseRow {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Enrollment join row.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = student_courses)]
pub struct StudentCourseRow {
    pub student_id: i32,
    pub course_id: i32,
}

/// Database row for a fingerprint template.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = fingerprint_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TemplateRow {
    pub id: i32,
    pub student_id: i32,
    pub finger_slot: i32,
    pub sensor_template_id: i32,
    pub template_data: Vec<u8>,
    pub created_at: String,
}

/// Database row for a fingerprint template (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = fingerprint_templates)]
pub struct NewTemplateRow {
    pub student_id: i32,
    pub finger_slot: i32,
    pub sensor_template_id: i32,
    pub template_data: Vec<u8>,
    pub created_at: String,
}

/// Database row for an attendance record.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttendanceRow {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub timestamp: String,
    pub status: String,
    pub synced: bool,
}

/// Database row for an attendance record (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = attendance_records)]
pub struct NewAttendanceRow {
    pub student_id: i32,
    pub course_id: i32,
    pub timestamp: String,
    pub status: String,
    pub synced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attendance_row_is_insertable() {
        // Type check - if this compiles, the Insertable derive works
        let _row = NewAttendanceRow {
            student_id: 1,
            course_id: 1,
            timestamp: "2026-08-01T09:00:00+00:00".to_string(),
            status: "present".to_string(),
            synced: false,
        };
    }

    #[test]
    fn new_template_row_is_insertable() {
        let _row = NewTemplateRow {
            student_id: 1,
            finger_slot: 0,
            sensor_template_id: 1,
            template_data: vec![1, 2, 3],
            created_at: "2026-08-01T09:00:00+00:00".to_string(),
        };
    }
}
