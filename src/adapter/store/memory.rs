//! In-memory store, primarily for tests and local experiments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{
    AttendanceRecord, AttendanceStatus, BiometricTemplate, Course, CourseId, FingerSlot,
    NewAttendance, NewTemplate, StatsFilter, StatusCounts, Student, StudentId, TemplateId,
};
use crate::error::Result;
use crate::port::AttendanceStore;

/// Keeps everything in `RwLock`ed maps. Write paths take the same
/// all-or-nothing shape as the SQLite store.
#[derive(Default)]
pub struct MemoryStore {
    students: RwLock<HashMap<i32, Student>>,
    courses: RwLock<HashMap<i32, Course>>,
    enrollments: RwLock<Vec<(i32, i32)>>,
    templates: RwLock<HashMap<i32, BiometricTemplate>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    next_id: AtomicI32,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1),
            ..Self::default()
        }
    }

    fn alloc_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Register a student and return it.
    pub fn add_student(&self, external_id: &str, first_name: &str, last_name: &str) -> Student {
        let id = self.alloc_id();
        let student = Student {
            id: StudentId(id),
            external_id: external_id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: None,
            created_at: Utc::now(),
        };
        self.students.write().insert(id, student.clone());
        student
    }

    /// Register a course and return it.
    pub fn add_course(&self, code: &str, title: &str) -> Course {
        let id = self.alloc_id();
        let course = Course {
            id: CourseId(id),
            code: code.to_string(),
            title: title.to_string(),
            description: None,
            created_at: Utc::now(),
        };
        self.courses.write().insert(id, course.clone());
        course
    }

    /// Enroll a student in a course.
    pub fn enroll(&self, student_id: StudentId, course_id: CourseId) {
        let mut enrollments = self.enrollments.write();
        let pair = (student_id.0, course_id.0);
        if !enrollments.contains(&pair) {
            enrollments.push(pair);
        }
    }

    fn matches_filter(record: &AttendanceRecord, filter: &StatsFilter) -> bool {
        if let Some(course_id) = filter.course_id {
            if record.course_id != course_id {
                return false;
            }
        }
        if let Some(start) = filter.start {
            if record.timestamp < start {
                return false;
            }
        }
        if let Some(end) = filter.end {
            if record.timestamp > end {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn student(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.students.read().get(&id.0).cloned())
    }

    async fn student_by_external_id(&self, external_id: &str) -> Result<Option<Student>> {
        Ok(self
            .students
            .read()
            .values()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.courses.read().get(&id.0).cloned())
    }

    async fn is_enrolled(&self, student_id: StudentId, course_id: CourseId) -> Result<bool> {
        Ok(self
            .enrollments
            .read()
            .contains(&(student_id.0, course_id.0)))
    }

    async fn template_for_slot(
        &self,
        student_id: StudentId,
        slot: FingerSlot,
    ) -> Result<Option<BiometricTemplate>> {
        Ok(self
            .templates
            .read()
            .values()
            .find(|t| t.student_id == student_id && t.finger_slot == slot)
            .cloned())
    }

    async fn template_owner(&self, template_id: TemplateId) -> Result<Option<BiometricTemplate>> {
        Ok(self
            .templates
            .read()
            .values()
            .find(|t| t.sensor_template_id == template_id)
            .cloned())
    }

    async fn upsert_template(&self, template: &NewTemplate) -> Result<BiometricTemplate> {
        let mut templates = self.templates.write();
        templates.retain(|_, t| {
            !(t.student_id == template.student_id && t.finger_slot == template.finger_slot)
                && t.sensor_template_id != template.sensor_template_id
        });
        let id = self.alloc_id();
        let stored = BiometricTemplate {
            id,
            student_id: template.student_id,
            finger_slot: template.finger_slot,
            sensor_template_id: template.sensor_template_id,
            template_data: template.template_data.clone(),
            created_at: Utc::now(),
        };
        templates.insert(id, stored.clone());
        Ok(stored)
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<AttendanceRecord> {
        let stored = AttendanceRecord {
            id: self.alloc_id(),
            student_id: record.student_id,
            course_id: record.course_id,
            timestamp: record.timestamp,
            status: record.status,
            synced: record.synced,
        };
        self.attendance.write().push(stored.clone());
        Ok(stored)
    }

    async fn unsynced_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .attendance
            .read()
            .iter()
            .filter(|r| !r.synced)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    async fn mark_synced(&self, ids: &[i32]) -> Result<usize> {
        let mut attendance = self.attendance.write();
        let mut updated = 0;
        for record in attendance.iter_mut() {
            if ids.contains(&record.id) && !record.synced {
                record.synced = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn status_counts(&self, filter: &StatsFilter) -> Result<StatusCounts> {
        let attendance = self.attendance.read();
        let mut counts = StatusCounts::default();
        for record in attendance.iter().filter(|r| Self::matches_filter(r, filter)) {
            match record.status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::Absent => counts.absent += 1,
            }
        }
        Ok(counts)
    }

    async fn recent_attendance(
        &self,
        filter: &StatsFilter,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .attendance
            .read()
            .iter()
            .filter(|r| Self::matches_filter(r, filter))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_slot_and_sensor_id() {
        let store = MemoryStore::new();
        let student = store.add_student("S00001", "Test", "Student");

        store
            .upsert_template(&NewTemplate {
                student_id: student.id,
                finger_slot: FingerSlot::new(2).unwrap(),
                sensor_template_id: TemplateId(5),
                template_data: b"old".to_vec(),
            })
            .await
            .unwrap();
        store
            .upsert_template(&NewTemplate {
                student_id: student.id,
                finger_slot: FingerSlot::new(2).unwrap(),
                sensor_template_id: TemplateId(6),
                template_data: b"new".to_vec(),
            })
            .await
            .unwrap();

        assert!(store.template_owner(TemplateId(5)).await.unwrap().is_none());
        let stored = store
            .template_for_slot(student.id, FingerSlot::new(2).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.template_data, b"new");
    }

    #[tokio::test]
    async fn mark_synced_counts_only_flips() {
        let store = MemoryStore::new();
        let student = store.add_student("S00001", "Test", "Student");
        let course = store.add_course("CS101", "Intro");

        let record = store
            .insert_attendance(&NewAttendance {
                student_id: student.id,
                course_id: course.id,
                timestamp: Utc::now(),
                status: AttendanceStatus::Present,
                synced: false,
            })
            .await
            .unwrap();

        assert_eq!(store.mark_synced(&[record.id]).await.unwrap(), 1);
        assert_eq!(store.mark_synced(&[record.id]).await.unwrap(), 0);
    }
}
