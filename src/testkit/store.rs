//! Store doubles.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::store::MemoryStore;
use crate::domain::{
    AttendanceRecord, BiometricTemplate, Course, CourseId, FingerSlot, NewAttendance, NewTemplate,
    StatsFilter, StatusCounts, Student, StudentId, TemplateId,
};
use crate::error::{Error, Result};
use crate::port::AttendanceStore;

/// Delegates every read to an inner [`MemoryStore`] but rejects attendance
/// writes, for exercising persistence failure paths.
pub struct FailingWriteStore {
    inner: Arc<MemoryStore>,
}

impl FailingWriteStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AttendanceStore for FailingWriteStore {
    async fn student(&self, id: StudentId) -> Result<Option<Student>> {
        self.inner.student(id).await
    }

    async fn student_by_external_id(&self, external_id: &str) -> Result<Option<Student>> {
        self.inner.student_by_external_id(external_id).await
    }

    async fn course(&self, id: CourseId) -> Result<Option<Course>> {
        self.inner.course(id).await
    }

    async fn is_enrolled(&self, student_id: StudentId, course_id: CourseId) -> Result<bool> {
        self.inner.is_enrolled(student_id, course_id).await
    }

    async fn template_for_slot(
        &self,
        student_id: StudentId,
        slot: FingerSlot,
    ) -> Result<Option<BiometricTemplate>> {
        self.inner.template_for_slot(student_id, slot).await
    }

    async fn template_owner(&self, template_id: TemplateId) -> Result<Option<BiometricTemplate>> {
        self.inner.template_owner(template_id).await
    }

    async fn upsert_template(&self, template: &NewTemplate) -> Result<BiometricTemplate> {
        self.inner.upsert_template(template).await
    }

    async fn insert_attendance(&self, _record: &NewAttendance) -> Result<AttendanceRecord> {
        Err(Error::Database("attendance write rejected".into()))
    }

    async fn unsynced_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        self.inner.unsynced_attendance().await
    }

    async fn mark_synced(&self, ids: &[i32]) -> Result<usize> {
        self.inner.mark_synced(ids).await
    }

    async fn status_counts(&self, filter: &StatsFilter) -> Result<StatusCounts> {
        self.inner.status_counts(filter).await
    }

    async fn recent_attendance(
        &self,
        filter: &StatsFilter,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        self.inner.recent_attendance(filter, limit).await
    }
}
