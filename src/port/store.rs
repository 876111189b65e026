//! Store port for the persistence collaborator.
//!
//! Students, courses, and enrollments are managed elsewhere (CRUD layer);
//! the core only reads them. Attendance records and biometric templates
//! are the two entities this crate writes.

use async_trait::async_trait;

use crate::domain::{
    AttendanceRecord, BiometricTemplate, Course, CourseId, FingerSlot, NewAttendance, NewTemplate,
    StatsFilter, StatusCounts, Student, StudentId, TemplateId,
};
use crate::error::Result;

/// Persistence operations the core depends on.
///
/// Implementations must be thread-safe. Multi-row writes
/// (`upsert_template`, `mark_synced`) are transactional: they either apply
/// fully or leave the store untouched.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Look up a student by database id.
    async fn student(&self, id: StudentId) -> Result<Option<Student>>;

    /// Look up a student by campus-issued external id string.
    async fn student_by_external_id(&self, external_id: &str) -> Result<Option<Student>>;

    /// Look up a course by database id.
    async fn course(&self, id: CourseId) -> Result<Option<Course>>;

    /// Whether the student is enrolled in the course.
    async fn is_enrolled(&self, student_id: StudentId, course_id: CourseId) -> Result<bool>;

    /// Template for one finger of one student, if enrolled.
    async fn template_for_slot(
        &self,
        student_id: StudentId,
        slot: FingerSlot,
    ) -> Result<Option<BiometricTemplate>>;

    /// Resolve a sensor-assigned template id to its owning template row.
    async fn template_owner(&self, template_id: TemplateId) -> Result<Option<BiometricTemplate>>;

    /// Insert or overwrite the template for `(student, finger_slot)`.
    /// Last write wins; exactly one row exists afterwards.
    async fn upsert_template(&self, template: &NewTemplate) -> Result<BiometricTemplate>;

    /// Append an attendance record.
    async fn insert_attendance(&self, record: &NewAttendance) -> Result<AttendanceRecord>;

    /// All records not yet handed off to the aggregator.
    async fn unsynced_attendance(&self) -> Result<Vec<AttendanceRecord>>;

    /// Flip the synced flag on the given records, all or nothing.
    /// Returns the number of rows updated.
    async fn mark_synced(&self, ids: &[i32]) -> Result<usize>;

    /// Per-status counts under the given filter.
    async fn status_counts(&self, filter: &StatsFilter) -> Result<StatusCounts>;

    /// Most recent records under the given filter, newest first.
    async fn recent_attendance(
        &self,
        filter: &StatsFilter,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>>;
}
