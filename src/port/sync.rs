//! Sync port: bulk hand-off of attendance records to an external
//! aggregator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AttendanceRecord, AttendanceStatus, CourseId};
use crate::error::Result;

/// One record in a sync batch, keyed by the campus-issued student id so
/// the aggregator never sees our database ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    pub id: i32,
    pub student_id: String,
    pub course_id: CourseId,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

impl SyncEntry {
    #[must_use]
    pub fn from_record(record: &AttendanceRecord, student_external_id: String) -> Self {
        Self {
            id: record.id,
            student_id: student_external_id,
            course_id: record.course_id,
            timestamp: record.timestamp,
            status: record.status,
        }
    }
}

/// Receiver for bulk attendance hand-off.
///
/// `push` is all-or-nothing from the caller's perspective: on error the
/// caller leaves every record unsynced and retries the whole batch later.
#[async_trait]
pub trait SyncTarget: Send + Sync {
    async fn push(&self, batch: &[SyncEntry]) -> Result<()>;

    /// Target name for logging.
    fn target_name(&self) -> &'static str;
}
