//! Attendance recording, external ingestion, sync, and statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, CourseId, NewAttendance, StatsFilter,
    StudentId,
};
use crate::error::{Error, Result};
use crate::port::{AttendanceStore, SyncEntry, SyncTarget};

/// Result of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Records handed off and marked synced. 0 when nothing was pending.
    pub synced: usize,
}

/// Writes attendance records and hands them off to the aggregator.
pub struct AttendanceRecorder {
    store: Arc<dyn AttendanceStore>,
    target: Arc<dyn SyncTarget>,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl AttendanceRecorder {
    pub fn new(store: Arc<dyn AttendanceStore>, target: Arc<dyn SyncTarget>) -> Self {
        Self {
            store,
            target,
            last_sync: Mutex::new(None),
        }
    }

    /// Record attendance taken at this station.
    ///
    /// Both the student and the course must exist. A student not enrolled
    /// in the course is logged and recorded anyway; roster gaps are a
    /// registrar problem, not a reason to lose the observation.
    ///
    /// `synced` is false for manual entries and true for records that
    /// originated on the device side, which the aggregator already knows
    /// about.
    pub async fn record(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        status: AttendanceStatus,
        timestamp: Option<DateTime<Utc>>,
        synced: bool,
    ) -> Result<AttendanceRecord> {
        let student = self
            .store
            .student(student_id)
            .await?
            .ok_or_else(|| Error::not_found("student", student_id))?;
        let course = self
            .store
            .course(course_id)
            .await?
            .ok_or_else(|| Error::not_found("course", course_id))?;

        if !self.store.is_enrolled(student_id, course_id).await? {
            warn!(
                student = %student.external_id,
                course = %course.code,
                "recording attendance for a student not on the course roster"
            );
        }

        let record = self
            .store
            .insert_attendance(&NewAttendance {
                student_id,
                course_id,
                timestamp: timestamp.unwrap_or_else(Utc::now),
                status,
                synced,
            })
            .await?;

        info!(
            student = %student.external_id,
            course = %course.code,
            status = %record.status,
            "attendance recorded"
        );
        Ok(record)
    }

    /// Ingest a record pushed by the campus aggregator.
    ///
    /// The student arrives as the campus-issued id string, unknown statuses
    /// normalize to present, and an unparseable timestamp falls back to
    /// now. Records arriving this way are already on the aggregator, so
    /// they land pre-synced.
    pub async fn record_external(
        &self,
        external_id: &str,
        course_id: CourseId,
        status: &str,
        timestamp: Option<&str>,
    ) -> Result<AttendanceRecord> {
        let student = self
            .store
            .student_by_external_id(external_id)
            .await?
            .ok_or_else(|| Error::not_found("student", external_id))?;
        self.store
            .course(course_id)
            .await?
            .ok_or_else(|| Error::not_found("course", course_id))?;

        let timestamp = match timestamp {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    warn!(raw, error = %e, "unparseable timestamp, falling back to now");
                    Utc::now()
                }
            },
            None => Utc::now(),
        };

        self.store
            .insert_attendance(&NewAttendance {
                student_id: student.id,
                course_id,
                timestamp,
                status: AttendanceStatus::normalize(status),
                synced: true,
            })
            .await
    }

    /// Push every unsynced record to the aggregator, all or nothing.
    ///
    /// On a rejected batch every record stays unsynced and the next pass
    /// retries the whole thing.
    pub async fn sync(&self) -> Result<SyncReport> {
        let pending = self.store.unsynced_attendance().await?;
        if pending.is_empty() {
            return Ok(SyncReport { synced: 0 });
        }

        let mut batch = Vec::with_capacity(pending.len());
        for record in &pending {
            let student = self
                .store
                .student(record.student_id)
                .await?
                .ok_or_else(|| Error::not_found("student", record.student_id))?;
            batch.push(SyncEntry::from_record(record, student.external_id));
        }

        self.target.push(&batch).await?;

        let ids: Vec<i32> = pending.iter().map(|r| r.id).collect();
        let synced = self.store.mark_synced(&ids).await?;
        *self.last_sync.lock() = Some(Utc::now());

        info!(
            records = synced,
            target = self.target.target_name(),
            "attendance synced"
        );
        Ok(SyncReport { synced })
    }

    /// When the last successful sync pass finished, if any has.
    #[must_use]
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.lock()
    }

    /// Aggregate statistics under the given filter.
    pub async fn statistics(&self, filter: &StatsFilter) -> Result<AttendanceStats> {
        let counts = self.store.status_counts(filter).await?;
        Ok(AttendanceStats::from_counts(counts))
    }

    /// Most recent records under the given filter, newest first.
    pub async fn recent(&self, filter: &StatsFilter, limit: i64) -> Result<Vec<AttendanceRecord>> {
        self.store.recent_attendance(filter, limit).await
    }
}
