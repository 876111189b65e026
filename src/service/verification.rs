//! Live fingerprint verification and attendance capture.

use std::sync::Arc;

use tracing::info;

use crate::domain::{AttendanceRecord, AttendanceStatus, CourseId, Student, VerifyReply};
use crate::error::{Error, Result};
use crate::port::AttendanceStore;
use crate::service::{AttendanceRecorder, SensorHandle};

/// What a successful scan produced.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub student: Student,
    /// Match confidence as reported by the device, when it reports one.
    pub confidence: Option<u8>,
    pub record: AttendanceRecord,
}

/// Runs a live scan against the device and resolves the match back to a
/// student. The four failure paths stay distinct so an operator client can
/// show the right message: device unreachable, nothing matched, matched a
/// template no student owns, or the record write failed.
pub struct VerificationService {
    store: Arc<dyn AttendanceStore>,
    sensor: Arc<SensorHandle>,
    recorder: Arc<AttendanceRecorder>,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        sensor: Arc<SensorHandle>,
        recorder: Arc<AttendanceRecorder>,
    ) -> Self {
        Self {
            store,
            sensor,
            recorder,
        }
    }

    /// Scan, identify, and record attendance against the course.
    pub async fn verify_and_record(&self, course_id: Option<CourseId>) -> Result<VerifyOutcome> {
        let course_id = course_id
            .ok_or_else(|| Error::InvalidRequest("a course id is required".into()))?;
        self.store
            .course(course_id)
            .await?
            .ok_or_else(|| Error::not_found("course", course_id))?;

        // One reconnect attempt before giving up on the device.
        if !self.sensor.is_connected().await && !self.sensor.reconnect().await {
            return Err(Error::SensorUnavailable(
                "could not reach the fingerprint device".into(),
            ));
        }

        let (template_id, confidence) = match self.sensor.verify().await {
            VerifyReply::Match {
                template_id,
                confidence,
            } => {
                info!(template = %template_id, confidence, "fingerprint matched");
                (template_id, confidence)
            }
            VerifyReply::NoMatch { message } => return Err(Error::NoMatch(message)),
            VerifyReply::Error { message } => return Err(Error::SensorUnavailable(message)),
        };

        let template = self
            .store
            .template_owner(template_id)
            .await?
            .ok_or(Error::UnenrolledTemplate {
                template_id: template_id.0,
            })?;

        let student = self
            .store
            .student(template.student_id)
            .await?
            .ok_or_else(|| Error::not_found("student", template.student_id))?;

        // A verified scan originated on the device side; the aggregator
        // sees it through that channel, so the record lands pre-synced.
        let record = self
            .recorder
            .record(student.id, course_id, AttendanceStatus::Present, None, true)
            .await
            .map_err(|e| match e {
                e @ (Error::Database(_) | Error::Connection(_)) => {
                    Error::persistence("recording attendance", e)
                }
                other => other,
            })?;

        Ok(VerifyOutcome {
            student,
            confidence,
            record,
        })
    }
}
