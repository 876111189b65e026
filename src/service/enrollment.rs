//! Enrollment sessions: starting, polling, cancelling, and reclaiming.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::{
    EnrollStage, EnrollmentUpdate, FingerSlot, NewTemplate, OperatorId, PollPhase, StudentId,
};
use crate::error::{Error, Result};
use crate::port::AttendanceStore;
use crate::service::SensorHandle;

struct Session {
    student_id: StudentId,
    finger_slot: FingerSlot,
    stage: EnrollStage,
    progress: u8,
    last_poll: Instant,
}

/// Drives the two-sample capture protocol and keeps the per-operator
/// session book.
///
/// The device runs one enrollment at a time, so at most one session is
/// live across all operators. Sessions an operator stops polling are
/// reclaimed after the TTL, which also aborts the device-side operation.
pub struct EnrollmentService {
    store: Arc<dyn AttendanceStore>,
    sensor: Arc<SensorHandle>,
    sessions: DashMap<OperatorId, Session>,
    /// Serializes `start`: the empty-map check, the device command, and the
    /// session insert must not interleave between callers.
    start_gate: tokio::sync::Mutex<()>,
    session_ttl: Duration,
}

impl EnrollmentService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        sensor: Arc<SensorHandle>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            store,
            sensor,
            sessions: DashMap::new(),
            start_gate: tokio::sync::Mutex::new(()),
            session_ttl,
        }
    }

    /// Start an enrollment for `student_id` on `finger_slot`.
    ///
    /// Re-enrolling an occupied slot is rejected unless `overwrite` is set.
    /// A second start while any session is live is rejected rather than
    /// silently replacing it.
    pub async fn start(
        &self,
        operator: OperatorId,
        student_id: StudentId,
        finger_slot: u8,
        overwrite: bool,
    ) -> Result<()> {
        self.sweep_expired().await;

        let slot = FingerSlot::new(finger_slot).ok_or_else(|| {
            Error::InvalidRequest(format!(
                "finger slot must be 0-{}, got {finger_slot}",
                FingerSlot::MAX
            ))
        })?;

        let student = self
            .store
            .student(student_id)
            .await?
            .ok_or_else(|| Error::not_found("student", student_id))?;

        if !overwrite && self.store.template_for_slot(student_id, slot).await?.is_some() {
            return Err(Error::InvalidRequest(format!(
                "finger slot {slot} of {} is already enrolled; pass overwrite to replace it",
                student.full_name()
            )));
        }

        let _gate = self.start_gate.lock().await;

        if let Some(entry) = self.sessions.iter().next() {
            let holder = entry.key().clone();
            return Err(Error::SessionConflict(if holder == operator {
                "an enrollment is already in progress for this operator".into()
            } else {
                format!("the device is busy with an enrollment held by {holder}")
            }));
        }

        if !self.sensor.is_connected().await && !self.sensor.reconnect().await {
            return Err(Error::SensorUnavailable(
                "could not reach the fingerprint device".into(),
            ));
        }
        if !self.sensor.start_enrollment().await {
            return Err(Error::SensorUnavailable(
                "device refused to start an enrollment".into(),
            ));
        }

        info!(operator = %operator, student = %student_id, slot = %slot, "enrollment started");
        self.sessions.insert(
            operator,
            Session {
                student_id,
                finger_slot: slot,
                stage: EnrollStage::AwaitingFirstSample,
                progress: 0,
                last_poll: Instant::now(),
            },
        );
        Ok(())
    }

    /// Poll the operator's session.
    ///
    /// Stage and progress never regress: a device answer that classifies
    /// behind the recorded stage is clamped forward. The completing poll
    /// retires the session before the template is persisted, so a repeat
    /// poll answers `Inactive` rather than persisting twice.
    pub async fn poll(&self, operator: &OperatorId) -> Result<EnrollmentUpdate> {
        self.sweep_expired().await;

        let Some(session) = self.sessions.get(operator) else {
            return Ok(EnrollmentUpdate::Inactive);
        };
        let (student_id, slot) = (session.student_id, session.finger_slot);
        drop(session);

        let poll = self.sensor.poll_enrollment().await;
        match poll.phase {
            PollPhase::Error => {
                self.sessions.remove(operator);
                warn!(operator = %operator, message = %poll.message, "enrollment failed");
                Ok(EnrollmentUpdate::Failed {
                    message: poll.message,
                })
            }
            PollPhase::Complete => {
                // Retire the session first: if persistence fails the error
                // surfaces once and a repeat poll is Inactive, never a
                // second write.
                self.sessions.remove(operator);

                let Some(template) = poll.template else {
                    return Ok(EnrollmentUpdate::Failed {
                        message: "device completed without delivering a template".into(),
                    });
                };

                let stored = self
                    .store
                    .upsert_template(&NewTemplate {
                        student_id,
                        finger_slot: slot,
                        sensor_template_id: template.template_id,
                        template_data: template.data,
                    })
                    .await
                    .map_err(|e| Error::persistence("storing fingerprint template", e))?;

                info!(
                    student = %student_id,
                    slot = %slot,
                    template = %stored.sensor_template_id,
                    "enrollment complete"
                );
                Ok(EnrollmentUpdate::Complete {
                    student_id,
                    finger_slot: slot,
                    message: poll.message,
                })
            }
            PollPhase::Waiting | PollPhase::InProgress => {
                let classified = EnrollStage::classify(poll.phase, poll.progress)
                    .unwrap_or(EnrollStage::AwaitingFirstSample);

                let mut session = self
                    .sessions
                    .get_mut(operator)
                    .ok_or_else(|| Error::SessionConflict("session vanished mid-poll".into()))?;
                session.stage = session.stage.max(classified);
                session.progress = session.progress.max(poll.progress);
                session.last_poll = Instant::now();

                Ok(EnrollmentUpdate::InProgress {
                    stage: session.stage,
                    progress: session.progress,
                    message: poll.message,
                })
            }
        }
    }

    /// Abort the operator's session. Returns whether one existed.
    pub async fn cancel(&self, operator: &OperatorId) -> Result<bool> {
        let existed = self.sessions.remove(operator).is_some();
        if existed {
            if !self.sensor.cancel().await {
                warn!(operator = %operator, "device-side cancel failed");
            }
            info!(operator = %operator, "enrollment cancelled");
        }
        Ok(existed)
    }

    /// Reclaim sessions whose operator stopped polling.
    async fn sweep_expired(&self) {
        let expired: Vec<OperatorId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().last_poll.elapsed() > self.session_ttl)
            .map(|entry| entry.key().clone())
            .collect();

        for operator in expired {
            if self.sessions.remove(&operator).is_some() {
                warn!(operator = %operator, "enrollment session expired, reclaiming");
                self.sensor.cancel().await;
            }
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
