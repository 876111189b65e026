//! Values crossing the sensor boundary.
//!
//! The sensor port never surfaces raw transport errors: every failure is
//! folded into one of these shapes at the adapter boundary.

use serde::{Deserialize, Serialize};

use super::ids::TemplateId;

/// Coarse device phase reported on an enrollment status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    /// Device is waiting for a finger placement.
    Waiting,
    /// Device is capturing or processing.
    InProgress,
    /// Enrollment finished; template bytes are attached.
    Complete,
    /// Device-side failure, including transport faults.
    Error,
}

/// One enrollment status poll answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentPoll {
    pub phase: PollPhase,
    pub message: String,
    /// 0-100. The device ramps 0-50 on the first capture and 50-100 on the
    /// second, holding 95 while processing.
    pub progress: u8,
    /// Present only when `phase` is `Complete`.
    pub template: Option<CompletedTemplate>,
}

/// Template material delivered on the completing poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTemplate {
    pub template_id: TemplateId,
    pub data: Vec<u8>,
}

impl EnrollmentPoll {
    /// Error-shaped poll used when the transport itself fails.
    #[must_use]
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            phase: PollPhase::Error,
            message: message.into(),
            progress: 0,
            template: None,
        }
    }
}

/// Outcome of a live verify scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyReply {
    /// The device matched a stored template.
    Match {
        template_id: TemplateId,
        /// Match confidence 0-100, when the device reports one.
        confidence: Option<u8>,
    },
    /// Scan completed but matched nothing in device memory.
    NoMatch { message: String },
    /// Device or transport failure.
    Error { message: String },
}

/// Coarse sensor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorState {
    Ready,
    Enrolling,
    Error,
}

/// Answer to a sensor status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorHealth {
    pub state: SensorState,
    pub message: String,
}

impl SensorHealth {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: SensorState::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, SensorState::Ready)
    }
}
