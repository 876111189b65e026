//! Enrollment stage machine.
//!
//! Stages only ever advance as observed by successive polls: the device
//! reports phase and progress, [`EnrollStage::classify`] maps that onto a
//! stage, and the session clamps against regression.

use serde::Serialize;

use super::ids::{FingerSlot, StudentId};
use super::sensor::PollPhase;

/// Server-side view of where a two-sample capture stands.
///
/// Ordering is meaningful: later stages compare greater, which is what the
/// monotonicity clamp relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollStage {
    AwaitingFirstSample,
    CapturingFirst,
    AwaitingSecondSample,
    CapturingSecond,
    Processing,
    Complete,
}

impl EnrollStage {
    /// Map a device poll onto a stage.
    ///
    /// The device contract: progress 0 while awaiting the first placement,
    /// 0-50 during the first capture, held at 50 between samples, 50-100
    /// during the second capture, pinned at 95 while processing.
    #[must_use]
    pub fn classify(phase: PollPhase, progress: u8) -> Option<Self> {
        match phase {
            PollPhase::Complete => Some(Self::Complete),
            PollPhase::Waiting => {
                if progress < 50 {
                    Some(Self::AwaitingFirstSample)
                } else {
                    Some(Self::AwaitingSecondSample)
                }
            }
            PollPhase::InProgress => {
                if progress < 50 {
                    Some(Self::CapturingFirst)
                } else if progress < 95 {
                    Some(Self::CapturingSecond)
                } else {
                    Some(Self::Processing)
                }
            }
            PollPhase::Error => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingFirstSample => "awaiting_first_sample",
            Self::CapturingFirst => "capturing_first",
            Self::AwaitingSecondSample => "awaiting_second_sample",
            Self::CapturingSecond => "capturing_second",
            Self::Processing => "processing",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for EnrollStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to an operator's enrollment poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentUpdate {
    /// No enrollment in progress for this operator. Also the answer for
    /// any poll issued after completion.
    Inactive,
    /// Capture underway.
    InProgress {
        stage: EnrollStage,
        progress: u8,
        message: String,
    },
    /// Enrollment finished and the template was persisted.
    Complete {
        student_id: StudentId,
        finger_slot: FingerSlot,
        message: String,
    },
    /// Device-side failure; the session has been cleared.
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_progress_contract() {
        assert_eq!(
            EnrollStage::classify(PollPhase::Waiting, 0),
            Some(EnrollStage::AwaitingFirstSample)
        );
        assert_eq!(
            EnrollStage::classify(PollPhase::InProgress, 25),
            Some(EnrollStage::CapturingFirst)
        );
        assert_eq!(
            EnrollStage::classify(PollPhase::Waiting, 50),
            Some(EnrollStage::AwaitingSecondSample)
        );
        assert_eq!(
            EnrollStage::classify(PollPhase::InProgress, 75),
            Some(EnrollStage::CapturingSecond)
        );
        assert_eq!(
            EnrollStage::classify(PollPhase::InProgress, 95),
            Some(EnrollStage::Processing)
        );
        assert_eq!(
            EnrollStage::classify(PollPhase::Complete, 100),
            Some(EnrollStage::Complete)
        );
        assert_eq!(EnrollStage::classify(PollPhase::Error, 0), None);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(EnrollStage::AwaitingFirstSample < EnrollStage::CapturingFirst);
        assert!(EnrollStage::CapturingSecond < EnrollStage::Processing);
        assert!(EnrollStage::Processing < EnrollStage::Complete);
    }
}
