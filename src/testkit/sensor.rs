//! A sensor double driven by a script of queued replies.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    CompletedTemplate, EnrollmentPoll, PollPhase, SensorHealth, SensorState, TemplateId,
    VerifyReply,
};
use crate::port::SensorLink;

#[derive(Default)]
struct State {
    connected: bool,
    refuse_initialize: bool,
    refuse_start: bool,
    polls: VecDeque<EnrollmentPoll>,
    verifies: VecDeque<VerifyReply>,
    starts: usize,
    cancels: usize,
}

/// Answers each command from a queue of scripted replies.
///
/// Clones share state, so a test can keep one clone as a probe while the
/// other is boxed into a [`SensorHandle`](crate::service::SensorHandle).
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    state: Arc<Mutex<State>>,
}

impl ScriptedSensor {
    /// A sensor that connects and initializes cleanly.
    #[must_use]
    pub fn connected() -> Self {
        let sensor = Self::default();
        sensor.state.lock().connected = true;
        sensor
    }

    /// Make `initialize` and `reconnect` fail.
    #[must_use]
    pub fn refuse_initialize(self) -> Self {
        {
            let mut state = self.state.lock();
            state.refuse_initialize = true;
            state.connected = false;
        }
        self
    }

    /// Make `start_enrollment` fail.
    #[must_use]
    pub fn refuse_start(self) -> Self {
        self.state.lock().refuse_start = true;
        self
    }

    /// Queue one enrollment poll reply.
    #[must_use]
    pub fn push_poll(self, poll: EnrollmentPoll) -> Self {
        self.state.lock().polls.push_back(poll);
        self
    }

    /// Queue one verify reply.
    #[must_use]
    pub fn push_verify(self, reply: VerifyReply) -> Self {
        self.state.lock().verifies.push_back(reply);
        self
    }

    /// Number of `start_enrollment` calls that succeeded.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of `cancel` calls received.
    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.state.lock().cancels
    }
}

/// A waiting-phase poll.
#[must_use]
pub fn poll_waiting(progress: u8, message: &str) -> EnrollmentPoll {
    EnrollmentPoll {
        phase: PollPhase::Waiting,
        message: message.to_string(),
        progress,
        template: None,
    }
}

/// An in-progress poll.
#[must_use]
pub fn poll_in_progress(progress: u8, message: &str) -> EnrollmentPoll {
    EnrollmentPoll {
        phase: PollPhase::InProgress,
        message: message.to_string(),
        progress,
        template: None,
    }
}

/// A completing poll carrying template material.
#[must_use]
pub fn poll_complete(template_id: u32, data: &[u8]) -> EnrollmentPoll {
    EnrollmentPoll {
        phase: PollPhase::Complete,
        message: "enrollment complete".to_string(),
        progress: 100,
        template: Some(CompletedTemplate {
            template_id: TemplateId(template_id),
            data: data.to_vec(),
        }),
    }
}

#[async_trait]
impl SensorLink for ScriptedSensor {
    async fn initialize(&mut self) -> bool {
        let mut state = self.state.lock();
        if state.refuse_initialize {
            return false;
        }
        state.connected = true;
        true
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    async fn reconnect(&mut self) -> bool {
        self.initialize().await
    }

    async fn start_enrollment(&mut self) -> bool {
        let mut state = self.state.lock();
        if !state.connected || state.refuse_start {
            return false;
        }
        state.starts += 1;
        true
    }

    async fn poll_enrollment(&mut self) -> EnrollmentPoll {
        self.state
            .lock()
            .polls
            .pop_front()
            .unwrap_or_else(|| EnrollmentPoll::transport_error("script exhausted"))
    }

    async fn verify(&mut self) -> VerifyReply {
        self.state.lock().verifies.pop_front().unwrap_or(VerifyReply::Error {
            message: "script exhausted".to_string(),
        })
    }

    async fn cancel(&mut self) -> bool {
        self.state.lock().cancels += 1;
        true
    }

    async fn status(&mut self) -> SensorHealth {
        let state = self.state.lock();
        if state.connected {
            SensorHealth {
                state: SensorState::Ready,
                message: "scripted".to_string(),
            }
        } else {
            SensorHealth::error("not connected")
        }
    }

    async fn close(&mut self) {
        self.state.lock().connected = false;
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}
