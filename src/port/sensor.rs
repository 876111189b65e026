//! Sensor port: the command protocol against the fingerprint device.
//!
//! Implementations speak to real hardware over a serial line or to a
//! networked sensor module over HTTP. Every method resolves to a value;
//! transport failures (I/O errors, malformed replies) are folded into the
//! error-shaped variants of the returned types and never cross this
//! boundary as raw errors.

use async_trait::async_trait;

use crate::domain::{EnrollmentPoll, SensorHealth, VerifyReply};

/// Command interface to the fingerprint capture device.
///
/// The device is a single-owner resource: callers go through
/// [`SensorHandle`](crate::service::SensorHandle), which serializes command
/// dispatch behind one lock. That lock is the only access path, so
/// implementations only need `Send` — the serial port handle, for one, is
/// not `Sync`.
#[async_trait]
pub trait SensorLink: Send {
    /// One-time hardware handshake. Idempotent: calling on an already
    /// initialized device reports the current state rather than erroring.
    async fn initialize(&mut self) -> bool;

    /// Whether the transport currently holds a usable connection.
    fn is_connected(&self) -> bool;

    /// Re-establish the transport. Best effort; returns the new
    /// connected-and-initialized state.
    async fn reconnect(&mut self) -> bool;

    /// Begin a two-sample capture sequence. Fails (false) when the device
    /// is already mid-operation or unreachable.
    async fn start_enrollment(&mut self) -> bool;

    /// Non-blocking status query, bounded by the transport's read timeout.
    async fn poll_enrollment(&mut self) -> EnrollmentPoll;

    /// Blocking live scan-and-match, bounded by a generous timeout since
    /// it waits on a finger placement.
    async fn verify(&mut self) -> VerifyReply;

    /// Abort any in-flight device operation. No-op success when idle.
    async fn cancel(&mut self) -> bool;

    /// Current device status.
    async fn status(&mut self) -> SensorHealth;

    /// Release the transport. Called once at shutdown.
    async fn close(&mut self);

    /// Transport name for logging.
    fn transport_name(&self) -> &'static str;
}

#[async_trait]
impl SensorLink for Box<dyn SensorLink> {
    async fn initialize(&mut self) -> bool {
        (**self).initialize().await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn reconnect(&mut self) -> bool {
        (**self).reconnect().await
    }

    async fn start_enrollment(&mut self) -> bool {
        (**self).start_enrollment().await
    }

    async fn poll_enrollment(&mut self) -> EnrollmentPoll {
        (**self).poll_enrollment().await
    }

    async fn verify(&mut self) -> VerifyReply {
        (**self).verify().await
    }

    async fn cancel(&mut self) -> bool {
        (**self).cancel().await
    }

    async fn status(&mut self) -> SensorHealth {
        (**self).status().await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}
