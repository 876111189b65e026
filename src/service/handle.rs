//! Shared ownership of the single sensor device.

use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{EnrollmentPoll, SensorHealth, VerifyReply};
use crate::port::SensorLink;

/// Serializes all command dispatch to the device behind one async lock.
///
/// The device processes one command at a time; interleaving an enrollment
/// poll with a verify scan corrupts both. Every caller goes through this
/// handle, so at most one command is in flight.
pub struct SensorHandle {
    inner: Mutex<Box<dyn SensorLink>>,
}

impl SensorHandle {
    #[must_use]
    pub fn new(link: Box<dyn SensorLink>) -> Self {
        Self {
            inner: Mutex::new(link),
        }
    }

    pub async fn initialize(&self) -> bool {
        let mut link = self.inner.lock().await;
        let ok = link.initialize().await;
        info!(transport = link.transport_name(), ok, "sensor initialize");
        ok
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected()
    }

    pub async fn reconnect(&self) -> bool {
        self.inner.lock().await.reconnect().await
    }

    pub async fn start_enrollment(&self) -> bool {
        self.inner.lock().await.start_enrollment().await
    }

    pub async fn poll_enrollment(&self) -> EnrollmentPoll {
        self.inner.lock().await.poll_enrollment().await
    }

    pub async fn verify(&self) -> VerifyReply {
        self.inner.lock().await.verify().await
    }

    pub async fn cancel(&self) -> bool {
        self.inner.lock().await.cancel().await
    }

    pub async fn status(&self) -> SensorHealth {
        self.inner.lock().await.status().await
    }

    pub async fn transport_name(&self) -> &'static str {
        self.inner.lock().await.transport_name()
    }

    pub async fn shutdown(&self) {
        let mut link = self.inner.lock().await;
        link.close().await;
        info!(transport = link.transport_name(), "sensor released");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::sensor::SerialSensor;
    use crate::config::SensorConfig;

    // The serial port handle is Send but not Sync; the handle must still be
    // shareable because the lock is the only access path.
    #[tokio::test(flavor = "multi_thread")]
    async fn handle_shares_a_serial_link_across_tasks() {
        let link = SerialSensor::new(&SensorConfig::default());
        let handle = Arc::new(SensorHandle::new(Box::new(link)));

        let probe = handle.clone();
        let joined = tokio::spawn(async move { probe.is_connected().await })
            .await
            .unwrap();
        assert!(!joined);
        assert_eq!(handle.transport_name().await, "serial");
    }
}
