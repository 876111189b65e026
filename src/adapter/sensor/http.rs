//! HTTP transport to a networked sensor module.
//!
//! The module exposes the same reply documents as the serial firmware
//! behind a small REST surface. Enrollment differs in one respect: the
//! module hands out the device slot id up front (`GET /enrollment/start`),
//! so the adapter remembers it and fills it into a completing poll that
//! omits one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::wire::{EnrollmentStatusReply, HealthWireReply, VerifyWireReply};
use crate::config::SensorConfig;
use crate::domain::{EnrollmentPoll, PollPhase, SensorHealth, VerifyReply};
use crate::error::{Error, Result};
use crate::port::SensorLink;

#[derive(Debug, Deserialize)]
struct SlotReply {
    finger_id: u32,
}

#[derive(Debug, Serialize)]
struct SlotRequest {
    finger_id: u32,
}

#[derive(Debug, Deserialize)]
struct TemplateCountReply {
    count: u32,
}

pub struct HttpSensor {
    base_url: Url,
    client: reqwest::Client,
    verify_timeout: std::time::Duration,
    connected: bool,
    /// Device slot id handed out for the enrollment in flight.
    pending_slot: Option<u32>,
}

impl HttpSensor {
    pub fn new(config: &SensorConfig) -> Result<Self> {
        let base = config
            .base_url
            .as_deref()
            .ok_or(Error::InvalidRequest("sensor.base_url is required".into()))?;
        let base_url = Url::parse(base)?;
        let client = reqwest::Client::builder()
            .timeout(config.read_timeout())
            .build()?;

        Ok(Self {
            base_url,
            client,
            verify_timeout: config.verify_timeout(),
            connected: false,
            pending_slot: None,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let reply = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(reply)
    }

    async fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?.error_for_status()?)
    }
}

#[async_trait]
impl SensorLink for HttpSensor {
    async fn initialize(&mut self) -> bool {
        match self.post::<()>("init", None).await {
            Ok(_) => {
                self.connected = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "sensor module init failed");
                self.connected = false;
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn reconnect(&mut self) -> bool {
        self.initialize().await
    }

    async fn start_enrollment(&mut self) -> bool {
        let slot = match self.get_json::<SlotReply>("enrollment/start").await {
            Ok(reply) => reply.finger_id,
            Err(e) => {
                warn!(error = %e, "failed to reserve an enrollment slot");
                return false;
            }
        };

        match self
            .post("enroll", Some(&SlotRequest { finger_id: slot }))
            .await
        {
            Ok(_) => {
                debug!(slot, "enrollment started");
                self.pending_slot = Some(slot);
                true
            }
            Err(e) => {
                warn!(slot, error = %e, "failed to start enrollment");
                false
            }
        }
    }

    async fn poll_enrollment(&mut self) -> EnrollmentPoll {
        let mut reply = match self.get_json::<EnrollmentStatusReply>("enrollment-status").await {
            Ok(reply) => reply,
            Err(e) => return EnrollmentPoll::transport_error(e.to_string()),
        };

        if reply.status == PollPhase::Complete && reply.template_id.is_none() {
            reply.template_id = self.pending_slot;
        }
        let poll = reply.into_poll();
        if matches!(poll.phase, PollPhase::Complete | PollPhase::Error) {
            self.pending_slot = None;
        }
        poll
    }

    async fn verify(&mut self) -> VerifyReply {
        let url = match self.endpoint("verify") {
            Ok(url) => url,
            Err(e) => return VerifyReply::Error { message: e.to_string() },
        };

        let response = self
            .client
            .post(url)
            .timeout(self.verify_timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                if e.is_connect() {
                    self.connected = false;
                }
                return VerifyReply::Error { message: e.to_string() };
            }
        };

        match response.json::<VerifyWireReply>().await {
            Ok(wire) => wire.into_reply(),
            Err(e) => VerifyReply::Error {
                message: format!("malformed verify reply: {e}"),
            },
        }
    }

    async fn cancel(&mut self) -> bool {
        let Some(slot) = self.pending_slot else {
            // Nothing in flight.
            return true;
        };
        match self
            .post("delete", Some(&SlotRequest { finger_id: slot }))
            .await
        {
            Ok(_) => {
                self.pending_slot = None;
                true
            }
            Err(e) => {
                warn!(slot, error = %e, "failed to cancel enrollment");
                false
            }
        }
    }

    async fn status(&mut self) -> SensorHealth {
        let mut health = match self.get_json::<HealthWireReply>("status").await {
            Ok(wire) => wire.into_health(),
            Err(e) => {
                self.connected = false;
                return SensorHealth::error(e.to_string());
            }
        };

        if let Ok(reply) = self.get_json::<TemplateCountReply>("template-count").await {
            health.message = format!("{} ({} templates stored)", health.message, reply.count);
        }
        health
    }

    async fn close(&mut self) {
        self.connected = false;
        self.pending_slot = None;
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_config() -> SensorConfig {
        SensorConfig {
            transport: crate::config::SensorTransport::Http,
            base_url: Some("http://192.168.1.40/".into()),
            ..SensorConfig::default()
        }
    }

    #[test]
    fn requires_a_base_url() {
        let config = SensorConfig::default();
        assert!(HttpSensor::new(&config).is_err());
        assert!(HttpSensor::new(&http_config()).is_ok());
    }

    #[test]
    fn endpoints_join_against_the_base() {
        let sensor = HttpSensor::new(&http_config()).unwrap();
        assert_eq!(
            sensor.endpoint("enrollment-status").unwrap().as_str(),
            "http://192.168.1.40/enrollment-status"
        );
    }

    #[tokio::test]
    async fn cancel_without_pending_enrollment_is_noop_success() {
        let mut sensor = HttpSensor::new(&http_config()).unwrap();
        assert!(sensor.cancel().await);
    }
}
