//! HTTP sync target posting attendance batches to the campus aggregator.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::port::{SyncEntry, SyncTarget};

#[derive(Serialize)]
struct SyncPayload<'a> {
    records: &'a [SyncEntry],
}

pub struct HttpSyncTarget {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpSyncTarget {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl SyncTarget for HttpSyncTarget {
    async fn push(&self, batch: &[SyncEntry]) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&SyncPayload { records: batch })
            .send()
            .await
            .map_err(|e| Error::SyncFailed(e.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "aggregator rejected the batch");
            return Err(Error::SyncFailed(format!(
                "aggregator answered {}",
                response.status()
            )));
        }

        debug!(records = batch.len(), "batch accepted by aggregator");
        Ok(())
    }

    fn target_name(&self) -> &'static str {
        "http-aggregator"
    }
}

/// Fallback target used when no aggregator endpoint is configured: records
/// are marked synced locally and the hand-off is logged.
pub struct LocalSyncTarget;

#[async_trait]
impl SyncTarget for LocalSyncTarget {
    async fn push(&self, batch: &[SyncEntry]) -> Result<()> {
        debug!(records = batch.len(), "no aggregator configured, marking locally");
        Ok(())
    }

    fn target_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_endpoints() {
        assert!(HttpSyncTarget::new("not a url").is_err());
        assert!(HttpSyncTarget::new("https://aggregator.example.edu/attendance").is_ok());
    }

    #[test]
    fn payload_serializes_records_envelope() {
        use crate::domain::{AttendanceStatus, CourseId};

        let entry = SyncEntry {
            id: 1,
            student_id: "S00001".into(),
            course_id: CourseId(2),
            timestamp: chrono::Utc::now(),
            status: AttendanceStatus::Present,
        };
        let json = serde_json::to_value(SyncPayload { records: &[entry] }).unwrap();
        assert_eq!(json["records"][0]["student_id"], "S00001");
        assert_eq!(json["records"][0]["status"], "present");
    }
}
