//! JSON reply shapes shared by the sensor transports.
//!
//! The serial firmware and the networked sensor module answer with the
//! same JSON documents; both adapters parse through these types and
//! convert into domain values at the boundary.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::domain::{
    CompletedTemplate, EnrollmentPoll, PollPhase, SensorHealth, SensorState, TemplateId,
    VerifyReply,
};

/// Reply to an enrollment status query.
#[derive(Debug, Deserialize)]
pub struct EnrollmentStatusReply {
    pub status: PollPhase,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub progress: u8,
    /// Base64 template bytes, present on the completing reply.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub template_id: Option<u32>,
}

impl EnrollmentStatusReply {
    /// Convert into a domain poll. A `complete` reply without a template id
    /// is a malformed device answer and folds into an error poll.
    pub fn into_poll(self) -> EnrollmentPoll {
        let template = match (self.status, self.template_id) {
            (PollPhase::Complete, Some(id)) => {
                let data = match self.template.as_deref() {
                    Some(encoded) => match BASE64.decode(encoded) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            return EnrollmentPoll::transport_error(format!(
                                "malformed template payload: {e}"
                            ));
                        }
                    },
                    None => Vec::new(),
                };
                Some(CompletedTemplate {
                    template_id: TemplateId(id),
                    data,
                })
            }
            (PollPhase::Complete, None) => {
                return EnrollmentPoll::transport_error(
                    "device reported completion without a template id",
                );
            }
            _ => None,
        };

        EnrollmentPoll {
            phase: self.status,
            message: self.message,
            progress: self.progress.min(100),
            template,
        }
    }
}

/// Reply to a verify command.
#[derive(Debug, Deserialize)]
pub struct VerifyWireReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub template_id: Option<u32>,
    #[serde(default)]
    pub confidence: Option<u8>,
}

impl VerifyWireReply {
    pub fn into_reply(self) -> VerifyReply {
        match self.status.as_str() {
            "success" | "match" => match self.template_id {
                Some(id) => VerifyReply::Match {
                    template_id: TemplateId(id),
                    confidence: self.confidence,
                },
                None => VerifyReply::Error {
                    message: "device reported a match without a template id".into(),
                },
            },
            "no_match" => VerifyReply::NoMatch {
                message: self
                    .message
                    .unwrap_or_else(|| "no matching fingerprint found".into()),
            },
            other => VerifyReply::Error {
                message: self
                    .message
                    .unwrap_or_else(|| format!("device verify failed: {other}")),
            },
        }
    }
}

/// Reply to a status query.
#[derive(Debug, Deserialize)]
pub struct HealthWireReply {
    pub status: SensorState,
    #[serde(default)]
    pub message: String,
}

impl HealthWireReply {
    pub fn into_health(self) -> SensorHealth {
        SensorHealth {
            state: self.status,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_reply_decodes_template() {
        let reply: EnrollmentStatusReply = serde_json::from_str(
            r#"{"status":"complete","message":"done","progress":100,
                "template":"AQID","template_id":7}"#,
        )
        .unwrap();
        let poll = reply.into_poll();
        assert_eq!(poll.phase, PollPhase::Complete);
        let template = poll.template.unwrap();
        assert_eq!(template.template_id, TemplateId(7));
        assert_eq!(template.data, vec![1, 2, 3]);
    }

    #[test]
    fn complete_reply_without_id_is_error() {
        let reply: EnrollmentStatusReply =
            serde_json::from_str(r#"{"status":"complete","progress":100}"#).unwrap();
        let poll = reply.into_poll();
        assert_eq!(poll.phase, PollPhase::Error);
    }

    #[test]
    fn waiting_reply_carries_progress() {
        let reply: EnrollmentStatusReply = serde_json::from_str(
            r#"{"status":"waiting","message":"place finger","progress":50}"#,
        )
        .unwrap();
        let poll = reply.into_poll();
        assert_eq!(poll.phase, PollPhase::Waiting);
        assert_eq!(poll.progress, 50);
        assert!(poll.template.is_none());
    }

    #[test]
    fn verify_statuses_map_to_outcomes() {
        let matched: VerifyWireReply = serde_json::from_str(
            r#"{"status":"success","template_id":3,"confidence":87}"#,
        )
        .unwrap();
        assert_eq!(
            matched.into_reply(),
            VerifyReply::Match {
                template_id: TemplateId(3),
                confidence: Some(87)
            }
        );

        let missed: VerifyWireReply =
            serde_json::from_str(r#"{"status":"no_match","message":"no finger matched"}"#).unwrap();
        assert!(matches!(missed.into_reply(), VerifyReply::NoMatch { .. }));

        let broken: VerifyWireReply =
            serde_json::from_str(r#"{"status":"error","message":"sensor fault"}"#).unwrap();
        assert!(matches!(broken.into_reply(), VerifyReply::Error { .. }));
    }

    #[test]
    fn health_reply_parses_states() {
        let health: HealthWireReply =
            serde_json::from_str(r#"{"status":"ready","message":"idle"}"#).unwrap();
        assert!(health.into_health().is_ready());

        let enrolling: HealthWireReply =
            serde_json::from_str(r#"{"status":"enrolling","message":"busy"}"#).unwrap();
        assert_eq!(enrolling.into_health().state, SensorState::Enrolling);
    }
}
