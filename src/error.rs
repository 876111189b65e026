use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors surfaced by the enrollment, verification, and recording flows.
///
/// Each failure path a caller needs to branch on gets its own variant:
/// an operator-facing client must be able to tell apart "device
/// unreachable", "no finger matched", "matched but unknown to us", and
/// "recorded".
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("no matching fingerprint: {0}")]
    NoMatch(String),

    #[error("template {template_id} matched on the device but no student owns it")]
    UnenrolledTemplate { template_id: u32 },

    #[error("enrollment session conflict: {0}")]
    SessionConflict(String),

    #[error("persistence failure while {operation}: {reason}")]
    Persistence {
        operation: &'static str,
        reason: String,
    },

    #[error("sync failed: {0}")]
    SyncFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a `NotFound` with a displayable id.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Shorthand for a `Persistence` failure.
    pub fn persistence(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::Persistence {
            operation,
            reason: reason.to_string(),
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
