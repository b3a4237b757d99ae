//! Failure types for the evaluation pipeline.
//!
//! [`OracleError`] is what a single outbound call can fail with, before any
//! interpretation. [`ClassifiedError`] is what callers of the pipeline see:
//! every failure lands in exactly one class, and the class fixes the HTTP status.

use serde::{Deserialize, Serialize};

/// Stable name of a [`ClassifiedError`] class.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    UpstreamUnavailable,
    UpstreamTimeout,
    UpstreamEmptyResult,
    TransportFailure,
    InternalFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UpstreamEmptyResult => "upstream_empty_result",
            Self::TransportFailure => "transport_failure",
            Self::InternalFailure => "internal_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline failure, classified for the caller.
///
/// The message is for humans and may embed the underlying cause.
/// Callers should branch on [`ClassifiedError::kind`] or [`ClassifiedError::status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifiedError {
    /// No FEN, or an empty one. The oracle was not contacted.
    #[error("{message}")]
    MissingInput { message: String },

    /// The oracle answered with a status other than 200.
    #[error("{message}")]
    UpstreamUnavailable { message: String, status: u16 },

    /// The oracle did not answer within the budget.
    #[error("{message}")]
    UpstreamTimeout { message: String },

    /// The oracle answered 200 but had no usable line.
    #[error("{message}")]
    UpstreamEmptyResult { message: String },

    /// DNS, connection, or framing failure.
    #[error("{message}")]
    TransportFailure { message: String },

    /// Anything else that went wrong.
    #[error("{message}")]
    InternalFailure { message: String },
}

impl ClassifiedError {
    pub fn missing_input() -> Self {
        Self::MissingInput {
            message: "FEN position is required".to_string(),
        }
    }

    pub fn upstream_unavailable(status: u16) -> Self {
        Self::UpstreamUnavailable {
            message: format!("Upstream oracle error: {status}"),
            status,
        }
    }

    pub fn upstream_timeout() -> Self {
        Self::UpstreamTimeout {
            message: "Upstream oracle timeout".to_string(),
        }
    }

    pub fn upstream_empty_result() -> Self {
        Self::UpstreamEmptyResult {
            message: "No move returned from upstream oracle".to_string(),
        }
    }

    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::TransportFailure {
            message: format!("Network error: {cause}"),
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::InternalFailure {
            message: format!("Error: {cause}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput { .. } => ErrorKind::MissingInput,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            Self::UpstreamEmptyResult { .. } => ErrorKind::UpstreamEmptyResult,
            Self::TransportFailure { .. } => ErrorKind::TransportFailure,
            Self::InternalFailure { .. } => ErrorKind::InternalFailure,
        }
    }

    /// HTTP status reported to the inbound caller.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingInput { .. } => 400,
            Self::UpstreamTimeout { .. } => 504,
            Self::UpstreamUnavailable { .. }
            | Self::UpstreamEmptyResult { .. }
            | Self::TransportFailure { .. }
            | Self::InternalFailure { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::MissingInput { message }
            | Self::UpstreamUnavailable { message, .. }
            | Self::UpstreamTimeout { message }
            | Self::UpstreamEmptyResult { message }
            | Self::TransportFailure { message }
            | Self::InternalFailure { message } => message,
        }
    }
}

impl From<OracleError> for ClassifiedError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout => Self::upstream_timeout(),
            OracleError::Transport { message } => Self::transport(message),
            OracleError::Internal { message } => Self::internal(message),
        }
    }
}

/// Failure of one outbound oracle call, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle call timed out")]
    Timeout,

    #[error("{message}")]
    Transport { message: String },

    /// The client itself could not be set up.
    #[error("{message}")]
    Internal { message: String },
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        // An unusable URL is reported like any other failure to reach the oracle.
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}
