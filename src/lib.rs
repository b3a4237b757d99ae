//! Best-move and evaluation service backed by a remote position-evaluation oracle.
//!
//! The heart of the crate is the [`Orchestrator`]: given a FEN it validates the input,
//! asks the oracle once (with a hard time budget), picks the first move of the best
//! candidate line, and classifies every failure into a [`ClassifiedError`].
//!
//! With the `server` feature, [`server::router`] exposes the orchestrator over HTTP.

pub mod config;
pub mod error;
pub mod local_engine;
pub mod oracle;
pub mod orchestrator;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;

pub use config::OracleConfig;
pub use error::{ClassifiedError, ErrorKind, OracleError};
pub use oracle::CloudEvalOracle;
pub use orchestrator::Orchestrator;
pub use types::{EvaluationResult, PositionQuery, Validity};

pub use shakmaty;

/// A single outbound evaluation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub fen: String,
    pub depth: i64,
}

/// What came back from the oracle, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleReply {
    /// HTTP status of the answer.
    pub status: u16,
    /// Raw body. May be empty for non-200 answers.
    pub body: String,
}

/// The trait that defines a position-evaluation oracle.
///
/// An oracle takes a position and a depth and answers with a status and a body;
/// it does not interpret the answer. Interpretation belongs to the [`Orchestrator`].
///
/// ## Contract
///
/// 1. [`Oracle::query`] is called at most once per inbound request. Implementations must not retry.
/// 2. The `timeout` argument is the budget for the whole call. Implementations should honour it,
///    but the orchestrator enforces it on its own as well, so a misbehaving oracle cannot hang a request.
/// 3. Implementations hold no per-request state; the same value is shared between concurrent requests.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn query(
        &self,
        request: &OracleRequest,
        timeout: Duration,
    ) -> Result<OracleReply, OracleError>;
}

#[async_trait]
impl<O: Oracle + ?Sized> Oracle for std::sync::Arc<O> {
    async fn query(
        &self,
        request: &OracleRequest,
        timeout: Duration,
    ) -> Result<OracleReply, OracleError> {
        (**self).query(request, timeout).await
    }
}
