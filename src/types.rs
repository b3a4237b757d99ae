#[cfg(feature = "server")]
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::error::ClassifiedError;

/// Ask for an evaluation of a position.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionQuery {
    /// The position in FEN. Opaque here beyond being non-empty;
    /// the oracle decides whether it is well-formed.
    #[serde(default)]
    pub fen: Option<String>,

    /// Search depth hint, passed to the oracle as-is.
    /// If None, the configured default is used.
    #[serde(default)]
    pub depth: Option<i64>,
}

impl PositionQuery {
    pub fn new(fen: impl Into<String>) -> Self {
        Self {
            fen: Some(fen.into()),
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// The oracle's payload. Only the candidate lines matter to us.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleResponse {
    /// Candidate lines, best first.
    #[serde(default)]
    pub pvs: Option<Vec<PrincipalVariation>>,
}

/// One candidate line.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalVariation {
    /// Space-separated moves in the oracle's notation.
    #[serde(default)]
    pub moves: String,

    /// Centipawns, from the side to move's point of view.
    #[serde(default)]
    pub cp: Option<i64>,

    /// Mate-in-N, when the oracle found one. Not carried into [`EvaluationResult`].
    #[serde(default)]
    pub mate: Option<i64>,
}

impl PrincipalVariation {
    /// The first move of the line, if there is one.
    pub fn first_move(&self) -> Option<&str> {
        self.moves.split_whitespace().next()
    }
}

/// A successful evaluation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Always true; kept so the success and failure payloads share a discriminator.
    pub success: bool,

    /// The FEN exactly as the caller sent it.
    pub fen: String,

    /// First move of the best line, in the oracle's notation.
    pub best_move: String,

    /// Centipawn score of the best line, if the oracle gave one.
    pub evaluation: Option<i64>,

    /// Always null for now.
    pub mate: Option<i64>,
}

/// Outcome of a validity check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    pub success: bool,
    pub valid: bool,
    pub fen: String,
}

/// Body sent back when the pipeline fails.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Body sent back when a validity check cannot even be attempted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidityErrorBody {
    pub success: bool,
    pub valid: bool,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

/// What the evaluation routes respond with.
#[derive(Clone, Debug)]
pub enum EvaluationReply {
    Ok(EvaluationResult),
    Failed(ClassifiedError),
}

impl From<Result<EvaluationResult, ClassifiedError>> for EvaluationReply {
    fn from(result: Result<EvaluationResult, ClassifiedError>) -> Self {
        match result {
            Ok(what) => Self::Ok(what),
            Err(why) => Self::Failed(why),
        }
    }
}

/// What the validity route responds with.
#[derive(Clone, Debug)]
pub enum ValidityReply {
    Ok(Validity),
    Failed(ClassifiedError),
}

impl From<Result<Validity, ClassifiedError>> for ValidityReply {
    fn from(result: Result<Validity, ClassifiedError>) -> Self {
        match result {
            Ok(what) => Self::Ok(what),
            Err(why) => Self::Failed(why),
        }
    }
}

#[cfg(feature = "server")]
fn status_of(err: &ClassifiedError) -> StatusCode {
    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(feature = "server")]
impl IntoResponse for EvaluationReply {
    fn into_response(self) -> axum::response::Response {
        match self {
            EvaluationReply::Ok(what) => (StatusCode::OK, Json(what)).into_response(),
            EvaluationReply::Failed(why) => (
                status_of(&why),
                Json(ErrorBody {
                    success: false,
                    error: why.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for ValidityReply {
    fn into_response(self) -> axum::response::Response {
        match self {
            ValidityReply::Ok(what) => (StatusCode::OK, Json(what)).into_response(),
            ValidityReply::Failed(why) => (
                status_of(&why),
                Json(ValidityErrorBody {
                    success: false,
                    valid: false,
                    error: why.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
