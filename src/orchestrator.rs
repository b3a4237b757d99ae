//! The evaluation pipeline: validate, query once, interpret, classify.

use std::time::Duration;

use serde_json::error::Category;
use tracing::{info, warn};

use crate::{
    config::OracleConfig,
    error::ClassifiedError,
    types::{EvaluationResult, OracleResponse, PositionQuery, Validity},
    Oracle, OracleReply, OracleRequest,
};

/// How many characters of the FEN go into log records.
const FEN_LOG_PREFIX: usize = 50;

/// Runs evaluation requests against an [`Oracle`].
///
/// Holds no per-request state, so one value can be shared by every concurrent request.
#[derive(Debug, Clone)]
pub struct Orchestrator<O> {
    oracle: O,
    config: OracleConfig,
}

impl<O: Oracle> Orchestrator<O> {
    pub fn new(oracle: O, config: OracleConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Get the best move and score for a position.
    ///
    /// Exactly one oracle call is made, unless the FEN is missing or empty,
    /// in which case none is. Nothing is retried.
    pub async fn evaluate(&self, query: PositionQuery) -> Result<EvaluationResult, ClassifiedError> {
        let result = self.run_evaluation(&query).await;

        let fen = fen_prefix(query.fen.as_deref());
        match &result {
            Ok(what) => info!(
                fen = %fen,
                branch = "ok",
                best_move = %what.best_move,
                evaluation = ?what.evaluation,
                "evaluation finished"
            ),
            Err(why) => warn!(
                fen = %fen,
                branch = %why.kind(),
                error = %why,
                "evaluation failed"
            ),
        }

        result
    }

    /// Check whether the oracle accepts a position.
    ///
    /// Only a missing FEN is reported as an error. Every upstream failure,
    /// including a timeout, collapses into `valid: false`.
    pub async fn validate_position(&self, query: PositionQuery) -> Result<Validity, ClassifiedError> {
        let Some(fen) = non_empty_fen(&query) else {
            let why = ClassifiedError::missing_input();
            warn!(fen = "", branch = %why.kind(), error = %why, "validation failed");
            return Err(why);
        };

        let request = OracleRequest {
            fen: fen.to_string(),
            depth: self.config.validate_depth,
        };
        let outcome = self
            .query_once(&request, self.config.validate_timeout())
            .await;

        let valid = match &outcome {
            Ok(reply) if reply.status == 200 => {
                info!(fen = %fen_prefix(Some(fen)), branch = "valid", "validation finished");
                true
            }
            Ok(reply) => {
                let why = ClassifiedError::upstream_unavailable(reply.status);
                info!(
                    fen = %fen_prefix(Some(fen)),
                    branch = "invalid",
                    error = %why,
                    "validation finished"
                );
                false
            }
            Err(why) => {
                info!(
                    fen = %fen_prefix(Some(fen)),
                    branch = "invalid",
                    error = %why,
                    "validation finished"
                );
                false
            }
        };

        Ok(Validity {
            success: true,
            valid,
            fen: fen.to_string(),
        })
    }

    async fn run_evaluation(
        &self,
        query: &PositionQuery,
    ) -> Result<EvaluationResult, ClassifiedError> {
        let fen = non_empty_fen(query).ok_or_else(ClassifiedError::missing_input)?;

        let request = OracleRequest {
            fen: fen.to_string(),
            depth: query.depth.unwrap_or(self.config.default_depth),
        };
        let reply = self
            .query_once(&request, self.config.evaluate_timeout())
            .await?;

        if reply.status != 200 {
            return Err(ClassifiedError::upstream_unavailable(reply.status));
        }

        let (best_move, evaluation) = best_line(&reply.body)?;

        Ok(EvaluationResult {
            success: true,
            fen: fen.to_string(),
            best_move,
            evaluation,
            mate: None,
        })
    }

    /// One oracle call, bounded by `budget` whatever the oracle does with it.
    async fn query_once(
        &self,
        request: &OracleRequest,
        budget: Duration,
    ) -> Result<OracleReply, ClassifiedError> {
        match tokio::time::timeout(budget, self.oracle.query(request, budget)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(why)) => Err(why.into()),
            Err(_) => Err(ClassifiedError::upstream_timeout()),
        }
    }
}

fn non_empty_fen(query: &PositionQuery) -> Option<&str> {
    query.fen.as_deref().filter(|fen| !fen.is_empty())
}

/// First move and score of the top-ranked line in a 200 body.
fn best_line(body: &str) -> Result<(String, Option<i64>), ClassifiedError> {
    let response: OracleResponse = serde_json::from_str(body).map_err(|err| match err.classify() {
        // Well-formed JSON of the wrong shape.
        Category::Data => ClassifiedError::internal(err),
        Category::Syntax | Category::Eof | Category::Io => ClassifiedError::transport(err),
    })?;

    // The oracle ranks the lines; we take its first.
    let top = response
        .pvs
        .as_deref()
        .and_then(<[_]>::first)
        .ok_or_else(ClassifiedError::upstream_empty_result)?;

    let best_move = top
        .first_move()
        .ok_or_else(ClassifiedError::upstream_empty_result)?;

    Ok((best_move.to_string(), top.cp))
}

fn fen_prefix(fen: Option<&str>) -> &str {
    let fen = fen.unwrap_or_default();
    match fen.char_indices().nth(FEN_LOG_PREFIX) {
        Some((idx, _)) => &fen[..idx],
        None => fen,
    }
}
