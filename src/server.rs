use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::{
    error::ClassifiedError,
    orchestrator::Orchestrator,
    types::{EvaluationReply, HealthStatus, PositionQuery, ValidityReply},
    Oracle,
};

type Shared<O> = Arc<Orchestrator<O>>;

pub fn router<O: Oracle + 'static>(orchestrator: Orchestrator<O>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/best-move", post(best_move::<O>))
        .route("/api/analyze", post(analyze::<O>))
        .route("/api/validate-fen", post(validate_fen::<O>))
        .with_state(Arc::new(orchestrator))
        // Browser clients call from their own origin.
        .layer(CorsLayer::permissive())
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve<O: Oracle + 'static>(
    addr: SocketAddr,
    orchestrator: Orchestrator<O>,
) -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind(addr)?;
    serve_with_shutdown(listener, orchestrator, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<O, F>(
    listener: std::net::TcpListener,
    orchestrator: Orchestrator<O>,
    shutdown: F,
) -> anyhow::Result<()>
where
    O: Oracle + 'static,
    F: Future<Output = ()>,
{
    listener.set_nonblocking(true)?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::Server::from_tcp(listener)?
        .serve(router(orchestrator).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // If the handler cannot be installed there is nothing to wait for.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn health() -> Json<HealthStatus> {
    info!("health check requested");
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

async fn best_move<O: Oracle>(
    State(orchestrator): State<Shared<O>>,
    body: Result<Json<PositionQuery>, JsonRejection>,
) -> EvaluationReply {
    debug!("best move requested");
    run_evaluation(&orchestrator, body).await
}

async fn analyze<O: Oracle>(
    State(orchestrator): State<Shared<O>>,
    body: Result<Json<PositionQuery>, JsonRejection>,
) -> EvaluationReply {
    debug!("analysis requested");
    run_evaluation(&orchestrator, body).await
}

async fn run_evaluation<O: Oracle>(
    orchestrator: &Orchestrator<O>,
    body: Result<Json<PositionQuery>, JsonRejection>,
) -> EvaluationReply {
    match body {
        Ok(Json(query)) => orchestrator.evaluate(query).await.into(),
        Err(rejection) => EvaluationReply::Failed(unreadable_body(rejection)),
    }
}

async fn validate_fen<O: Oracle>(
    State(orchestrator): State<Shared<O>>,
    body: Result<Json<PositionQuery>, JsonRejection>,
) -> ValidityReply {
    debug!("fen validation requested");
    match body {
        Ok(Json(query)) => orchestrator.validate_position(query).await.into(),
        Err(rejection) => ValidityReply::Failed(unreadable_body(rejection)),
    }
}

fn unreadable_body(rejection: JsonRejection) -> ClassifiedError {
    let why = ClassifiedError::internal(rejection.body_text());
    warn!(branch = %why.kind(), error = %why, "request body rejected");
    why
}
