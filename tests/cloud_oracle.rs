//! Orchestrator + CloudEvalOracle against a wiremock oracle.

use std::time::{Duration, Instant};

use eval_oracle::{
    CloudEvalOracle, ErrorKind, Oracle, OracleConfig, OracleRequest, Orchestrator, PositionQuery,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn config_for(mock_server: &MockServer) -> OracleConfig {
    OracleConfig::default().with_endpoint(format!("{}/api/cloud-eval", mock_server.uri()))
}

fn orchestrator(config: OracleConfig) -> Orchestrator<CloudEvalOracle> {
    let oracle = CloudEvalOracle::new(&config).expect("failed to create oracle");
    Orchestrator::new(oracle, config)
}

#[tokio::test]
async fn test_best_move_from_top_line() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cloud-eval"))
        .and(query_param("fen", START))
        .and(query_param("depth", "20"))
        .and(header("user-agent", "ChessGame/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fen": START,
            "knodes": 1000,
            "depth": 20,
            "pvs": [
                {"moves": "e2e4 e7e5", "cp": 25},
                {"moves": "d2d4 d7d5", "cp": 20}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = orchestrator(config_for(&mock_server))
        .evaluate(PositionQuery::new(START))
        .await
        .expect("evaluation failed");

    assert!(result.success);
    assert_eq!(result.fen, START);
    assert_eq!(result.best_move, "e2e4");
    assert_eq!(result.evaluation, Some(25));
    assert_eq!(result.mate, None);
}

#[tokio::test]
async fn test_caller_depth_is_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("depth", "35"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"pvs": [{"moves": "g1f3", "cp": 5}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = orchestrator(config_for(&mock_server))
        .evaluate(PositionQuery::new(START).with_depth(35))
        .await
        .expect("evaluation failed");
    assert_eq!(result.best_move, "g1f3");
}

#[tokio::test]
async fn test_missing_fen_makes_no_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let orch = orchestrator(config_for(&mock_server));
    let missing = orch.evaluate(PositionQuery::default()).await.unwrap_err();
    let empty = orch.evaluate(PositionQuery::new("")).await.unwrap_err();

    assert_eq!(missing.kind(), ErrorKind::MissingInput);
    assert_eq!(empty.status(), 400);
}

#[tokio::test]
async fn test_slow_oracle_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"pvs": [{"moves": "e2e4", "cp": 1}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server).with_evaluate_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = orchestrator(config)
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
    assert_eq!(err.status(), 504);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_empty_lines_are_empty_results() {
    for body in [serde_json::json!({"pvs": []}), serde_json::json!({"fen": START})] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&mock_server)
            .await;

        let err = orchestrator(config_for(&mock_server))
            .evaluate(PositionQuery::new(START))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamEmptyResult, "body {body}");
        assert_eq!(err.status(), 500);
    }
}

#[tokio::test]
async fn test_503_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = orchestrator(config_for(&mock_server))
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(err.status(), 500);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_404_for_unknown_position_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Not found"})),
        )
        .mount(&mock_server)
        .await;

    let err = orchestrator(config_for(&mock_server))
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    // Grab a free port, then close it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = OracleConfig::default().with_endpoint(format!("http://127.0.0.1:{port}/eval"));

    let err = orchestrator(config)
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert!(err.to_string().starts_with("Network error:"));
}

#[tokio::test]
async fn test_unusable_endpoint_is_transport_failure() {
    let config = OracleConfig::default().with_endpoint("not a url");

    let err = orchestrator(config)
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(err.status(), 500);
    assert!(err.to_string().starts_with("Network error:"));
}

#[tokio::test]
async fn test_mistyped_payload_is_internal_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"pvs": [{"moves": 123, "cp": 25}]})),
        )
        .mount(&mock_server)
        .await;

    let err = orchestrator(config_for(&mock_server))
        .evaluate(PositionQuery::new(START))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalFailure);
    assert!(err.to_string().starts_with("Error:"));
}

#[tokio::test]
async fn test_non_200_body_is_not_read() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service busy"))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let oracle = CloudEvalOracle::new(&config).expect("failed to create oracle");
    let reply = oracle
        .query(
            &OracleRequest {
                fen: START.to_string(),
                depth: 20,
            },
            Duration::from_secs(5),
        )
        .await
        .expect("query failed");

    assert_eq!(reply.status, 503);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_repeat_evaluations_are_identical() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"pvs": [{"moves": "e2e4 e7e5", "cp": 25}]})),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let orch = orchestrator(config_for(&mock_server));
    let first = orch.evaluate(PositionQuery::new(START)).await.unwrap();
    let second = orch.evaluate(PositionQuery::new(START)).await.unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_validate_uses_shallow_depth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("depth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let validity = orchestrator(config_for(&mock_server))
        .validate_position(PositionQuery::new(START))
        .await
        .expect("validation failed");

    assert!(validity.success);
    assert!(validity.valid);
    assert_eq!(validity.fen, START);
}

#[tokio::test]
async fn test_validate_collapses_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let rejected = orchestrator(config_for(&mock_server))
        .validate_position(PositionQuery::new("garbage"))
        .await
        .expect("validation should not fail");
    assert!(!rejected.valid);

    let slow_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&slow_server)
        .await;

    let config = config_for(&slow_server).with_validate_timeout(Duration::from_millis(200));
    let timed_out = orchestrator(config)
        .validate_position(PositionQuery::new(START))
        .await
        .expect("validation should not fail");
    assert!(!timed_out.valid);
}
