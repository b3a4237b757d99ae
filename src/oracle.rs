//! HTTP oracle: the cloud evaluation endpoint, reached with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::{config::OracleConfig, error::OracleError, Oracle, OracleReply, OracleRequest};

/// Queries a cloud-eval style endpoint with `GET ?fen=..&depth=..`.
#[derive(Debug, Clone)]
pub struct CloudEvalOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl CloudEvalOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let mut default_headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| OracleError::Internal {
                message: format!("invalid user agent: {e}"),
            })?;
        default_headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| OracleError::Internal {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Oracle for CloudEvalOracle {
    async fn query(
        &self,
        request: &OracleRequest,
        timeout: Duration,
    ) -> Result<OracleReply, OracleError> {
        debug!(endpoint = %self.endpoint, depth = request.depth, "querying oracle");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("fen", request.fen.as_str())])
            .query(&[("depth", request.depth)])
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        // Only a 200 body is ever parsed.
        let body = if status == reqwest::StatusCode::OK {
            response.text().await?
        } else {
            String::new()
        };
        let status = status.as_u16();

        Ok(OracleReply { status, body })
    }
}
