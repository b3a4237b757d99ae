//! Oracle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the oracle lives and how long we wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Evaluation endpoint; queried with `fen` and `depth` parameters.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Sent as the `User-Agent` of every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Depth used when the caller gives none.
    #[serde(default = "default_depth")]
    pub default_depth: i64,

    /// Depth used by validity checks.
    #[serde(default = "default_validate_depth")]
    pub validate_depth: i64,

    #[serde(default = "default_evaluate_timeout_ms")]
    pub evaluate_timeout_ms: u64,

    #[serde(default = "default_validate_timeout_ms")]
    pub validate_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://lichess.org/api/cloud-eval".to_string()
}

fn default_user_agent() -> String {
    "ChessGame/1.0".to_string()
}

fn default_depth() -> i64 {
    20
}

fn default_validate_depth() -> i64 {
    1
}

fn default_evaluate_timeout_ms() -> u64 {
    30_000
}

fn default_validate_timeout_ms() -> u64 {
    10_000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            default_depth: default_depth(),
            validate_depth: default_validate_depth(),
            evaluate_timeout_ms: default_evaluate_timeout_ms(),
            validate_timeout_ms: default_validate_timeout_ms(),
        }
    }
}

impl OracleConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `EVAL_ORACLE_URL` | Oracle endpoint |
    /// | `EVAL_ORACLE_USER_AGENT` | User-Agent header |
    /// | `EVAL_DEFAULT_DEPTH` | Depth when the caller gives none |
    /// | `EVAL_VALIDATE_DEPTH` | Depth for validity checks |
    /// | `EVAL_TIMEOUT_MS` | Evaluation timeout |
    /// | `EVAL_VALIDATE_TIMEOUT_MS` | Validity check timeout |
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("EVAL_ORACLE_URL").unwrap_or_else(|_| default_endpoint()),
            user_agent: std::env::var("EVAL_ORACLE_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
            default_depth: parsed_env("EVAL_DEFAULT_DEPTH").unwrap_or_else(default_depth),
            validate_depth: parsed_env("EVAL_VALIDATE_DEPTH")
                .unwrap_or_else(default_validate_depth),
            evaluate_timeout_ms: parsed_env("EVAL_TIMEOUT_MS")
                .unwrap_or_else(default_evaluate_timeout_ms),
            validate_timeout_ms: parsed_env("EVAL_VALIDATE_TIMEOUT_MS")
                .unwrap_or_else(default_validate_timeout_ms),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_evaluate_timeout(mut self, timeout: Duration) -> Self {
        self.evaluate_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn with_validate_timeout(mut self, timeout: Duration) -> Self {
        self.validate_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn evaluate_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluate_timeout_ms)
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_millis(self.validate_timeout_ms)
    }
}

fn saturating_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
