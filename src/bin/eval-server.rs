use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use eval_oracle::{
    server,
    telemetry::{self, LogFormat, TelemetryConfig},
    CloudEvalOracle, OracleConfig, Orchestrator,
};
use tracing::info;

/// Best-move service backed by a cloud evaluation oracle.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "EVAL_BIND", default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Also append log records to this file.
    #[arg(long, env = "EVAL_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    telemetry::init(&TelemetryConfig {
        format: if args.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        file: args.log_file,
        default_filter: None,
    })?;

    let config = OracleConfig::from_env();
    let oracle = CloudEvalOracle::new(&config).context("building oracle client")?;
    info!(
        bind = %args.bind,
        oracle = %oracle.endpoint(),
        default_depth = config.default_depth,
        "starting eval server"
    );

    server::serve(args.bind, Orchestrator::new(oracle, config)).await
}
