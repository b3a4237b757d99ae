use anyhow::Context;
use clap::Parser;
use eval_oracle::{
    local_engine::{board_diagram, LocalEngine},
    telemetry::{self, TelemetryConfig},
};

/// Ask a locally installed UCI engine for the best move in a position.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Path to the engine binary.
    #[arg(long, env = "STOCKFISH_PATH", default_value = "stockfish")]
    engine: String,

    /// Search depth in plies.
    #[arg(long, default_value_t = 15)]
    depth: u32,

    /// Position in FEN.
    fen: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init(&TelemetryConfig {
        default_filter: Some("warn".to_string()),
        ..TelemetryConfig::default()
    })?;

    println!("{}", board_diagram(&args.fen)?);

    let mut engine = LocalEngine::spawn(&args.engine)?;
    let best = engine
        .best_move(&args.fen, args.depth)
        .with_context(|| format!("searching {}", args.fen))?;

    println!("Best move: {best}");
    Ok(())
}
