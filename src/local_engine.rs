//! Driver for a locally installed UCI engine.
//!
//! This is independent of the oracle: it spawns an engine binary, hands it a
//! position, and waits for its `bestmove`. There is no time limit.

use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    str::FromStr,
};

use shakmaty::{fen::Fen, uci::Uci, File, Rank, Square};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum LocalEngineError {
    #[error("failed to start engine {path}: {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },

    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine exited while waiting for '{0}'")]
    Exited(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    #[error("engine found no move")]
    NoMove,

    #[error("engine sent a malformed move: {0}")]
    MalformedMove(String),
}

/// A running UCI engine process.
pub struct LocalEngine {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl LocalEngine {
    /// Start the engine at `path` and complete the UCI handshake.
    pub fn spawn(path: &str) -> Result<Self, LocalEngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LocalEngineError::Spawn {
                path: path.to_string(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(LocalEngineError::Exited("uciok".to_string()));
        };

        let mut engine = Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
        };
        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;
        Ok(engine)
    }

    /// Ask for the best move in `fen`, searching to `depth` plies.
    pub fn best_move(&mut self, fen: &str, depth: u32) -> Result<Uci, LocalEngineError> {
        // Refuse what the engine could only choke on.
        Fen::from_str(fen)?;

        self.send("isready")?;
        self.wait_for("readyok")?;
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {depth}"))?;

        let line = self.wait_for("bestmove")?;
        parse_bestmove(&line)
    }

    fn send(&mut self, cmd: &str) -> Result<(), LocalEngineError> {
        debug!(cmd, "to engine");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read lines until one starts with `target`, and return it.
    fn wait_for(&mut self, target: &str) -> Result<String, LocalEngineError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(LocalEngineError::Exited(target.to_string()));
            }
            let trimmed = line.trim();
            if trimmed.starts_with(target) {
                return Ok(trimmed.to_string());
            }
        }
    }
}

impl Drop for LocalEngine {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

/// Extract the move from a `bestmove <move> [ponder <move>]` line.
fn parse_bestmove(line: &str) -> Result<Uci, LocalEngineError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return Err(LocalEngineError::MalformedMove(line.to_string()));
    }
    match tokens.next() {
        None | Some("(none)") | Some("0000") => Err(LocalEngineError::NoMove),
        Some(token) => {
            Uci::from_str(token).map_err(|_| LocalEngineError::MalformedMove(token.to_string()))
        }
    }
}

/// Text diagram of the board in `fen`, rank 8 at the top, `.` for empty squares.
pub fn board_diagram(fen: &str) -> Result<String, LocalEngineError> {
    let fen = Fen::from_str(fen)?;
    let board = &fen.as_setup().board;

    let mut out = String::new();
    for rank in Rank::ALL.iter().rev() {
        let row: Vec<String> = File::ALL
            .iter()
            .map(|file| {
                board
                    .piece_at(Square::from_coords(*file, *rank))
                    .map_or('.', |piece| piece.char())
                    .to_string()
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    Ok(out)
}
