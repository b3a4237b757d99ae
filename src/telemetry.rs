//! Log output for the binaries.
//!
//! The library only emits `tracing` events. A process that wants to see them calls
//! [`init`] once at startup; nothing is configured implicitly.

use std::{fs::File, path::PathBuf, sync::Arc};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// How log records are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// Records are also appended here when set.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: Option<String>,
}

impl TelemetryConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.default_filter.as_deref().unwrap_or("info"))
        })
    }
}

/// Install the global subscriber: stderr, plus the log file if one is configured.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let file = match &config.file {
        Some(path) => Some(Arc::new(
            File::options().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    let stderr_layer = match config.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let file_layer = file.map(|file| match config.format {
        LogFormat::Text => fmt::layer().with_ansi(false).with_writer(file).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(file).boxed(),
    });

    tracing_subscriber::registry()
        .with(config.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
