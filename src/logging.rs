use crate::config::Config;
use crate::error::Result;
use std::fs::OpenOptions;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// The TUI owns the terminal; only log when a file is configured.
    FileOnly,
    Stderr,
}

pub fn init(config: &Config, sink: Sink) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));

    if let Some(path) = &config.log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true);
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
        tracing::info!(path = ?path, "tracing initialized");
        return Ok(());
    }

    if sink == Sink::Stderr {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    }

    Ok(())
}
