//! Tracing subscriber setup for the command-line tool.
//!
//! Diagnostics go to stderr so terminal output on stdout stays clean. The
//! filter comes from `EDUTRAIN_LOG` (or `RUST_LOG`) when set, otherwise from
//! the `-v` count.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const ENV_VAR: &str = "EDUTRAIN_LOG";

static INITIALIZED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The filter directive from the environment could not be parsed.
    #[error("invalid log filter in {var}: {source}")]
    Filter {
        var: &'static str,
        source: tracing_subscriber::filter::ParseError,
    },
    /// Another subscriber was installed first.
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(verbosity: u8, ansi: bool) -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let filter = build_env_filter(verbosity)?;
    let layer = fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    let subscriber = Registry::default().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = INITIALIZED.set(());
    tracing::debug!(verbosity, "logging initialized");
    Ok(())
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "edutrain=info,warn",
        _ => "edutrain=debug,info",
    }
}

fn build_env_filter(verbosity: u8) -> Result<EnvFilter, LoggingError> {
    for var in [ENV_VAR, "RUST_LOG"] {
        if let Ok(raw) = std::env::var(var) {
            if !raw.trim().is_empty() {
                return EnvFilter::try_new(raw.trim())
                    .map_err(|source| LoggingError::Filter { var, source });
            }
        }
    }
    Ok(EnvFilter::new(default_directive(verbosity)))
}
