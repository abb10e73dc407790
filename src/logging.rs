//! Structured logging setup using the `tracing` ecosystem.
//!
//! JSON lines for production, pretty output on a TTY. The format is
//! auto-detected from stdout but can be forced with `--json` or
//! `--pretty`. Filtering uses a `Targets` filter with a single default
//! level.

use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    resolve_format_for(pretty, json, std::io::IsTerminal::is_terminal(&std::io::stdout()))
}

const fn resolve_format_for(pretty: bool, json: bool, is_tty: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || is_tty {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let filter = Targets::new().with_default(level.to_tracing_level());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}
