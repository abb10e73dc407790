//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for the
//! `run` and `health` subcommands, and their argument structs. Every `run`
//! flag has an environment variable equivalent, so the usual deployment
//! only sets `SUPABASE_URL` and `SUPABASE_ANON_KEY`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_AUDIT_TABLE;

#[derive(Parser)]
#[command(
    name = "audit-proxy",
    version,
    about = "Authenticating HTTP forward proxy with an audit trail",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        SUPABASE_URL=https://xyz.supabase.co SUPABASE_ANON_KEY=... audit-proxy run\n  \
        curl -H 'Authorization: Bearer <jwt>' 'localhost:3000/proxy?url=https://example.com'"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        audit-proxy run                                   Read Supabase settings from env\n  \
        audit-proxy run -p 8080 --pretty                  Local dev mode\n  \
        audit-proxy run --audit-failure strict            Fail requests whose audit insert fails")]
pub struct RunArgs {
    /// Supabase project URL (identity service and audit store)
    #[arg(long, env = "SUPABASE_URL", help_heading = "Supabase")]
    pub supabase_url: String,

    /// Supabase anon (public) key
    #[arg(
        long,
        env = "SUPABASE_ANON_KEY",
        hide_env_values = true,
        help_heading = "Supabase"
    )]
    pub supabase_anon_key: String,

    /// Table receiving one row per proxied call
    #[arg(long, env = "AUDIT_TABLE", default_value = DEFAULT_AUDIT_TABLE, help_heading = "Supabase")]
    pub audit_table: String,

    /// What a failed audit insert does to an otherwise successful request
    #[arg(long, env = "AUDIT_FAILURE_POLICY", default_value = "relay")]
    pub audit_failure: AuditFailurePolicy,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuditFailurePolicy {
    /// Log the failure and still relay the upstream response
    Relay,
    /// Answer 500 with the insert error, discarding the upstream response
    Strict,
}

impl AuditFailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relay => "relay",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for AuditFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
