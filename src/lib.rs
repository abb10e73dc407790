//! audit-proxy is an authenticating HTTP forward proxy with an audit trail.
//!
//! Each request names its target in the `url` query parameter. The caller's
//! bearer token is verified against an identity service, the request is
//! re-issued against the target, one audit record is written, and the
//! target's response is relayed back unchanged.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- Startup configuration and its validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime counters.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The request pipeline: authenticate, forward, audit, relay.
//! - [`server`] -- Axum router, shared application state, HTTP client, and
//!   graceful shutdown.
//! - [`services`] -- Identity and audit collaborator traits and their
//!   Supabase implementation.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;
pub mod services;
