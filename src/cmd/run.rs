//! `audit-proxy run` — start the proxy server.
//!
//! Validates the Supabase configuration, builds the single shared
//! [`SupabaseClient`], and serves the router until Ctrl+C or SIGTERM.
//! Configuration problems abort here, before the listener binds.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::ServiceConfig;
use crate::error::AuditProxyError;
use crate::logging;
use crate::server::{self, AppState};
use crate::services::supabase::SupabaseClient;

pub async fn execute(args: RunArgs) -> Result<(), AuditProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = ServiceConfig::from_args(&args)?;
    let state = build_state(config.clone(), &args);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        identity = %config.supabase_url,
        audit_table = %config.audit_table,
        audit_policy = %args.audit_failure,
        "audit-proxy started"
    );

    axum::serve(listener, server::build_router(state))
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("audit-proxy stopped");
    Ok(())
}

fn build_state(config: ServiceConfig, args: &RunArgs) -> Arc<AppState> {
    let http_client = server::build_http_client();
    let audit_table = config.audit_table.clone();
    // One client serves both collaborator roles.
    let supabase = Arc::new(SupabaseClient::new(http_client.clone(), config));

    Arc::new(AppState::new(
        http_client,
        supabase.clone(),
        supabase,
        audit_table,
        args.audit_failure,
    ))
}
