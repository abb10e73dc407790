//! The authenticating forward-proxy handler.
//!
//! [`proxy_handler`] runs one linear pipeline per request: read the `url`
//! query parameter, authenticate the caller ([`auth`]), forward the
//! request ([`forward`], with header preparation in [`headers`]), write
//! the audit record ([`audit`]), and relay the upstream response
//! ([`relay`]). Any step can end the request with a [`ProxyError`].

pub mod audit;
pub mod auth;
pub mod forward;
pub mod headers;
pub mod relay;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::server::AppState;

/// Query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";

/// First `url` value of the raw query string, percent-decoded. An empty
/// value counts as missing, even when a later `url` is set.
#[must_use]
pub fn target_url(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == URL_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let correlation_id = headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    match handle(&state, query.as_deref(), &method, &headers, &correlation_id).await {
        Ok(upstream) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            relay::relay(upstream)
        }
        Err(e) => {
            match e {
                ProxyError::Unauthorized => {
                    state.stats.unauthorized.fetch_add(1, Ordering::Relaxed);
                }
                ProxyError::Forward { .. } | ProxyError::Audit { .. } => {
                    state.stats.failed.fetch_add(1, Ordering::Relaxed);
                }
                ProxyError::MissingUrl => {}
            }
            tracing::info!(
                correlation_id = %correlation_id,
                method = %method,
                status = e.status().as_u16(),
                error = %e,
                "request rejected"
            );
            e.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    query: Option<&str>,
    method: &Method,
    headers: &HeaderMap,
    correlation_id: &str,
) -> Result<forward::UpstreamResponse, ProxyError> {
    let target = target_url(query).ok_or(ProxyError::MissingUrl)?;

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        target = %target,
        "request received"
    );

    let user = auth::authenticate(state.identity.as_ref(), headers, correlation_id).await?;

    let upstream = forward::forward(
        &state.http_client,
        &target,
        method,
        headers,
        correlation_id,
    )
    .await?;

    let record = audit::build_record(&user, &target, method, upstream.status);
    audit::record(state, &record, correlation_id).await?;

    Ok(upstream)
}
