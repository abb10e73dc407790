//! Caller authentication against the [`IdentityService`].

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ProxyError;
use crate::services::{IdentityService, User};

/// Extract the credential from the `Authorization` header.
///
/// A literal `"Bearer "` prefix is stripped when present; any other value
/// is passed through whole. Missing, empty, or non-UTF-8 values yield `None`.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller to a [`User`], or fail with [`ProxyError::Unauthorized`].
///
/// Identity-service errors are logged here and never reach the caller.
pub async fn authenticate(
    identity: &dyn IdentityService,
    headers: &HeaderMap,
    correlation_id: &str,
) -> Result<User, ProxyError> {
    let Some(token) = bearer_token(headers) else {
        tracing::warn!(correlation_id = %correlation_id, "missing bearer credential");
        return Err(ProxyError::Unauthorized);
    };

    match identity.get_user(token).await {
        Ok(Some(user)) => {
            tracing::debug!(correlation_id = %correlation_id, user_id = %user.id, "caller authenticated");
            Ok(user)
        }
        Ok(None) => {
            tracing::warn!(correlation_id = %correlation_id, "credential rejected by identity service");
            Err(ProxyError::Unauthorized)
        }
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                error = %e,
                "identity service check failed"
            );
            Err(ProxyError::Unauthorized)
        }
    }
}
