//! Audit trail write for a completed forward.
//!
//! Exactly one [`AuditRecord`] is inserted per forward that produced an
//! upstream status. What a failed insert does to the response depends on
//! the [`AuditFailurePolicy`].

use std::sync::atomic::Ordering;

use axum::http::{Method, StatusCode};

use crate::cli::AuditFailurePolicy;
use crate::error::ProxyError;
use crate::server::AppState;
use crate::services::{AuditRecord, User};

#[must_use]
pub fn build_record(user: &User, target: &str, method: &Method, status: StatusCode) -> AuditRecord {
    AuditRecord {
        user_id: user.id.clone(),
        target_url: target.to_string(),
        method: method.as_str().to_string(),
        status: status.as_u16(),
    }
}

/// Insert `record` into the configured table.
///
/// Under [`AuditFailurePolicy::Relay`] a failed insert is logged and
/// counted but does not fail the request; under
/// [`AuditFailurePolicy::Strict`] it becomes [`ProxyError::Audit`].
pub async fn record(
    state: &AppState,
    record: &AuditRecord,
    correlation_id: &str,
) -> Result<(), ProxyError> {
    let Err(e) = state.audit.insert(&state.audit_table, record).await else {
        return Ok(());
    };

    state.stats.audit_failures.fetch_add(1, Ordering::Relaxed);
    tracing::warn!(
        correlation_id = %correlation_id,
        table = %state.audit_table,
        user_id = %record.user_id,
        target = %record.target_url,
        method = %record.method,
        status = record.status,
        error = %e,
        policy = %state.audit_policy,
        "audit insert failed"
    );

    match state.audit_policy {
        AuditFailurePolicy::Relay => Ok(()),
        AuditFailurePolicy::Strict => Err(ProxyError::audit(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_mirrors_exchange() {
        let user = User { id: "u1".into() };
        let record = build_record(
            &user,
            "https://example.com/data",
            &Method::GET,
            StatusCode::OK,
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "user_id": "u1",
                "target_url": "https://example.com/data",
                "method": "GET",
                "status": 200,
            })
        );
    }

    #[test]
    fn record_keeps_error_status() {
        let user = User { id: "u2".into() };
        let record = build_record(&user, "http://t/x", &Method::DELETE, StatusCode::NOT_FOUND);
        assert_eq!(record.method, "DELETE");
        assert_eq!(record.status, 404);
    }
}
