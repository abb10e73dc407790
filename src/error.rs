//! Error types for audit-proxy.
//!
//! [`AuditProxyError`] covers startup and CLI failures, [`ProxyError`] is
//! the per-request failure that renders as a JSON error body, and
//! [`ServiceError`] is returned by the identity and audit collaborators.
//! All three derive `Display` and `Error` through `thiserror`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an error and its `source()` chain as `outer: inner: root`.
///
/// hyper's client errors carry the useful part (DNS failure, connection
/// refused) in the source chain, not in their own `Display`.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuditProxyError {
    #[error("Invalid configuration:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),
}

/// Failure reported by an [`IdentityService`](crate::services::IdentityService)
/// or [`AuditStore`](crate::services::AuditStore).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{service} JSON error: {source}")]
    Json {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A request that ends before the upstream response is relayed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Missing url param")]
    MissingUrl,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Forward { message: String },

    #[error("{message}")]
    Audit { message: String },
}

impl ProxyError {
    pub fn forward(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::Forward {
            message: error_chain(err),
        }
    }

    pub fn audit(err: &ServiceError) -> Self {
        Self::Audit {
            message: error_chain(err),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forward { .. } | Self::Audit { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ProxyError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_url_is_400() {
        let (status, body) = render(ProxyError::MissingUrl).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Missing url param" }));
    }

    #[tokio::test]
    async fn unauthorized_is_401() {
        let (status, body) = render(ProxyError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn forward_failure_exposes_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let (status, body) = render(ProxyError::forward(&io)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "connection refused");
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = ServiceError::Json {
            service: "identity",
            source: serde_json::from_str::<u8>("x").unwrap_err(),
        };
        let chain = error_chain(&err);
        assert!(chain.starts_with("identity JSON error"));
        assert_eq!(chain.matches("expected value").count(), 1);
    }

    #[test]
    fn validation_errors_are_listed() {
        let err = AuditProxyError::ConfigValidation {
            errors: vec![
                ValidationError {
                    field: "supabase_url".into(),
                    message: "missing scheme".into(),
                    suggestion: Some("did you mean 'https://x'?".into()),
                },
                ValidationError {
                    field: "anon_key".into(),
                    message: "cannot be empty".into(),
                    suggestion: None,
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("supabase_url: missing scheme (did you mean 'https://x'?)"));
        assert!(text.contains("\n  anon_key: cannot be empty"));
    }
}
