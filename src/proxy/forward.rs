//! Single-target request forwarding.
//!
//! Re-issues the inbound request against the caller-supplied URL with the
//! same method and headers but an empty body, then reads the whole
//! upstream body into memory. Every failure before a status code is
//! obtained, and any body read failure after it, surfaces as
//! [`ProxyError::Forward`].

use std::time::Instant;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use super::headers::build_forwarded_headers;
use crate::error::ProxyError;
use crate::server::HttpClient;

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Parse the target into an absolute URI (scheme and host required).
pub fn parse_target(target: &str) -> Result<Uri, ProxyError> {
    let uri: Uri = target.parse().map_err(|e: axum::http::uri::InvalidUri| {
        ProxyError::Forward {
            message: format!("Invalid URL '{target}': {e}"),
        }
    })?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ProxyError::Forward {
            message: format!("Invalid URL '{target}': expected an absolute URL"),
        });
    }
    Ok(uri)
}

pub async fn forward(
    client: &HttpClient,
    target: &str,
    method: &Method,
    inbound_headers: &HeaderMap,
    correlation_id: &str,
) -> Result<UpstreamResponse, ProxyError> {
    let uri = parse_target(target)?;

    let mut req = hyper::Request::builder()
        .method(method.clone())
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .map_err(|e| ProxyError::forward(&e))?;
    *req.headers_mut() = build_forwarded_headers(inbound_headers);

    let start = Instant::now();
    let response = client.request(req).await.map_err(|e| {
        tracing::error!(
            correlation_id = %correlation_id,
            target = %target,
            error = %e,
            "forward request failed"
        );
        ProxyError::forward(&e)
    })?;

    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| {
            tracing::error!(
                correlation_id = %correlation_id,
                target = %target,
                status = parts.status.as_u16(),
                error = %e,
                "upstream body read failed"
            );
            ProxyError::forward(&e)
        })?
        .to_bytes();

    #[allow(clippy::cast_possible_truncation)]
    let latency_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        correlation_id = %correlation_id,
        target = %target,
        status = parts.status.as_u16(),
        bytes = body.len(),
        latency_ms,
        "upstream responded"
    );

    Ok(UpstreamResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_parse() {
        let uri = parse_target("https://example.com/data?x=1").unwrap();
        assert_eq!(uri.host(), Some("example.com"));
        assert_eq!(uri.path_and_query().unwrap().as_str(), "/data?x=1");
    }

    #[test]
    fn relative_url_is_rejected() {
        let err = parse_target("/data").unwrap_err();
        assert!(err.to_string().contains("expected an absolute URL"));
    }

    #[test]
    fn garbage_url_is_rejected() {
        let err = parse_target("http://exa mple.com").unwrap_err();
        assert!(matches!(err, ProxyError::Forward { .. }));
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[tokio::test]
    async fn unreachable_target_is_forward_error() {
        let client = crate::server::build_http_client();
        // Bind then drop to get a port with no listener.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = forward(
            &client,
            &format!("http://{addr}/"),
            &Method::GET,
            &HeaderMap::new(),
            "cid",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProxyError::Forward { .. }));
        assert!(err.to_string().to_lowercase().contains("connect"));
    }
}
