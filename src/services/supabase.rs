//! Supabase-backed [`IdentityService`] and [`AuditStore`].
//!
//! Token verification calls the GoTrue `GET /auth/v1/user` endpoint with
//! the caller's token; audit rows are written through PostgREST
//! (`POST /rest/v1/{table}`) with the project's anon key. One client is
//! built at startup and shared by every request.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};

use super::{AuditRecord, AuditStore, IdentityService, User};
use crate::config::ServiceConfig;
use crate::error::{error_chain, ServiceError};
use crate::server::HttpClient;

const IDENTITY: &str = "identity service";
const AUDIT: &str = "audit store";

/// Upper bound on how much of an error body is kept in a [`ServiceError`].
const MAX_ERROR_BODY: usize = 512;

pub struct SupabaseClient {
    http: HttpClient,
    config: ServiceConfig,
}

impl SupabaseClient {
    #[must_use]
    pub fn new(http: HttpClient, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    fn request(
        &self,
        service: &'static str,
        method: Method,
        path: &str,
        bearer: &str,
    ) -> Result<http::request::Builder, ServiceError> {
        let apikey = HeaderValue::from_str(&self.config.anon_key).map_err(|e| {
            ServiceError::Transport {
                service,
                message: format!("invalid anon key header: {e}"),
            }
        })?;
        let authorization =
            HeaderValue::from_str(&format!("Bearer {bearer}")).map_err(|e| {
                ServiceError::Transport {
                    service,
                    message: format!("invalid authorization header: {e}"),
                }
            })?;

        Ok(Request::builder()
            .method(method)
            .uri(self.config.endpoint(path))
            .header("apikey", apikey)
            .header(AUTHORIZATION, authorization))
    }

    async fn send(
        &self,
        service: &'static str,
        builder: http::request::Builder,
        body: Bytes,
    ) -> Result<(StatusCode, Bytes), ServiceError> {
        let req = builder
            .body(Full::new(body))
            .map_err(|e| ServiceError::Transport {
                service,
                message: error_chain(&e),
            })?;

        let response = self
            .http
            .request(req)
            .await
            .map_err(|e| ServiceError::Transport {
                service,
                message: error_chain(&e),
            })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ServiceError::Transport {
                service,
                message: format!("body read error: {}", error_chain(&e)),
            })?
            .to_bytes();
        Ok((status, body))
    }
}

fn status_error(service: &'static str, status: StatusCode, body: &[u8]) -> ServiceError {
    let text = String::from_utf8_lossy(body);
    let body = text.chars().take(MAX_ERROR_BODY).collect();
    ServiceError::Status {
        service,
        status,
        body,
    }
}

#[async_trait]
impl IdentityService for SupabaseClient {
    async fn get_user(&self, token: &str) -> Result<Option<User>, ServiceError> {
        let Ok(builder) = self.request(IDENTITY, Method::GET, "auth/v1/user", token) else {
            // A token that cannot be sent as a header cannot belong to a user.
            return Ok(None);
        };
        let (status, body) = self.send(IDENTITY, builder, Bytes::new()).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(IDENTITY, status, &body));
        }

        let user: User = serde_json::from_slice(&body).map_err(|source| ServiceError::Json {
            service: IDENTITY,
            source,
        })?;
        Ok(Some(user).filter(|u| !u.id.is_empty()))
    }
}

#[async_trait]
impl AuditStore for SupabaseClient {
    async fn insert(&self, table: &str, record: &AuditRecord) -> Result<(), ServiceError> {
        let payload = serde_json::to_vec(record).map_err(|source| ServiceError::Json {
            service: AUDIT,
            source,
        })?;
        let builder = self
            .request(
                AUDIT,
                Method::POST,
                &format!("rest/v1/{table}"),
                &self.config.anon_key,
            )?
            .header(CONTENT_TYPE, "application/json")
            .header("prefer", "return=minimal");

        let (status, body) = self.send(AUDIT, builder, Bytes::from(payload)).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(AUDIT, status, &body))
        }
    }
}
