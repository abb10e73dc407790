//! Tests of the Supabase client against mock GoTrue and PostgREST endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use audit_proxy::config::ServiceConfig;
use audit_proxy::error::ServiceError;
use audit_proxy::server::build_http_client;
use audit_proxy::services::supabase::SupabaseClient;
use audit_proxy::services::{AuditRecord, AuditStore, IdentityService};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

/// Status and body the mock user endpoint answers with.
type Canned = (StatusCode, &'static str);

#[derive(Default)]
struct Seen {
    paths: Mutex<Vec<String>>,
    content_types: Mutex<Vec<String>>,
}

async fn serve_mock(user_reply: Canned, insert_reply: Canned) -> (SocketAddr, Arc<Seen>) {
    let seen = Arc::new(Seen::default());
    let user_seen = seen.clone();
    let insert_seen = seen.clone();

    let router = Router::new()
        .route(
            "/auth/v1/user",
            get(move || {
                let seen = user_seen.clone();
                async move {
                    seen.paths.lock().unwrap().push("/auth/v1/user".into());
                    user_reply
                }
            }),
        )
        .route(
            "/rest/v1/{table}",
            post(
                move |Path(table): Path<String>, headers: HeaderMap| {
                    let seen = insert_seen.clone();
                    async move {
                        seen.paths.lock().unwrap().push(format!("/rest/v1/{table}"));
                        if let Some(ct) = headers.get("content-type").and_then(|v| v.to_str().ok())
                        {
                            seen.content_types.lock().unwrap().push(ct.to_string());
                        }
                        insert_reply.into_response()
                    }
                },
            ),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, seen)
}

fn client_for(addr: SocketAddr) -> SupabaseClient {
    let config = ServiceConfig::from_parts(&format!("http://{addr}"), "anon", "proxy_logs").unwrap();
    SupabaseClient::new(build_http_client(), config)
}

fn record() -> AuditRecord {
    AuditRecord {
        user_id: "u1".into(),
        target_url: "https://example.com/data".into(),
        method: "GET".into(),
        status: 200,
    }
}

#[tokio::test]
async fn user_is_parsed_from_gotrue_response() {
    let (addr, seen) = serve_mock(
        (StatusCode::OK, r#"{"id":"u1","email":"a@b.c","aud":"authenticated"}"#),
        (StatusCode::CREATED, ""),
    )
    .await;

    let user = client_for(addr).get_user("token").await.unwrap().unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(*seen.paths.lock().unwrap(), ["/auth/v1/user"]);
}

#[tokio::test]
async fn rejected_tokens_map_to_no_user() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
        let (addr, _) = serve_mock(
            (status, r#"{"msg":"invalid JWT"}"#),
            (StatusCode::CREATED, ""),
        )
        .await;
        assert!(client_for(addr).get_user("token").await.unwrap().is_none());
    }
}

#[tokio::test]
async fn empty_user_id_is_no_user() {
    let (addr, _) = serve_mock((StatusCode::OK, r#"{"id":""}"#), (StatusCode::CREATED, "")).await;
    assert!(client_for(addr).get_user("token").await.unwrap().is_none());
}

#[tokio::test]
async fn gotrue_outage_is_an_error() {
    let (addr, _) = serve_mock(
        (StatusCode::SERVICE_UNAVAILABLE, "down"),
        (StatusCode::CREATED, ""),
    )
    .await;
    let err = client_for(addr).get_user("token").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

#[tokio::test]
async fn malformed_user_body_is_json_error() {
    let (addr, _) = serve_mock((StatusCode::OK, "not json"), (StatusCode::CREATED, "")).await;
    let err = client_for(addr).get_user("token").await.unwrap_err();
    assert!(matches!(err, ServiceError::Json { .. }));
}

#[tokio::test]
async fn insert_posts_json_to_table() {
    let (addr, seen) = serve_mock((StatusCode::OK, "{}"), (StatusCode::CREATED, "")).await;

    client_for(addr)
        .insert("proxy_logs", &record())
        .await
        .unwrap();
    assert_eq!(*seen.paths.lock().unwrap(), ["/rest/v1/proxy_logs"]);
    assert_eq!(*seen.content_types.lock().unwrap(), ["application/json"]);
}

#[tokio::test]
async fn rejected_insert_carries_status_and_body() {
    let (addr, _) = serve_mock(
        (StatusCode::OK, "{}"),
        (StatusCode::NOT_FOUND, r#"{"message":"relation \"public.proxy_logs\" does not exist"}"#),
    )
    .await;

    let err = client_for(addr)
        .insert("proxy_logs", &record())
        .await
        .unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("audit store responded with status 404"));
    assert!(text.contains("does not exist"));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let err = client_for(addr)
        .insert("proxy_logs", &record())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport { .. }));
}
