//! External collaborators of the proxy handler.
//!
//! Defines the [`IdentityService`] and [`AuditStore`] traits that the
//! handler depends on, plus the [`User`] and [`AuditRecord`] values that
//! cross those seams. [`supabase`] provides the production implementation
//! of both traits on top of the shared hyper client.

pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Identity resolved from a bearer credential. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
}

/// One row of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub user_id: String,
    pub target_url: String,
    pub method: String,
    pub status: u16,
}

// async_trait is required here because both traits are stored as
// Arc<dyn ...> in the shared state and native async fn in traits does not
// support dyn dispatch.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// `Ok(None)` means the service answered but did not recognise the token.
    async fn get_user(&self, token: &str) -> Result<Option<User>, ServiceError>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, table: &str, record: &AuditRecord) -> Result<(), ServiceError>;
}
