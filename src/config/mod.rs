//! Service configuration resolved once at startup.
//!
//! [`ServiceConfig`] holds the identity/audit backend location and the
//! audit table name. It is built from CLI flags or their environment
//! variables and validated by [`validation::validate`] before the server
//! binds, so a missing or malformed value aborts the process instead of
//! failing individual requests.

pub mod validation;

use url::Url;

use crate::cli::RunArgs;
use crate::error::AuditProxyError;

pub const DEFAULT_AUDIT_TABLE: &str = "proxy_logs";

#[derive(Clone)]
pub struct ServiceConfig {
    pub supabase_url: Url,
    pub anon_key: String,
    pub audit_table: String,
}

// The anon key is a credential; keep it out of Debug output and logs.
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("anon_key", &"<redacted>")
            .field("audit_table", &self.audit_table)
            .finish()
    }
}

impl ServiceConfig {
    /// Validate raw values and build the configuration.
    ///
    /// Every problem is collected so the operator sees all of them at once.
    pub fn from_parts(
        supabase_url: &str,
        anon_key: &str,
        audit_table: &str,
    ) -> Result<Self, AuditProxyError> {
        let (url, errors) = validation::validate(supabase_url, anon_key, audit_table);
        match url {
            Some(supabase_url) if errors.is_empty() => Ok(Self {
                supabase_url,
                anon_key: anon_key.trim().to_string(),
                audit_table: audit_table.to_string(),
            }),
            _ => Err(AuditProxyError::ConfigValidation { errors }),
        }
    }

    pub fn from_args(args: &RunArgs) -> Result<Self, AuditProxyError> {
        Self::from_parts(
            &args.supabase_url,
            &args.supabase_anon_key,
            &args.audit_table,
        )
    }

    /// Resolve `path` against the Supabase base URL, keeping any base path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.supabase_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_valid_parts() {
        let config =
            ServiceConfig::from_parts("https://abc.supabase.co", " anon ", "proxy_logs").unwrap();
        assert_eq!(config.supabase_url.host_str(), Some("abc.supabase.co"));
        assert_eq!(config.anon_key, "anon");
        assert_eq!(config.audit_table, "proxy_logs");
    }

    #[test]
    fn reports_every_invalid_field() {
        let Err(AuditProxyError::ConfigValidation { errors }) =
            ServiceConfig::from_parts("not a url", "  ", "proxy-logs")
        else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["supabase_url", "anon_key", "audit_table"]);
    }

    #[test]
    fn endpoint_joins_paths() {
        let config =
            ServiceConfig::from_parts("http://127.0.0.1:54321/", "k", "proxy_logs").unwrap();
        assert_eq!(
            config.endpoint("/auth/v1/user"),
            "http://127.0.0.1:54321/auth/v1/user"
        );

        let nested =
            ServiceConfig::from_parts("https://gw.example.com/supabase", "k", "proxy_logs")
                .unwrap();
        assert_eq!(
            nested.endpoint("rest/v1/proxy_logs"),
            "https://gw.example.com/supabase/rest/v1/proxy_logs"
        );
    }

    #[test]
    fn debug_hides_anon_key() {
        let config =
            ServiceConfig::from_parts("https://abc.supabase.co", "secret-key", "proxy_logs")
                .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
