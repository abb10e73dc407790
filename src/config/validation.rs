//! Startup validation of the service configuration.
//!
//! Each field has its own check returning a human-readable error; the
//! [`validate`] entry point runs them all and collects the failures as
//! [`ValidationError`] values with suggestions where one can be offered.

use url::Url;

use crate::error::ValidationError;

/// Validate the Supabase base URL. Returns the parsed URL or an error and
/// an optional suggestion.
pub fn validate_base_url(raw: &str) -> Result<Url, (String, Option<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(("cannot be empty".into(), None));
    }
    match Url::parse(trimmed) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
            "http" | "https" => Err((format!("'{trimmed}' has no host"), None)),
            scheme => Err((
                format!("unsupported scheme '{scheme}' (expected http or https)"),
                None,
            )),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => Err((
            format!("'{trimmed}' is missing a scheme"),
            Some(format!("did you mean 'https://{trimmed}'?")),
        )),
        Err(_) => Err((format!("'{trimmed}' is not a valid URL"), None)),
    }
}

/// The key travels in the `apikey` and `Authorization` headers.
pub fn validate_anon_key(key: &str) -> Result<(), String> {
    let key = key.trim();
    if key.is_empty() {
        Err("cannot be empty".into())
    } else if !key.bytes().all(|b| b.is_ascii_graphic()) {
        Err("must be printable ASCII without spaces".into())
    } else {
        Ok(())
    }
}

/// Table names are interpolated into the REST path, so only plain
/// identifiers are accepted.
pub fn validate_table(table: &str) -> Result<(), (String, Option<String>)> {
    if table.is_empty() {
        return Err(("cannot be empty".into(), None));
    }
    if table
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Ok(());
    }
    let cleaned: String = table
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    Err((
        format!("'{table}' must contain only ASCII letters, digits and '_'"),
        Some(format!("did you mean '{cleaned}'?")),
    ))
}

pub fn validate(
    supabase_url: &str,
    anon_key: &str,
    audit_table: &str,
) -> (Option<Url>, Vec<ValidationError>) {
    let mut errors = Vec::new();

    let url = match validate_base_url(supabase_url) {
        Ok(url) => Some(url),
        Err((message, suggestion)) => {
            errors.push(ValidationError {
                field: "supabase_url".into(),
                message,
                suggestion,
            });
            None
        }
    };

    if let Err(message) = validate_anon_key(anon_key) {
        errors.push(ValidationError {
            field: "anon_key".into(),
            message,
            suggestion: Some("set SUPABASE_ANON_KEY".into()),
        });
    }

    if let Err((message, suggestion)) = validate_table(audit_table) {
        errors.push(ValidationError {
            field: "audit_table".into(),
            message,
            suggestion,
        });
    }

    (url, errors)
}
