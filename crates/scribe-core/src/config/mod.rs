//! Backend configuration for Scribe clients.
//!
//! A client only needs the Supabase project URL and its public anon key. Both
//! are safe to ship with a build; secret credentials must never be stored here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding the Supabase project URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase anon/public key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

const AUTH_PATH: &str = "/auth/v1";
const REST_PATH: &str = "/rest/v1";

/// Validated Supabase project settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Project base URL without a trailing slash or service path
    pub supabase_url: String,
    /// Public anon key sent as `apikey` on every request
    pub supabase_anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl AsRef<str>, anon_key: impl AsRef<str>) -> Result<Self> {
        let supabase_url = normalize_project_url(url.as_ref())?;
        let supabase_anon_key = normalize_text_option(Some(anon_key.as_ref().to_string()))
            .ok_or_else(|| Error::Config("Supabase anon key must not be empty".to_string()))?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
        })
    }

    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` from the process environment.
    ///
    /// Returns `Ok(None)` when neither is set.
    pub fn from_env() -> Result<Option<Self>> {
        resolve_optional_backend_config(
            std::env::var(SUPABASE_URL_ENV).ok(),
            std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
        )
    }

    /// GoTrue auth endpoint root.
    pub fn auth_url(&self) -> String {
        format!("{}{AUTH_PATH}", self.supabase_url)
    }

    /// PostgREST endpoint root.
    pub fn rest_url(&self) -> String {
        format!("{}{REST_PATH}", self.supabase_url)
    }
}

/// Build a config from optional parts, treating blank values as absent.
///
/// Both missing means "not configured"; exactly one missing is an error.
pub fn resolve_optional_backend_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<BackendConfig>> {
    match (normalize_text_option(url), normalize_text_option(anon_key)) {
        (None, None) => Ok(None),
        (Some(url), Some(anon_key)) => BackendConfig::new(url, anon_key).map(Some),
        (Some(_), None) => Err(Error::Config(format!(
            "{SUPABASE_ANON_KEY_ENV} is required when {SUPABASE_URL_ENV} is set"
        ))),
        (None, Some(_)) => Err(Error::Config(format!(
            "{SUPABASE_URL_ENV} is required when {SUPABASE_ANON_KEY_ENV} is set"
        ))),
    }
}

fn normalize_project_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("Supabase URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "Supabase URL must include http:// or https://".to_string(),
        ));
    }

    let base = trimmed
        .strip_suffix(AUTH_PATH)
        .or_else(|| trimmed.strip_suffix(REST_PATH))
        .unwrap_or(trimmed);
    Ok(base.to_string())
}

/// Normalize optional text by trimming whitespace and removing empties.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_config_derives_service_urls() {
        let config = BackendConfig::new(" https://demo.supabase.co/ ", "anon").unwrap();
        assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn backend_config_strips_existing_service_path() {
        let config = BackendConfig::new("https://demo.supabase.co/auth/v1", "anon").unwrap();
        assert_eq!(config.supabase_url, "https://demo.supabase.co");

        let config = BackendConfig::new("https://demo.supabase.co/rest/v1/", "anon").unwrap();
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn backend_config_rejects_missing_scheme_and_blank_key() {
        assert!(matches!(
            BackendConfig::new("demo.supabase.co", "anon"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BackendConfig::new("https://demo.supabase.co", "   "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn resolve_optional_config_requires_both_or_neither() {
        assert_eq!(resolve_optional_backend_config(None, None).unwrap(), None);
        assert_eq!(
            resolve_optional_backend_config(Some(" ".to_string()), None).unwrap(),
            None
        );
        assert!(resolve_optional_backend_config(
            Some("https://demo.supabase.co".to_string()),
            None
        )
        .is_err());

        let config = resolve_optional_backend_config(
            Some("https://demo.supabase.co".to_string()),
            Some(" anon ".to_string()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(config.supabase_anon_key, "anon");
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn compact_text_limits_length() {
        let long = "x".repeat(400);
        assert_eq!(compact_text(&long).len(), 180);
    }
}
