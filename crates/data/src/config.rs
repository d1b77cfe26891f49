//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the backend project (e.g. <https://abc.supabase.co>)
//! - `SUPABASE_SERVICE_KEY` - Service-role API key (full read/write access)
//!
//! ## Optional
//! - `BACKEND_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 30)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIN_SERVICE_KEY_LENGTH: usize = 20;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Backend connection configuration.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project
    pub base_url: Url,
    /// Service-role API key (full read/write access)
    pub service_key: SecretString,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service key fails validation (placeholder detection, length).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("SUPABASE_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;

        let service_key = get_required_env("SUPABASE_SERVICE_KEY")?;
        validate_service_key(&service_key, "SUPABASE_SERVICE_KEY")?;

        let timeout_secs = get_env_or_default("BACKEND_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            service_key: SecretString::from(service_key),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a configuration directly, applying the same key validation as
    /// [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the service key fails validation.
    pub fn new(base_url: Url, service_key: &str) -> Result<Self, ConfigError> {
        validate_service_key(service_key, "service key")?;

        Ok(Self {
            base_url,
            service_key: SecretString::from(service_key.to_owned()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// The configured service key, for header construction.
    #[must_use]
    pub fn service_key(&self) -> &str {
        self.service_key.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a service key is not an obvious placeholder.
fn validate_service_key(value: &str, var_name: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_SERVICE_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SERVICE_KEY_LENGTH,
                value.len()
            ),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_placeholder_key() {
        let err = validate_service_key("your-anon-key-goes-here", "SUPABASE_SERVICE_KEY")
            .expect_err("placeholder should be rejected");
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(validate_service_key("abc123", "SUPABASE_SERVICE_KEY").is_err());
    }

    #[test]
    fn test_accepts_opaque_key() {
        assert!(validate_service_key("eyJhbGciOiJIUzI1NiJ9.c2VydmljZQ", "k").is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = BackendConfig::new(
            Url::parse("https://abc.supabase.co").expect("valid url"),
            "eyJhbGciOiJIUzI1NiJ9.c2VydmljZQ",
        )
        .expect("valid config");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("eyJhbGci"));
    }
}
