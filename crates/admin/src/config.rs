//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `OWNER_ID` - Auth user id of the shop owner; the only account allowed in
//! - `SUPABASE_URL` - Project URL of the managed auth/storage provider
//! - `SUPABASE_ANON_KEY` - Public API key (auth endpoints)
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service-role key (storage writes, HIGH PRIVILEGE)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `STORAGE_BUCKET` - Image bucket name (default: images)
//! - `MAX_UPLOAD_BYTES` - Largest accepted image (default: 5 MiB)
//! - `PASSWORD_RESET_REDIRECT_URL` - Where recovery emails send the owner
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use endulque_core::OwnerId;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_STORAGE_BUCKET: &str = "images";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// The shop owner; scopes the catalog and gates login
    pub owner_id: OwnerId,
    /// Managed auth/storage provider
    pub supabase: SupabaseConfig,
    /// Image storage settings
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Managed auth and storage provider configuration.
///
/// Implements `Debug` manually to redact the service-role key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL without trailing slash (e.g. `https://abc.supabase.co`)
    pub url: String,
    /// Public (anon) API key
    pub anon_key: SecretString,
    /// Service-role key (HIGH PRIVILEGE - bypasses row-level security)
    pub service_role_key: SecretString,
    /// Redirect target for password recovery emails
    pub password_reset_redirect_url: Option<String>,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("service_role_key", &"[REDACTED]")
            .field(
                "password_reset_redirect_url",
                &self.password_reset_redirect_url,
            )
            .finish()
    }
}

/// Image storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding product and menu images
    pub bucket: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        let owner_id = get_required_env("OWNER_ID")?
            .parse::<OwnerId>()
            .map_err(|e| ConfigError::InvalidEnvVar("OWNER_ID".to_string(), e.to_string()))?;

        let supabase = SupabaseConfig::from_env()?;
        let storage = StorageConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            owner_id,
            supabase,
            storage,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_required_env("SUPABASE_URL")?;
        let parsed = url::Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: SecretString::from(get_required_env("SUPABASE_ANON_KEY")?),
            service_role_key: get_validated_secret("SUPABASE_SERVICE_ROLE_KEY")?,
            password_reset_redirect_url: get_optional_env("PASSWORD_RESET_REDIRECT_URL"),
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_upload_bytes = get_optional_env("MAX_UPLOAD_BYTES")
            .map(|v| {
                v.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidEnvVar("MAX_UPLOAD_BYTES".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            bucket: get_env_or_default("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
            max_upload_bytes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Whether the secret has the shape of a provider-issued JWT.
///
/// Three base64url segments, the header starting with `eyJ`. Random base64
/// text can contain any blocklisted word, so these skip the substring check.
fn looks_like_jwt(secret: &str) -> bool {
    let segments: Vec<&str> = secret.split('.').collect();
    segments.len() == 3
        && secret.starts_with("eyJ")
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    let patterns: &[&str] = if looks_like_jwt(secret) {
        &[]
    } else {
        PLACEHOLDER_PATTERNS
    };
    for pattern in patterns {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-service-role-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_provider_key() {
        // Provider-issued keys carry a "secret" prefix; that alone is not a placeholder.
        let result = validate_secret_strength("sb_secret_N7fQ2kLm9PzR4tVw8XyB3cD", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_strength_jwt_with_blocklisted_text() {
        // Base64 payloads may spell "xxx" or "TODO" by chance.
        let key = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                   eyJyb2xlIjoic2VydmljZV9yb2xlIiwicmVmIjoiYXBxeXxxXTodo9k3mQ.\
                   Zq8XxxR4tVw8yB3cDn7fQ2kLm9PzTODOa1b2c3d4e5f6";
        assert!(looks_like_jwt(key));
        assert!(validate_secret_strength(key, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_secret_strength_non_jwt_placeholder_still_rejected() {
        assert!(!looks_like_jwt("your-key-here-xxx"));
        let result = validate_secret_strength("your-key-here-xxx", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));

        // Dotted but not base64url.
        assert!(!looks_like_jwt("eyJ.your key.here"));
        let result = validate_secret_strength("eyJ.your-placeholder.xxx!", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_jwt_still_needs_entropy() {
        let result = validate_secret_strength("eyJaaaa.aaaaaaaa.aaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    fn config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/test".to_string()),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            owner_id: "7f1c1d3e-8a8b-4f5e-9c1a-2b3c4d5e6f70".parse().unwrap(),
            supabase: SupabaseConfig {
                url: "https://abc.supabase.co".to_string(),
                anon_key: SecretString::from("anon-key-value".to_string()),
                service_role_key: SecretString::from("super_secret_service_role".to_string()),
                password_reset_redirect_url: None,
            },
            storage: StorageConfig {
                bucket: DEFAULT_STORAGE_BUCKET.to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_supabase_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", config());

        assert!(debug_output.contains("https://abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_role"));
        assert!(!debug_output.contains("anon-key-value"));
    }
}
