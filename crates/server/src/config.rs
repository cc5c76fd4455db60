//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLOUDINARY_CLOUD_NAME` - Media host cloud name
//! - `CLOUDINARY_API_KEY` - Media host API key
//! - `CLOUDINARY_API_SECRET` - Media host API secret (high entropy; the
//!   account must have SHA-256 request signatures enabled)
//!
//! ## Optional
//! - `VITRINE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the in-memory store is used)
//! - `VITRINE_HOST` - Bind address (default: 127.0.0.1)
//! - `VITRINE_PORT` - Listen port (default: 3000)
//! - `VITRINE_BASE_URL` - Public URL used in share links (default: <http://localhost:3000>)
//! - `VITRINE_MAX_UPLOAD_BYTES` - Upload request body limit (default: 25 MiB)
//! - `CLOUDINARY_FOLDER` - Folder for uploaded assets (default: catalog-items)
//! - `CLOUDINARY_API_BASE` - API root (default: <https://api.cloudinary.com/v1_1>)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - Placeholder admin login (disabled unless both set)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;
use vitrine_core::Slug;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, always ending in `/`
    pub base_url: Url,
    /// Upload request body limit in bytes
    pub max_upload_bytes: usize,
    /// Media host configuration
    pub cloudinary: CloudinaryConfig,
    /// Placeholder admin credentials
    pub admin: Option<AdminCredentials>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Media host (Cloudinary) configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// API root, e.g. `https://api.cloudinary.com/v1_1`
    pub api_base: Url,
    /// Cloud name
    pub cloud_name: String,
    /// API key (sent with every signed request)
    pub api_key: String,
    /// API secret used to sign requests
    pub api_secret: SecretString,
    /// Folder uploaded assets are placed in
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("api_base", &self.api_base.as_str())
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Credentials for the placeholder admin login.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("VITRINE_DATABASE_URL");
        let host = parse_env("VITRINE_HOST", "127.0.0.1")?;
        let port = parse_env("VITRINE_PORT", "3000")?;
        let base_url = parse_base_url(&get_env_or_default(
            "VITRINE_BASE_URL",
            "http://localhost:3000",
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_BASE_URL".to_string(), e))?;
        let max_upload_bytes = parse_env(
            "VITRINE_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        let cloudinary = CloudinaryConfig::from_env()?;
        let admin = AdminCredentials::from_env();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            max_upload_bytes,
            cloudinary,
            admin,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Public link for an item: `<base_url>item/<slug>`.
    #[must_use]
    pub fn share_url(&self, slug: &Slug) -> String {
        self.base_url.join(&format!("item/{slug}")).map_or_else(
            |_| format!("{}item/{slug}", self.base_url),
            String::from,
        )
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_base = Url::parse(&get_env_or_default(
            "CLOUDINARY_API_BASE",
            "https://api.cloudinary.com/v1_1",
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("CLOUDINARY_API_BASE".to_string(), e.to_string()))?;

        Ok(Self {
            api_base,
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
            folder: get_env_or_default("CLOUDINARY_FOLDER", "catalog-items"),
        })
    }
}

impl AdminCredentials {
    fn from_env() -> Option<Self> {
        let username = get_optional_env("ADMIN_USERNAME")?;
        let password = get_optional_env("ADMIN_PASSWORD")?;
        Some(Self {
            username,
            password: SecretString::from(password),
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

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the public base URL and make sure its path ends with `/` so that
/// relative joins append rather than replace the last segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
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

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
