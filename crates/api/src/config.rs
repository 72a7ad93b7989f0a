//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string (falls back to `DB_CONNECTION_STRING`)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `APP_ENV` - `development` or `production` (default: production)
//! - `CLERK_JWT_PUBLIC_KEY` - RSA public key (PEM) used to verify bearer tokens
//! - `JWT_ISSUER` - Expected `iss` claim
//! - `JWT_LEEWAY_SECS` - Clock skew allowance for `exp`/`nbf` (default: 60)
//! - `GOOGLE_PLACES_API_KEY` - Places provider API key
//! - `PLACES_API_BASE_URL` - Provider endpoint root (default: <https://places.googleapis.com/v1>)
//! - `PLACES_PHOTO_MAX_WIDTH_PX` / `PLACES_PHOTO_MAX_HEIGHT_PX` - Photo size (default: width 400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! The signing key and the provider key are optional at load time. A missing
//! signing key is reported when a request is authenticated; a missing provider
//! key is reported when the provider is called.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
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

/// Deployment environment.
///
/// Controls whether provider failures degrade to fallback data
/// (development) or surface as errors (production).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Parse an environment name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unknown names.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "APP_ENV".to_string(),
                format!("unknown environment '{other}'"),
            )),
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Bearer token verification settings
    pub auth: AuthConfig,
    /// Places provider settings
    pub places: PlacesConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Bearer token verification configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// RSA public key in PEM form
    pub jwt_public_key: Option<String>,
    /// Required `iss` claim, if any
    pub issuer: Option<String>,
    /// Leeway in seconds applied to `exp` and `nbf`
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_public_key: None,
            issuer: None,
            leeway_secs: 60,
        }
    }
}

/// Places provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PlacesConfig {
    /// Provider API key
    pub api_key: Option<SecretString>,
    /// Provider endpoint root, e.g. `https://places.googleapis.com/v1`
    pub base_url: Url,
    /// Requested photo width in pixels
    pub photo_max_width_px: Option<u32>,
    /// Requested photo height in pixels
    pub photo_max_height_px: Option<u32>,
}

impl std::fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url.as_str())
            .field("photo_max_width_px", &self.photo_max_width_px)
            .field("photo_max_height_px", &self.photo_max_height_px)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the provider key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::load(&|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn load(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get_database_url(vars)?;
        let host = get_env_or_default(vars, "API_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(vars, "PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let environment = get_optional_env(vars, "APP_ENV")
            .map(|value| Environment::parse(&value))
            .transpose()?
            .unwrap_or_default();

        let auth = AuthConfig::load(vars)?;
        let places = PlacesConfig::load(vars)?;
        let sentry_dsn = get_optional_env(vars, "SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            auth,
            places,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn load(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_public_key: get_optional_env(vars, "CLERK_JWT_PUBLIC_KEY")
                .map(|pem| normalize_pem(&pem)),
            issuer: get_optional_env(vars, "JWT_ISSUER"),
            leeway_secs: get_parsed_env(vars, "JWT_LEEWAY_SECS")?.unwrap_or(60),
        })
    }
}

impl PlacesConfig {
    fn load(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = get_optional_env(vars, "GOOGLE_PLACES_API_KEY")
            .map(|key| {
                validate_secret_strength(&key, "GOOGLE_PLACES_API_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(key))
            })
            .transpose()?;

        let base_url = get_env_or_default(vars, "PLACES_API_BASE_URL", DEFAULT_PLACES_BASE_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PLACES_API_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_key,
            base_url,
            photo_max_width_px: get_parsed_env(vars, "PLACES_PHOTO_MAX_WIDTH_PX")?,
            photo_max_height_px: get_parsed_env(vars, "PLACES_PHOTO_MAX_HEIGHT_PX")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as unset.
fn get_optional_env(vars: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(vars: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(vars, key).unwrap_or_else(|| default.to_string())
}

/// Get an optional variable parsed into `T`.
fn get_parsed_env<T>(
    vars: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(vars, key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Get the database URL, accepting the legacy `DB_CONNECTION_STRING` name.
fn get_database_url(vars: &dyn Fn(&str) -> Option<String>) -> Result<SecretString, ConfigError> {
    get_optional_env(vars, "DATABASE_URL")
        .or_else(|| get_optional_env(vars, "DB_CONNECTION_STRING"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
}

/// Undo the `\n` escaping commonly used to store PEM blocks in a single-line variable.
fn normalize_pem(pem: &str) -> String {
    pem.replace("\\n", "\n").trim().to_string()
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

    // Real API keys are random strings with high entropy
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
