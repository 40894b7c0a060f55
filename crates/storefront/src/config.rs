//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_STATE_DIR` - Directory for persisted cart state (default: .storefront)
//! - `STOREFRONT_CATALOG` - Catalog source, `static` or `remote` (default: static)
//! - `STOREFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//!
//! ## Hosted backend (required when `STOREFRONT_CATALOG=remote`)
//! - `STOREFRONT_BACKEND_URL` - Backend project URL
//! - `STOREFRONT_BACKEND_ANON_KEY` - Public anon API key
//!
//! ## Signed-in shopper (both or neither)
//! - `STOREFRONT_USER_ID` - Backend user UUID
//! - `STOREFRONT_ACCESS_TOKEN` - Shopper's access token

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use storefront_core::UserId;

const DEFAULT_STATE_DIR: &str = ".storefront";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example-key",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
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

/// Where products come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    /// The built-in seed catalog.
    #[default]
    Static,
    /// The hosted backend's `products` table.
    Remote,
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding `cart.json`, `savedItems.json`, `wishlist.json`
    pub state_dir: PathBuf,
    /// Catalog source selection
    pub catalog: CatalogMode,
    /// How long catalog reads are cached
    pub catalog_cache_ttl: Duration,
    /// Hosted backend, if configured
    pub backend: Option<BackendConfig>,
    /// Signed-in shopper, if any
    pub identity: Option<Identity>,
    /// Log output format
    pub log_format: LogFormat,
}

/// Hosted backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL
    pub url: Url,
    /// Public anon API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// An authenticated shopper.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Identity {
    /// Backend user ID
    pub user_id: UserId,
    /// Bearer token for the backend
    pub access_token: SecretString,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if variables are invalid, if remote mode lacks a
    /// backend, or if the anon key fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let state_dir = PathBuf::from(env.or_default("STOREFRONT_STATE_DIR", DEFAULT_STATE_DIR));

        let catalog = match env.or_default("STOREFRONT_CATALOG", "static").as_str() {
            "static" => CatalogMode::Static,
            "remote" => CatalogMode::Remote,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_CATALOG".to_string(),
                    format!("expected `static` or `remote`, got `{other}`"),
                ));
            }
        };

        let ttl_secs = env
            .or_default(
                "STOREFRONT_CATALOG_CACHE_TTL_SECS",
                &DEFAULT_CACHE_TTL_SECS.to_string(),
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "STOREFRONT_CATALOG_CACHE_TTL_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        let log_format = match env.or_default("STOREFRONT_LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_LOG_FORMAT".to_string(),
                    format!("expected `pretty` or `json`, got `{other}`"),
                ));
            }
        };

        let backend = BackendConfig::from_env(&env)?;
        if catalog == CatalogMode::Remote && backend.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "STOREFRONT_BACKEND_URL".to_string(),
            ));
        }

        let identity = Identity::from_env(&env)?;

        Ok(Self {
            state_dir,
            catalog,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            backend,
            identity,
            log_format,
        })
    }
}

impl BackendConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = env.optional("STOREFRONT_BACKEND_URL") else {
            return Ok(None);
        };
        let url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BACKEND_URL".to_string(), e.to_string())
        })?;
        let anon_key = env.validated_secret("STOREFRONT_BACKEND_ANON_KEY")?;

        Ok(Some(Self { url, anon_key }))
    }
}

impl Identity {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        match (
            env.optional("STOREFRONT_USER_ID"),
            env.optional("STOREFRONT_ACCESS_TOKEN"),
        ) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "STOREFRONT_ACCESS_TOKEN".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("STOREFRONT_USER_ID".to_string())),
            (Some(user_id), Some(token)) => {
                let user_id = user_id.parse::<UserId>().map_err(|e| {
                    ConfigError::InvalidEnvVar("STOREFRONT_USER_ID".to_string(), e.to_string())
                })?;
                Ok(Some(Self {
                    user_id,
                    access_token: SecretString::from(token),
                }))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the helpers the loaders share.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let secret = SecretString::from(self.required(key)?);
        validate_secret_strength(&secret, key)?;
        Ok(secret)
    }
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy keys.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    let lower = value.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the backend dashboard."
            ),
        ));
    }

    Ok(())
}
