//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_PROJECT_ID` - Project hosting the document store and auth
//! - `FIREBASE_API_KEY` - Web API key for the auth provider and store
//! - `IMGBB_API_KEY` - Image host API key
//!
//! ## Optional
//! - `FIRESTORE_BASE_URL` - Document store REST root (default: production;
//!   point at the emulator for local runs)
//! - `IDENTITY_BASE_URL` - Auth provider REST root (default: production)
//! - `IMGBB_BASE_URL` - Image upload endpoint (default: production)
//! - `CHAT_POLL_INTERVAL_SECS` - Chat refresh interval (default: 5)
//! - `RECOMMENDED_MIN_DISCOUNT` - Smallest discount shown as a pick (default: 30)
//! - `RECOMMENDED_LIMIT` - Number of picks shown (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Default document store REST root.
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
/// Default auth provider REST root.
pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
/// Default image upload endpoint.
pub const DEFAULT_IMGBB_BASE_URL: &str = "https://api.imgbb.com/1/upload";

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Document store and auth provider
    pub firebase: FirebaseConfig,
    /// Image host
    pub imgbb: ImgbbConfig,
    /// How often an open chat re-fetches its messages
    pub chat_poll_interval: Duration,
    /// Discounted picks on the home page
    pub recommended: RecommendedConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Project ID
    pub project_id: String,
    /// Web API key
    pub api_key: SecretString,
    /// Document store REST root
    pub firestore_base_url: String,
    /// Auth provider REST root
    pub identity_base_url: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("firestore_base_url", &self.firestore_base_url)
            .field("identity_base_url", &self.identity_base_url)
            .finish()
    }
}

/// Image host configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ImgbbConfig {
    /// API key
    pub api_key: SecretString,
    /// Upload endpoint
    pub base_url: String,
}

impl std::fmt::Debug for ImgbbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImgbbConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Recommended products settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedConfig {
    /// Smallest discount percentage that qualifies
    pub min_discount: u32,
    /// Maximum number of picks
    pub limit: usize,
}

impl Default for RecommendedConfig {
    fn default() -> Self {
        Self {
            min_discount: 30,
            limit: 10,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if API keys fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let firebase = FirebaseConfig::from_env()?;
        let imgbb = ImgbbConfig::from_env()?;
        let chat_poll_interval =
            Duration::from_secs(parse_env_or_default("CHAT_POLL_INTERVAL_SECS", 5_u64)?);
        if chat_poll_interval.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CHAT_POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let defaults = RecommendedConfig::default();
        let recommended = RecommendedConfig {
            min_discount: parse_env_or_default("RECOMMENDED_MIN_DISCOUNT", defaults.min_discount)?
                .min(100),
            limit: parse_env_or_default("RECOMMENDED_LIMIT", defaults.limit)?,
        };

        Ok(Self {
            firebase,
            imgbb,
            chat_poll_interval,
            recommended,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_validated_secret("FIREBASE_API_KEY")?,
            firestore_base_url: trim_base_url(get_env_or_default(
                "FIRESTORE_BASE_URL",
                DEFAULT_FIRESTORE_BASE_URL,
            )),
            identity_base_url: trim_base_url(get_env_or_default(
                "IDENTITY_BASE_URL",
                DEFAULT_IDENTITY_BASE_URL,
            )),
        })
    }

    /// Configuration for a local emulator: no real key, custom roots.
    #[must_use]
    pub fn emulator(project_id: &str, firestore_base_url: &str, identity_base_url: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            api_key: SecretString::from("emulator"),
            firestore_base_url: trim_base_url(firestore_base_url.to_string()),
            identity_base_url: trim_base_url(identity_base_url.to_string()),
        }
    }
}

impl ImgbbConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("IMGBB_API_KEY")?,
            base_url: get_env_or_default("IMGBB_BASE_URL", DEFAULT_IMGBB_BASE_URL),
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

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
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

/// Validate that an API key is not a placeholder and has sufficient entropy.
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the provider console."
            ),
        ));
    }

    Ok(())
}

/// Load and validate an API key from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
