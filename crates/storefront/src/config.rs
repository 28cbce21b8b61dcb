//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults match the hosted backend.
//!
//! - `AKARIO_API_URL` - Backend base URL (default: `https://backend-1-tf17.onrender.com`)
//! - `AKARIO_CACHE_TTL_SECS` - GET cache lifetime in seconds (default: 300)
//! - `AKARIO_NOTIFICATION_TTL_SECS` - Toast lifetime in seconds (default: 3)
//! - `AKARIO_CHECKOUT_MAX_AMOUNT` - Upper bound for a payment, inclusive (default: 50000)
//! - `AKARIO_TAX_RATE` - Tax applied to the cart subtotal (default: 0.08)
//! - `AKARIO_STATE_DIR` - Directory holding the persisted session (default: `.akario`)
//! - `RAZORPAY_KEY_ID` - Payment widget key handed to the widget
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use akario_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://backend-1-tf17.onrender.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend gateway configuration
    pub api: ApiConfig,
    /// How long a toast notification stays visible
    pub notification_ttl: Duration,
    /// Checkout limits and payment settings
    pub checkout: CheckoutConfig,
    /// Directory for the persisted session file
    pub state_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Backend gateway configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash; request paths are appended verbatim.
    pub base_url: String,
    /// Lifetime of cached GET responses
    pub cache_ttl: Duration,
    /// Maximum number of cached GET responses
    pub cache_capacity: u64,
}

/// Checkout configuration.
///
/// Implements `Debug` manually to redact the payment key.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Inclusive upper bound on the order total accepted by the gateway
    pub max_amount: Decimal,
    /// Tax rate applied to the subtotal (0.08 = 8%)
    pub tax_rate: Decimal,
    /// Currency sent with payment orders
    pub currency: CurrencyCode,
    /// Delay before leaving the confirmation screen
    pub redirect_delay: Duration,
    /// Key id passed to the payment widget
    pub razorpay_key_id: Option<SecretString>,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("max_amount", &self.max_amount)
            .field("tax_rate", &self.tax_rate)
            .field("currency", &self.currency)
            .field("redirect_delay", &self.redirect_delay)
            .field(
                "razorpay_key_id",
                &self.razorpay_key_id.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ApiConfig {
    /// Gateway configuration for `base_url` with default cache settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url("AKARIO_API_URL", base_url)?,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        })
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_amount: Decimal::from(50_000),
            tax_rate: Decimal::new(8, 2),
            currency: CurrencyCode::INR,
            redirect_delay: Duration::from_secs(3),
            razorpay_key_id: None,
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
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut api = ApiConfig::new(&get_env_or_default("AKARIO_API_URL", DEFAULT_API_URL))?;
        api.cache_ttl = Duration::from_secs(parse_env_or("AKARIO_CACHE_TTL_SECS", 300)?);

        let checkout = CheckoutConfig {
            max_amount: parse_env_or("AKARIO_CHECKOUT_MAX_AMOUNT", Decimal::from(50_000))?,
            tax_rate: parse_env_or("AKARIO_TAX_RATE", Decimal::new(8, 2))?,
            razorpay_key_id: get_optional_env("RAZORPAY_KEY_ID").map(SecretString::from),
            ..CheckoutConfig::default()
        };

        Ok(Self {
            api,
            notification_ttl: Duration::from_secs(parse_env_or(
                "AKARIO_NOTIFICATION_TTL_SECS",
                3,
            )?),
            checkout,
            state_dir: PathBuf::from(get_env_or_default("AKARIO_STATE_DIR", ".akario")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Configuration pointing at `base_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::new(base_url)?,
            notification_ttl: Duration::from_secs(3),
            checkout: CheckoutConfig::default(),
            state_dir: PathBuf::from(".akario"),
            sentry_dsn: None,
        })
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Check that a base URL is absolute http(s) and strip trailing slashes.
fn validate_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
