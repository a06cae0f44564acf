//! # Client Configuration
//!
//! Settings for pricing, caching, the storefront home page and admin
//! bootstrap.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAZAAR_TAX_RATE_BPS=825                                            │
//! │     BAZAAR_OWNER_EMAILS=owner@shop.example,partner@shop.example        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bazaar/client.toml (Linux)                               │
//! │     ~/Library/Application Support/com.bazaar.marketplace/client.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     10% tax, 1000 cached queries for 5 minutes, no owner emails        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [pricing]
//! tax_rate_bps = 1000
//! currency_symbol = "$"
//!
//! [cache]
//! max_capacity = 1000
//! ttl_secs = 300
//!
//! [storefront]
//! featured_count = 8
//!
//! [admin]
//! owner_emails = ["owner@shop.example"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use bazaar_core::validation::validate_email;
use bazaar_core::TaxRate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Pricing Settings
// =============================================================================

/// How cart totals are taxed and shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Sales tax in basis points (1000 = 10%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// Symbol placed before formatted prices.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_tax_rate_bps() -> u32 {
    TaxRate::DEFAULT.bps()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: default_tax_rate_bps(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

/// Query cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of cached queries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    /// Seconds a cached query stays valid without being invalidated.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_max_capacity() -> u64 {
    1000
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

// =============================================================================
// Storefront Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontSettings {
    /// Products shown in the home page's featured grid.
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
}

fn default_featured_count() -> usize {
    8
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        StorefrontSettings {
            featured_count: default_featured_count(),
        }
    }
}

// =============================================================================
// Admin Settings
// =============================================================================

/// Admin bootstrap settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Emails allowed to claim admin access for themselves.
    ///
    /// Anyone who saves a profile with one of these emails can become an
    /// administrator. Keep it empty unless bootstrapping a new store.
    #[serde(default)]
    pub owner_emails: Vec<String>,
}

impl AdminSettings {
    /// Case-insensitive allowlist check.
    pub fn is_owner_email(&self, email: &str) -> bool {
        let email = email.trim();
        self.owner_emails
            .iter()
            .any(|owner| owner.trim().eq_ignore_ascii_case(email))
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub storefront: StorefrontSettings,

    #[serde(default)]
    pub admin: AdminSettings,
}

impl ClientConfig {
    /// Loads configuration: defaults, then the TOML file, then environment.
    ///
    /// ## Arguments
    /// * `config_path` - File to read. `None` uses the platform config dir.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    ClientError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents).map_err(|e| {
                    ClientError::Config(format!("cannot parse {}: {}", path.display(), e))
                })?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        if !config.admin.owner_emails.is_empty() {
            warn!(
                count = config.admin.owner_emails.len(),
                "Owner email allowlist is set; matching profiles can claim admin access"
            );
        }

        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.pricing.tax_rate_bps > 10_000 {
            return Err(ClientError::Config(format!(
                "tax_rate_bps must be at most 10000, got {}",
                self.pricing.tax_rate_bps
            )));
        }

        if self.pricing.currency_symbol.trim().is_empty() {
            return Err(ClientError::Config("currency_symbol must not be empty".into()));
        }

        if self.cache.max_capacity == 0 {
            return Err(ClientError::Config("max_capacity must be greater than 0".into()));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ClientError::Config("ttl_secs must be greater than 0".into()));
        }

        if self.storefront.featured_count == 0 {
            return Err(ClientError::Config(
                "featured_count must be greater than 0".into(),
            ));
        }

        for email in &self.admin.owner_emails {
            validate_email(email)
                .map_err(|e| ClientError::Config(format!("owner_emails: {}", e)))?;
        }

        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.pricing.tax_rate_bps)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BAZAAR_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bps) = lookup("BAZAAR_TAX_RATE_BPS") {
            match bps.parse::<u32>() {
                Ok(bps) => {
                    debug!(bps, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = bps;
                }
                Err(_) => warn!(value = %bps, "Ignoring invalid BAZAAR_TAX_RATE_BPS"),
            }
        }

        if let Some(symbol) = lookup("BAZAAR_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = symbol;
        }

        if let Some(capacity) = lookup("BAZAAR_CACHE_CAPACITY") {
            if let Ok(c) = capacity.parse::<u64>() {
                self.cache.max_capacity = c;
            }
        }

        if let Some(ttl) = lookup("BAZAAR_CACHE_TTL_SECS") {
            if let Ok(t) = ttl.parse::<u64>() {
                debug!(ttl_secs = t, "Overriding cache TTL from environment");
                self.cache.ttl_secs = t;
            }
        }

        if let Some(count) = lookup("BAZAAR_FEATURED_COUNT") {
            if let Ok(n) = count.parse::<usize>() {
                self.storefront.featured_count = n;
            }
        }

        if let Some(emails) = lookup("BAZAAR_OWNER_EMAILS") {
            self.admin.owner_emails = emails
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bazaar", "marketplace")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
