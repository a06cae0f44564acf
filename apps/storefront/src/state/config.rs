//! # Configuration State
//!
//! Display settings the pages read, derived once from `ClientConfig` at
//! startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BAZAAR_*`)
//! 2. Config file (`client.toml`)
//! 3. Defaults
//!
//! Read-only after initialization, so no lock.

use bazaar_client::config::AdminSettings;
use bazaar_client::ClientConfig;
use bazaar_core::money::format_price;
use bazaar_core::{Money, TaxRate};
use serde::Serialize;

/// Storefront display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Symbol placed before every price.
    pub currency_symbol: String,

    /// Sales tax applied to cart and checkout totals.
    pub tax_rate: TaxRate,

    /// Products in the home page's featured grid.
    pub featured_count: usize,

    /// Owner emails eligible to claim admin access.
    #[serde(skip)]
    pub admin: AdminSettings,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for ConfigState {
    fn from(config: &ClientConfig) -> Self {
        ConfigState {
            currency_symbol: config.pricing.currency_symbol.clone(),
            tax_rate: config.tax_rate(),
            featured_count: config.storefront.featured_count,
            admin: config.admin.clone(),
        }
    }
}

impl ConfigState {
    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::Money;
    /// use bazaar_storefront::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(2200)), "$22.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!("{}{}", self.currency_symbol, format_price(amount.cents()))
    }

    /// Tax row label, e.g. "Tax (10%)".
    pub fn tax_label(&self) -> String {
        format!("Tax ({})", self.tax_rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
