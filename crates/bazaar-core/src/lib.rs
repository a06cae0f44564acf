//! # bazaar-core: Pure Client Logic for the Bazaar Marketplace
//!
//! This crate holds everything the marketplace client computes on its own:
//! cart pricing, form validation, catalog filtering and route access
//! decisions. It performs no I/O; every function here is deterministic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Client Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront Pages (apps/storefront)              │   │
//! │  │   Catalog ──► Cart ──► Checkout ──► Orders      Admin console   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │   │  types   │ │  money   │ │  access  │ │ catalog  │ │forms │ │   │
//! │  │   │ Product  │ │  Money   │ │  Guard   │ │  Filter  │ │Draft │ │   │
//! │  │   │ Cart     │ │ Breakdown│ │  Role    │ │  Stats   │ │Addr. │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO BACKEND CALLS • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           bazaar-client (Remote Data Access Layer)              │   │
//! │  │        backend trait, query cache, session, configuration       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cart, OrderData, UserRole, ...)
//! - [`money`] - Money type and the pricing engine
//! - [`access`] - Role-gated route access state machine
//! - [`catalog`] - Product filtering and storefront statistics
//! - [`forms`] - Admin product draft and checkout address forms
//! - [`validation`] - Field validators shared by the forms
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::{format_price, Money, PriceBreakdown, PricedLine};
//! use bazaar_core::types::TaxRate;
//!
//! let lines = [
//!     PricedLine::new(Money::from_cents(500), 2),
//!     PricedLine::new(Money::from_cents(1000), 1),
//! ];
//! let breakdown = PriceBreakdown::for_lines(&lines, TaxRate::DEFAULT).unwrap();
//!
//! assert_eq!(breakdown.subtotal.cents(), 2000);
//! assert_eq!(breakdown.tax.cents(), 200);
//! assert_eq!(format_price(breakdown.total.cents()), "22.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod catalog;
pub mod error;
pub mod forms;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{AccessGuard, AccessState, RequiredRole};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, PriceBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of order lines previewed on the order history page before the
/// "+N more items" summary.
pub const ORDER_PREVIEW_ITEMS: usize = 3;

/// Maximum length accepted for a catalog search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
