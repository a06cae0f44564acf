//! # bazaar-client: Remote Data Access Layer for Bazaar
//!
//! Every read and write the storefront makes against the marketplace
//! backend goes through this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  Page (cart, checkout, admin)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bazaar-client (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ Marketplace   │    │  QueryCache   │    │   Session    │   │   │
//! │  │   │ Client        │───►│  (moka)       │    │  principal   │   │   │
//! │  │   │ (client.rs)   │    │  key → value  │    │  sign in/out │   │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘   │   │
//! │  │           │ reads: cached by QueryKey, one call per key         │   │
//! │  │           │ writes: call, then invalidate Mutation's kinds      │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        dyn MarketplaceBackend (remote service boundary)         │   │
//! │  │        InMemoryBackend for the demo binary and tests            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `MarketplaceBackend` trait
//! - [`memory`] - In-memory backend with the service's observable rules
//! - [`cache`] - Query keys, the invalidation table, and the moka cache
//! - [`client`] - `MarketplaceClient`, the typed read/write API
//! - [`session`] - The signed-in principal
//! - [`config`] - Client configuration (TOML + environment)
//! - [`error`] - Client errors and user-facing notices
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bazaar_client::{ClientConfig, InMemoryBackend, MarketplaceClient, Session};
//!
//! let config = ClientConfig::load_or_default(None);
//! let backend = Arc::new(InMemoryBackend::with_demo_catalog(config.admin.owner_emails.clone()));
//! let client = MarketplaceClient::new(backend, Session::new(), &config);
//!
//! let products = client.products().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{BackendError, BackendResult, MarketplaceBackend};
pub use cache::{Mutation, QueryCache, QueryKey, QueryKind};
pub use client::MarketplaceClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, Notice, NoticeLevel};
pub use memory::InMemoryBackend;
pub use session::Session;
