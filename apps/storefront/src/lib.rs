//! # Bazaar Storefront Library
//!
//! Customer storefront and admin console pages for the Bazaar marketplace.
//! Every page is a loader that returns a serializable view, and every form
//! is an action that returns a notice. Data access goes through
//! `bazaar-client`; pricing and access rules live in `bazaar-core`.
//!
//! ## Module Organization
//! ```text
//! bazaar_storefront/
//! ├── lib.rs          ◄─── You are here (logging, demo walkthrough)
//! ├── routes.rs       ◄─── Route table and role gate
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (client + display config)
//! │   └── config.rs   ◄─── ConfigState
//! ├── pages/
//! │   ├── catalog.rs  ◄─── Home, product list, product detail
//! │   ├── cart.rs     ◄─── Cart and quantity stepper
//! │   ├── checkout.rs ◄─── Shipping form and order placement
//! │   ├── orders.rs   ◄─── Order history and confirmation
//! │   ├── account.rs  ◄─── Sign in, profile setup, admin login
//! │   └── admin.rs    ◄─── Dashboard, products, categories
//! └── error.rs        ◄─── API error type for page loaders
//! ```

pub mod error;
pub mod pages;
pub mod routes;
pub mod state;

use std::error::Error;
use std::sync::Arc;

use bazaar_client::{ClientConfig, InMemoryBackend, Session};
use bazaar_core::catalog::CatalogFilter;
use bazaar_core::forms::{ProfileDraft, ShippingAddress};
use bazaar_core::ProductId;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pages::{account, admin, cart, catalog, checkout, orders};
use routes::{gate, Route};
use state::AppState;

/// Principal the demo walkthrough signs in as.
pub const DEMO_PRINCIPAL: &str = "rrkah-fqaaa-aaaaa-aaaaq-cai";

/// Runs the demo storefront against the in-memory backend.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ─────► tracing-subscriber with env filter        │
/// │  2. Load Configuration ─────► client.toml + BAZAAR_* overrides          │
/// │  3. Seed Backend ───────────► InMemoryBackend::with_demo_catalog        │
/// │  4. Build AppState ─────────► MarketplaceClient + ConfigState           │
/// │  5. Walk the pages ─────────► browse, cart, checkout, orders, admin     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Starting Bazaar storefront demo");

    let config = ClientConfig::load_or_default(None);
    let backend = Arc::new(InMemoryBackend::with_demo_catalog(
        config.admin.owner_emails.clone(),
    ));
    let state = AppState::new(backend, Session::new(), &config);

    walkthrough(&state).await?;

    info!("Demo complete");
    Ok(())
}

/// Visits each page as a shopper, then as the first administrator.
pub async fn walkthrough(state: &AppState) -> Result<(), Box<dyn Error>> {
    show("home", &catalog::home(state).await?)?;
    show(
        "products?category=Electronics",
        &catalog::products(state, &CatalogFilter::new(Some("Electronics"), "")?).await?,
    )?;
    show("product 1", &catalog::product_detail(state, ProductId(1)).await?)?;

    let gated = gate(&state.client, &Route::Cart).await;
    info!(?gated, "Cart gate while signed out");

    show("sign in", &account::sign_in(state, DEMO_PRINCIPAL).await)?;
    show("login", &account::login_view(state).await?)?;
    let profile = ProfileDraft {
        name: "Demo Shopper".to_string(),
        email: "demo@bazaar.example".to_string(),
    };
    show("save profile", &account::save_profile(state, &profile).await)?;

    show("add to cart", &catalog::add_to_cart(state, ProductId(1), 2).await)?;
    show("add to cart", &catalog::add_to_cart(state, ProductId(3), 1).await)?;
    show("cart", &cart::view(state).await?)?;
    show("checkout", &checkout::view(state).await?)?;

    let address = ShippingAddress {
        full_name: "Demo Shopper".to_string(),
        address_line1: "1 Market Street".to_string(),
        city: "Springfield".to_string(),
        ..ShippingAddress::default()
    };
    let placed = checkout::place_order(state, &address).await;
    show("place order", &placed.notice)?;
    if let Some(Route::OrderConfirmation(order_id)) = placed.redirect {
        show("order confirmation", &orders::confirmation(state, order_id).await?)?;
    }
    show("orders", &orders::history(state).await?)?;

    show("admin login", &account::admin_login(state).await?)?;
    show("claim admin", &account::bootstrap(state).await.notice)?;
    show("admin dashboard", &admin::dashboard(state).await?)?;
    show("admin products", &admin::products_table(state).await?)?;

    Ok(())
}

fn show<T: Serialize>(title: &str, view: &T) -> Result<(), serde_json::Error> {
    println!("── {} ──\n{}", title, serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bazaar_client=trace` - Show cache and backend traffic
/// - Default: INFO, DEBUG for the bazaar crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar_client=debug,bazaar_storefront=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub const ALICE: &str = DEMO_PRINCIPAL;
    pub const OWNER: &str = "qoctq-giaaa-aaaaa-aaaea-cai";

    /// Demo catalog, default config, nobody signed in.
    pub fn demo_state(owner_emails: Vec<String>) -> AppState {
        let mut config = ClientConfig::default();
        config.admin.owner_emails = owner_emails.clone();
        AppState::new(
            Arc::new(InMemoryBackend::with_demo_catalog(owner_emails)),
            Session::new(),
            &config,
        )
    }

    /// Signs in as Alice with a saved profile.
    pub async fn shopper(state: &AppState, email: &str) {
        state.client.sign_in(ALICE.parse().unwrap()).await.unwrap();
        state
            .client
            .save_profile(&ProfileDraft {
                name: "Alice".to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap();
    }

    /// Signs in as the store owner and claims the first admin seat.
    pub async fn admin(state: &AppState) {
        state.client.sign_in(OWNER.parse().unwrap()).await.unwrap();
        state
            .client
            .save_profile(&ProfileDraft {
                name: "Store Owner".to_string(),
                email: "owner@shop.example".to_string(),
            })
            .await
            .unwrap();
        state.client.bootstrap_owner_admin().await.unwrap();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
