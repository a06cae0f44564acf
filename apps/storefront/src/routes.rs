//! # Routes
//!
//! The route table and the role gate in front of protected routes.
//!
//! ## Route Table
//! ```text
//! ┌──────────────────────────────┬───────────────────┬──────────────────┐
//! │ Path                         │ Route             │ Requires         │
//! ├──────────────────────────────┼───────────────────┼──────────────────┤
//! │ /                            │ Home              │ -                │
//! │ /products                    │ Products          │ -                │
//! │ /products/{id}               │ ProductDetail     │ -                │
//! │ /login                       │ Login             │ -                │
//! │ /login/admin                 │ AdminLogin        │ -                │
//! │ /cart                        │ Cart              │ user             │
//! │ /checkout                    │ Checkout          │ user             │
//! │ /orders                      │ Orders            │ user             │
//! │ /order/{id}                  │ OrderConfirmation │ user             │
//! │ /admin                       │ AdminDashboard    │ admin            │
//! │ /admin/products              │ AdminProducts     │ admin            │
//! │ /admin/products/new          │ AdminProductNew   │ admin            │
//! │ /admin/products/{id}/edit    │ AdminProductEdit  │ admin            │
//! │ /admin/categories            │ AdminCategories   │ admin            │
//! └──────────────────────────────┴───────────────────┴──────────────────┘
//! ```
//!
//! Role gating only decides what to render; the backend rejects anything
//! the caller is not allowed to do.

use std::fmt;

use bazaar_client::MarketplaceClient;
use bazaar_core::access::{AccessGuard, AccessState, IdentityState, RequiredRole};
use bazaar_core::{OrderId, ProductId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;

// =============================================================================
// Route
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    ProductDetail(ProductId),
    Login,
    AdminLogin,
    Cart,
    Checkout,
    Orders,
    OrderConfirmation(OrderId),
    AdminDashboard,
    AdminProducts,
    AdminProductNew,
    AdminProductEdit(ProductId),
    AdminCategories,
}

impl Route {
    /// Parses a path. A trailing slash and a query string are ignored.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::ProductId;
    /// use bazaar_storefront::routes::Route;
    ///
    /// assert_eq!(Route::parse("/products/7").unwrap(), Route::ProductDetail(ProductId(7)));
    /// assert!(Route::parse("/products/seven").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Route, ApiError> {
        let path = path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["products"] => Route::Products,
            ["products", id] => Route::ProductDetail(parse_id(id, path)?),
            ["login"] => Route::Login,
            ["login", "admin"] => Route::AdminLogin,
            ["cart"] => Route::Cart,
            ["checkout"] => Route::Checkout,
            ["orders"] => Route::Orders,
            ["order", id] => Route::OrderConfirmation(parse_id(id, path)?),
            ["admin"] => Route::AdminDashboard,
            ["admin", "products"] => Route::AdminProducts,
            ["admin", "products", "new"] => Route::AdminProductNew,
            ["admin", "products", id, "edit"] => Route::AdminProductEdit(parse_id(id, path)?),
            ["admin", "categories"] => Route::AdminCategories,
            _ => return Err(ApiError::not_found("Page", path)),
        };
        Ok(route)
    }

    /// The role a route demands, if any.
    pub fn required_role(&self) -> Option<RequiredRole> {
        match self {
            Route::Home
            | Route::Products
            | Route::ProductDetail(_)
            | Route::Login
            | Route::AdminLogin => None,
            Route::Cart | Route::Checkout | Route::Orders | Route::OrderConfirmation(_) => {
                Some(RequiredRole::User)
            }
            Route::AdminDashboard
            | Route::AdminProducts
            | Route::AdminProductNew
            | Route::AdminProductEdit(_)
            | Route::AdminCategories => Some(RequiredRole::Admin),
        }
    }
}

fn parse_id<T: std::str::FromStr>(segment: &str, path: &str) -> Result<T, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::not_found("Page", path))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Products => write!(f, "/products"),
            Route::ProductDetail(id) => write!(f, "/products/{}", id),
            Route::Login => write!(f, "/login"),
            Route::AdminLogin => write!(f, "/login/admin"),
            Route::Cart => write!(f, "/cart"),
            Route::Checkout => write!(f, "/checkout"),
            Route::Orders => write!(f, "/orders"),
            Route::OrderConfirmation(id) => write!(f, "/order/{}", id),
            Route::AdminDashboard => write!(f, "/admin"),
            Route::AdminProducts => write!(f, "/admin/products"),
            Route::AdminProductNew => write!(f, "/admin/products/new"),
            Route::AdminProductEdit(id) => write!(f, "/admin/products/{}/edit", id),
            Route::AdminCategories => write!(f, "/admin/categories"),
        }
    }
}

/// Serialized as its path, so views can carry redirect targets.
impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Access-denied screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDeniedView {
    pub title: String,
    pub message: String,
    pub required_role: RequiredRole,
    pub reason: AccessState,
}

/// What to render for a route right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Identity or role still resolving: show a loading indicator.
    Loading,
    Denied(AccessDeniedView),
    Allowed,
}

/// Resolves identity and role for `route`.
///
/// A role answer that arrives after the session changed hands is dropped,
/// leaving the route loading until the next resolution.
pub async fn gate(client: &MarketplaceClient, route: &Route) -> Gate {
    let Some(required) = route.required_role() else {
        return Gate::Allowed;
    };
    let mut guard = AccessGuard::new(required);

    match client.session().state().await {
        IdentityState::Resolving => {}
        IdentityState::Anonymous => guard.on_identity(None),
        IdentityState::SignedIn(principal) => {
            guard.on_identity(Some(principal.clone()));
            match client.role_of(&principal).await {
                Ok(role) => {
                    guard.on_role(&principal, role);
                }
                Err(err) => {
                    warn!(principal = %principal, error = %err, "Role lookup failed");
                    guard.on_role_failed(&principal);
                }
            }
            let current = client.session().principal().await;
            if current.as_ref() != Some(&principal) {
                guard.on_identity(current);
            }
        }
    }

    let state = guard.state();
    debug!(route = %route, ?state, "Route gated");
    match state {
        AccessState::Initializing => Gate::Loading,
        AccessState::Authorized => Gate::Allowed,
        AccessState::Unauthenticated | AccessState::Unauthorized => {
            Gate::Denied(AccessDeniedView {
                title: "Access Denied".to_string(),
                message: required.denied_message(),
                required_role: required,
                reason: state,
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
