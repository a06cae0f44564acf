//! # Marketplace Backend
//!
//! The remote service boundary. Every capability the storefront uses is one
//! async method; every method receives the caller's principal explicitly
//! (the anonymous principal when nobody is signed in).
//!
//! ## Capability Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Products    get_products  get_product  create  update  delete          │
//! │              approve  reject                                (admin)     │
//! │  Categories  get_categories  get_category  create  update  delete       │
//! │  Cart        get_cart  add_to_cart  update_cart_item                    │
//! │              remove_from_cart  clear_cart                   (user)      │
//! │  Orders      checkout  get_order  get_orders  get_all_orders            │
//! │  Identity    get_caller_user_role  get_caller_user_profile              │
//! │              save_caller_user_profile  get_user_profile                 │
//! │              get_all_user_profiles  is_caller_admin                     │
//! │              assign_user_role  add_admin_by_principal                   │
//! │              add_admin_by_email                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend is authoritative for permissions, stock and existence. A
//! failed call carries only a message; the client classifies it by text.

use async_trait::async_trait;
use bazaar_core::{
    Cart, Category, CategoryId, CoreError, OrderData, OrderId, Principal, Product, ProductId,
    UserProfile, UserRole,
};
use thiserror::Error;

// =============================================================================
// Backend Error
// =============================================================================

/// A failed remote call. Only the message crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        BackendError {
            message: message.into(),
        }
    }
}

impl From<CoreError> for BackendError {
    fn from(err: CoreError) -> Self {
        BackendError::new(err.to_string())
    }
}

/// Result type alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

// =============================================================================
// Backend Trait
// =============================================================================

/// The marketplace service as seen from the client.
#[async_trait]
pub trait MarketplaceBackend: Send + Sync {
    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Every product, any status.
    async fn get_products(&self, caller: &Principal) -> BackendResult<Vec<Product>>;

    async fn get_product(&self, caller: &Principal, id: ProductId)
        -> BackendResult<Option<Product>>;

    /// Returns the id the backend assigned.
    async fn create_product(&self, caller: &Principal, product: Product)
        -> BackendResult<ProductId>;

    async fn update_product(
        &self,
        caller: &Principal,
        id: ProductId,
        product: Product,
    ) -> BackendResult<()>;

    async fn delete_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()>;

    async fn approve_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()>;

    async fn reject_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()>;

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    async fn get_categories(&self, caller: &Principal) -> BackendResult<Vec<Category>>;

    async fn get_category(&self, caller: &Principal, id: CategoryId)
        -> BackendResult<Option<Category>>;

    async fn create_category(&self, caller: &Principal, name: &str) -> BackendResult<CategoryId>;

    async fn update_category(
        &self,
        caller: &Principal,
        id: CategoryId,
        name: &str,
    ) -> BackendResult<()>;

    async fn delete_category(&self, caller: &Principal, id: CategoryId) -> BackendResult<()>;

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// `None` when the caller has never had a cart.
    async fn get_cart(&self, caller: &Principal) -> BackendResult<Option<Cart>>;

    /// Adds to the existing line when the product is already in the cart.
    async fn add_to_cart(
        &self,
        caller: &Principal,
        product_id: ProductId,
        quantity: u64,
    ) -> BackendResult<()>;

    async fn update_cart_item(
        &self,
        caller: &Principal,
        product_id: ProductId,
        quantity: u64,
    ) -> BackendResult<()>;

    async fn remove_from_cart(&self, caller: &Principal, product_id: ProductId)
        -> BackendResult<()>;

    async fn clear_cart(&self, caller: &Principal) -> BackendResult<()>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Converts the caller's cart into an order. Returns the new order id.
    async fn checkout(&self, caller: &Principal) -> BackendResult<OrderId>;

    async fn get_order(&self, caller: &Principal, id: OrderId) -> BackendResult<Option<OrderData>>;

    /// The caller's own orders.
    async fn get_orders(&self, caller: &Principal) -> BackendResult<Vec<OrderData>>;

    /// Every order in the store (admin).
    async fn get_all_orders(&self, caller: &Principal) -> BackendResult<Vec<OrderData>>;

    // -------------------------------------------------------------------------
    // Identity & Roles
    // -------------------------------------------------------------------------

    async fn get_caller_user_role(&self, caller: &Principal) -> BackendResult<UserRole>;

    async fn get_caller_user_profile(&self, caller: &Principal)
        -> BackendResult<Option<UserProfile>>;

    async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> BackendResult<()>;

    async fn get_user_profile(
        &self,
        caller: &Principal,
        user: &Principal,
    ) -> BackendResult<Option<UserProfile>>;

    async fn get_all_user_profiles(
        &self,
        caller: &Principal,
    ) -> BackendResult<Vec<(Principal, UserProfile)>>;

    async fn is_caller_admin(&self, caller: &Principal) -> BackendResult<bool>;

    async fn assign_user_role(
        &self,
        caller: &Principal,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()>;

    async fn add_admin_by_principal(&self, caller: &Principal, user: &Principal)
        -> BackendResult<()>;

    async fn add_admin_by_email(&self, caller: &Principal, email: &str) -> BackendResult<()>;
}
