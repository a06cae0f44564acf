//! # In-Memory Backend
//!
//! A `MarketplaceBackend` that keeps everything in process memory and
//! enforces the same observable rules as the marketplace service. The demo
//! binary and the tests run against it.
//!
//! ## Permission Rules
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Operation                    │ Caller must be                           │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ product / category reads     │ anyone                                   │
//! │ product / category writes    │ admin                                    │
//! │ cart, checkout, own orders   │ user or admin                            │
//! │ save own profile             │ signed in (becomes user)                 │
//! │ all orders, all profiles     │ admin                                    │
//! │ assign role                  │ admin                                    │
//! │ add admin (principal/email)  │ admin, or nobody is admin yet, or        │
//! │                              │ an owner granting their own email        │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! ## Checkout
//! All-or-nothing under one write lock: every line is checked for existence
//! and stock before any stock is decremented. Prices are snapshotted into
//! the order and the cart is cleared.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::access::RequiredRole;
use bazaar_core::money::subtotal;
use bazaar_core::validation::validate_quantity;
use bazaar_core::{
    Cart, CartItem, Category, CategoryId, CoreError, Money, OrderData, OrderId, OrderItem,
    Principal, Product, ProductId, ProductStatus, UserProfile, UserRole, ValidationError,
};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::{BackendError, BackendResult, MarketplaceBackend};

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    carts: HashMap<Principal, Cart>,
    orders: BTreeMap<OrderId, OrderData>,
    roles: HashMap<Principal, UserRole>,
    profiles: HashMap<Principal, UserProfile>,
    next_product_id: u64,
    next_category_id: u64,
    next_order_id: u64,
}

impl State {
    fn role_of(&self, principal: &Principal) -> UserRole {
        if principal.is_anonymous() {
            return UserRole::Guest;
        }
        self.roles.get(principal).copied().unwrap_or(UserRole::Guest)
    }

    fn has_admin(&self) -> bool {
        self.roles.values().any(|role| *role == UserRole::Admin)
    }

    fn require(&self, caller: &Principal, required: RequiredRole, what: &str) -> BackendResult<()> {
        if required.admits(self.role_of(caller)) {
            Ok(())
        } else {
            let who = match required {
                RequiredRole::Admin => "admins",
                RequiredRole::User => "users",
            };
            Err(CoreError::Unauthorized(format!("Only {} can {}", who, what)).into())
        }
    }

    fn product_mut(&mut self, id: ProductId) -> BackendResult<&mut Product> {
        self.products
            .get_mut(&id)
            .ok_or_else(|| CoreError::ProductNotFound(id.get()).into())
    }

    fn insert_product(&mut self, mut product: Product) -> ProductId {
        self.next_product_id += 1;
        let id = ProductId(self.next_product_id);
        product.id = id;
        self.products.insert(id, product);
        id
    }

    fn insert_category(&mut self, name: &str) -> CategoryId {
        self.next_category_id += 1;
        let id = CategoryId(self.next_category_id);
        self.categories.insert(
            id,
            Category {
                id,
                name: name.trim().to_string(),
            },
        );
        id
    }

    /// Grants admin to `target` if `caller` may, for either add-admin call.
    ///
    /// `target_email` is the email the target was looked up by, when any.
    fn grant_admin(
        &mut self,
        caller: &Principal,
        target: Principal,
        target_email: Option<&str>,
        owner_emails: &[String],
    ) -> BackendResult<()> {
        let caller_is_admin = self.role_of(caller) == UserRole::Admin;
        let bootstrap = !self.has_admin() && !caller.is_anonymous();
        let owner_claim = &target == caller
            && target_email.is_some_and(|email| {
                owner_emails
                    .iter()
                    .any(|owner| owner.trim().eq_ignore_ascii_case(email))
            });

        if !(caller_is_admin || bootstrap || owner_claim) {
            return Err(CoreError::Unauthorized("Only admins can add admins".to_string()).into());
        }

        info!(
            caller = %caller,
            target = %target,
            bootstrap,
            owner_claim,
            "Granting admin role"
        );
        self.roles.insert(target, UserRole::Admin);
        Ok(())
    }
}

fn validation(err: ValidationError) -> BackendError {
    CoreError::from(err).into()
}

/// Applies the client's quantity rules: at least one, at most `MAX_QUANTITY`.
fn cart_quantity(quantity: u64) -> BackendResult<u64> {
    validate_quantity(i64::try_from(quantity).unwrap_or(i64::MAX)).map_err(validation)
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// Process-local marketplace service.
#[derive(Debug)]
pub struct InMemoryBackend {
    state: RwLock<State>,
    owner_emails: Vec<String>,
    latency: Option<Duration>,
    calls: AtomicU64,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        InMemoryBackend::new(Vec::new())
    }
}

impl InMemoryBackend {
    /// An empty store.
    ///
    /// ## Arguments
    /// * `owner_emails` - Profiles with these emails may grant themselves admin
    pub fn new(owner_emails: Vec<String>) -> Self {
        InMemoryBackend {
            state: RwLock::new(State::default()),
            owner_emails,
            latency: None,
            calls: AtomicU64::new(0),
        }
    }

    /// A store seeded with a few categories and products.
    pub fn with_demo_catalog(owner_emails: Vec<String>) -> Self {
        let mut state = State::default();
        for name in ["Electronics", "Home", "Books"] {
            state.insert_category(name);
        }

        #[rustfmt::skip]
        let seed = [
            ("Wireless Headphones", "Over-ear, 30h battery", 8999, 25, "Electronics", ProductStatus::Approved),
            ("USB-C Charger", "65W fast charger", 2999, 60, "Electronics", ProductStatus::Approved),
            ("Desk Lamp", "Warm dimmable LED lamp", 3450, 12, "Home", ProductStatus::Approved),
            ("Ceramic Mug", "350ml, dishwasher safe", 1200, 0, "Home", ProductStatus::Approved),
            ("Rust in Practice", "Paperback, 420 pages", 3900, 8, "Books", ProductStatus::Approved),
            ("Smart Plug", "Awaiting review", 1999, 40, "Electronics", ProductStatus::Pending),
        ];
        for (title, description, cents, stock, category, status) in seed {
            state.insert_product(Product {
                id: ProductId(0),
                title: title.to_string(),
                description: description.to_string(),
                price: Money::from_cents(cents),
                stock,
                category: category.to_string(),
                image: format!("/assets/products/{}.jpg", title.to_lowercase().replace(' ', "-")),
                status,
            });
        }

        InMemoryBackend {
            state: RwLock::new(state),
            ..InMemoryBackend::new(owner_emails)
        }
    }

    /// Delays every call by `latency`, like a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of calls served so far.
    pub fn remote_calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self, operation: &'static str, caller: &Principal) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(operation, caller = %caller, "Backend call");
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MarketplaceBackend for InMemoryBackend {
    // =========================================================================
    // Products
    // =========================================================================

    async fn get_products(&self, caller: &Principal) -> BackendResult<Vec<Product>> {
        self.round_trip("get_products", caller).await;
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn get_product(
        &self,
        caller: &Principal,
        id: ProductId,
    ) -> BackendResult<Option<Product>> {
        self.round_trip("get_product", caller).await;
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn create_product(
        &self,
        caller: &Principal,
        product: Product,
    ) -> BackendResult<ProductId> {
        self.round_trip("create_product", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "create products")?;
        Ok(state.insert_product(product))
    }

    async fn update_product(
        &self,
        caller: &Principal,
        id: ProductId,
        product: Product,
    ) -> BackendResult<()> {
        self.round_trip("update_product", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "update products")?;
        let existing = state.product_mut(id)?;
        *existing = Product { id, ..product };
        Ok(())
    }

    async fn delete_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()> {
        self.round_trip("delete_product", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "delete products")?;
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::ProductNotFound(id.get()).into())
    }

    async fn approve_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()> {
        self.round_trip("approve_product", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "approve products")?;
        state.product_mut(id)?.status = ProductStatus::Approved;
        Ok(())
    }

    async fn reject_product(&self, caller: &Principal, id: ProductId) -> BackendResult<()> {
        self.round_trip("reject_product", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "reject products")?;
        state.product_mut(id)?.status = ProductStatus::Rejected;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    async fn get_categories(&self, caller: &Principal) -> BackendResult<Vec<Category>> {
        self.round_trip("get_categories", caller).await;
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn get_category(
        &self,
        caller: &Principal,
        id: CategoryId,
    ) -> BackendResult<Option<Category>> {
        self.round_trip("get_category", caller).await;
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn create_category(&self, caller: &Principal, name: &str) -> BackendResult<CategoryId> {
        self.round_trip("create_category", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "create categories")?;
        Ok(state.insert_category(name))
    }

    async fn update_category(
        &self,
        caller: &Principal,
        id: CategoryId,
        name: &str,
    ) -> BackendResult<()> {
        self.round_trip("update_category", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "update categories")?;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| BackendError::from(CoreError::CategoryNotFound(id.get())))?;
        category.name = name.trim().to_string();
        Ok(())
    }

    async fn delete_category(&self, caller: &Principal, id: CategoryId) -> BackendResult<()> {
        self.round_trip("delete_category", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "delete categories")?;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::CategoryNotFound(id.get()).into())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    async fn get_cart(&self, caller: &Principal) -> BackendResult<Option<Cart>> {
        self.round_trip("get_cart", caller).await;
        let state = self.state.read().await;
        state.require(caller, RequiredRole::User, "view a cart")?;
        Ok(state.carts.get(caller).cloned())
    }

    async fn add_to_cart(
        &self,
        caller: &Principal,
        product_id: ProductId,
        quantity: u64,
    ) -> BackendResult<()> {
        self.round_trip("add_to_cart", caller).await;
        let quantity = cart_quantity(quantity)?;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::User, "add to cart")?;
        if !state.products.contains_key(&product_id) {
            return Err(CoreError::ProductNotFound(product_id.get()).into());
        }

        let cart = state.carts.entry(caller.clone()).or_default();
        match cart.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => item.quantity = cart_quantity(item.quantity.saturating_add(quantity))?,
            None => cart.items.push(CartItem {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    async fn update_cart_item(
        &self,
        caller: &Principal,
        product_id: ProductId,
        quantity: u64,
    ) -> BackendResult<()> {
        self.round_trip("update_cart_item", caller).await;
        let quantity = cart_quantity(quantity)?;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::User, "update a cart")?;
        let item = state
            .carts
            .get_mut(caller)
            .and_then(|cart| cart.items.iter_mut().find(|i| i.product_id == product_id))
            .ok_or_else(|| BackendError::from(CoreError::ProductNotFound(product_id.get())))?;
        item.quantity = quantity;
        Ok(())
    }

    async fn remove_from_cart(
        &self,
        caller: &Principal,
        product_id: ProductId,
    ) -> BackendResult<()> {
        self.round_trip("remove_from_cart", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::User, "update a cart")?;
        if let Some(cart) = state.carts.get_mut(caller) {
            cart.items.retain(|item| item.product_id != product_id);
            if cart.is_empty() {
                state.carts.remove(caller);
            }
        }
        Ok(())
    }

    async fn clear_cart(&self, caller: &Principal) -> BackendResult<()> {
        self.round_trip("clear_cart", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::User, "update a cart")?;
        state.carts.remove(caller);
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn checkout(&self, caller: &Principal) -> BackendResult<OrderId> {
        self.round_trip("checkout", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::User, "check out")?;

        let cart = state.carts.get(caller).cloned().unwrap_or_default();
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = state
                .products
                .get(&line.product_id)
                .ok_or_else(|| {
                    BackendError::from(CoreError::ProductNotFound(line.product_id.get()))
                })?;
            if !product.can_fulfil(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    title: product.title.clone(),
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }
            items.push(OrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price: product.price,
            });
        }

        let total = subtotal(&items)?;
        for item in &items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.stock -= item.quantity;
            }
        }

        state.next_order_id += 1;
        let order_id = OrderId(state.next_order_id);
        let order = OrderData {
            order_id,
            buyer: caller.clone(),
            total,
            items,
            placed_at: Utc::now(),
        };
        info!(order_id = %order_id, total = %order.total, "Order placed");
        state.orders.insert(order_id, order);
        state.carts.remove(caller);

        Ok(order_id)
    }

    async fn get_order(&self, caller: &Principal, id: OrderId) -> BackendResult<Option<OrderData>> {
        self.round_trip("get_order", caller).await;
        let state = self.state.read().await;
        match state.orders.get(&id) {
            Some(order) if &order.buyer == caller || state.role_of(caller) == UserRole::Admin => {
                Ok(Some(order.clone()))
            }
            Some(_) => Err(CoreError::Unauthorized(
                "Can only view your own orders".to_string(),
            )
            .into()),
            None => Ok(None),
        }
    }

    async fn get_orders(&self, caller: &Principal) -> BackendResult<Vec<OrderData>> {
        self.round_trip("get_orders", caller).await;
        let state = self.state.read().await;
        state.require(caller, RequiredRole::User, "view orders")?;
        Ok(state
            .orders
            .values()
            .filter(|order| &order.buyer == caller)
            .cloned()
            .collect())
    }

    async fn get_all_orders(&self, caller: &Principal) -> BackendResult<Vec<OrderData>> {
        self.round_trip("get_all_orders", caller).await;
        let state = self.state.read().await;
        state.require(caller, RequiredRole::Admin, "view all orders")?;
        Ok(state.orders.values().cloned().collect())
    }

    // =========================================================================
    // Identity & Roles
    // =========================================================================

    async fn get_caller_user_role(&self, caller: &Principal) -> BackendResult<UserRole> {
        self.round_trip("get_caller_user_role", caller).await;
        Ok(self.state.read().await.role_of(caller))
    }

    async fn get_caller_user_profile(
        &self,
        caller: &Principal,
    ) -> BackendResult<Option<UserProfile>> {
        self.round_trip("get_caller_user_profile", caller).await;
        Ok(self.state.read().await.profiles.get(caller).cloned())
    }

    async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> BackendResult<()> {
        self.round_trip("save_caller_user_profile", caller).await;
        if caller.is_anonymous() {
            return Err(
                CoreError::Unauthorized("Only signed-in users can save profiles".to_string())
                    .into(),
            );
        }

        let mut state = self.state.write().await;
        // The stored role is authoritative; the profile's role is not trusted.
        let role = match state.role_of(caller) {
            UserRole::Guest => UserRole::User,
            role => role,
        };
        state.roles.insert(caller.clone(), role);
        state
            .profiles
            .insert(caller.clone(), UserProfile { role, ..profile });
        Ok(())
    }

    async fn get_user_profile(
        &self,
        caller: &Principal,
        user: &Principal,
    ) -> BackendResult<Option<UserProfile>> {
        self.round_trip("get_user_profile", caller).await;
        let state = self.state.read().await;
        if caller != user {
            state.require(caller, RequiredRole::Admin, "view other profiles")?;
        }
        Ok(state.profiles.get(user).cloned())
    }

    async fn get_all_user_profiles(
        &self,
        caller: &Principal,
    ) -> BackendResult<Vec<(Principal, UserProfile)>> {
        self.round_trip("get_all_user_profiles", caller).await;
        let state = self.state.read().await;
        state.require(caller, RequiredRole::Admin, "view all profiles")?;
        let mut profiles: Vec<_> = state
            .profiles
            .iter()
            .map(|(p, profile)| (p.clone(), profile.clone()))
            .collect();
        profiles.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(profiles)
    }

    async fn is_caller_admin(&self, caller: &Principal) -> BackendResult<bool> {
        self.round_trip("is_caller_admin", caller).await;
        Ok(self.state.read().await.role_of(caller) == UserRole::Admin)
    }

    async fn assign_user_role(
        &self,
        caller: &Principal,
        user: &Principal,
        role: UserRole,
    ) -> BackendResult<()> {
        self.round_trip("assign_user_role", caller).await;
        let mut state = self.state.write().await;
        state.require(caller, RequiredRole::Admin, "assign roles")?;
        state.roles.insert(user.clone(), role);
        if let Some(profile) = state.profiles.get_mut(user) {
            profile.role = role;
        }
        Ok(())
    }

    async fn add_admin_by_principal(
        &self,
        caller: &Principal,
        user: &Principal,
    ) -> BackendResult<()> {
        self.round_trip("add_admin_by_principal", caller).await;
        if user.is_anonymous() {
            return Err(validation(ValidationError::InvalidFormat {
                field: "principal".to_string(),
                reason: "Invalid principal: anonymous".to_string(),
            }));
        }
        let mut state = self.state.write().await;
        state.grant_admin(caller, user.clone(), None, &self.owner_emails)?;
        if let Some(profile) = state.profiles.get_mut(user) {
            profile.role = UserRole::Admin;
        }
        Ok(())
    }

    async fn add_admin_by_email(&self, caller: &Principal, email: &str) -> BackendResult<()> {
        self.round_trip("add_admin_by_email", caller).await;
        let email = email.trim();
        let mut state = self.state.write().await;

        let target = state
            .profiles
            .iter()
            .find(|(_, profile)| profile.email.eq_ignore_ascii_case(email))
            .map(|(principal, _)| principal.clone());

        let Some(target) = target else {
            // Permission is checked first so outsiders cannot probe emails.
            if state.role_of(caller) != UserRole::Admin && state.has_admin() {
                return Err(
                    CoreError::Unauthorized("Only admins can add admins".to_string()).into(),
                );
            }
            return Err(CoreError::ProfileNotFound(email.to_string()).into());
        };

        state.grant_admin(caller, target.clone(), Some(email), &self.owner_emails)?;
        if let Some(profile) = state.profiles.get_mut(&target) {
            profile.role = UserRole::Admin;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::validation::MAX_QUANTITY;

    fn alice() -> Principal {
        "rrkah-fqaaa-aaaaa-aaaaq-cai".parse().unwrap()
    }

    fn bob() -> Principal {
        "ryjl3-tyaaa-aaaaa-aaaba-cai".parse().unwrap()
    }

    fn profile(name: &str, email: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            role: UserRole::User,
            email: email.to_string(),
        }
    }

    async fn store_with_users() -> InMemoryBackend {
        let backend = InMemoryBackend::with_demo_catalog(vec!["owner@shop.example".to_string()]);
        backend
            .save_caller_user_profile(&alice(), profile("Alice", "alice@shop.example"))
            .await
            .unwrap();
        backend
            .save_caller_user_profile(&bob(), profile("Bob", "bob@shop.example"))
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn test_demo_catalog() {
        let backend = InMemoryBackend::with_demo_catalog(vec![]);
        let anon = Principal::anonymous();
        assert_eq!(backend.get_products(&anon).await.unwrap().len(), 6);
        assert_eq!(backend.get_categories(&anon).await.unwrap().len(), 3);
        assert_eq!(backend.remote_calls(), 2);
    }

    #[tokio::test]
    async fn test_saving_profile_makes_user() {
        let backend = store_with_users().await;
        assert_eq!(
            backend.get_caller_user_role(&alice()).await.unwrap(),
            UserRole::User
        );
        assert_eq!(
            backend.get_caller_user_role(&Principal::anonymous()).await.unwrap(),
            UserRole::Guest
        );
    }

    #[tokio::test]
    async fn test_admin_writes_are_gated() {
        let backend = store_with_users().await;
        let err = backend
            .create_category(&alice(), "Garden")
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Unauthorized:"));

        let err = backend.approve_product(&alice(), ProductId(6)).await.unwrap_err();
        assert_eq!(err.message, "Unauthorized: Only admins can approve products");
    }

    #[tokio::test]
    async fn test_first_admin_bootstrap_then_locked() {
        let backend = store_with_users().await;
        backend.add_admin_by_principal(&alice(), &alice()).await.unwrap();
        assert!(backend.is_caller_admin(&alice()).await.unwrap());

        // Now an admin exists: bob cannot promote himself.
        let err = backend
            .add_admin_by_principal(&bob(), &bob())
            .await
            .unwrap_err();
        assert!(err.message.contains("Unauthorized"));

        // Alice can promote bob by email.
        backend
            .add_admin_by_email(&alice(), "BOB@shop.example")
            .await
            .unwrap();
        assert!(backend.is_caller_admin(&bob()).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_email_can_claim_admin() {
        let backend = store_with_users().await;
        backend.add_admin_by_principal(&alice(), &alice()).await.unwrap();

        let owner: Principal = "qoctq-giaaa-aaaaa-aaaea-cai".parse().unwrap();
        backend
            .save_caller_user_profile(&owner, profile("Owner", "owner@shop.example"))
            .await
            .unwrap();
        backend
            .add_admin_by_email(&owner, "owner@shop.example")
            .await
            .unwrap();
        assert_eq!(
            backend.get_caller_user_role(&owner).await.unwrap(),
            UserRole::Admin
        );

        // The allowlist does not let bob claim someone else's email.
        let err = backend
            .add_admin_by_email(&bob(), "owner@shop.example")
            .await
            .unwrap_err();
        assert!(err.message.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_add_admin_unknown_email() {
        let backend = store_with_users().await;
        backend.add_admin_by_principal(&alice(), &alice()).await.unwrap();
        let err = backend
            .add_admin_by_email(&alice(), "ghost@shop.example")
            .await
            .unwrap_err();
        assert_eq!(
            err.message,
            "No user profile found for email ghost@shop.example"
        );
    }

    #[tokio::test]
    async fn test_cart_lines_merge() {
        let backend = store_with_users().await;
        backend.add_to_cart(&alice(), ProductId(1), 1).await.unwrap();
        backend.add_to_cart(&alice(), ProductId(1), 2).await.unwrap();
        backend.add_to_cart(&alice(), ProductId(3), 1).await.unwrap();

        let cart = backend.get_cart(&alice()).await.unwrap().unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.quantity_of(ProductId(1)), 3);

        backend.update_cart_item(&alice(), ProductId(1), 1).await.unwrap();
        backend.remove_from_cart(&alice(), ProductId(3)).await.unwrap();
        let cart = backend.get_cart(&alice()).await.unwrap().unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(backend.add_to_cart(&alice(), ProductId(99), 1).await.is_err());
        assert!(backend.add_to_cart(&alice(), ProductId(1), 0).await.is_err());
        assert!(backend.add_to_cart(&alice(), ProductId(1), u64::MAX).await.is_err());
        assert!(backend
            .add_to_cart(&Principal::anonymous(), ProductId(1), 1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_cart_merge_cannot_pass_max_quantity() {
        let backend = store_with_users().await;
        backend
            .add_to_cart(&alice(), ProductId(1), MAX_QUANTITY - 1)
            .await
            .unwrap();
        backend.add_to_cart(&alice(), ProductId(1), 1).await.unwrap();

        let err = backend.add_to_cart(&alice(), ProductId(1), 1).await.unwrap_err();
        assert_eq!(
            err.message,
            "Validation error: quantity must be between 1 and 10000"
        );
        let cart = backend.get_cart(&alice()).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(ProductId(1)), MAX_QUANTITY);

        assert!(backend
            .update_cart_item(&alice(), ProductId(1), MAX_QUANTITY + 1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_removing_last_line_drops_cart() {
        let backend = store_with_users().await;
        backend.add_to_cart(&alice(), ProductId(1), 1).await.unwrap();
        backend.add_to_cart(&alice(), ProductId(3), 1).await.unwrap();

        backend.remove_from_cart(&alice(), ProductId(1)).await.unwrap();
        assert!(backend.get_cart(&alice()).await.unwrap().is_some());

        backend.remove_from_cart(&alice(), ProductId(3)).await.unwrap();
        assert_eq!(backend.get_cart(&alice()).await.unwrap(), None);
        assert_eq!(
            backend.checkout(&alice()).await.unwrap_err().message,
            "Cart is empty"
        );
    }

    #[tokio::test]
    async fn test_checkout_snapshots_prices_and_decrements_stock() {
        let backend = store_with_users().await;
        backend.add_to_cart(&alice(), ProductId(2), 2).await.unwrap();
        backend.add_to_cart(&alice(), ProductId(3), 1).await.unwrap();

        let order_id = backend.checkout(&alice()).await.unwrap();
        let order = backend.get_order(&alice(), order_id).await.unwrap().unwrap();

        assert_eq!(order.buyer, alice());
        assert_eq!(order.total.cents(), 2 * 2999 + 3450);
        assert_eq!(order.items[0].price.cents(), 2999);
        assert_eq!(backend.get_cart(&alice()).await.unwrap(), None);

        let charger = backend.get_product(&alice(), ProductId(2)).await.unwrap().unwrap();
        assert_eq!(charger.stock, 58);

        assert_eq!(backend.get_orders(&alice()).await.unwrap().len(), 1);
        assert!(backend.get_orders(&bob()).await.unwrap().is_empty());
        assert!(backend.get_order(&bob(), order_id).await.is_err());
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let backend = store_with_users().await;
        let err = backend.checkout(&alice()).await.unwrap_err();
        assert_eq!(err.message, "Cart is empty");
    }

    #[tokio::test]
    async fn test_checkout_is_all_or_nothing() {
        let backend = store_with_users().await;
        backend.add_to_cart(&alice(), ProductId(1), 1).await.unwrap();
        // Ceramic Mug is out of stock.
        backend.add_to_cart(&alice(), ProductId(4), 1).await.unwrap();

        let err = backend.checkout(&alice()).await.unwrap_err();
        assert!(err.message.starts_with("Insufficient stock for Ceramic Mug"));

        let headphones = backend.get_product(&alice(), ProductId(1)).await.unwrap().unwrap();
        assert_eq!(headphones.stock, 25);
        assert_eq!(
            backend.get_cart(&alice()).await.unwrap().unwrap().item_count(),
            2
        );
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let backend = InMemoryBackend::new(vec![]).with_latency(Duration::from_millis(5));
        let started = std::time::Instant::now();
        backend.get_categories(&Principal::anonymous()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
