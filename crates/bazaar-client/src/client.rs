//! # Marketplace Client
//!
//! Typed reads and writes over a [`MarketplaceBackend`], with the query
//! cache in front of the reads.
//!
//! ## Rules
//! - Reads are cached under a [`QueryKey`]; concurrent reads of one key make
//!   one backend call.
//! - Reads scoped to the signed-in identity (cart, orders, role, admin flag,
//!   profile) return an empty value without a backend call when signed out.
//! - Writes require a signed-in identity. On success they invalidate the
//!   kinds listed by their [`Mutation`]; on failure the cache is untouched.
//! - Signing in or out clears the cache.

use std::future::Future;
use std::sync::Arc;

use bazaar_core::forms::{ProductDraft, ProfileDraft};
use bazaar_core::validation::{validate_category_name, validate_email, validate_quantity};
use bazaar_core::{
    Cart, Category, CategoryId, OrderData, OrderId, Principal, Product, ProductId, UserProfile,
    UserRole,
};
use tracing::{debug, info, warn};

use crate::backend::{BackendResult, MarketplaceBackend};
use crate::cache::{CachedValue, Mutation, QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Data access handle shared by every page. Cheap to clone.
#[derive(Clone)]
pub struct MarketplaceClient {
    backend: Arc<dyn MarketplaceBackend>,
    cache: QueryCache,
    session: Session,
}

fn unexpected(key: &QueryKey, value: &CachedValue) -> ClientError {
    ClientError::Internal(format!("cache entry {:?} holds {:?}", key, value))
}

impl MarketplaceClient {
    pub fn new(
        backend: Arc<dyn MarketplaceBackend>,
        session: Session,
        config: &ClientConfig,
    ) -> Self {
        MarketplaceClient {
            backend,
            cache: QueryCache::new(config.cache.max_capacity, config.cache_ttl()),
            session,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Signs in and drops everything cached for the previous identity.
    pub async fn sign_in(&self, principal: Principal) -> ClientResult<()> {
        self.session.sign_in(principal).await?;
        self.cache.clear().await;
        Ok(())
    }

    pub async fn sign_out(&self) {
        self.session.sign_out().await;
        self.cache.clear().await;
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Runs a write and applies its invalidations on success.
    async fn mutate<T, F>(&self, mutation: Mutation, call: F) -> ClientResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        match call.await {
            Ok(value) => {
                self.cache.invalidate_for(mutation).await;
                info!(?mutation, "Mutation succeeded");
                Ok(value)
            }
            Err(err) => {
                warn!(?mutation, error = %err, "Mutation failed");
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // Catalog Reads
    // =========================================================================

    /// Every product, for the customer catalog.
    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        let caller = self.session.caller().await;
        let key = QueryKey::Products;
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!("Fetching products");
                Ok(CachedValue::Products(self.backend.get_products(&caller).await?))
            })
            .await?;
        match value {
            CachedValue::Products(products) => Ok(products),
            other => Err(unexpected(&key, &other)),
        }
    }

    /// Every product, for the admin table.
    pub async fn all_products(&self) -> ClientResult<Vec<Product>> {
        let caller = self.session.caller().await;
        let key = QueryKey::AllProducts;
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!("Fetching all products");
                Ok(CachedValue::Products(self.backend.get_products(&caller).await?))
            })
            .await?;
        match value {
            CachedValue::Products(products) => Ok(products),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn product(&self, id: ProductId) -> ClientResult<Option<Product>> {
        let caller = self.session.caller().await;
        let key = QueryKey::Product(id);
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(product_id = %id, "Fetching product");
                let product = self.backend.get_product(&caller, id).await?;
                Ok(CachedValue::Product(product.map(Box::new)))
            })
            .await?;
        match value {
            CachedValue::Product(product) => Ok(product.map(|p| *p)),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        let caller = self.session.caller().await;
        let key = QueryKey::Categories;
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!("Fetching categories");
                Ok(CachedValue::Categories(self.backend.get_categories(&caller).await?))
            })
            .await?;
        match value {
            CachedValue::Categories(categories) => Ok(categories),
            other => Err(unexpected(&key, &other)),
        }
    }

    /// Single category lookup; not cached.
    pub async fn category(&self, id: CategoryId) -> ClientResult<Option<Category>> {
        let caller = self.session.caller().await;
        Ok(self.backend.get_category(&caller, id).await?)
    }

    // =========================================================================
    // Identity-Scoped Reads
    // =========================================================================

    pub async fn cart(&self) -> ClientResult<Option<Cart>> {
        let Some(principal) = self.session.principal().await else {
            return Ok(None);
        };
        let key = QueryKey::Cart(principal.clone());
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(principal = %principal, "Fetching cart");
                Ok(CachedValue::Cart(self.backend.get_cart(&principal).await?))
            })
            .await?;
        match value {
            CachedValue::Cart(cart) => Ok(cart),
            other => Err(unexpected(&key, &other)),
        }
    }

    /// The caller's own orders.
    pub async fn orders(&self) -> ClientResult<Vec<OrderData>> {
        let Some(principal) = self.session.principal().await else {
            return Ok(Vec::new());
        };
        let key = QueryKey::Orders(principal.clone());
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(principal = %principal, "Fetching orders");
                Ok(CachedValue::Orders(self.backend.get_orders(&principal).await?))
            })
            .await?;
        match value {
            CachedValue::Orders(orders) => Ok(orders),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn order(&self, id: OrderId) -> ClientResult<Option<OrderData>> {
        let Some(principal) = self.session.principal().await else {
            return Ok(None);
        };
        let key = QueryKey::Order(id);
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(order_id = %id, "Fetching order");
                let order = self.backend.get_order(&principal, id).await?;
                Ok(CachedValue::Order(order.map(Box::new)))
            })
            .await?;
        match value {
            CachedValue::Order(order) => Ok(order.map(|o| *o)),
            other => Err(unexpected(&key, &other)),
        }
    }

    /// Every order in the store. Admin only.
    pub async fn all_orders(&self) -> ClientResult<Vec<OrderData>> {
        let principal = self.session.require().await?;
        let key = QueryKey::AllOrders;
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!("Fetching all orders");
                Ok(CachedValue::Orders(self.backend.get_all_orders(&principal).await?))
            })
            .await?;
        match value {
            CachedValue::Orders(orders) => Ok(orders),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn caller_role(&self) -> ClientResult<UserRole> {
        let Some(principal) = self.session.principal().await else {
            return Ok(UserRole::Guest);
        };
        self.role_of(&principal).await
    }

    /// Role lookup tagged with the principal it was issued for, so a guard
    /// can discard the answer if the identity changed meanwhile.
    pub async fn role_of(&self, principal: &Principal) -> ClientResult<UserRole> {
        let key = QueryKey::UserRole(principal.clone());
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(principal = %principal, "Fetching role");
                Ok(CachedValue::Role(self.backend.get_caller_user_role(principal).await?))
            })
            .await?;
        match value {
            CachedValue::Role(role) => Ok(role),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn is_admin(&self) -> ClientResult<bool> {
        let Some(principal) = self.session.principal().await else {
            return Ok(false);
        };
        let key = QueryKey::IsAdmin(principal.clone());
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(principal = %principal, "Fetching admin flag");
                Ok(CachedValue::Flag(self.backend.is_caller_admin(&principal).await?))
            })
            .await?;
        match value {
            CachedValue::Flag(flag) => Ok(flag),
            other => Err(unexpected(&key, &other)),
        }
    }

    pub async fn caller_profile(&self) -> ClientResult<Option<UserProfile>> {
        let Some(principal) = self.session.principal().await else {
            return Ok(None);
        };
        let key = QueryKey::CurrentUserProfile(principal.clone());
        let value = self
            .cache
            .get_or_fetch(key.clone(), async {
                debug!(principal = %principal, "Fetching profile");
                Ok(CachedValue::Profile(
                    self.backend.get_caller_user_profile(&principal).await?,
                ))
            })
            .await?;
        match value {
            CachedValue::Profile(profile) => Ok(profile),
            other => Err(unexpected(&key, &other)),
        }
    }

    /// Another user's profile; not cached.
    pub async fn user_profile(&self, user: &Principal) -> ClientResult<Option<UserProfile>> {
        let caller = self.session.caller().await;
        Ok(self.backend.get_user_profile(&caller, user).await?)
    }

    /// Every profile in the store; not cached. Admin only.
    pub async fn all_user_profiles(&self) -> ClientResult<Vec<(Principal, UserProfile)>> {
        let caller = self.session.require().await?;
        Ok(self.backend.get_all_user_profiles(&caller).await?)
    }

    // =========================================================================
    // Profile & Role Writes
    // =========================================================================

    pub async fn save_profile(&self, draft: &ProfileDraft) -> ClientResult<()> {
        let profile = draft.validate()?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::SaveProfile,
            self.backend.save_caller_user_profile(&caller, profile),
        )
        .await
    }

    pub async fn assign_role(&self, user: &Principal, role: UserRole) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::AssignRole,
            self.backend.assign_user_role(&caller, user, role),
        )
        .await
    }

    pub async fn add_admin_by_principal(&self, user: &Principal) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::AddAdminByPrincipal,
            self.backend.add_admin_by_principal(&caller, user),
        )
        .await
    }

    pub async fn add_admin_by_email(&self, email: &str) -> ClientResult<()> {
        let email = email.trim();
        validate_email(email)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::AddAdminByEmail,
            self.backend.add_admin_by_email(&caller, email),
        )
        .await
    }

    /// Grants the caller admin through their own profile email.
    ///
    /// Succeeds when no admin exists yet or the email is on the owner list.
    pub async fn bootstrap_owner_admin(&self) -> ClientResult<()> {
        let caller = self.session.require().await?;
        let profile = self
            .caller_profile()
            .await?
            .ok_or_else(|| ClientError::not_found("Profile", &caller))?;
        info!(principal = %caller, email = %profile.email, "Claiming owner admin");
        self.mutate(
            Mutation::BootstrapOwnerAdmin,
            self.backend.add_admin_by_email(&caller, &profile.email),
        )
        .await
    }

    // =========================================================================
    // Product Writes
    // =========================================================================

    pub async fn create_product(&self, draft: &ProductDraft) -> ClientResult<ProductId> {
        let product = draft.validate(ProductId(0))?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::CreateProduct,
            self.backend.create_product(&caller, product),
        )
        .await
    }

    pub async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> ClientResult<()> {
        let product = draft.validate(id)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::UpdateProduct,
            self.backend.update_product(&caller, id, product),
        )
        .await
    }

    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::DeleteProduct, self.backend.delete_product(&caller, id))
            .await
    }

    pub async fn approve_product(&self, id: ProductId) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::ApproveProduct, self.backend.approve_product(&caller, id))
            .await
    }

    pub async fn reject_product(&self, id: ProductId) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::RejectProduct, self.backend.reject_product(&caller, id))
            .await
    }

    // =========================================================================
    // Category Writes
    // =========================================================================

    pub async fn create_category(&self, name: &str) -> ClientResult<CategoryId> {
        validate_category_name(name)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::CreateCategory,
            self.backend.create_category(&caller, name.trim()),
        )
        .await
    }

    pub async fn update_category(&self, id: CategoryId, name: &str) -> ClientResult<()> {
        validate_category_name(name)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::UpdateCategory,
            self.backend.update_category(&caller, id, name.trim()),
        )
        .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::DeleteCategory, self.backend.delete_category(&caller, id))
            .await
    }

    // =========================================================================
    // Cart & Checkout Writes
    // =========================================================================

    pub async fn add_to_cart(&self, product_id: ProductId, quantity: i64) -> ClientResult<()> {
        let quantity = validate_quantity(quantity)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::AddToCart,
            self.backend.add_to_cart(&caller, product_id, quantity),
        )
        .await
    }

    pub async fn update_cart_item(&self, product_id: ProductId, quantity: i64) -> ClientResult<()> {
        let quantity = validate_quantity(quantity)?;
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::UpdateCartItem,
            self.backend.update_cart_item(&caller, product_id, quantity),
        )
        .await
    }

    pub async fn remove_from_cart(&self, product_id: ProductId) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(
            Mutation::RemoveFromCart,
            self.backend.remove_from_cart(&caller, product_id),
        )
        .await
    }

    pub async fn clear_cart(&self) -> ClientResult<()> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::ClearCart, self.backend.clear_cart(&caller))
            .await
    }

    /// Converts the cart into an order.
    pub async fn checkout(&self) -> ClientResult<OrderId> {
        let caller = self.session.require().await?;
        self.mutate(Mutation::Checkout, self.backend.checkout(&caller))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
