//! # Query Cache
//!
//! Keyed cache for backend reads, with one auditable table that says which
//! reads each write makes stale.
//!
//! ## Read / Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  read(key) ──► moka::try_get_with(key)                                  │
//! │                   │                                                     │
//! │                   ├── cached ─────────────────────────► value           │
//! │                   ├── in flight for key ──► wait ─────► same value      │
//! │                   └── miss ──► backend call ──┬─ Ok ──► insert, value   │
//! │                                               └─ Err ─► nothing cached  │
//! │                                                                         │
//! │  write(mutation) ──► backend call ──┬─ Ok ──► invalidate               │
//! │                                     │         mutation.invalidates()    │
//! │                                     └─ Err ─► cache untouched           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalidation drops every key of a kind, whichever identity or id it is
//! scoped to. The next read after a write resolves observes fresh data.
//!
//! ## Generations
//! Each kind carries a generation counter that invalidation bumps, and
//! entries are stored under `(key, generation)`. A read issued after an
//! invalidation therefore never joins a fetch that started before it, and
//! whatever that older fetch returns is never served to newer reads.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{
    Cart, Category, OrderData, OrderId, Principal, Product, ProductId, UserProfile, UserRole,
};
use moka::future::Cache;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Query Keys
// =============================================================================

/// Stable key for one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUserProfile(Principal),
    UserRole(Principal),
    IsAdmin(Principal),
    Categories,
    /// Customer catalog.
    Products,
    /// Admin product table.
    AllProducts,
    Product(ProductId),
    Cart(Principal),
    Orders(Principal),
    Order(OrderId),
    AllOrders,
}

/// Family of a [`QueryKey`], ignoring the identity or id it is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum QueryKind {
    CurrentUserProfile,
    UserRole,
    IsAdmin,
    Categories,
    Products,
    AllProducts,
    Product,
    Cart,
    Orders,
    Order,
    AllOrders,
}

impl QueryKind {
    const COUNT: usize = QueryKind::AllOrders as usize + 1;
}

impl QueryKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::CurrentUserProfile(_) => QueryKind::CurrentUserProfile,
            QueryKey::UserRole(_) => QueryKind::UserRole,
            QueryKey::IsAdmin(_) => QueryKind::IsAdmin,
            QueryKey::Categories => QueryKind::Categories,
            QueryKey::Products => QueryKind::Products,
            QueryKey::AllProducts => QueryKind::AllProducts,
            QueryKey::Product(_) => QueryKind::Product,
            QueryKey::Cart(_) => QueryKind::Cart,
            QueryKey::Orders(_) => QueryKind::Orders,
            QueryKey::Order(_) => QueryKind::Order,
            QueryKey::AllOrders => QueryKind::AllOrders,
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Every write the client performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    SaveProfile,
    AssignRole,
    AddAdminByPrincipal,
    AddAdminByEmail,
    BootstrapOwnerAdmin,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ApproveProduct,
    RejectProduct,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    AddToCart,
    UpdateCartItem,
    RemoveFromCart,
    ClearCart,
    Checkout,
}

const PRODUCT_READS: &[QueryKind] = &[
    QueryKind::Products,
    QueryKind::AllProducts,
    QueryKind::Product,
];
const ROLE_READS: &[QueryKind] = &[QueryKind::UserRole, QueryKind::IsAdmin];

impl Mutation {
    /// The invalidation table.
    pub fn invalidates(&self) -> &'static [QueryKind] {
        match self {
            // A first profile promotes a guest to user.
            Mutation::SaveProfile => &[
                QueryKind::CurrentUserProfile,
                QueryKind::UserRole,
                QueryKind::IsAdmin,
            ],
            Mutation::AssignRole | Mutation::AddAdminByPrincipal | Mutation::AddAdminByEmail => {
                ROLE_READS
            }
            Mutation::BootstrapOwnerAdmin => &[
                QueryKind::UserRole,
                QueryKind::IsAdmin,
                QueryKind::CurrentUserProfile,
            ],
            Mutation::CreateProduct
            | Mutation::UpdateProduct
            | Mutation::DeleteProduct
            | Mutation::ApproveProduct
            | Mutation::RejectProduct => PRODUCT_READS,
            Mutation::CreateCategory | Mutation::UpdateCategory | Mutation::DeleteCategory => {
                &[QueryKind::Categories]
            }
            Mutation::AddToCart
            | Mutation::UpdateCartItem
            | Mutation::RemoveFromCart
            | Mutation::ClearCart => &[QueryKind::Cart],
            // Stock changes, so the catalog goes too.
            Mutation::Checkout => &[
                QueryKind::Cart,
                QueryKind::Orders,
                QueryKind::AllOrders,
                QueryKind::Order,
                QueryKind::Products,
                QueryKind::AllProducts,
                QueryKind::Product,
            ],
        }
    }
}

// =============================================================================
// Cached Values
// =============================================================================

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Profile(Option<UserProfile>),
    Role(UserRole),
    Flag(bool),
    Categories(Vec<Category>),
    Products(Vec<Product>),
    Product(Option<Box<Product>>),
    Cart(Option<Cart>),
    Orders(Vec<OrderData>),
    Order(Option<Box<OrderData>>),
}

// =============================================================================
// Query Cache
// =============================================================================

/// Cache entries are stored under the key's generation at fetch time.
type Slot = (QueryKey, u64);

/// Shared handle to the moka cache. Cheap to clone.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<Slot, CachedValue>,
    generations: Arc<[AtomicU64; QueryKind::COUNT]>,
}

impl QueryCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .build();
        QueryCache {
            inner,
            generations: Arc::new(std::array::from_fn(|_| AtomicU64::new(0))),
        }
    }

    fn generation(&self, kind: QueryKind) -> u64 {
        self.generations[kind as usize].load(Ordering::SeqCst)
    }

    fn slot(&self, key: &QueryKey) -> Slot {
        (key.clone(), self.generation(key.kind()))
    }

    /// Returns the cached value for `key`, or runs `fetch` to fill it.
    ///
    /// Concurrent callers for the same key share one `fetch`, as long as no
    /// invalidation of the key's kind lands in between. A failed `fetch`
    /// caches nothing and every waiter gets the same error.
    pub async fn get_or_fetch<F>(&self, key: QueryKey, fetch: F) -> ClientResult<CachedValue>
    where
        F: Future<Output = ClientResult<CachedValue>>,
    {
        let slot = self.slot(&key);
        if let Some(value) = self.inner.get(&slot).await {
            debug!(?key, "Cache hit");
            return Ok(value);
        }

        let value = self
            .inner
            .try_get_with(slot.clone(), fetch)
            .await
            .map_err(|e: Arc<ClientError>| (*e).clone())?;

        // Invalidated mid-flight: the caller still gets its answer, but the
        // entry is already unreachable and only takes up room.
        if self.generation(key.kind()) != slot.1 {
            debug!(?key, "Fetch outlived an invalidation");
            self.inner.invalidate(&slot).await;
        }
        Ok(value)
    }

    /// Drops every entry whose kind is in `kinds`.
    ///
    /// Bumps each kind's generation first, so reads from here on start a
    /// fresh fetch even while an older one is still in flight.
    pub async fn invalidate_kinds(&self, kinds: &[QueryKind]) {
        for kind in kinds {
            self.generations[*kind as usize].fetch_add(1, Ordering::SeqCst);
        }

        let stale: Vec<Slot> = self
            .inner
            .iter()
            .filter(|(slot, _)| kinds.contains(&slot.0.kind()))
            .map(|(slot, _)| (*slot).clone())
            .collect();

        for slot in &stale {
            self.inner.invalidate(slot).await;
        }
        debug!(?kinds, dropped = stale.len(), "Invalidated cached queries");
    }

    /// Applies the invalidation table for a successful mutation.
    pub async fn invalidate_for(&self, mutation: Mutation) {
        self.invalidate_kinds(mutation.invalidates()).await;
    }

    /// Whether a value is cached for `key`.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.contains_key(&self.slot(key))
    }

    /// Drops everything (sign-out).
    pub async fn clear(&self) {
        for generation in self.generations.iter() {
            generation.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::CartItem;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> QueryCache {
        QueryCache::new(100, Duration::from_secs(60))
    }

    fn alice() -> Principal {
        "rrkah-fqaaa-aaaaa-aaaaq-cai".parse().unwrap()
    }

    #[test]
    fn test_cart_mutations_only_touch_cart() {
        for mutation in [
            Mutation::AddToCart,
            Mutation::UpdateCartItem,
            Mutation::RemoveFromCart,
            Mutation::ClearCart,
        ] {
            assert_eq!(mutation.invalidates(), &[QueryKind::Cart]);
        }
    }

    #[test]
    fn test_checkout_invalidates_cart_orders_and_catalog() {
        let kinds = Mutation::Checkout.invalidates();
        for kind in [
            QueryKind::Cart,
            QueryKind::Orders,
            QueryKind::AllOrders,
            QueryKind::Products,
            QueryKind::Product,
        ] {
            assert!(kinds.contains(&kind), "{:?} not invalidated", kind);
        }
        assert!(!kinds.contains(&QueryKind::Categories));
    }

    #[test]
    fn test_role_mutations() {
        assert_eq!(Mutation::AddAdminByEmail.invalidates(), ROLE_READS);
        assert!(Mutation::BootstrapOwnerAdmin
            .invalidates()
            .contains(&QueryKind::CurrentUserProfile));
        assert!(Mutation::SaveProfile
            .invalidates()
            .contains(&QueryKind::UserRole));
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(QueryKey::Categories, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(CachedValue::Categories(vec![]))
                })
                .await
                .unwrap();
            assert!(matches!(value, CachedValue::Categories(_)));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_caches_nothing() {
        let cache = cache();
        let result = cache
            .get_or_fetch(QueryKey::Products, async {
                Err(ClientError::Remote("backend down".to_string()))
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            ClientError::Remote("backend down".to_string())
        );
        assert!(!cache.contains(&QueryKey::Products));
    }

    #[tokio::test]
    async fn test_invalidate_drops_every_scope_of_a_kind() {
        let cache = cache();
        let fill = |key: QueryKey| {
            let cache = cache.clone();
            async move {
                cache
                    .get_or_fetch(key, async { Ok(CachedValue::Cart(None)) })
                    .await
                    .unwrap();
            }
        };
        fill(QueryKey::Cart(alice())).await;
        fill(QueryKey::Cart(Principal::anonymous())).await;
        fill(QueryKey::Categories).await;

        cache.invalidate_for(Mutation::AddToCart).await;

        assert!(!cache.contains(&QueryKey::Cart(alice())));
        assert!(!cache.contains(&QueryKey::Cart(Principal::anonymous())));
        assert!(cache.contains(&QueryKey::Categories));
    }

    fn cart_with(quantity: u64) -> CachedValue {
        CachedValue::Cart(Some(Cart {
            items: vec![CartItem {
                product_id: ProductId(1),
                quantity,
            }],
        }))
    }

    fn cart_quantity(value: &CachedValue) -> u64 {
        match value {
            CachedValue::Cart(Some(cart)) => cart.quantity_of(ProductId(1)),
            other => panic!("expected a cart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_after_mutation_does_not_join_older_fetch() {
        let cache = cache();
        let key = QueryKey::Cart(alice());

        let slow = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            async move {
                cache
                    .get_or_fetch(key, async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(cart_with(1))
                    })
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.invalidate_for(Mutation::UpdateCartItem).await;
        let fresh = cache
            .get_or_fetch(key.clone(), async { Ok(cart_with(5)) })
            .await
            .unwrap();
        assert_eq!(cart_quantity(&fresh), 5);

        // The older read still resolves with what it fetched.
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(cart_quantity(&stale), 1);

        // ...but its late result never replaces the fresh entry.
        let cached = cache
            .get_or_fetch(key.clone(), async { Ok(cart_with(9)) })
            .await
            .unwrap();
        assert_eq!(cart_quantity(&cached), 5);
        assert!(cache.contains(&key));
    }

    #[tokio::test]
    async fn test_concurrent_reads_without_mutation_share_fetch() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, ClientError>(cart_with(2))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(QueryKey::Cart(alice()), fetch()),
            cache.get_or_fetch(QueryKey::Cart(alice()), fetch()),
        );
        assert_eq!(cart_quantity(&a.unwrap()), 2);
        assert_eq!(cart_quantity(&b.unwrap()), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_leaves_other_kinds_in_flight() {
        let cache = cache();
        let categories = tokio::spawn({
            let cache = cache.clone();
            async move {
                cache
                    .get_or_fetch(QueryKey::Categories, async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(CachedValue::Categories(vec![]))
                    })
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate_for(Mutation::AddToCart).await;
        categories.await.unwrap().unwrap();

        assert!(cache.contains(&QueryKey::Categories));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        cache
            .get_or_fetch(QueryKey::AllOrders, async { Ok(CachedValue::Orders(vec![])) })
            .await
            .unwrap();
        cache.clear().await;
        assert!(!cache.contains(&QueryKey::AllOrders));
    }
}
