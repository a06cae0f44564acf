//! # Catalog Pages
//!
//! Home, the filtered product list, and product detail with add-to-cart.
//!
//! ## Products Page Flow
//! ```text
//! ?category=Home&q=lamp
//!       │
//!       ▼
//! CatalogFilter::new ──► client.products() (cached) ──► filter.apply
//!       │                                                   │
//!       ▼                                                   ▼
//! heading ("Search results for \"lamp\"")          ProductCard per match
//! ```

use bazaar_client::{ClientError, Notice};
use bazaar_core::catalog::{featured, result_label, CatalogFilter};
use bazaar_core::{Category, Product, ProductId};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, ConfigState};

// =============================================================================
// Views
// =============================================================================

/// Product tile used by the home grid and the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub category: String,
    pub image: String,
    pub in_stock: bool,
}

impl ProductCard {
    pub fn new(product: &Product, config: &ConfigState) -> Self {
        ProductCard {
            id: product.id,
            title: product.title.clone(),
            price: config.format_currency(product.price),
            category: product.category.clone(),
            image: product.image.clone(),
            in_stock: product.in_stock(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub featured: Vec<ProductCard>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsView {
    pub heading: String,
    pub result_label: String,
    pub selected_category: Option<String>,
    pub query: String,
    pub categories: Vec<Category>,
    pub products: Vec<ProductCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailView {
    pub product: ProductCard,
    pub description: String,
    pub stock: u64,
    pub stock_label: String,
}

// =============================================================================
// Loaders
// =============================================================================

pub async fn home(state: &AppState) -> Result<HomeView, ApiError> {
    let products = state.client.products().await?;
    let categories = state.client.categories().await?;

    Ok(HomeView {
        featured: featured(&products, state.config.featured_count)
            .into_iter()
            .map(|p| ProductCard::new(p, &state.config))
            .collect(),
        categories,
    })
}

/// Approved products matching the selected category and search text.
pub async fn products(state: &AppState, filter: &CatalogFilter) -> Result<ProductsView, ApiError> {
    let products = state.client.products().await?;
    let categories = state.client.categories().await?;
    let matches = filter.apply(&products);
    debug!(
        category = ?filter.category,
        query = filter.query(),
        matches = matches.len(),
        "Products page"
    );

    Ok(ProductsView {
        heading: filter.heading(),
        result_label: result_label(matches.len()),
        selected_category: filter.category.clone(),
        query: filter.query().to_string(),
        categories,
        products: matches
            .into_iter()
            .map(|p| ProductCard::new(p, &state.config))
            .collect(),
    })
}

/// Detail page. Products that are not approved are hidden from customers.
pub async fn product_detail(
    state: &AppState,
    id: ProductId,
) -> Result<ProductDetailView, ApiError> {
    let product = state
        .client
        .product(id)
        .await?
        .filter(Product::is_listed)
        .ok_or_else(|| ApiError::not_found("Product", &id.to_string()))?;

    let stock_label = if product.in_stock() {
        format!("In Stock ({} available)", product.stock)
    } else {
        "Out of Stock".to_string()
    };

    Ok(ProductDetailView {
        product: ProductCard::new(&product, &state.config),
        description: product.description.clone(),
        stock: product.stock,
        stock_label,
    })
}

// =============================================================================
// Actions
// =============================================================================

/// Add-to-cart button on the detail page.
pub async fn add_to_cart(state: &AppState, id: ProductId, quantity: i64) -> Notice {
    match state.client.add_to_cart(id, quantity).await {
        Ok(()) => Notice::success("Added to cart!"),
        Err(ClientError::NotSignedIn) => Notice::error("Please sign in to add items to cart"),
        Err(err @ ClientError::Validation(_)) => Notice::error(err.to_string()),
        Err(err) => {
            debug!(product_id = %id, error = %err, "Add to cart failed");
            Notice::error("Failed to add to cart")
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{demo_state, shopper};

    #[tokio::test]
    async fn test_home_features_approved_products() {
        let state = demo_state(vec![]);
        let view = home(&state).await.unwrap();
        assert_eq!(view.featured.len(), 5);
        assert_eq!(view.categories.len(), 3);
        assert_eq!(view.featured[0].price, "$89.99");
    }

    #[tokio::test]
    async fn test_products_filtered_by_category_and_query() {
        let state = demo_state(vec![]);

        let filter = CatalogFilter::new(Some("Electronics"), "").unwrap();
        let view = products(&state, &filter).await.unwrap();
        assert_eq!(view.heading, "Electronics");
        assert_eq!(view.result_label, "2 results");

        let filter = CatalogFilter::new(None, "LAMP").unwrap();
        let view = products(&state, &filter).await.unwrap();
        assert_eq!(view.heading, "Search results for \"lamp\"");
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].title, "Desk Lamp");
    }

    #[tokio::test]
    async fn test_product_detail() {
        let state = demo_state(vec![]);
        let view = product_detail(&state, ProductId(4)).await.unwrap();
        assert_eq!(view.stock_label, "Out of Stock");
        assert!(!view.product.in_stock);

        // Pending products are not shown.
        let err = product_detail(&state, ProductId(6)).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_to_cart_notices() {
        let state = demo_state(vec![]);
        let notice = add_to_cart(&state, ProductId(1), 1).await;
        assert_eq!(notice.message, "Please sign in to add items to cart");

        shopper(&state, "alice@shop.example").await;
        let notice = add_to_cart(&state, ProductId(1), 1).await;
        assert_eq!(notice, Notice::success("Added to cart!"));

        let notice = add_to_cart(&state, ProductId(999), 1).await;
        assert_eq!(notice.message, "Failed to add to cart");

        let notice = add_to_cart(&state, ProductId(1), 0).await;
        assert_eq!(notice.message, "quantity must be positive");
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_huge_quantity() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;

        let notice = add_to_cart(&state, ProductId(1), i64::MAX).await;
        assert_eq!(notice.message, "quantity must be between 1 and 10000");

        let cart = crate::pages::cart::view(&state).await.unwrap();
        assert!(cart.is_empty);

        let notice = add_to_cart(&state, ProductId(1), 10_000).await;
        assert_eq!(notice, Notice::success("Added to cart!"));
        let notice = add_to_cart(&state, ProductId(1), 1).await;
        assert_eq!(notice.message, "Failed to add to cart");
    }
}
