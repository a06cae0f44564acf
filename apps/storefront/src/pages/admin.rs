//! # Admin Pages
//!
//! Dashboard, product table, product form, and categories. Every route here
//! is gated on the admin role; the backend enforces it again on each write.
//!
//! ## Dashboard
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ Products  6  │ │ Orders    2  │ │ Revenue      │
//! │              │ │              │ │  $193.48     │
//! └──────────────┘ └──────────────┘ └──────────────┘
//! Your Principal ID: rrkah-fqaaa-...
//! Grant admin:  [ email ........ ] [Assign]   [ principal ... ] [Assign]
//! ```

use bazaar_client::error::ErrorClass;
use bazaar_client::{ClientError, Notice};
use bazaar_core::catalog::StoreStats;
use bazaar_core::forms::ProductDraft;
use bazaar_core::{Category, CategoryId, Principal, Product, ProductId, ProductStatus};
use serde::Serialize;
use tracing::{info, warn};

use super::Outcome;
use crate::error::ApiError;
use crate::routes::Route;
use crate::state::{AppState, ConfigState};

const GRANT_ADMIN: &str = "grant admin access";
const ADMIN_ASSIGNED: &str = "Admin role assigned successfully";

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub product_count: usize,
    pub order_count: usize,
    pub revenue: String,
    pub principal: String,
}

pub async fn dashboard(state: &AppState) -> Result<DashboardView, ApiError> {
    let principal = state.client.session().require().await?;
    let products = state.client.all_products().await?;
    let orders = state.client.all_orders().await?;
    let stats = StoreStats::compute(&products, &orders)?;

    Ok(DashboardView {
        product_count: stats.product_count,
        order_count: stats.order_count,
        revenue: state.config.format_currency(stats.revenue),
        principal: principal.to_string(),
    })
}

/// Grant admin by email.
pub async fn grant_admin_by_email(state: &AppState, email: &str) -> Notice {
    if email.trim().is_empty() {
        return Notice::error("Please enter an email address");
    }
    match state.client.add_admin_by_email(email).await {
        Ok(()) => Notice::success(ADMIN_ASSIGNED),
        Err(err) => {
            warn!(error = %err, "Grant admin by email failed");
            err.notice(GRANT_ADMIN)
        }
    }
}

/// Grant admin by principal text.
pub async fn grant_admin_by_principal(state: &AppState, text: &str) -> Notice {
    let text = text.trim();
    if text.is_empty() {
        return Notice::error("Please enter a principal ID");
    }
    let Ok(principal) = text.parse::<Principal>() else {
        return Notice::error("Invalid principal ID format");
    };

    match state.client.add_admin_by_principal(&principal).await {
        Ok(()) => Notice::success(ADMIN_ASSIGNED),
        Err(ClientError::Remote(message)) if message.contains("Invalid principal") => {
            Notice::error("Invalid principal ID format")
        }
        Err(err) => {
            warn!(error = %err, "Grant admin by principal failed");
            match (err.class(), &err) {
                (ErrorClass::Authorization, _) => err.notice(GRANT_ADMIN),
                (_, ClientError::Remote(message)) if !message.trim().is_empty() => {
                    Notice::error(message.clone())
                }
                _ => Notice::error("Failed to assign admin role"),
            }
        }
    }
}

// =============================================================================
// Product Table
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub price: String,
    pub stock: u64,
    pub status: ProductStatus,
    /// Badge text: "Approved", "Pending", ...
    pub status_badge: String,
}

impl ProductRow {
    fn new(product: &Product, config: &ConfigState) -> Self {
        let status = product.status.as_str();
        let mut badge = status.to_string();
        if let Some(first) = badge.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        ProductRow {
            id: product.id,
            title: product.title.clone(),
            category: product.category.clone(),
            price: config.format_currency(product.price),
            stock: product.stock,
            status: product.status,
            status_badge: badge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductsView {
    pub rows: Vec<ProductRow>,
    pub pending_count: usize,
}

pub async fn products_table(state: &AppState) -> Result<AdminProductsView, ApiError> {
    let products = state.client.all_products().await?;
    Ok(AdminProductsView {
        pending_count: products
            .iter()
            .filter(|p| p.status == ProductStatus::Pending)
            .count(),
        rows: products
            .iter()
            .map(|p| ProductRow::new(p, &state.config))
            .collect(),
    })
}

pub async fn delete_product(state: &AppState, id: ProductId) -> Notice {
    match state.client.delete_product(id).await {
        Ok(()) => Notice::success("Product deleted successfully"),
        Err(err) => {
            warn!(product_id = %id, error = %err, "Delete product failed");
            Notice::error("Failed to delete product")
        }
    }
}

pub async fn approve_product(state: &AppState, id: ProductId) -> Notice {
    match state.client.approve_product(id).await {
        Ok(()) => Notice::success("Product approved"),
        Err(err) => err.notice("approve product"),
    }
}

pub async fn reject_product(state: &AppState, id: ProductId) -> Notice {
    match state.client.reject_product(id).await {
        Ok(()) => Notice::success("Product rejected"),
        Err(err) => err.notice("reject product"),
    }
}

// =============================================================================
// Product Form
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormView {
    pub heading: String,
    pub editing: Option<ProductId>,
    pub draft: ProductDraft,
    pub categories: Vec<Category>,
    pub statuses: Vec<ProductStatus>,
}

/// Blank form for `None`, prefilled form for `Some(id)`.
pub async fn product_form(
    state: &AppState,
    id: Option<ProductId>,
) -> Result<ProductFormView, ApiError> {
    let categories = state.client.categories().await?;
    let (heading, draft) = match id {
        None => ("Add New Product".to_string(), ProductDraft::default()),
        Some(id) => {
            let product = state
                .client
                .product(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Product", &id.to_string()))?;
            ("Edit Product".to_string(), ProductDraft::from_product(&product))
        }
    };

    Ok(ProductFormView {
        heading,
        editing: id,
        draft,
        categories,
        statuses: ProductStatus::ALL.to_vec(),
    })
}

/// Creates (`None`) or updates (`Some(id)`) a product from the form.
pub async fn save_product(
    state: &AppState,
    id: Option<ProductId>,
    draft: &ProductDraft,
) -> Outcome {
    let blank = |s: &str| s.trim().is_empty();
    if blank(&draft.title) || blank(&draft.price) || blank(&draft.category) {
        return Outcome::failed(Notice::error("Please fill in all required fields"));
    }

    let result = match id {
        Some(id) => state
            .client
            .update_product(id, draft)
            .await
            .map(|()| "Product updated successfully"),
        None => state
            .client
            .create_product(draft)
            .await
            .map(|_| "Product created successfully"),
    };

    match result {
        Ok(message) => {
            info!(title = %draft.title, "Product saved");
            Outcome::done(Notice::success(message), Route::AdminProducts)
        }
        Err(ClientError::Validation(err)) => Outcome::failed(Notice::error(err.to_string())),
        Err(ClientError::Remote(message)) if !message.trim().is_empty() => {
            Outcome::failed(Notice::error(message))
        }
        Err(err) => {
            warn!(error = %err, "Save product failed");
            Outcome::failed(Notice::error("Failed to save product"))
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub product_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesView {
    pub categories: Vec<CategoryRow>,
}

pub async fn categories(state: &AppState) -> Result<CategoriesView, ApiError> {
    let categories = state.client.categories().await?;
    let products = state.client.all_products().await?;

    Ok(CategoriesView {
        categories: categories
            .into_iter()
            .map(|c| CategoryRow {
                product_count: products.iter().filter(|p| p.category == c.name).count(),
                id: c.id,
                name: c.name,
            })
            .collect(),
    })
}

pub async fn create_category(state: &AppState, name: &str) -> Notice {
    match state.client.create_category(name).await {
        Ok(_) => Notice::success("Category created"),
        Err(err) => err.notice("create category"),
    }
}

pub async fn rename_category(state: &AppState, id: CategoryId, name: &str) -> Notice {
    match state.client.update_category(id, name).await {
        Ok(()) => Notice::success("Category updated"),
        Err(err) => err.notice("update category"),
    }
}

pub async fn delete_category(state: &AppState, id: CategoryId) -> Notice {
    match state.client.delete_category(id).await {
        Ok(()) => Notice::success("Category deleted"),
        Err(err) => err.notice("delete category"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
