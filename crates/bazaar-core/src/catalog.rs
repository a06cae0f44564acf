//! # Catalog
//!
//! Product filtering for the customer pages and the numbers shown on the
//! admin dashboard.
//!
//! ## Filter Pipeline
//! ```text
//! all products ──► status == approved ──► category == selected? ──► title ∋ query?
//!                                          (none selected: pass)    (case-insensitive)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderData, Product};
use crate::validation::validate_search_query;

// =============================================================================
// Catalog Filter
// =============================================================================

/// Category selection and search text on the products page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Selected category name. `None` shows every category.
    pub category: Option<String>,
    /// Lowercased search text. Empty means no search.
    query: String,
}

impl CatalogFilter {
    /// Builds a filter from the page's `category` and `q` parameters.
    pub fn new(category: Option<&str>, query: &str) -> Result<Self, ValidationError> {
        Ok(CatalogFilter {
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            query: validate_search_query(query)?,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Selecting the current category again clears the selection.
    pub fn toggle_category(&mut self, name: &str) {
        if self.category.as_deref() == Some(name) {
            self.category = None;
        } else {
            self.category = Some(name.to_string());
        }
    }

    /// Whether a product passes the category and search filters.
    ///
    /// Moderation status is not checked here; see [`CatalogFilter::apply`].
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        self.query.is_empty() || product.title.to_lowercase().contains(&self.query)
    }

    /// Approved products that pass the filter, in backend order.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products
            .iter()
            .filter(|p| p.is_listed() && self.matches(p))
            .collect()
    }

    /// Page heading: the search, else the category, else "All Products".
    pub fn heading(&self) -> String {
        if !self.query.is_empty() {
            format!("Search results for \"{}\"", self.query)
        } else if let Some(category) = &self.category {
            category.clone()
        } else {
            "All Products".to_string()
        }
    }
}

/// `"1 result"` / `"3 results"`.
pub fn result_label(count: usize) -> String {
    if count == 1 {
        "1 result".to_string()
    } else {
        format!("{} results", count)
    }
}

/// The first `count` approved products, for the home page.
pub fn featured(products: &[Product], count: usize) -> Vec<&Product> {
    products.iter().filter(|p| p.is_listed()).take(count).collect()
}

// =============================================================================
// Store Statistics
// =============================================================================

/// Sum of order totals.
pub fn revenue(orders: &[OrderData]) -> CoreResult<Money> {
    orders.iter().try_fold(Money::zero(), |sum, order| {
        sum.checked_add(order.total).ok_or(CoreError::AmountOverflow)
    })
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub product_count: usize,
    pub order_count: usize,
    pub revenue: Money,
}

impl StoreStats {
    pub fn compute(products: &[Product], orders: &[OrderData]) -> CoreResult<Self> {
        Ok(StoreStats {
            product_count: products.len(),
            order_count: orders.len(),
            revenue: revenue(orders)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderId, Principal, ProductId, ProductStatus};
    use chrono::Utc;

    fn product(id: u64, title: &str, category: &str, status: ProductStatus) -> Product {
        Product {
            id: ProductId(id),
            title: title.to_string(),
            description: String::new(),
            price: Money::from_cents(1000),
            stock: 5,
            category: category.to_string(),
            image: String::new(),
            status,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Desk Lamp", "Home", ProductStatus::Approved),
            product(2, "Floor Lamp", "Home", ProductStatus::Pending),
            product(3, "USB Lamp", "Electronics", ProductStatus::Approved),
            product(4, "Headphones", "Electronics", ProductStatus::Approved),
        ]
    }

    fn ids(products: Vec<&Product>) -> Vec<u64> {
        products.into_iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn test_no_filter_lists_only_approved() {
        let products = catalog();
        let filter = CatalogFilter::default();
        assert_eq!(ids(filter.apply(&products)), vec![1, 3, 4]);
        assert_eq!(filter.heading(), "All Products");
    }

    #[test]
    fn test_category_filter() {
        let products = catalog();
        let filter = CatalogFilter::new(Some("Electronics"), "").unwrap();
        assert_eq!(ids(filter.apply(&products)), vec![3, 4]);
        assert_eq!(filter.heading(), "Electronics");
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let products = catalog();
        let filter = CatalogFilter::new(None, "LAMP").unwrap();
        assert_eq!(ids(filter.apply(&products)), vec![1, 3]);
        assert_eq!(filter.heading(), "Search results for \"lamp\"");
    }

    #[test]
    fn test_category_and_query_combine() {
        let products = catalog();
        let filter = CatalogFilter::new(Some("Home"), "lamp").unwrap();
        assert_eq!(ids(filter.apply(&products)), vec![1]);
    }

    #[test]
    fn test_toggle_category() {
        let mut filter = CatalogFilter::default();
        filter.toggle_category("Home");
        assert_eq!(filter.category.as_deref(), Some("Home"));
        filter.toggle_category("Electronics");
        assert_eq!(filter.category.as_deref(), Some("Electronics"));
        filter.toggle_category("Electronics");
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_blank_category_means_all() {
        let filter = CatalogFilter::new(Some("  "), "").unwrap();
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_result_label() {
        assert_eq!(result_label(0), "0 results");
        assert_eq!(result_label(1), "1 result");
        assert_eq!(result_label(7), "7 results");
    }

    #[test]
    fn test_featured_takes_first_approved() {
        let products = catalog();
        assert_eq!(ids(featured(&products, 2)), vec![1, 3]);
        assert_eq!(ids(featured(&products, 10)), vec![1, 3, 4]);
    }

    #[test]
    fn test_store_stats() {
        let order = |id: u64, total: i64| OrderData {
            order_id: OrderId(id),
            buyer: Principal::anonymous(),
            items: vec![],
            total: Money::from_cents(total),
            placed_at: Utc::now(),
        };
        let orders = vec![order(1, 2200), order(2, 800)];
        let stats = StoreStats::compute(&catalog(), &orders).unwrap();
        assert_eq!(stats.product_count, 4);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.revenue.cents(), 3000);
        assert_eq!(revenue(&[]).unwrap().cents(), 0);

        let huge = vec![order(1, i64::MAX), order(2, 1)];
        assert_eq!(revenue(&huge), Err(CoreError::AmountOverflow));
    }
}
