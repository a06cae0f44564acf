//! # Pages
//!
//! One module per screen. Loaders take the app state explicitly and return a
//! serializable view or an [`ApiError`](crate::error::ApiError); actions
//! return a [`Notice`](bazaar_client::Notice).
//!
//! - [`catalog`] - Home, product list, product detail, add to cart
//! - [`cart`] - Cart lines, quantity updates, removal
//! - [`checkout`] - Shipping form and order placement
//! - [`orders`] - Order history and order confirmation
//! - [`admin`] - Dashboard, product table and form, categories
//! - [`account`] - Profile setup and admin login

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use bazaar_client::Notice;
use bazaar_core::money::Priced;
use bazaar_core::{CoreResult, Money, PriceBreakdown, Product, ProductId};
use serde::Serialize;

use crate::routes::Route;
use crate::state::ConfigState;

/// Result of a form submission: a notice, and where to go on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub notice: Notice,
    pub redirect: Option<Route>,
}

impl Outcome {
    pub fn done(notice: Notice, redirect: Route) -> Self {
        Outcome {
            notice,
            redirect: Some(redirect),
        }
    }

    pub fn failed(notice: Notice) -> Self {
        Outcome {
            notice,
            redirect: None,
        }
    }
}

/// "1 item" / "3 items".
pub fn item_label(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", count)
    }
}

/// Subtotal, tax and total rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownView {
    pub subtotal: String,
    pub tax_label: String,
    pub tax: String,
    pub total: String,
    pub total_cents: i64,
}

impl BreakdownView {
    pub fn new(breakdown: &PriceBreakdown, config: &ConfigState) -> Self {
        BreakdownView {
            subtotal: config.format_currency(breakdown.subtotal),
            tax_label: config.tax_label(),
            tax: config.format_currency(breakdown.tax),
            total: config.format_currency(breakdown.total),
            total_cents: breakdown.total.cents(),
        }
    }
}

/// A priced line joined with the catalog.
///
/// A product missing from the catalog shows as `Product #id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub quantity: u64,
    pub unit_price: String,
    pub line_total: String,
}

impl LineView {
    pub fn new<L: Priced>(
        product_id: ProductId,
        line: &L,
        product: Option<&Product>,
        config: &ConfigState,
    ) -> CoreResult<Self> {
        Ok(LineView {
            product_id,
            title: product
                .map(|p| p.title.clone())
                .unwrap_or_else(|| format!("Product #{}", product_id)),
            image: product
                .map(|p| p.image.clone())
                .filter(|image| !image.is_empty()),
            quantity: line.quantity(),
            unit_price: config.format_currency(line.unit_price()),
            line_total: config.format_currency(line.line_total()?),
        })
    }
}

/// Looks a product up in an already fetched catalog.
pub(crate) fn find_product(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

/// Current catalog price, zero when the product is gone.
pub(crate) fn current_price(products: &[Product], id: ProductId) -> Money {
    find_product(products, id)
        .map(|p| p.price)
        .unwrap_or_else(Money::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_label() {
        assert_eq!(item_label(0), "0 items");
        assert_eq!(item_label(1), "1 item");
        assert_eq!(item_label(4), "4 items");
    }
}
