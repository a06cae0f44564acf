//! # Cart Page
//!
//! Cart lines joined with the catalog, the price breakdown, and the
//! quantity stepper.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  Desk Lamp                 $34.50   [-] 2 [+]   [x]   $69.00   │
//! │  Product #41               $0.00    [-] 1 [+]   [x]    $0.00   │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Subtotal (2 items)                                   $69.00   │
//! │  Tax (10%)                                             $6.90   │
//! │  Total                                                $75.90   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are priced at the catalog's current price. A product that is no
//! longer in the catalog is priced at zero.

use bazaar_client::Notice;
use bazaar_core::money::PricedLine;
use bazaar_core::{Cart, CoreResult, PriceBreakdown, ProductId};
use serde::Serialize;
use tracing::warn;

use super::{current_price, find_product, item_label, BreakdownView, LineView};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<LineView>,
    /// "Subtotal (2 items)": counts lines, not units.
    pub item_label: String,
    pub breakdown: BreakdownView,
    pub is_empty: bool,
}

/// The caller's cart priced against the current catalog.
pub(crate) struct PricedCart {
    pub lines: Vec<LineView>,
    pub breakdown: PriceBreakdown,
}

pub(crate) async fn price_cart(state: &AppState) -> Result<PricedCart, ApiError> {
    let cart: Cart = state.client.cart().await?.unwrap_or_default();
    let products = state.client.products().await?;

    let priced: Vec<(ProductId, PricedLine)> = cart
        .items
        .iter()
        .map(|item| {
            let price = current_price(&products, item.product_id);
            (item.product_id, PricedLine::new(price, item.quantity))
        })
        .collect();

    let lines = priced
        .iter()
        .map(|(id, line)| LineView::new(*id, line, find_product(&products, *id), &state.config))
        .collect::<CoreResult<Vec<_>>>()?;
    let bare: Vec<PricedLine> = priced.into_iter().map(|(_, line)| line).collect();

    Ok(PricedCart {
        lines,
        breakdown: PriceBreakdown::for_lines(&bare, state.config.tax_rate)?,
    })
}

pub async fn view(state: &AppState) -> Result<CartView, ApiError> {
    let PricedCart { lines, breakdown } = price_cart(state).await?;
    Ok(CartView {
        item_label: format!("Subtotal ({})", item_label(lines.len())),
        is_empty: lines.is_empty(),
        lines,
        breakdown: BreakdownView::new(&breakdown, &state.config),
    })
}

/// Quantity stepper. Values below one are ignored without a call.
///
/// Returns a notice only on failure.
pub async fn update_quantity(state: &AppState, id: ProductId, quantity: i64) -> Option<Notice> {
    if quantity < 1 {
        return None;
    }
    match state.client.update_cart_item(id, quantity).await {
        Ok(()) => None,
        Err(err) => {
            warn!(product_id = %id, error = %err, "Quantity update failed");
            Some(Notice::error("Failed to update quantity"))
        }
    }
}

pub async fn remove(state: &AppState, id: ProductId) -> Notice {
    match state.client.remove_from_cart(id).await {
        Ok(()) => Notice::success("Item removed from cart"),
        Err(err) => {
            warn!(product_id = %id, error = %err, "Remove from cart failed");
            Notice::error("Failed to remove item")
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::pages::checkout;
    use crate::testing::{admin, demo_state, shopper};
    use bazaar_core::forms::ProductDraft;

    #[tokio::test]
    async fn test_empty_cart() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;

        let view = view(&state).await.unwrap();
        assert!(view.is_empty);
        assert_eq!(view.item_label, "Subtotal (0 items)");
        assert_eq!(view.breakdown.total, "$0.00");
    }

    #[tokio::test]
    async fn test_lines_and_breakdown() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(3), 2).await.unwrap();
        state.client.add_to_cart(ProductId(2), 1).await.unwrap();

        let view = view(&state).await.unwrap();
        assert_eq!(view.item_label, "Subtotal (2 items)");
        assert_eq!(view.lines[0].title, "Desk Lamp");
        assert_eq!(view.lines[0].line_total, "$69.00");
        // 6900 + 2999 = 9899; tax 990 (989.9 rounded half up)
        assert_eq!(view.breakdown.subtotal, "$98.99");
        assert_eq!(view.breakdown.tax, "$9.90");
        assert_eq!(view.breakdown.total, "$108.89");
    }

    #[tokio::test]
    async fn test_overflowing_total_is_an_error_page() {
        let state = demo_state(vec![]);
        admin(&state).await;
        let draft = ProductDraft {
            title: "Private Island".to_string(),
            price: "50000000000000000".to_string(),
            stock: "10".to_string(),
            category: "Home".to_string(),
            ..ProductDraft::default()
        };
        state.client.create_product(&draft).await.unwrap();

        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(7), 2).await.unwrap();

        let err = view(&state).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Amount is too large");
        assert!(checkout::view(&state).await.is_err());

        // One unit still prices.
        state.client.update_cart_item(ProductId(7), 1).await.unwrap();
        let view = view(&state).await.unwrap();
        assert_eq!(view.lines[0].line_total, "$50000000000000000.00");
    }

    #[tokio::test]
    async fn test_deleted_product_shows_placeholder() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(5), 1).await.unwrap();
        state.client.bootstrap_owner_admin().await.unwrap();
        state.client.delete_product(ProductId(5)).await.unwrap();

        let view = view(&state).await.unwrap();
        assert_eq!(view.lines[0].title, "Product #5");
        assert_eq!(view.lines[0].unit_price, "$0.00");
        assert_eq!(view.lines[0].image, None);
    }

    #[tokio::test]
    async fn test_quantity_below_one_is_ignored() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(1), 2).await.unwrap();

        assert_eq!(update_quantity(&state, ProductId(1), 0).await, None);
        let cart = state.client.cart().await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(ProductId(1)), 2);

        assert_eq!(update_quantity(&state, ProductId(1), 4).await, None);
        let cart = state.client.cart().await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(ProductId(1)), 4);

        let notice = update_quantity(&state, ProductId(3), 4).await.unwrap();
        assert_eq!(notice.message, "Failed to update quantity");
    }

    #[tokio::test]
    async fn test_remove() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(1), 1).await.unwrap();

        assert_eq!(
            remove(&state, ProductId(1)).await,
            Notice::success("Item removed from cart")
        );
        assert!(view(&state).await.unwrap().is_empty);
    }
}
