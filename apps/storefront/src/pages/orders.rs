//! # Orders Pages
//!
//! Order history and the confirmation page shown after checkout.
//!
//! Order lines are priced at what the buyer paid, not the current catalog
//! price. Titles and images still come from the catalog.

use bazaar_core::{CoreResult, OrderData, OrderId, Product, ORDER_PREVIEW_ITEMS};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{find_product, item_label, LineView};
use crate::error::ApiError;
use crate::state::{AppState, ConfigState};

fn placed_label(placed_at: &DateTime<Utc>) -> String {
    placed_at.format("%B %-d, %Y").to_string()
}

// =============================================================================
// Order History
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPreview {
    pub title: String,
    pub image: Option<String>,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryView {
    pub order_id: OrderId,
    pub placed_on: String,
    pub item_label: String,
    pub total: String,
    pub previews: Vec<ItemPreview>,
    /// "+2 more items" when the order has more lines than previews.
    pub more_label: Option<String>,
}

impl OrderSummaryView {
    fn new(order: &OrderData, products: &[Product], config: &ConfigState) -> CoreResult<Self> {
        let previews = order
            .items
            .iter()
            .take(ORDER_PREVIEW_ITEMS)
            .map(|item| {
                let line = LineView::new(
                    item.product_id,
                    item,
                    find_product(products, item.product_id),
                    config,
                )?;
                Ok(ItemPreview {
                    title: line.title,
                    image: line.image,
                    quantity: item.quantity,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let hidden = order.items.len().saturating_sub(ORDER_PREVIEW_ITEMS);
        Ok(OrderSummaryView {
            order_id: order.order_id,
            placed_on: placed_label(&order.placed_at),
            item_label: item_label(order.items.len()),
            total: config.format_currency(order.total),
            previews,
            more_label: (hidden > 0).then(|| format!("+{} more", item_label(hidden))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersView {
    pub orders: Vec<OrderSummaryView>,
    pub is_empty: bool,
}

/// The caller's orders, newest first.
pub async fn history(state: &AppState) -> Result<OrdersView, ApiError> {
    let mut orders = state.client.orders().await?;
    let products = state.client.products().await?;
    orders.sort_by(|a, b| b.order_id.cmp(&a.order_id));

    Ok(OrdersView {
        is_empty: orders.is_empty(),
        orders: orders
            .iter()
            .map(|order| OrderSummaryView::new(order, &products, &state.config))
            .collect::<CoreResult<Vec<_>>>()?,
    })
}

// =============================================================================
// Order Confirmation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmationView {
    pub order_id: OrderId,
    pub placed_on: String,
    pub lines: Vec<LineView>,
    pub total: String,
}

pub async fn confirmation(
    state: &AppState,
    id: OrderId,
) -> Result<OrderConfirmationView, ApiError> {
    let order = state
        .client
        .order(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id.to_string()))?;
    let products = state.client.products().await?;

    Ok(OrderConfirmationView {
        order_id: order.order_id,
        placed_on: placed_label(&order.placed_at),
        lines: order
            .items
            .iter()
            .map(|item| {
                LineView::new(
                    item.product_id,
                    item,
                    find_product(&products, item.product_id),
                    &state.config,
                )
            })
            .collect::<CoreResult<Vec<_>>>()?,
        total: state.config.format_currency(order.total),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{demo_state, shopper};
    use bazaar_core::ProductId;

    #[tokio::test]
    async fn test_no_orders() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        assert!(history(&state).await.unwrap().is_empty);
    }

    #[tokio::test]
    async fn test_previews_and_more_label() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        for id in [1, 2, 3, 5] {
            state.client.add_to_cart(ProductId(id), 1).await.unwrap();
        }
        state.client.checkout().await.unwrap();

        let view = history(&state).await.unwrap();
        let order = &view.orders[0];
        assert_eq!(order.item_label, "4 items");
        assert_eq!(order.previews.len(), 3);
        assert_eq!(order.more_label.as_deref(), Some("+1 more item"));
        // 8999 + 2999 + 3450 + 3900
        assert_eq!(order.total, "$193.48");
    }

    #[tokio::test]
    async fn test_confirmation_uses_price_at_purchase() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        state.client.add_to_cart(ProductId(3), 2).await.unwrap();
        let order_id = state.client.checkout().await.unwrap();

        state.client.bootstrap_owner_admin().await.unwrap();
        let mut draft = bazaar_core::forms::ProductDraft::from_product(
            &state.client.product(ProductId(3)).await.unwrap().unwrap(),
        );
        draft.price = "99.00".to_string();
        state.client.update_product(ProductId(3), &draft).await.unwrap();

        let view = confirmation(&state, order_id).await.unwrap();
        assert_eq!(view.lines[0].title, "Desk Lamp");
        assert_eq!(view.lines[0].unit_price, "$34.50");
        assert_eq!(view.lines[0].line_total, "$69.00");
        assert_eq!(view.total, "$69.00");
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        let err = confirmation(&state, OrderId(42)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
