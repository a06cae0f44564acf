//! # Checkout Page
//!
//! Shipping form, order summary, and order placement.
//!
//! ## Place Order Flow
//! ```text
//! ShippingAddress::validate ──✗──► "Please fill in all required shipping fields"
//!          │ ✓
//!          ▼
//! cart empty? ──yes──► "Your cart is empty"
//!          │ no
//!          ▼
//! client.checkout() ──✗──► remote message (e.g. "Cart is empty",
//!          │ ✓                              "Insufficient stock for ...")
//!          ▼
//! "Order placed successfully!" + redirect to /order/{id}
//! ```
//!
//! The address is only checked for completeness; it is not sent with the
//! order.

use bazaar_client::Notice;
use bazaar_core::forms::ShippingAddress;
use serde::Serialize;
use tracing::{info, warn};

use super::cart::{price_cart, PricedCart};
use super::{BreakdownView, LineView, Outcome};
use crate::error::ApiError;
use crate::routes::Route;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub lines: Vec<LineView>,
    pub breakdown: BreakdownView,
    pub is_empty: bool,
}

pub async fn view(state: &AppState) -> Result<CheckoutView, ApiError> {
    let PricedCart { lines, breakdown } = price_cart(state).await?;
    Ok(CheckoutView {
        is_empty: lines.is_empty(),
        lines,
        breakdown: BreakdownView::new(&breakdown, &state.config),
    })
}

pub async fn place_order(state: &AppState, address: &ShippingAddress) -> Outcome {
    if let Err(err) = address.validate() {
        warn!(error = %err, "Shipping form incomplete");
        return Outcome::failed(Notice::error(
            "Please fill in all required shipping fields",
        ));
    }

    match state.client.cart().await {
        Ok(Some(cart)) if !cart.is_empty() => {}
        Ok(_) => return Outcome::failed(Notice::error("Your cart is empty")),
        Err(err) => return Outcome::failed(err.notice("place order")),
    }

    match state.client.checkout().await {
        Ok(order_id) => {
            info!(order_id = %order_id, "Checkout complete");
            Outcome::done(
                Notice::success("Order placed successfully!"),
                Route::OrderConfirmation(order_id),
            )
        }
        Err(err) => Outcome::failed(err.notice("place order")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
