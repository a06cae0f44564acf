//! # Forms
//!
//! Raw form input from the storefront and the checks that turn it into
//! domain values.
//!
//! ```text
//! Admin product form ── ProductDraft ──validate──► Product ──► create/update
//! Checkout form ─────── ShippingAddress ──validate──► (stays client-side)
//! Profile setup ─────── ProfileDraft ──validate──► UserProfile ──► save
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{format_price, Money};
use crate::types::{Product, ProductId, ProductStatus, UserProfile, UserRole};
use crate::validation::{
    parse_stock, validate_category_name, validate_description, validate_email,
    validate_required, validate_title, ValidationResult,
};

// =============================================================================
// Product Draft
// =============================================================================

/// The admin product form as typed.
///
/// `price` is in dollars ("12.99"), `stock` is free text (blank means 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
    pub image: String,
    pub status: ProductStatus,
}

impl Default for ProductDraft {
    /// An empty form. New products default to approved.
    fn default() -> Self {
        ProductDraft {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            stock: String::new(),
            category: String::new(),
            image: String::new(),
            status: ProductStatus::Approved,
        }
    }
}

impl ProductDraft {
    /// Prefills the form from an existing product (edit page).
    pub fn from_product(product: &Product) -> Self {
        ProductDraft {
            title: product.title.clone(),
            description: product.description.clone(),
            price: format_price(product.price.cents()),
            stock: product.stock.to_string(),
            category: product.category.clone(),
            image: product.image.clone(),
            status: product.status,
        }
    }

    /// Validates the form into a product carrying `id`.
    ///
    /// Pass `ProductId(0)` when creating; the backend assigns the id.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::forms::ProductDraft;
    /// use bazaar_core::types::ProductId;
    ///
    /// let draft = ProductDraft {
    ///     title: "Desk Lamp".into(),
    ///     price: "24.50".into(),
    ///     category: "Home".into(),
    ///     ..ProductDraft::default()
    /// };
    /// let product = draft.validate(ProductId(0)).unwrap();
    /// assert_eq!(product.price.cents(), 2450);
    /// assert_eq!(product.stock, 0);
    /// ```
    pub fn validate(&self, id: ProductId) -> ValidationResult<Product> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_category_name(&self.category)?;
        let price: Money = Money::from_major_str(&self.price)?;
        let stock = parse_stock(&self.stock)?;

        Ok(Product {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            stock,
            category: self.category.trim().to_string(),
            image: self.image.trim().to_string(),
            status: self.status,
        })
    }
}

// =============================================================================
// Shipping Address
// =============================================================================

/// Checkout shipping form.
///
/// Collected for the buyer's confirmation only. It is not sent with the
/// checkout call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    /// Full name, first address line and city are required.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("fullName", &self.full_name)?;
        validate_required("addressLine1", &self.address_line1)?;
        validate_required("city", &self.city)?;
        Ok(())
    }
}

// =============================================================================
// Profile Draft
// =============================================================================

/// Profile setup form shown to a signed-in user without a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
}

impl ProfileDraft {
    /// Validates into a profile with the `user` role.
    pub fn validate(&self) -> Result<UserProfile, ValidationError> {
        let name = validate_required("name", &self.name)?;
        validate_email(&self.email)?;
        Ok(UserProfile {
            name: name.to_string(),
            role: UserRole::User,
            email: self.email.trim().to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
