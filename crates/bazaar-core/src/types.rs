//! # Domain Types
//!
//! Core domain types shared by the client and the storefront pages.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Cart       │   │   OrderData     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (u64)       │   │  items          │   │  order_id       │       │
//! │  │  title          │   │   └ CartItem    │   │  buyer          │       │
//! │  │  price (cents)  │   │     product_id  │   │  items          │       │
//! │  │  stock          │   │     quantity    │   │   └ OrderItem   │       │
//! │  │  category name  │   └─────────────────┘   │  total          │       │
//! │  │  status         │                         │  placed_at      │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Principal     │   │  UserProfile    │   │    TaxRate      │       │
//! │  │  "2vxsx-fae"    │   │  name, email    │   │  bps (u32)      │       │
//! │  │  caller id      │   │  role           │   │  1000 = 10%     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The remote backend is the source of truth for all of these. The client
//! only reads them, caches them, and sends them back on writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{Money, Priced};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The storefront's flat sales tax: 10%.
    pub const DEFAULT: TaxRate = TaxRate(1000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::DEFAULT
    }
}

/// `1000` → `10%`, `825` → `8.25%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// Textual identity of a caller, as issued by the identity provider.
///
/// ## Format
/// Lowercase base32 (`a-z`, `2-7`) in dash-separated groups of five, the
/// last group may be shorter: `"2vxsx-fae"`, `"rrkah-fqaaa-aaaaa-aaaaq-cai"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// The identity of an unauthenticated caller.
    pub const ANONYMOUS: &'static str = "2vxsx-fae";

    /// Returns the anonymous principal.
    pub fn anonymous() -> Self {
        Principal(Self::ANONYMOUS.to_string())
    }

    /// True for the unauthenticated caller.
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "principal".to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "principal".to_string(),
            });
        }

        let groups: Vec<&str> = text.split('-').collect();
        let last = groups.len() - 1;
        for (i, group) in groups.iter().enumerate() {
            if group.is_empty() || group.len() > 5 || (i < last && group.len() != 5) {
                return Err(invalid("groups must be five characters separated by '-'"));
            }
            if !group
                .chars()
                .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c))
            {
                return Err(invalid("must contain only a-z and 2-7"));
            }
        }

        Ok(Principal(text.to_string()))
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Declares a `u64` identifier that parses from route parameters.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let text = s.trim();
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ValidationError::InvalidFormat {
                        field: $field.to_string(),
                        reason: "must be a non-negative integer".to_string(),
                    });
                }
                text.parse().map($name).map_err(|_| ValidationError::InvalidFormat {
                    field: $field.to_string(),
                    reason: "is too large".to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Backend-assigned product identifier.
    ProductId,
    "productId"
);
numeric_id!(
    /// Backend-assigned category identifier.
    CategoryId,
    "categoryId"
);
numeric_id!(
    /// Backend-assigned order identifier.
    OrderId,
    "orderId"
);

// =============================================================================
// Product
// =============================================================================

/// Moderation state of a product listing.
///
/// ```text
///   Draft ──► Pending ──┬──► Approved   (visible to customers)
///                       └──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
    Rejected,
    Draft,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::Pending,
        ProductStatus::Approved,
        ProductStatus::Rejected,
        ProductStatus::Draft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::Rejected => "rejected",
            ProductStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ProductStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

/// A product listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend-assigned id. Zero on create; the backend assigns the real one.
    pub id: ProductId,

    pub title: String,

    pub description: String,

    /// Price in cents.
    pub price: Money,

    /// Units available for checkout.
    pub stock: u64,

    /// Category *name*. Not checked against the category list.
    pub category: String,

    /// Image URL or asset reference.
    pub image: String,

    pub status: ProductStatus,
}

impl Product {
    /// Customer-facing listings only show approved products.
    #[inline]
    pub fn is_listed(&self) -> bool {
        self.status == ProductStatus::Approved
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: u64) -> bool {
        quantity <= self.stock
    }
}

/// A product category. Products reference it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

// =============================================================================
// Cart
// =============================================================================

/// One product line in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u64,
}

/// The caller's cart. Lines keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Quantity of `product_id` in the cart, zero when absent.
    pub fn quantity_of(&self, product_id: ProductId) -> u64 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A purchased line. `price` is the unit price at the moment of checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u64,
    pub price: Money,
}

impl Priced for OrderItem {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> u64 {
        self.quantity
    }
}

/// A completed order. Immutable once created by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub order_id: OrderId,
    pub buyer: Principal,
    pub items: Vec<OrderItem>,
    /// Σ price × quantity, computed by the backend at checkout.
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}

impl OrderData {
    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

// =============================================================================
// Users & Roles
// =============================================================================

/// Role assigned to a principal by the backend.
///
/// Used for UI gating only; the backend enforces permissions itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile saved by a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub role: UserRole,
    pub email: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_ten_percent() {
        assert_eq!(TaxRate::default().bps(), 1000);
        assert_eq!(TaxRate::DEFAULT.to_string(), "10%");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(TaxRate::from_bps(750).to_string(), "7.5%");
    }

    #[test]
    fn test_principal_parse() {
        let p: Principal = "rrkah-fqaaa-aaaaa-aaaaq-cai".parse().unwrap();
        assert_eq!(p.as_str(), "rrkah-fqaaa-aaaaa-aaaaq-cai");
        assert!(!p.is_anonymous());

        assert!(Principal::anonymous().is_anonymous());
        assert!(" 2vxsx-fae ".parse::<Principal>().unwrap().is_anonymous());
    }

    #[test]
    fn test_principal_rejects_malformed() {
        assert!("".parse::<Principal>().is_err());
        assert!("abc-defgh".parse::<Principal>().is_err());
        assert!("abcde--fgh".parse::<Principal>().is_err());
        assert!("ABCDE-fgh".parse::<Principal>().is_err());
        assert!("abcd1-fgh".parse::<Principal>().is_err());
        assert!("abcdef".parse::<Principal>().is_err());
    }

    #[test]
    fn test_principal_serde_validates() {
        let json = serde_json::to_string(&Principal::anonymous()).unwrap();
        assert_eq!(json, "\"2vxsx-fae\"");
        assert!(serde_json::from_str::<Principal>("\"not a principal\"").is_err());
    }

    #[test]
    fn test_ids_parse_from_route_params() {
        assert_eq!("42".parse::<ProductId>().unwrap(), ProductId(42));
        assert_eq!(" 7 ".parse::<OrderId>().unwrap(), OrderId(7));
        assert!("".parse::<ProductId>().is_err());
        assert!("-1".parse::<ProductId>().is_err());
        assert!("12abc".parse::<CategoryId>().is_err());
        assert!("99999999999999999999999".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_product_status_round_trip_text() {
        for status in ProductStatus::ALL {
            assert_eq!(status.as_str().parse::<ProductStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_cart_counts() {
        let cart = Cart {
            items: vec![
                CartItem {
                    product_id: ProductId(1),
                    quantity: 2,
                },
                CartItem {
                    product_id: ProductId(2),
                    quantity: 3,
                },
            ],
        };
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.quantity_of(ProductId(2)), 3);
        assert_eq!(cart.quantity_of(ProductId(9)), 0);
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: ProductId(1),
            title: "Lamp".to_string(),
            description: String::new(),
            price: Money::from_cents(2500),
            stock: 0,
            category: "Home".to_string(),
            image: String::new(),
            status: ProductStatus::Approved,
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["price"], 2500);
        assert_eq!(value["status"], "approved");
        assert!(product.is_listed());
        assert!(!product.in_stock());
    }
}
