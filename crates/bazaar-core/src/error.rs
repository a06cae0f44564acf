//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Marketplace rule violations                    │
//! │  └── ValidationError  - Form and route parameter failures              │
//! │                                                                         │
//! │  bazaar-client errors (separate crate)                                 │
//! │  └── ClientError      - Backend calls, session, configuration          │
//! │                                                                         │
//! │  Storefront errors (in app)                                            │
//! │  └── ApiError         - What a page shows (serialized)                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → ApiError → Page     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name)
//! 3. Errors are enum variants, never String
//! 4. Messages match what the marketplace backend reports, so the client
//!    can classify either by the same text

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Marketplace rule violations.
///
/// The in-memory backend reports these through their `Display` text, which
/// is the same wording the remote service uses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Caller lacks the role an operation requires.
    ///
    /// ## User Workflow
    /// ```text
    /// Customer opens /admin/products/new and submits
    ///      │
    ///      ▼
    /// create_product ──► Unauthorized("Only admins can create products")
    ///      │
    ///      ▼
    /// Notice: "You do not have permission to create product"
    /// ```
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    /// Category id does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(u64),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    /// No saved profile carries this email.
    #[error("No user profile found for email {0}")]
    ProfileNotFound(String),

    /// Checkout would sell more units than are in stock.
    #[error("Insufficient stock for {title}: available {available}, requested {requested}")]
    InsufficientStock {
        title: String,
        available: u64,
        requested: u64,
    },

    /// Checkout was called with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line total, subtotal or order total does not fit in `i64` cents.
    #[error("Amount is too large")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a backend call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (malformed id, email, price text).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            title: "Desk Lamp".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Desk Lamp: available 3, requested 5"
        );

        let err = CoreError::Unauthorized("Only admins can create products".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Only admins can create products");

        let err = CoreError::ProfileNotFound("a@b.co".to_string());
        assert_eq!(err.to_string(), "No user profile found for email a@b.co");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "fullName".to_string(),
        };
        assert_eq!(err.to_string(), "fullName is required");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "title must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
