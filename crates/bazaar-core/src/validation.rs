//! # Validation Module
//!
//! Field validators shared by the storefront forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Route params                                                 │
//! │  └── ProductId / OrderId FromStr (malformed ids never reach a call)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Forms (THIS MODULE + forms.rs)                               │
//! │  ├── Required fields, lengths, email shape                             │
//! │  └── Caught before the backend is called                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative: permissions, stock, existence                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_quantity, validate_title};
//!
//! assert!(validate_title("Desk Lamp").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_SEARCH_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product title.
pub const MAX_TITLE_LEN: usize = 200;

/// Longest accepted product description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Longest accepted category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Most units of one product a single cart line can hold.
pub const MAX_QUANTITY: u64 = 10_000;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a trimmed field is present, returning the trimmed text.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_required;
///
/// assert_eq!(validate_required("city", "  Lisbon ").unwrap(), "Lisbon");
/// assert!(validate_required("city", "   ").is_err());
/// ```
pub fn validate_required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = validate_required("title", title)?;
    validate_max_len("title", title, MAX_TITLE_LEN)
}

/// Validates a product description. May be empty.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_max_len("description", description.trim(), MAX_DESCRIPTION_LEN)
}

/// Validates a category name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = validate_required("category", name)?;
    validate_max_len("category", name, MAX_CATEGORY_NAME_LEN)
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a
/// domain containing a dot that neither starts nor ends it.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_email;
///
/// assert!(validate_email("owner@shop.example").is_ok());
/// assert!(validate_email("owner@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = validate_required("email", email)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Normalizes a catalog search query.
///
/// ## Rules
/// - Trimmed and lowercased (matching is case-insensitive)
/// - At most 100 characters
/// - Empty is allowed and means "no filter"
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    validate_max_len("query", query, MAX_SEARCH_QUERY_LEN)?;
    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1
/// - At most [`MAX_QUANTITY`]
///
/// Takes `i64` because quantities arrive from form steppers that can go
/// below one.
pub fn validate_quantity(qty: i64) -> ValidationResult<u64> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    match u64::try_from(qty) {
        Ok(qty) if qty <= MAX_QUANTITY => Ok(qty),
        _ => Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY as i64,
        }),
    }
}

/// Parses a stock count typed into the product form. Blank means zero.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::parse_stock;
///
/// assert_eq!(parse_stock("").unwrap(), 0);
/// assert_eq!(parse_stock(" 12 ").unwrap(), 12);
/// assert!(parse_stock("-3").is_err());
/// ```
pub fn parse_stock(text: &str) -> ValidationResult<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "stock".to_string(),
        reason: "must be a whole number of units".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Desk Lamp").is_ok());
        assert!(matches!(
            validate_title("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_title(&"x".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_validate_description_allows_empty() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"y".repeat(5001)).is_err());
    }

    #[test]
    fn test_validate_category_name() {
        assert!(validate_category_name("Electronics").is_ok());
        assert!(validate_category_name("").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@shop.example").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@shop.example").is_err());
        assert!(validate_email("a@b@c.example").is_err());
        assert!(validate_email("a@.example").is_err());
        assert!(validate_email("a@example.").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Lamp ").unwrap(), "lamp");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert_eq!(validate_quantity(40).unwrap(), 40);
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
    }

    #[test]
    fn test_validate_quantity_upper_bound() {
        assert_eq!(validate_quantity(10_000).unwrap(), MAX_QUANTITY);
        for qty in [10_001, i64::MAX] {
            assert!(matches!(
                validate_quantity(qty),
                Err(ValidationError::OutOfRange { min: 1, max: 10_000, .. })
            ));
        }
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("").unwrap(), 0);
        assert_eq!(parse_stock("5").unwrap(), 5);
        assert!(parse_stock("five").is_err());
        assert!(parse_stock("2.5").is_err());
    }
}
