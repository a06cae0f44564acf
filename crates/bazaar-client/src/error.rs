//! # Client Error Types
//!
//! Errors from the data access layer, and the notices pages show for them.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Before call   │  │   Remote        │  │   Local                 │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Remote(msg)    │  │  Config                 │ │
//! │  │  NotSignedIn    │  │                 │  │  NotFound  Internal     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Remote messages are classified by text:                               │
//! │    "Unauthorized" / "Not authorized"  → permission notice              │
//! │    "No user profile found"            → setup guidance                 │
//! │    anything else                      → message verbatim               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ClientError` is `Clone` because the query cache hands the same failure
//! to every caller waiting on a deduplicated read.

use bazaar_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Guidance shown when an admin grant names an email with no profile.
pub const NO_PROFILE_GUIDANCE: &str = "No user found with that email. The target user must sign in and complete profile setup with this email address before they can be granted admin privileges.";

// =============================================================================
// Client Error
// =============================================================================

/// Client error type covering every data access failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Input rejected before the backend was called.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend rejected the call.
    #[error("{0}")]
    Remote(String),

    /// The operation needs a signed-in identity.
    #[error("Not signed in")]
    NotSignedIn,

    /// A read found nothing for an id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// A cached entry did not hold the value its key promises.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        ClientError::Remote(err.message)
    }
}

/// How a failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authorization,
    Validation,
    NotFound,
    Generic,
}

impl ClientError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        ClientError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Classifies the failure. Remote failures are classified by message text.
    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Validation(_) => ErrorClass::Validation,
            ClientError::NotSignedIn => ErrorClass::Authorization,
            ClientError::NotFound { .. } => ErrorClass::NotFound,
            ClientError::Config(_) | ClientError::Internal(_) => ErrorClass::Generic,
            ClientError::Remote(message) => {
                if message.contains("Unauthorized") || message.contains("Not authorized") {
                    ErrorClass::Authorization
                } else if message.contains("No user profile found") {
                    ErrorClass::NotFound
                } else if message.contains("Validation error") || message.contains("Invalid") {
                    ErrorClass::Validation
                } else {
                    ErrorClass::Generic
                }
            }
        }
    }

    /// The transient notice a page shows when `action` fails.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_client::ClientError;
    ///
    /// let err = ClientError::Remote("Unauthorized: Only admins can add admins".into());
    /// assert_eq!(
    ///     err.notice("grant admin access").message,
    ///     "You do not have permission to grant admin access"
    /// );
    /// ```
    pub fn notice(&self, action: &str) -> Notice {
        let message = match (self, self.class()) {
            (ClientError::NotSignedIn, _) => format!("Please sign in to {}", action),
            (_, ErrorClass::Authorization) => {
                format!("You do not have permission to {}", action)
            }
            (ClientError::Remote(_), ErrorClass::NotFound) => NO_PROFILE_GUIDANCE.to_string(),
            (ClientError::Remote(message), _) if !message.trim().is_empty() => message.clone(),
            (ClientError::Remote(_), _)
            | (ClientError::Config(_), _)
            | (ClientError::Internal(_), _) => {
                format!("Failed to {}", action)
            }
            (other, _) => other.to_string(),
        };
        Notice::error(message)
    }
}

// =============================================================================
// Notices
// =============================================================================

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message shown after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_becomes_remote() {
        let err: ClientError = BackendError::new("Cart is empty").into();
        assert_eq!(err, ClientError::Remote("Cart is empty".to_string()));
    }

    #[test]
    fn test_classification() {
        let remote = |m: &str| ClientError::Remote(m.to_string());
        assert_eq!(
            remote("Unauthorized: Only admins can create products").class(),
            ErrorClass::Authorization
        );
        assert_eq!(remote("Not authorized").class(), ErrorClass::Authorization);
        assert_eq!(
            remote("No user profile found for email x@y.z").class(),
            ErrorClass::NotFound
        );
        assert_eq!(remote("Cart is empty").class(), ErrorClass::Generic);
        assert_eq!(ClientError::NotSignedIn.class(), ErrorClass::Authorization);
    }

    #[test]
    fn test_notice_texts() {
        assert_eq!(
            ClientError::Remote("Unauthorized: nope".into())
                .notice("grant admin access")
                .message,
            "You do not have permission to grant admin access"
        );
        assert_eq!(
            ClientError::Remote("No user profile found for email a@b.co".into())
                .notice("grant admin access")
                .message,
            NO_PROFILE_GUIDANCE
        );
        assert_eq!(
            ClientError::Remote("Cart is empty".into())
                .notice("place order")
                .message,
            "Cart is empty"
        );
        assert_eq!(
            ClientError::Remote(String::new()).notice("place order").message,
            "Failed to place order"
        );
        assert_eq!(
            ClientError::NotSignedIn.notice("add items to cart").message,
            "Please sign in to add items to cart"
        );
    }

    #[test]
    fn test_validation_notice_is_verbatim() {
        let err: ClientError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        let notice = err.notice("grant admin access");
        assert!(notice.is_error());
        assert_eq!(notice.message, "email is required");
    }
}
