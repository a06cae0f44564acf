//! # API Error Type
//!
//! Unified error type for page loaders.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Page loader: Result<View, ApiError>                                    │
//! │         │                                                               │
//! │         ├── ValidationError ─────────────► VALIDATION_ERROR             │
//! │         ├── CoreError ──── by variant ───► NOT_FOUND / UNAUTHORIZED ... │
//! │         └── ClientError                                                 │
//! │               ├── NotSignedIn ───────────► UNAUTHORIZED                 │
//! │               ├── NotFound ──────────────► NOT_FOUND                    │
//! │               ├── Remote(msg) ── by text ► UNAUTHORIZED / NOT_FOUND /   │
//! │               │                            VALIDATION_ERROR /           │
//! │               │                            REMOTE_ERROR                 │
//! │               └── Config / Internal ─────► INTERNAL (logged)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations do not use this type; they report a `Notice` instead.

use bazaar_client::error::ErrorClass;
use bazaar_client::ClientError;
use bazaar_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// API error returned from page loaders.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for page responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown route or missing entity (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Sign-in required or role insufficient (403)
    Unauthorized,

    /// The backend rejected the call
    RemoteError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id.to_string()),
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", &id.to_string()),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id.to_string()),
            CoreError::ProfileNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Unauthorized(_) => ApiError::unauthorized(err.to_string()),
            CoreError::InsufficientStock { .. } | CoreError::EmptyCart => {
                ApiError::new(ErrorCode::RemoteError, err.to_string())
            }
            CoreError::AmountOverflow => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(e) => e.into(),
            ClientError::NotSignedIn => ApiError::unauthorized("Please sign in to continue"),
            ClientError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            ClientError::Remote(ref message) => {
                let code = match err.class() {
                    ErrorClass::Authorization => ErrorCode::Unauthorized,
                    ErrorClass::NotFound => ErrorCode::NotFound,
                    ErrorClass::Validation => ErrorCode::ValidationError,
                    ErrorClass::Generic => ErrorCode::RemoteError,
                };
                ApiError::new(code, message.clone())
            }
            ClientError::Config(_) | ClientError::Internal(_) => {
                tracing::error!(error = %err, "Internal client failure");
                ApiError::internal("Something went wrong")
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
