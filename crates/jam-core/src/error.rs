//! # AppError
//!
//! Centralized error handling for the Jam Session ecosystem.
//! Maps domain-specific failures to actionable error types; the API layer
//! translates these into HTTP status codes.

use thiserror::Error;

/// The primary error type for all jam-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Review, Profile)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., missing field, rating out of range)
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (e.g., editing someone else's review)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., store unreachable, blob write failed)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Jam Session logic.
pub type Result<T> = std::result::Result<T, AppError>;
