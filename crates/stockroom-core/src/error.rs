//! # Errors
//!
//! What can go wrong inside the pure layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError   a field of a product, sale or pricing config is bad  │
//! │        │ #[from]                                                        │
//! │        ▼                                                                │
//! │  CoreError         a ledger mutation cannot go through                  │
//! │        │ #[from]                                                        │
//! │        ▼                                                                │
//! │  DbError           (stockroom-db) storage, spreadsheet, config          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculators never fail: missing or malformed numbers are treated as
//! zero. Only the ledger mutation path and the sale transaction surface errors.

use thiserror::Error;

/// A sale or catalog change was refused.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id in the catalog snapshot.
    #[error("no product with id {0}")]
    ProductNotFound(String),

    /// Selling more units than are on hand. Nothing is written.
    ///
    /// ```text
    /// sell(MOCH001, 5) with quantity 3
    ///      └─► InsufficientStock { sku: "MOCH001", available: 3, requested: 5 }
    /// ```
    #[error("cannot sell {requested} of {sku}, only {available} in stock")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// A single field failed its check. `field` is the user-facing field name.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} cannot be blank")]
    Required { field: String },

    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must lie in {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} accepts only {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;
