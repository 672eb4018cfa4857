//! # Storage Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx / serde_json / csv / toml / io          CoreError (stockroom-core)│
//! │          │                                           │                  │
//! │          ▼                                           ▼                  │
//! │      DbError::{Open, Schema, Sqlite, ...}      DbError::Core            │
//! │      "the store is broken"                     "the sale was refused"   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`DbError::is_rejection`] tells the two apart: a rejection leaves the
//! catalog and ledger untouched and can be shown to the operator as is.

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    #[error("cannot open ledger database: {0}")]
    Open(String),

    #[error("schema migration failed: {0}")]
    Schema(String),

    #[error("sqlite: {0}")]
    Sqlite(String),

    /// A multi-key write was rolled back.
    #[error("ledger write not committed: {0}")]
    Commit(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("ledger database busy")]
    PoolBusy,

    /// A stored value is not the JSON we wrote, or a value could not be encoded.
    #[error("stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// Unbalanced quotes, invalid UTF-8 or a missing header row.
    #[error("spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot read configuration: {0}")]
    ConfigRead(String),

    #[error("cannot write configuration: {0}")]
    ConfigWrite(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The operation was refused: unknown product, short stock, bad input.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DbError {
    /// True for business refusals, false for storage failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, DbError::Core(_))
    }
}

/// ```text
/// Database(e)    → Sqlite(e.message())
/// PoolTimedOut   → PoolBusy
/// PoolClosed     → Open("pool closed")
/// anything else  → Sqlite(display text)
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) => DbError::Sqlite(e.message().to_owned()),
            sqlx::Error::PoolTimedOut => DbError::PoolBusy,
            sqlx::Error::PoolClosed => DbError::Open("pool closed".into()),
            other => DbError::Sqlite(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Schema(err.to_string())
    }
}

impl From<csv::Error> for DbError {
    fn from(err: csv::Error) -> Self {
        DbError::Spreadsheet(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::ConfigRead(err.to_string())
    }
}

impl From<toml::ser::Error> for DbError {
    fn from(err: toml::ser::Error) -> Self {
        DbError::ConfigWrite(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_keep_core_message() {
        let core = CoreError::ProductNotFound("p-1".into());
        let expected = core.to_string();
        let err = DbError::from(core);

        assert!(err.is_rejection());
        assert_eq!(err.to_string(), expected);
        assert!(!DbError::Spreadsheet("bad quote".into()).is_rejection());
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let err: DbError = ValidationError::MustBePositive { field: "quantity".into() }.into();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_sqlx_error_mapping() {
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::Open(_)));
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolBusy));
    }
}
