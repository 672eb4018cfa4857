//! # stockroom-db: Storage Layer for the Stockroom Dashboards
//!
//! Persists the catalog, the sales ledger and the store settings as JSON
//! values in a key-value table, and orchestrates the core calculators over
//! them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Dashboard action (sell, import, open KPI panel)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌────────────────┐   │   │
//! │  │   │    Store      │   │ Repositories  │   │  SaleHandler   │   │   │
//! │  │   │  (store.rs)   │◄──│ products      │   │  Dashboard     │   │   │
//! │  │   │ keys + lock   │   │ sales         │   │  spreadsheet   │   │   │
//! │  │   │               │   │ settings      │   │  config        │   │   │
//! │  │   └───────┬───────┘   └───────────────┘   └────────────────┘   │   │
//! │  │           ▼                                                     │   │
//! │  │   KeyValueStore ── SqliteKvStore (pool.rs, migrations)          │   │
//! │  │                └── MemoryKvStore                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          kv_store(key, value, updated_at)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`kv`] - Key-value backends
//! - [`store`] - Profile-scoped store handle and storage keys
//! - [`repository`] - Product, sale and settings repositories
//! - [`checkout`] - Sale transaction handler
//! - [`dashboard`] - Analytics over the stored catalog and ledger
//! - [`spreadsheet`] - CSV import/export
//! - [`config`] - TOML store configuration
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, Store, StoreConfig};
//!
//! let config = StoreConfig::load_or_default(None);
//! let db = Database::new(config.db_config()).await?;
//! let store = Store::new(db.kv_store(), config.profile());
//!
//! let receipt = store.checkout().sell(&product_id, 2).await?;
//! let report = store.dashboard().report(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod spreadsheet;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::SaleHandler;
pub use config::StoreConfig;
pub use dashboard::{CostVolatility, Dashboard, DashboardReport};
pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use pool::{Database, DbConfig};
pub use store::{StorageKeys, Store};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
