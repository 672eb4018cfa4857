//! # Repository Module
//!
//! Typed access to the collections a [`Store`](crate::store::Store) keeps.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │  store.products().increase_quantity(id, 5)                      │
//! │       ▼                                                                 │
//! │  ProductRepository  ──┐                                                 │
//! │  SaleRepository     ──┼──► Store<S> (keys, write lock)                  │
//! │  SettingsRepository ──┘          │                                      │
//! │                                  ▼                                      │
//! │                       KeyValueStore (SQLite or memory)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog CRUD, stock corrections, CSV import/export
//! - [`SaleRepository`] - Sales ledger reads and figures
//! - [`SettingsRepository`] - Login flag and pricing configuration

pub mod product;
pub mod sale;
pub mod settings;

pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use settings::SettingsRepository;
