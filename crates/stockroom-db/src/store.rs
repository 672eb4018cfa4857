//! # Ledger Store
//!
//! The sole writer of persisted state. A [`Store`] binds a key-value backend
//! to one store profile and hands out repositories that share its write lock.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key                          value (JSON)                              │
//! │  ───────────────────────────  ──────────────────────────────────────    │
//! │  {prefix}products             [Product, ...]       catalog, ordered     │
//! │  {prefix}sales                [SaleRecord, ...]    append-only ledger   │
//! │  {prefix}pricing_config       PricingConfig        optional override    │
//! │  isAuthenticated              "true"               shared by profiles   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Discipline
//! ```text
//! lock ──► read whole list ──► mutate in memory ──► write whole list ──► unlock
//! ```
//! Readers don't take the lock; they see either the old or the new list.
//! The lock belongs to the backend ([`KeyValueStore::write_lock`]), so any
//! number of `Store`s over one backend serialize against each other.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use stockroom_core::StoreProfile;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::checkout::SaleHandler;
use crate::dashboard::Dashboard;
use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::repository::{ProductRepository, SaleRepository, SettingsRepository};

/// Key of the login flag. Not prefixed.
pub const AUTH_KEY: &str = "isAuthenticated";

// =============================================================================
// Storage Keys
// =============================================================================

/// Fully prefixed keys of one store profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub products: String,
    pub sales: String,
    pub pricing_config: String,
    pub auth: String,
}

impl StorageKeys {
    pub fn for_profile(profile: StoreProfile) -> Self {
        let prefix = profile.storage_prefix();
        StorageKeys {
            products: format!("{}products", prefix),
            sales: format!("{}sales", prefix),
            pricing_config: format!("{}pricing_config", prefix),
            auth: AUTH_KEY.to_string(),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle over one profile's ledger. Cheap to clone.
#[derive(Debug)]
pub struct Store<S> {
    kv: Arc<S>,
    keys: Arc<StorageKeys>,
    profile: StoreProfile,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            kv: Arc::clone(&self.kv),
            keys: Arc::clone(&self.keys),
            profile: self.profile,
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> Store<S> {
    pub fn new(kv: S, profile: StoreProfile) -> Self {
        let write_lock = kv.write_lock();
        Store {
            kv: Arc::new(kv),
            keys: Arc::new(StorageKeys::for_profile(profile)),
            profile,
            write_lock,
        }
    }

    pub fn profile(&self) -> StoreProfile {
        self.profile
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Serializes read-modify-write cycles on this store.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub fn products(&self) -> ProductRepository<S> {
        ProductRepository::new(self.clone())
    }

    pub fn sales(&self) -> SaleRepository<S> {
        SaleRepository::new(self.clone())
    }

    pub fn settings(&self) -> SettingsRepository<S> {
        SettingsRepository::new(self.clone())
    }

    /// The sale transaction handler.
    pub fn checkout(&self) -> SaleHandler<S> {
        SaleHandler::new(self.clone())
    }

    /// Dashboard over this store with the profile's default analytics.
    pub fn dashboard(&self) -> Dashboard<S> {
        Dashboard::for_profile(self.clone())
    }
}

// =============================================================================
// JSON Helpers
// =============================================================================

/// Reads a stored list. A missing key is an empty list.
pub(crate) async fn read_list<S, T>(kv: &S, key: &str) -> DbResult<Vec<T>>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match kv.get(key).await? {
        Some(raw) => {
            let items: Vec<T> = serde_json::from_str(&raw)?;
            debug!(key = %key, count = items.len(), "Loaded list");
            Ok(items)
        }
        None => Ok(Vec::new()),
    }
}

/// Replaces a stored list.
pub(crate) async fn write_list<S, T>(kv: &S, key: &str, items: &[T]) -> DbResult<()>
where
    S: KeyValueStore,
    T: Serialize,
{
    kv.set(key, &serde_json::to_string(items)?).await?;
    debug!(key = %key, count = items.len(), "Saved list");
    Ok(())
}
