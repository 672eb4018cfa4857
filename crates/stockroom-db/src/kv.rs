//! # Key-Value Backends
//!
//! The ledger persists everything as string values under string keys. The
//! [`KeyValueStore`] trait is the injected backend; repositories never know
//! which implementation they run on.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KeyValueStore                                    │
//! │            get · set · set_many (atomic) · remove                       │
//! │                 ▲                              ▲                        │
//! │                 │                              │                        │
//! │   ┌─────────────┴────────────┐   ┌─────────────┴────────────┐          │
//! │   │      SqliteKvStore       │   │      MemoryKvStore       │          │
//! │   │  kv_store table, upsert  │   │  RwLock<HashMap>         │          │
//! │   │  set_many = 1 transaction│   │  set_many = 1 write lock │          │
//! │   └──────────────────────────┘   └──────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each backend also owns the writer lock that [`Store`](crate::store::Store)
//! holds across read-validate-commit. Every store built over the same backend
//! (clones, `Arc`s, any profile) takes the same lock. Two `Database` handles
//! opened separately on one file do not share it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Trait
// =============================================================================

/// String key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = DbResult<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Stores every entry, or none of them.
    fn set_many(&self, entries: &[(String, String)]) -> impl Future<Output = DbResult<()>> + Send;

    /// Deletes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Lock shared by every writer of this backend.
    fn write_lock(&self) -> Arc<Mutex<()>>;
}

/// Lets several profile stores share one backend.
impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = DbResult<Option<String>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = DbResult<()>> + Send {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(String, String)]) -> impl Future<Output = DbResult<()>> + Send {
        (**self).set_many(entries)
    }

    fn remove(&self, key: &str) -> impl Future<Output = DbResult<()>> + Send {
        (**self).remove(key)
    }

    fn write_lock(&self) -> Arc<Mutex<()>> {
        (**self).write_lock()
    }
}

// =============================================================================
// SQLite
// =============================================================================

const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Backend over the `kv_store` table. Clones share the writer lock.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl SqliteKvStore {
    /// Backend with its own writer lock.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_writer(pool, Arc::default())
    }

    /// Backend that shares `writer` with other handles over the same pool.
    pub fn with_writer(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        SqliteKvStore { pool, writer }
    }
}

impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(key = %key, bytes = value.len(), "kv set");
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Commit(e.to_string()))?;

        let now = Utc::now();
        for (key, value) in entries {
            sqlx::query(UPSERT_SQL)
                .bind(key)
                .bind(value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::Commit(e.to_string()))?;

        debug!(keys = entries.len(), "kv set_many committed");
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "kv remove");
        Ok(())
    }

    fn write_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.writer)
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// Process-local backend for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> DbResult<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn write_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.writer)
    }
}
