//! # Schema Migrations
//!
//! The ledger needs a single table; migrations are embedded so a fresh
//! database file is usable right after [`Database::new`](crate::pool::Database::new).
//!
//! ```text
//! migrations/
//! └── 001_kv_store.sql   kv_store(key PRIMARY KEY, value, updated_at)
//! ```
//!
//! Applied migrations are recorded in `_sqlx_migrations`. Existing files are
//! never edited; schema changes go in a new numbered file.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Checking schema");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
