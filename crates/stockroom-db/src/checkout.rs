//! # Sale Transaction Handler
//!
//! Sells units of one product: checks stock, decrements it and appends the
//! sale record as a single unit of work.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sell(product_id, qty)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.lock() ─────────── held until the write returns                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read products ──► find id ──────────► ProductNotFound (nothing written)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_sale ───────────────────────► InsufficientStock / Validation     │
//! │       │                               (nothing written)                 │
//! │       ▼                                                                 │
//! │  read sales, append record                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  set_many([products, sales]) ── one transaction                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No read between the stock check and the commit can see a half-applied
//! sale, so two concurrent sells cannot oversell a product.
//!
//! This handler is the only writer of the sales ledger. Backfilled history
//! goes through [`SaleHandler::sell_at`], which checks and decrements stock
//! exactly like a live sale.

use chrono::{DateTime, Utc};
use stockroom_core::sale::apply_sale;
use stockroom_core::{CoreError, Product, SaleReceipt, SaleRecord};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::store::{read_list, Store};

/// Sells products out of one store's catalog.
#[derive(Debug)]
pub struct SaleHandler<S> {
    store: Store<S>,
}

impl<S: KeyValueStore> SaleHandler<S> {
    pub fn new(store: Store<S>) -> Self {
        SaleHandler { store }
    }

    /// Sells a single unit.
    pub async fn sell_one(&self, product_id: &str) -> DbResult<SaleReceipt> {
        self.sell(product_id, 1).await
    }

    /// Sells `quantity` units of `product_id`.
    ///
    /// ## Errors
    /// - `Core(ProductNotFound)` for an unknown id
    /// - `Core(InsufficientStock)` when the catalog holds fewer units
    /// - `Core(Validation)` when `quantity` is not positive
    ///
    /// On any error the catalog and the ledger are unchanged.
    pub async fn sell(&self, product_id: &str, quantity: i64) -> DbResult<SaleReceipt> {
        self.sell_at(product_id, quantity, Utc::now()).await
    }

    /// Same as [`sell`](Self::sell), with the sale dated `at`.
    ///
    /// Used to replay sales that happened away from the dashboard. Stock is
    /// checked against the current catalog, not the catalog as of `at`.
    pub async fn sell_at(&self, product_id: &str, quantity: i64, at: DateTime<Utc>) -> DbResult<SaleReceipt> {
        let keys = self.store.keys();
        let _guard = self.store.lock().await;

        let mut products: Vec<Product> = read_list(self.store.kv(), &keys.products).await?;
        let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
            warn!(product_id = %product_id, quantity, "Sale rejected, unknown product");
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        };

        let receipt = apply_sale(product, quantity, Uuid::new_v4().to_string(), at).map_err(|e| {
            warn!(product_id = %product_id, quantity, error = %e, "Sale rejected");
            e
        })?;

        let mut sales: Vec<SaleRecord> = read_list(self.store.kv(), &keys.sales).await?;
        sales.push(receipt.sale_record.clone());

        self.store
            .kv()
            .set_many(&[
                (keys.products.clone(), serde_json::to_string(&products)?),
                (keys.sales.clone(), serde_json::to_string(&sales)?),
            ])
            .await?;

        info!(
            sale_id = %receipt.sale_record.id,
            sku = %receipt.product.sku,
            quantity,
            sale_value = receipt.sale_value.units(),
            remaining = receipt.remaining_stock,
            "Sale recorded"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::kv::MemoryKvStore;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::{Money, NewProduct, StoreProfile};

    fn ramen() -> NewProduct {
        NewProduct {
            sku: "MOCH001".to_string(),
            name: "Ramen Tonkotsu Premium".to_string(),
            quantity: 5,
            price: Money::from_units(8500),
            cost: None,
        }
    }

    #[tokio::test]
    async fn test_sell_decrements_and_records() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Mochima);
        let product = store.products().create(ramen()).await.unwrap();

        let receipt = store.checkout().sell(&product.id, 2).await.unwrap();
        assert_eq!(receipt.quantity_sold, 2);
        assert_eq!(receipt.remaining_stock, 3);
        assert_eq!(receipt.sale_value.units(), 17_000);
        assert_eq!(receipt.sale_record.total_value.units(), 17_000);
        assert_eq!(receipt.sale_record.unit_price.units(), 8_500);

        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
        assert_eq!(store.products().count().await.unwrap(), 1);

        let sales = store.sales().get_all().await.unwrap();
        assert_eq!(sales, vec![receipt.sale_record]);

        store.checkout().sell_one(&product.id).await.unwrap();
        assert_eq!(store.sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Mochima);
        let product = store.products().create(ramen()).await.unwrap();

        let err = store.checkout().sell(&product.id, 6).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            })
        ));
        assert!(err.is_rejection());

        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
        assert_eq!(store.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_and_bad_quantity() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Basic);
        let product = store.products().create(ramen()).await.unwrap();

        let err = store.checkout().sell("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(ref id)) if id == "missing"));

        let err = store.checkout().sell(&product.id, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(store.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sell_out_then_reject() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Basic);
        let product = store.products().create(ramen()).await.unwrap();

        let receipt = store.checkout().sell(&product.id, 5).await.unwrap();
        assert_eq!(receipt.remaining_stock, 0);
        assert!(store.checkout().sell_one(&product.id).await.is_err());
        assert_eq!(store.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::HenchoTcg);
        let product = store.products().create(ramen()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let checkout = store.checkout();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move { checkout.sell_one(&id).await.is_ok() }));
        }

        let mut sold = 0;
        for handle in handles {
            if handle.await.unwrap() {
                sold += 1;
            }
        }

        assert_eq!(sold, 5);
        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0);
        assert_eq!(store.sales().count().await.unwrap(), 5);
    }

    async fn race_two_stores<S: KeyValueStore + 'static>(first: Store<S>, second: Store<S>) {
        let product = first.products().create(ramen()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let checkout = if i % 2 == 0 { first.checkout() } else { second.checkout() };
            let id = product.id.clone();
            handles.push(tokio::spawn(async move { checkout.sell_one(&id).await.is_ok() }));
        }

        let mut sold = 0;
        for handle in handles {
            if handle.await.unwrap() {
                sold += 1;
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(second.sales().count().await.unwrap(), 5);
        let stored = second.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0);
    }

    #[tokio::test]
    async fn test_stores_sharing_a_backend_never_oversell() {
        let kv = std::sync::Arc::new(MemoryKvStore::new());
        race_two_stores(
            Store::new(std::sync::Arc::clone(&kv), StoreProfile::Mochima),
            Store::new(kv, StoreProfile::Mochima),
        )
        .await;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        race_two_stores(
            Store::new(db.kv_store(), StoreProfile::HenchoTcg),
            Store::new(db.kv_store(), StoreProfile::HenchoTcg),
        )
        .await;
    }

    #[tokio::test]
    async fn test_backdated_sale_checks_and_decrements_stock() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Mochima);
        let product = store.products().create(ramen()).await.unwrap();
        let last_week = Utc::now() - chrono::Duration::days(7);

        let err = store.checkout().sell_at(&product.id, 50, last_week).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { requested: 50, .. })));
        assert_eq!(store.sales().count().await.unwrap(), 0);

        let receipt = store.checkout().sell_at(&product.id, 2, last_week).await.unwrap();
        assert_eq!(receipt.sale_record.timestamp, last_week);
        assert_eq!(receipt.remaining_stock, 3);

        let ledger = store.sales().get_all().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].quantity, 2);
        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
    }

    #[tokio::test]
    async fn test_ledger_and_stock_move_together() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::HenchoTcg);
        let product = store.products().create(ramen()).await.unwrap();

        for quantity in [2, 50, 0, 1, 9] {
            let _ = store.checkout().sell(&product.id, quantity).await;
        }

        let sold: i64 = store.sales().get_all().await.unwrap().iter().map(|s| s.quantity).sum();
        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(sold, 3);
        assert_eq!(stored.quantity + sold, 5);
    }

    #[tokio::test]
    async fn test_sell_on_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Store::new(db.kv_store(), StoreProfile::Mochima);
        let product = store.products().create(ramen()).await.unwrap();

        store.checkout().sell(&product.id, 4).await.unwrap();

        let stored = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 1);
        assert_eq!(store.sales().total_revenue().await.unwrap().units(), 34_000);
    }
}
