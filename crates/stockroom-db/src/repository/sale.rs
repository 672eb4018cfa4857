//! # Sale Repository
//!
//! Read access to the append-only sales ledger, plus the figures derived
//! from it. Records are appended only by the sale handler (checkout.rs), which
//! decrements stock in the same write.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. SELL                                                               │
//! │     └── SaleHandler::sell() → stock decremented + SaleRecord appended  │
//! │         (one atomic write, see checkout.rs)                            │
//! │                                                                         │
//! │  2. REPORT                                                             │
//! │     └── by_date() / stats() / consumption_history()                    │
//! │                                                                         │
//! │  3. (OPTIONAL) CLEAR                                                   │
//! │     └── clear() → ledger emptied, catalog untouched                    │
//! │                                                                         │
//! │  Records are never edited once written.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use stockroom_core::sales_stats::{self, SalesStats};
use stockroom_core::{ConsumptionHistory, Money, SaleRecord};
use tracing::info;

use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::store::{read_list, Store};

/// Repository for the sales ledger.
#[derive(Debug)]
pub struct SaleRepository<S> {
    store: Store<S>,
}

impl<S: KeyValueStore> SaleRepository<S> {
    pub fn new(store: Store<S>) -> Self {
        SaleRepository { store }
    }

    fn key(&self) -> &str {
        &self.store.keys().sales
    }

    /// Every sale, oldest first.
    pub async fn get_all(&self) -> DbResult<Vec<SaleRecord>> {
        read_list(self.store.kv(), self.key()).await
    }

    /// Sales recorded on `date` (local calendar day).
    pub async fn by_date(&self, date: NaiveDate) -> DbResult<Vec<SaleRecord>> {
        Ok(sales_stats::sales_on(&self.get_all().await?, date))
    }

    /// The last `limit` sales, newest first.
    pub async fn recent(&self, limit: usize) -> DbResult<Vec<SaleRecord>> {
        Ok(sales_stats::recent_sales(&self.get_all().await?, limit))
    }

    pub async fn total_revenue(&self) -> DbResult<Money> {
        Ok(sales_stats::total_revenue(&self.get_all().await?))
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.get_all().await?.len())
    }

    /// Figures for the sales and financial panels as of `today`.
    pub async fn stats(&self, today: NaiveDate) -> DbResult<SalesStats> {
        Ok(sales_stats::sales_stats(&self.get_all().await?, today))
    }

    /// Per-product daily consumption over the `window_days` days ending on `today`.
    pub async fn consumption_history(&self, today: NaiveDate, window_days: u32) -> DbResult<ConsumptionHistory> {
        Ok(ConsumptionHistory::from_sales(&self.get_all().await?, today, window_days))
    }

    /// Empties the ledger. The catalog is kept.
    pub async fn clear(&self) -> DbResult<()> {
        let _guard = self.store.lock().await;
        self.store.kv().remove(self.key()).await?;
        info!("Cleared sales ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::store::write_list;
    use chrono::{TimeZone, Utc};
    use stockroom_core::{Product, StoreProfile};

    fn record(id: &str, product_id: &str, quantity: i64, day: u32) -> SaleRecord {
        let product = Product {
            id: product_id.to_string(),
            sku: "MOCH001".to_string(),
            name: "Ramen Tonkotsu Premium".to_string(),
            quantity: 100,
            price: Money::from_units(8500),
            cost: None,
            previous_price: None,
            price_updated_at: None,
        };
        SaleRecord::new(id, &product, quantity, Utc.with_ymd_and_hms(2026, 10, day, 15, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_ledger_reads() {
        let store = Store::new(MemoryKvStore::new(), StoreProfile::Mochima);
        let repo = store.sales();
        assert_eq!(repo.count().await.unwrap(), 0);

        let ledger = vec![
            record("s1", "p1", 2, 14),
            record("s2", "p1", 1, 15),
            record("s3", "p2", 3, 15),
        ];
        write_list(store.kv(), &store.keys().sales, &ledger).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.total_revenue().await.unwrap().units(), 51_000);

        let day = repo.get_all().await.unwrap()[1].local_date();
        let on_day = repo.by_date(day).await.unwrap();
        assert_eq!(on_day.len(), 2);

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent[0].id, "s3");
        assert_eq!(recent[1].id, "s2");

        let history = repo.consumption_history(day, 7).await.unwrap();
        let p1 = history.entries_for("p1");
        assert_eq!(p1.len(), 7);
        assert_eq!(p1.iter().map(|e| e.quantity_consumed).sum::<f64>(), 3.0);
        assert!(repo.consumption_history(day, 0).await.unwrap().is_empty());

        let stats = repo.stats(day).await.unwrap();
        assert_eq!(stats.sales_today, 2);

        repo.clear().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
