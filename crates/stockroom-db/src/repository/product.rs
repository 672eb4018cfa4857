//! # Product Repository
//!
//! Catalog operations over the stored product list.
//!
//! ## Key Operations
//! - CRUD by id (ids are uuid v4, assigned here)
//! - Stock corrections that clamp at zero
//! - Bulk price application from the pricing engine
//! - CSV import (dedup by SKU) and export
//!
//! ## Mutation Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update / delete / adjust / import                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.lock()            ← one writer at a time                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read_list(products)     ← whole catalog                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  change in memory        ← not found? return None / false, no write     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write_list(products)    ← whole catalog                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use stockroom_core::catalog::{self, merge_import, ImportReport, ImportRow};
use stockroom_core::validation::{validate_price, validate_product_name, validate_search_query, validate_sku};
use stockroom_core::{NewProduct, PricingEngine, Product, ProductPatch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::spreadsheet::{self, ParsedSheet};
use crate::store::{read_list, write_list, Store};

/// Repository for the product catalog.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
///
/// let product = repo.create(new_product).await?;
/// let hits = repo.search("ramen").await?;
/// ```
#[derive(Debug)]
pub struct ProductRepository<S> {
    store: Store<S>,
}

impl<S: KeyValueStore> ProductRepository<S> {
    pub fn new(store: Store<S>) -> Self {
        ProductRepository { store }
    }

    fn key(&self) -> &str {
        &self.store.keys().products
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The whole catalog, in stored order.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        read_list(self.store.kv(), self.key()).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.get_all().await?.into_iter().find(|p| p.id == id))
    }

    /// First product carrying `sku`.
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        Ok(self.get_all().await?.into_iter().find(|p| p.sku == sku))
    }

    /// Case-insensitive search over name, SKU, price and quantity.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        let products = self.get_all().await?;
        let hits = catalog::search(&products, &query);

        debug!(query = %query, count = hits.len(), "Searched products");
        Ok(hits)
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.get_all().await?.len())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Appends a new product with a fresh id.
    ///
    /// ## Errors
    /// - `Validation` for a malformed SKU, a blank or long name, or a negative price
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        validate_sku(&new.sku)?;
        validate_product_name(&new.name)?;
        validate_price("price", new.price)?;
        if let Some(cost) = new.cost {
            validate_price("cost", cost)?;
        }

        let _guard = self.store.lock().await;
        let mut products = self.get_all().await?;

        let product = Product::from_new(Uuid::new_v4().to_string(), new);
        products.push(product.clone());
        write_list(self.store.kv(), self.key(), &products).await?;

        info!(id = %product.id, sku = %product.sku, "Created product");
        Ok(product)
    }

    /// Merges `patch` into the product with `id`.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Updated product
    /// * `Ok(None)` - No product with that id; nothing written
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Option<Product>> {
        if let Some(sku) = &patch.sku {
            validate_sku(sku)?;
        }
        if let Some(name) = &patch.name {
            validate_product_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price("price", price)?;
        }

        self.modify(id, |product| patch.apply_to(product)).await
    }

    /// Removes the product with `id`. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let _guard = self.store.lock().await;
        let mut products = self.get_all().await?;

        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            debug!(id = %id, "Delete skipped, product not found");
            return Ok(false);
        }

        write_list(self.store.kv(), self.key(), &products).await?;
        info!(id = %id, "Deleted product");
        Ok(true)
    }

    /// Replaces the whole catalog.
    pub async fn save_all(&self, products: &[Product]) -> DbResult<()> {
        let _guard = self.store.lock().await;
        write_list(self.store.kv(), self.key(), products).await?;
        info!(count = products.len(), "Saved catalog");
        Ok(())
    }

    /// Empties the catalog. The sales ledger is kept.
    pub async fn clear(&self) -> DbResult<()> {
        let _guard = self.store.lock().await;
        self.store.kv().remove(self.key()).await?;
        info!("Cleared catalog");
        Ok(())
    }

    /// Adds `amount` units. Returns `None` when the id is unknown.
    pub async fn increase_quantity(&self, id: &str, amount: i64) -> DbResult<Option<Product>> {
        self.modify(id, |product| catalog::adjust_quantity(product, amount)).await
    }

    /// Removes `amount` units, stopping at zero. Returns `None` when the id is unknown.
    pub async fn decrease_quantity(&self, id: &str, amount: i64) -> DbResult<Option<Product>> {
        self.modify(id, |product| catalog::adjust_quantity(product, amount.saturating_neg()))
            .await
    }

    /// Reprices the whole catalog from `engine` and stores the result.
    ///
    /// With `only_if_lower`, prices only ever go down.
    pub async fn apply_recommended_prices(
        &self,
        engine: &mut PricingEngine,
        only_if_lower: bool,
    ) -> DbResult<Vec<Product>> {
        let _guard = self.store.lock().await;
        let products = self.get_all().await?;

        let repriced = engine.apply_recommended_prices(&products, only_if_lower, Utc::now());
        write_list(self.store.kv(), self.key(), &repriced).await?;

        let changed = products
            .iter()
            .zip(&repriced)
            .filter(|(old, new)| old.price != new.price)
            .count();
        info!(count = repriced.len(), changed, only_if_lower, "Applied recommended prices");
        Ok(repriced)
    }

    /// Applies `change` to one product under the write lock.
    async fn modify(&self, id: &str, change: impl FnOnce(&mut Product)) -> DbResult<Option<Product>> {
        let _guard = self.store.lock().await;
        let mut products = self.get_all().await?;

        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            debug!(id = %id, "Update skipped, product not found");
            return Ok(None);
        };
        change(product);
        let updated = product.clone();

        write_list(self.store.kv(), self.key(), &products).await?;
        info!(id = %id, quantity = updated.quantity, "Updated product");
        Ok(Some(updated))
    }

    // =========================================================================
    // Spreadsheets
    // =========================================================================

    /// Merges already parsed rows into the catalog.
    pub async fn import_rows(&self, rows: Vec<ImportRow>, has_cost_column: bool) -> DbResult<ImportReport> {
        let started = Instant::now();
        let _guard = self.store.lock().await;
        let existing = self.get_all().await?;

        let row_count = rows.len();
        let report = merge_import(existing, rows, has_cost_column, || Uuid::new_v4().to_string());
        write_list(self.store.kv(), self.key(), &report.products).await?;

        if report.skipped > 0 {
            warn!(skipped = report.skipped, "Duplicate SKUs in import file were skipped");
        }
        info!(
            rows = row_count,
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Imported catalog"
        );
        Ok(report)
    }

    /// Imports CSV bytes. A parse error leaves the catalog untouched.
    pub async fn import_csv(&self, bytes: &[u8]) -> DbResult<ImportReport> {
        let ParsedSheet { rows, has_cost_column } = spreadsheet::parse_products(bytes)?;
        self.import_rows(rows, has_cost_column).await
    }

    /// Imports a CSV file from disk.
    pub async fn import_file(&self, path: impl AsRef<Path>) -> DbResult<ImportReport> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read import file");
        self.import_csv(&bytes).await
    }

    /// The catalog as CSV text.
    pub async fn export_csv(&self) -> DbResult<String> {
        let started = Instant::now();
        let products = self.get_all().await?;
        let text = spreadsheet::export_to_string(&products)?;

        info!(
            count = products.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Exported catalog"
        );
        Ok(text)
    }

    /// Writes the catalog CSV to `path`.
    pub async fn export_file(&self, path: impl AsRef<Path>) -> DbResult<()> {
        let text = self.export_csv().await?;
        tokio::fs::write(path.as_ref(), text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::validation::MAX_CELL_QUANTITY;
    use stockroom_core::{Money, PricingProfile, StoreProfile};

    fn new_product(sku: &str, quantity: i64, price: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            quantity,
            price: Money::from_units(price),
            cost: None,
        }
    }

    fn memory_store() -> Store<MemoryKvStore> {
        Store::new(MemoryKvStore::new(), StoreProfile::Mochima)
    }

    #[tokio::test]
    async fn test_crud_on_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = Store::new(db.kv_store(), StoreProfile::HenchoTcg).products();

        let created = repo.create(new_product("PKM001", 5, 45000)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.get_by_id(&created.id).await.unwrap().unwrap().sku, "PKM001");
        assert_eq!(repo.find_by_sku("PKM001").await.unwrap().unwrap().id, created.id);

        let updated = repo
            .update(
                &created.id,
                ProductPatch {
                    price: Some(Money::from_units(47000)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price.units(), 47000);
        assert_eq!(updated.id, created.id);

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(!repo.delete(&created.id).await.unwrap());
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let repo = memory_store().products();
        assert!(repo.create(new_product("", 1, 100)).await.is_err());

        let mut blank_name = new_product("A1", 1, 100);
        blank_name.name = "  ".to_string();
        assert!(repo.create(blank_name).await.is_err());

        assert!(repo.create(new_product("A1", 1, -5)).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_no_op() {
        let repo = memory_store().products();
        repo.create(new_product("A1", 1, 100)).await.unwrap();

        assert!(repo.update("nope", ProductPatch::default()).await.unwrap().is_none());
        assert!(repo.increase_quantity("nope", 5).await.unwrap().is_none());
        assert!(repo.decrease_quantity("nope", 5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quantity_adjustments_clamp_at_zero() {
        let repo = memory_store().products();
        let p = repo.create(new_product("A1", 3, 100)).await.unwrap();

        let p2 = repo.increase_quantity(&p.id, 4).await.unwrap().unwrap();
        assert_eq!(p2.quantity, 7);

        let p3 = repo.decrease_quantity(&p.id, 100).await.unwrap().unwrap();
        assert_eq!(p3.quantity, 0);
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_search_and_clear() {
        let repo = memory_store().products();
        repo.create(new_product("MOCH001", 25, 8500)).await.unwrap();
        repo.create(new_product("MOCH002", 30, 12000)).await.unwrap();

        assert_eq!(repo.search("moch002").await.unwrap().len(), 1);
        assert_eq!(repo.search("").await.unwrap().len(), 2);
        assert!(repo.search(&"x".repeat(101)).await.is_err());

        repo.clear().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_dedups_by_sku() {
        let repo = memory_store().products();
        let original = repo.create(new_product("A100", 1, 100)).await.unwrap();

        let csv = "SKU,Nombre,Cantidad,Precio\n\
                   A100,Updated A,7,700\n\
                   B200,First B,2,200\n\
                   B200,Second B,3,300\n";
        let report = repo.import_csv(csv.as_bytes()).await.unwrap();
        assert_eq!((report.inserted, report.updated, report.skipped), (1, 1, 1));

        let products = repo.get_all().await.unwrap();
        assert_eq!(products.len(), 2);
        let a = products.iter().find(|p| p.sku == "A100").unwrap();
        assert_eq!(a.id, original.id);
        assert_eq!((a.name.as_str(), a.quantity), ("Updated A", 7));
        let b: Vec<&Product> = products.iter().filter(|p| p.sku == "B200").collect();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].name, "First B");
    }

    #[tokio::test]
    async fn test_import_clamps_out_of_range_cells() {
        let store = memory_store();
        let csv = "SKU,Name,Quantity,Price,Cost\n\
                   A,Big,9000000000000000000,100,\n\
                   B,Refund,4,-500,-20\n";
        store.products().import_csv(csv.as_bytes()).await.unwrap();

        let big = store.products().find_by_sku("A").await.unwrap().unwrap();
        assert_eq!(big.quantity, MAX_CELL_QUANTITY);
        let refund = store.products().find_by_sku("B").await.unwrap().unwrap();
        assert_eq!(refund.price, Money::zero());
        assert_eq!(refund.cost, Some(Money::zero()));

        let kpis = store.dashboard().kpis().await.unwrap();
        assert_eq!(kpis.inventory.total_stock, MAX_CELL_QUANTITY + 4);
        assert_eq!(kpis.inventory.total_value.units(), MAX_CELL_QUANTITY * 100);
    }

    #[tokio::test]
    async fn test_kpis_saturate_on_huge_stock() {
        let store = memory_store();
        store.products().create(new_product("A", i64::MAX, 100)).await.unwrap();
        store.products().create(new_product("B", i64::MAX, 5)).await.unwrap();

        let kpis = store.dashboard().kpis().await.unwrap();
        assert_eq!(kpis.inventory.total_stock, i64::MAX);
        assert_eq!(kpis.inventory.total_value.units(), i64::MAX);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_catalog_untouched() {
        let repo = memory_store().products();
        repo.create(new_product("A100", 1, 100)).await.unwrap();

        let bytes: &[u8] = b"sku,name\nB1,\xff\n";
        assert!(repo.import_csv(bytes).await.is_err());

        let products = repo.get_all().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].sku, "A100");
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let source = memory_store().products();
        source.create(new_product("PKM001", 5, 45000)).await.unwrap();
        let mut with_cost = new_product("PKM002", 8, 25000);
        with_cost.cost = Some(Money::from_units(17500));
        source.create(with_cost).await.unwrap();

        let text = source.export_csv().await.unwrap();

        let target = Store::new(MemoryKvStore::new(), StoreProfile::HenchoTcg).products();
        target.import_csv(text.as_bytes()).await.unwrap();

        let tuples = |products: Vec<Product>| -> Vec<(String, String, i64, i64, Option<Money>)> {
            products
                .into_iter()
                .map(|p| (p.sku, p.name, p.quantity, p.price.units(), p.cost))
                .collect()
        };
        assert_eq!(
            tuples(source.get_all().await.unwrap()),
            tuples(target.get_all().await.unwrap())
        );
    }

    #[tokio::test]
    async fn test_apply_recommended_prices_persists() {
        let repo = memory_store().products();
        let mut new = new_product("A1", 10, 11000);
        new.cost = Some(Money::from_units(10000));
        let created = repo.create(new).await.unwrap();

        let mut engine = PricingEngine::new(PricingProfile::trading_cards());
        let repriced = repo.apply_recommended_prices(&mut engine, false).await.unwrap();
        assert_eq!(repriced[0].price.units(), 12500);

        let stored = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.price.units(), 12500);
        assert_eq!(stored.previous_price, Some(Money::from_units(11000)));
        assert!(stored.price_updated_at.is_some());
    }
}
