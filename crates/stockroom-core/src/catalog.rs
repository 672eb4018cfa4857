//! # Catalog Operations
//!
//! Pure list operations over the product catalog: search, inventory totals,
//! stock adjustments and the SKU-deduplicating spreadsheet merge.
//!
//! ## Import Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each imported row, in file order                                   │
//! │                                                                         │
//! │  SKU already seen in this file?  ──yes──► skipped (first row wins)      │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │  SKU in the catalog?  ──yes──► update in place (id and position kept)   │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │  append as a new product with a fresh id                                │
//! │                                                                         │
//! │  Catalog products absent from the file are left as they are.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{round_half_up, Money};
use crate::types::Product;

// =============================================================================
// Search
// =============================================================================

/// Case-insensitive substring search over name, SKU, price and quantity.
///
/// A blank term returns the whole catalog.
pub fn search(products: &[Product], term: &str) -> Vec<Product> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&term)
                || p.sku.to_lowercase().contains(&term)
                || p.price.units().to_string().contains(&term)
                || p.quantity.to_string().contains(&term)
        })
        .cloned()
        .collect()
}

// =============================================================================
// Inventory Statistics
// =============================================================================

/// Totals shown on the stats cards and the KPI panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_stock: i64,
    pub total_value: Money,
    pub average_price: Money,
    pub average_stock: i64,
}

pub fn inventory_stats(products: &[Product]) -> InventoryStats {
    if products.is_empty() {
        return InventoryStats::default();
    }

    let count = products.len() as f64;
    let total_stock = products.iter().map(Product::stock).fold(0_i64, i64::saturating_add);
    let total_price: Money = products.iter().map(|p| p.price).sum();

    InventoryStats {
        total_products: products.len(),
        total_stock,
        total_value: products.iter().map(Product::inventory_value).sum(),
        average_price: Money::round_half_up(total_price.as_f64() / count),
        average_stock: round_half_up(total_stock as f64 / count),
    }
}

/// The `limit` products holding the most stock value, highest first.
pub fn top_by_value(products: &[Product], limit: usize) -> Vec<Product> {
    let mut ranked = products.to_vec();
    ranked.sort_by(|a, b| b.inventory_value().cmp(&a.inventory_value()));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Stock Adjustments
// =============================================================================

/// Adds `delta` units (may be negative), clamping the result at zero.
pub fn adjust_quantity(product: &mut Product, delta: i64) {
    product.quantity = product.stock().saturating_add(delta).max(0);
}

// =============================================================================
// Import Merge
// =============================================================================

/// One spreadsheet row after header mapping and numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportRow {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    pub cost: Option<Money>,
}

impl ImportRow {
    /// Builds a row, substituting placeholders for blank SKU or name.
    ///
    /// `index` is the zero-based data row number.
    pub fn new(
        index: usize,
        sku: Option<&str>,
        name: Option<&str>,
        quantity: i64,
        price: Money,
        cost: Option<Money>,
    ) -> Self {
        let present = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        ImportRow {
            sku: present(sku).unwrap_or_else(|| format!("ITEM{}", index + 1)),
            name: present(name).unwrap_or_else(|| format!("Product {}", index + 1)),
            quantity: quantity.max(0),
            price,
            cost,
        }
    }
}

/// What happened to a row during the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Inserted,
    Updated,
    Skipped,
}

/// Per-SKU merge log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportLogEntry {
    pub sku: String,
    pub action: ImportAction,
}

/// Result of [`merge_import`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportReport {
    /// The merged catalog to persist.
    pub products: Vec<Product>,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub log: Vec<ImportLogEntry>,
}

/// Merges imported rows into the catalog, deduplicating by SKU.
///
/// When `has_cost_column` is false the existing cost of updated products is
/// kept; otherwise the row's cost (possibly blank) replaces it.
pub fn merge_import(
    existing: Vec<Product>,
    rows: Vec<ImportRow>,
    has_cost_column: bool,
    mut next_id: impl FnMut() -> String,
) -> ImportReport {
    let mut report = ImportReport {
        products: existing,
        ..ImportReport::default()
    };

    let mut index_by_sku: HashMap<String, usize> = HashMap::new();
    for (i, product) in report.products.iter().enumerate() {
        index_by_sku.entry(product.sku.clone()).or_insert(i);
    }

    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        if !seen.insert(row.sku.clone()) {
            report.skipped += 1;
            report.log.push(ImportLogEntry {
                sku: row.sku,
                action: ImportAction::Skipped,
            });
            continue;
        }

        let sku = row.sku.clone();
        let action = match index_by_sku.get(&row.sku) {
            Some(&i) => {
                let product = &mut report.products[i];
                product.name = row.name;
                product.quantity = row.quantity;
                product.price = row.price;
                if has_cost_column {
                    product.cost = row.cost;
                }
                report.updated += 1;
                ImportAction::Updated
            }
            None => {
                report.products.push(Product {
                    id: next_id(),
                    sku: row.sku,
                    name: row.name,
                    quantity: row.quantity,
                    price: row.price,
                    cost: row.cost,
                    previous_price: None,
                    price_updated_at: None,
                });
                index_by_sku.insert(sku.clone(), report.products.len() - 1);
                report.inserted += 1;
                ImportAction::Inserted
            }
        };

        report.log.push(ImportLogEntry { sku, action });
    }

    report
}
