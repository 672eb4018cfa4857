//! # Stock Alerts
//!
//! Classifies each product into at most one stock alert tier.
//!
//! ## Tiers
//! ```text
//! quantity:   0        1 ... critical     critical+1 ... low     low+1 ...
//!             │        │                  │                      │
//!             ▼        ▼                  ▼                      ▼
//!        OutOfStock  Critical           LowStock               (none)
//! ```
//!
//! Tiers are mutually exclusive, so `total_alerts` is the plain sum of the
//! three buckets and no product is ever counted twice.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;

// =============================================================================
// Thresholds
// =============================================================================

/// Quantity cutoffs for the low and critical tiers (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    pub low_stock: i64,
    pub critical_stock: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            low_stock: 10,
            critical_stock: 5,
        }
    }
}

// =============================================================================
// Alert Types
// =============================================================================

/// Alert tier for a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockAlert {
    OutOfStock,
    Critical,
    LowStock,
}

/// Products sharing an alert tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertBucket {
    pub count: usize,
    pub products: Vec<Product>,
}

impl AlertBucket {
    fn push(&mut self, product: &Product) {
        self.count += 1;
        self.products.push(product.clone());
    }
}

/// The three alert buckets plus their total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub out_of_stock: AlertBucket,
    pub critical_stock: AlertBucket,
    pub low_stock: AlertBucket,
    pub total_alerts: usize,
}

// =============================================================================
// Classification
// =============================================================================

/// Returns the alert tier for one product, if any.
pub fn check_product_alert(product: &Product, thresholds: &AlertThresholds) -> Option<StockAlert> {
    let stock = product.stock();

    if stock == 0 {
        Some(StockAlert::OutOfStock)
    } else if stock <= thresholds.critical_stock {
        Some(StockAlert::Critical)
    } else if stock <= thresholds.low_stock {
        Some(StockAlert::LowStock)
    } else {
        None
    }
}

/// Buckets every product by alert tier, preserving catalog order.
pub fn classify(products: &[Product], thresholds: &AlertThresholds) -> AlertSummary {
    let mut summary = AlertSummary::default();

    for product in products {
        match check_product_alert(product, thresholds) {
            Some(StockAlert::OutOfStock) => summary.out_of_stock.push(product),
            Some(StockAlert::Critical) => summary.critical_stock.push(product),
            Some(StockAlert::LowStock) => summary.low_stock.push(product),
            None => {}
        }
    }

    summary.total_alerts =
        summary.out_of_stock.count + summary.critical_stock.count + summary.low_stock.count;
    summary
}

/// Products with some stock left but at or below `threshold`.
pub fn low_stock_products(products: &[Product], threshold: i64) -> Vec<Product> {
    products
        .iter()
        .filter(|p| {
            let stock = p.stock();
            stock > 0 && stock <= threshold
        })
        .cloned()
        .collect()
}
