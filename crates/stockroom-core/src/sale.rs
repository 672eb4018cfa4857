//! # Sales
//!
//! Sale records and the pure commit step of a sale.
//!
//! ## Sale State Machine
//! ```text
//! ┌──────────┐      ┌───────────────┐      ┌──────────┐
//! │  Lookup  │─────►│ ValidateStock │─────►│  Commit  │
//! └────┬─────┘      └───────┬───────┘      └──────────┘
//!      │                    │
//!      ▼                    ▼
//!  ProductNotFound    InsufficientStock
//! ```
//!
//! Lookup happens in the ledger; [`apply_sale`] covers validation and the
//! in-memory commit. The caller persists the mutated product and the returned
//! record together, or neither.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;

/// Display format of the sale day, also the grouping key.
pub const SALE_DATE_FORMAT: &str = "%d-%m-%Y";
const SALE_TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Sale Record
// =============================================================================

/// One completed sale as stored in the append-only sales ledger.
///
/// Name, SKU and unit price are denormalized so the record survives later
/// edits or deletion of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_value: Money,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Local calendar day, `dd-mm-yyyy`.
    pub date: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
}

impl SaleRecord {
    /// Builds the record for selling `quantity` units of `product` at `timestamp`.
    pub fn new(id: impl Into<String>, product: &Product, quantity: i64, timestamp: DateTime<Utc>) -> Self {
        let local = timestamp.with_timezone(&Local);

        SaleRecord {
            id: id.into(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_sku: product.sku.clone(),
            quantity,
            unit_price: product.price,
            total_value: product.price.multiply_quantity(quantity),
            timestamp,
            date: local.format(SALE_DATE_FORMAT).to_string(),
            time: local.format(SALE_TIME_FORMAT).to_string(),
        }
    }

    /// Local calendar day of the sale.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

/// Formats a calendar day the way sale records store it.
pub fn sale_date_label(date: NaiveDate) -> String {
    date.format(SALE_DATE_FORMAT).to_string()
}

// =============================================================================
// Sale Receipt
// =============================================================================

/// Successful outcome of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    /// Product as stored after the sale.
    pub product: Product,
    pub quantity_sold: i64,
    pub sale_value: Money,
    pub remaining_stock: i64,
    pub sale_record: SaleRecord,
}

// =============================================================================
// Commit
// =============================================================================

/// Validates and applies a sale to `product`.
///
/// On error the product is left untouched.
///
/// ## Errors
/// - `Validation` when `quantity` is not positive
/// - `InsufficientStock` when `quantity` exceeds the units on hand
pub fn apply_sale(
    product: &mut Product,
    quantity: i64,
    sale_id: impl Into<String>,
    at: DateTime<Utc>,
) -> CoreResult<SaleReceipt> {
    validate_quantity(quantity)?;

    let available = product.stock();
    if quantity > available {
        return Err(CoreError::InsufficientStock {
            sku: product.sku.clone(),
            available,
            requested: quantity,
        });
    }

    product.quantity = available - quantity;
    let record = SaleRecord::new(sale_id, product, quantity, at);

    Ok(SaleReceipt {
        product: product.clone(),
        quantity_sold: quantity,
        sale_value: record.total_value,
        remaining_stock: product.quantity,
        sale_record: record,
    })
}
