//! # Restock Anticipation
//!
//! Projects which products will run out within the restock horizon and how
//! many units to order.
//!
//! ## Projection Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each product                                                       │
//! │                                                                         │
//! │  daily_consumption ◄── history mean over the window (if it sold)       │
//! │         │          ◄── price tier heuristic otherwise                   │
//! │         ▼                                                               │
//! │  needed = daily × horizon_days                                          │
//! │         │                                                               │
//! │         ├── stock >= needed → skip                                     │
//! │         │                                                               │
//! │         └── stock <  needed → RestockItem                              │
//! │                 needed_stock        = ceil(needed)                      │
//! │                 days_until_out      = floor(stock / max(daily, 0.1))    │
//! │                 recommended_order   = ceil(needed - stock)              │
//! │                                                                         │
//! │  Items sorted by days_until_out (stable), urgent = days <= cutoff       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! History built from the ledger covers the last `history_days` calendar
//! days, zero-sale days included. A single sale is spread over the window
//! instead of becoming the product's rate.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::sale::{sale_date_label, SaleRecord};
use crate::types::Product;

/// Lower bound on the consumption rate used as a divisor.
const MIN_CONSUMPTION_DIVISOR: f64 = 0.1;

/// Longest ledger window a history is built over.
pub const MAX_HISTORY_DAYS: u32 = 365;

// =============================================================================
// Configuration
// =============================================================================

/// Price-tier consumption heuristic used when a product has no history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionTiers {
    /// Prices strictly above this sell `slow_rate` units per day.
    pub high_price: Money,
    /// Prices from this value up to `high_price` sell `medium_rate`.
    pub mid_price: Money,
    pub slow_rate: f64,
    pub medium_rate: f64,
    pub fast_rate: f64,
}

impl Default for ConsumptionTiers {
    fn default() -> Self {
        ConsumptionTiers {
            high_price: Money::from_units(50_000),
            mid_price: Money::from_units(25_000),
            slow_rate: 0.1,
            medium_rate: 0.3,
            fast_rate: 0.5,
        }
    }
}

/// Horizon, urgency cutoff, history window and fallback heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnticipationConfig {
    pub horizon_days: u32,
    pub urgent_days: i64,
    /// Calendar days of sales, ending today, that feed the consumption rate.
    pub history_days: u32,
    pub tiers: ConsumptionTiers,
}

impl Default for AnticipationConfig {
    fn default() -> Self {
        AnticipationConfig {
            horizon_days: 7,
            urgent_days: 3,
            history_days: 28,
            tiers: ConsumptionTiers::default(),
        }
    }
}

impl AnticipationConfig {
    /// Same configuration with a different horizon. Zero keeps the current one.
    pub fn with_horizon(mut self, days: u32) -> Self {
        if days > 0 {
            self.horizon_days = days;
        }
        self
    }
}

// =============================================================================
// Consumption History
// =============================================================================

/// Units of one product consumed on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionEntry {
    pub date: String,
    pub quantity_consumed: f64,
}

/// Per-product consumption entries keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsumptionHistory {
    entries: HashMap<String, Vec<ConsumptionEntry>>,
}

impl ConsumptionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units sold per product per local day over the `window_days` days
    /// ending on `today`.
    ///
    /// Every product sold inside the window gets one entry per calendar day,
    /// zero on days without a sale, so the entry mean is units sold divided by
    /// the window length. Products with no sale in the window get no entries
    /// and fall back to the price tier. The window is capped at
    /// [`MAX_HISTORY_DAYS`]; a zero window yields an empty history.
    pub fn from_sales(sales: &[SaleRecord], today: NaiveDate, window_days: u32) -> Self {
        let mut history = ConsumptionHistory::new();
        let window = window_days.min(MAX_HISTORY_DAYS) as usize;
        if window == 0 {
            return history;
        }
        let first = today - Duration::days(window as i64 - 1);

        let mut per_day: HashMap<&str, Vec<f64>> = HashMap::new();
        for sale in sales {
            let day = sale.local_date();
            if day < first || day > today {
                continue;
            }
            let slot = (day - first).num_days() as usize;
            per_day
                .entry(sale.product_id.as_str())
                .or_insert_with(|| vec![0.0; window])[slot] += sale.quantity.max(0) as f64;
        }

        for (product_id, units) in per_day {
            let entries = units
                .into_iter()
                .enumerate()
                .map(|(offset, quantity_consumed)| ConsumptionEntry {
                    date: sale_date_label(first + Duration::days(offset as i64)),
                    quantity_consumed,
                })
                .collect();
            history.entries.insert(product_id.to_string(), entries);
        }

        history
    }

    /// Appends an entry for a product.
    pub fn record(&mut self, product_id: impl Into<String>, entry: ConsumptionEntry) {
        self.entries.entry(product_id.into()).or_default().push(entry);
    }

    /// Entries for a product; empty when none were recorded.
    pub fn entries_for(&self, product_id: &str) -> &[ConsumptionEntry] {
        self.entries
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Results
// =============================================================================

/// A product projected to run short within the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestockItem {
    pub product: Product,
    pub current_stock: i64,
    pub needed_stock: i64,
    pub daily_consumption: f64,
    pub days_until_out_of_stock: i64,
    pub recommended_order: i64,
}

/// Urgent subset of the restock list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UrgentRestock {
    pub count: usize,
    pub items: Vec<RestockItem>,
}

/// Output of [`project_restock`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestockSummary {
    pub total_products_needing_restock: usize,
    pub total_recommended_order: i64,
    pub urgent: UrgentRestock,
    pub items: Vec<RestockItem>,
}

// =============================================================================
// Calculations
// =============================================================================

/// Average daily consumption for a product.
///
/// Uses the mean of `entries` when there are any, otherwise the price tier.
pub fn daily_consumption(product: &Product, entries: &[ConsumptionEntry], tiers: &ConsumptionTiers) -> f64 {
    if !entries.is_empty() {
        let total: f64 = entries
            .iter()
            .map(|e| if e.quantity_consumed.is_finite() { e.quantity_consumed } else { 0.0 })
            .sum();
        return total / entries.len() as f64;
    }

    if product.price > tiers.high_price {
        tiers.slow_rate
    } else if product.price >= tiers.mid_price {
        tiers.medium_rate
    } else {
        tiers.fast_rate
    }
}

/// Units required to cover `days` of consumption (unrounded).
pub fn needed_stock(product: &Product, days: u32, entries: &[ConsumptionEntry], tiers: &ConsumptionTiers) -> f64 {
    daily_consumption(product, entries, tiers) * days as f64
}

/// Products whose stock will not cover the horizon, most urgent first.
pub fn products_needing_restock(
    products: &[Product],
    config: &AnticipationConfig,
    history: Option<&ConsumptionHistory>,
) -> Vec<RestockItem> {
    let mut items: Vec<RestockItem> = products
        .iter()
        .filter_map(|product| {
            let entries = history.map(|h| h.entries_for(&product.id)).unwrap_or(&[]);
            let daily = daily_consumption(product, entries, &config.tiers);
            let needed = daily * config.horizon_days as f64;
            let current = product.stock();

            if (current as f64) >= needed {
                return None;
            }

            Some(RestockItem {
                product: product.clone(),
                current_stock: current,
                needed_stock: needed.ceil() as i64,
                daily_consumption: daily,
                days_until_out_of_stock: (current as f64 / daily.max(MIN_CONSUMPTION_DIVISOR)).floor()
                    as i64,
                recommended_order: (needed - current as f64).ceil() as i64,
            })
        })
        .collect();

    items.sort_by_key(|item| item.days_until_out_of_stock);
    items
}

/// Full restock projection with totals and the urgent subset.
pub fn project_restock(
    products: &[Product],
    config: &AnticipationConfig,
    history: Option<&ConsumptionHistory>,
) -> RestockSummary {
    let items = products_needing_restock(products, config, history);

    let urgent: Vec<RestockItem> = items
        .iter()
        .filter(|item| item.days_until_out_of_stock <= config.urgent_days)
        .cloned()
        .collect();

    RestockSummary {
        total_products_needing_restock: items.len(),
        total_recommended_order: items
            .iter()
            .map(|item| item.recommended_order)
            .fold(0, i64::saturating_add),
        urgent: UrgentRestock {
            count: urgent.len(),
            items: urgent,
        },
        items,
    }
}
