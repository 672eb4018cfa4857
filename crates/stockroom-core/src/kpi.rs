//! # KPI Dashboard
//!
//! Aggregates the alert, restock and pricing summaries into a single health
//! score and a prioritized list of advisories.
//!
//! ## Health Score
//! ```text
//! score = 100
//!       - 1   × total alerts
//!       - 3   × critical            (on top of the alert penalty)
//!       - 5   × out of stock        (on top of the alert penalty)
//!       - 2   × urgent restocks
//!       - 0.5 × (price increases + price decreases)
//!
//! round, clamp to 0..=100
//!
//!   80 ─────── 60 ─────── 40 ─────── 0
//!  Excellent │  Good   │  Fair   │ Critical
//! ```
//!
//! Modules switched off in [`AnalyticsConfig`] contribute zeroed summaries, so
//! they never move the score.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::alerts::{classify, AlertSummary};
use crate::anticipation::{project_restock, ConsumptionHistory, RestockSummary};
use crate::catalog::{inventory_stats, InventoryStats};
use crate::money::{round_half_up, Money};
use crate::pricing::{PricingEngine, PricingSummary};
use crate::profile::AnalyticsConfig;
use crate::types::{Product, ProductRef};

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => HealthStatus::Excellent,
            60..=79 => HealthStatus::Good,
            40..=59 => HealthStatus::Fair,
            _ => HealthStatus::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthScore {
    pub score: u8,
    pub status: HealthStatus,
}

impl HealthScore {
    /// Reported for an empty catalog.
    pub const EMPTY_CATALOG: HealthScore = HealthScore {
        score: 0,
        status: HealthStatus::Critical,
    };
}

/// Computes the health score from the three summaries.
pub fn compute_health(alerts: &AlertSummary, restock: &RestockSummary, pricing: &PricingSummary) -> HealthScore {
    let penalty = alerts.total_alerts as f64
        + 3.0 * alerts.critical_stock.count as f64
        + 5.0 * alerts.out_of_stock.count as f64
        + 2.0 * restock.urgent.count as f64
        + 0.5 * (pricing.needing_increase.count + pricing.needing_decrease.count) as f64;

    let score = round_half_up(100.0 - penalty).clamp(0, 100) as u8;
    HealthScore {
        score,
        status: HealthStatus::from_score(score),
    }
}

// =============================================================================
// KPI Report
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AlertCounts {
    pub total_alerts: usize,
    pub low_stock: usize,
    pub critical_stock: usize,
    pub out_of_stock: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnticipationCounts {
    pub products_needing_restock: usize,
    pub total_recommended_order: i64,
    pub urgent_products: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingCounts {
    pub products_needing_price_adjustment: usize,
    pub potential_revenue_increase: Money,
    pub products_with_adequate_price: usize,
}

/// Headline numbers for the KPI panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KpiReport {
    pub inventory: InventoryStats,
    pub alerts: AlertCounts,
    pub anticipation: AnticipationCounts,
    pub pricing: PricingCounts,
    pub health: HealthScore,
}

impl KpiReport {
    /// Fully zeroed report for a catalog with no products.
    pub fn empty() -> Self {
        KpiReport {
            inventory: InventoryStats::default(),
            alerts: AlertCounts::default(),
            anticipation: AnticipationCounts::default(),
            pricing: PricingCounts::default(),
            health: HealthScore::EMPTY_CATALOG,
        }
    }
}

// =============================================================================
// Recommendations
// =============================================================================

/// Ordered low to high so that sorting descending puts urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Stock,
    Anticipation,
    Pricing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Restock,
    Order,
    AdjustPrices,
}

/// One dashboard advisory with the products it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub priority: RecommendationPriority,
    pub category: RecommendationCategory,
    pub message: String,
    pub action: RecommendedAction,
    pub products: Vec<ProductRef>,
}

// =============================================================================
// Analytics
// =============================================================================

/// The three summaries computed over one catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsSnapshot {
    pub alerts: AlertSummary,
    pub anticipation: RestockSummary,
    pub pricing: PricingSummary,
}

/// Runs the enabled analytics modules for one store.
#[derive(Debug)]
pub struct Analytics {
    config: AnalyticsConfig,
    pricing: PricingEngine,
}

impl Analytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        let pricing = PricingEngine::new(config.pricing.clone());
        Analytics { config, pricing }
    }

    /// Uses a prepared engine, e.g. one with a random cost sampler.
    pub fn with_pricing_engine(config: AnalyticsConfig, pricing: PricingEngine) -> Self {
        Analytics { config, pricing }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn pricing_engine(&mut self) -> &mut PricingEngine {
        &mut self.pricing
    }

    /// Computes every enabled summary. Disabled ones stay at their default.
    pub fn snapshot(&mut self, products: &[Product], history: Option<&ConsumptionHistory>) -> AnalyticsSnapshot {
        let modules = self.config.modules;
        let mut snapshot = AnalyticsSnapshot::default();

        if modules.alerts {
            snapshot.alerts = classify(products, &self.config.alerts);
        }
        if modules.anticipation {
            snapshot.anticipation = project_restock(products, &self.config.anticipation, history);
        }
        if modules.pricing {
            snapshot.pricing = self.pricing.summarize(products);
        }

        snapshot
    }

    /// Headline KPIs. An empty catalog yields [`KpiReport::empty`].
    pub fn calculate_kpis(&mut self, products: &[Product], history: Option<&ConsumptionHistory>) -> KpiReport {
        if products.is_empty() {
            return KpiReport::empty();
        }

        let snapshot = self.snapshot(products, history);
        Self::report_from(products, &snapshot)
    }

    /// Builds the report from an already computed snapshot.
    pub fn report_from(products: &[Product], snapshot: &AnalyticsSnapshot) -> KpiReport {
        if products.is_empty() {
            return KpiReport::empty();
        }

        let AnalyticsSnapshot {
            alerts,
            anticipation,
            pricing,
        } = snapshot;

        KpiReport {
            inventory: inventory_stats(products),
            alerts: AlertCounts {
                total_alerts: alerts.total_alerts,
                low_stock: alerts.low_stock.count,
                critical_stock: alerts.critical_stock.count,
                out_of_stock: alerts.out_of_stock.count,
            },
            anticipation: AnticipationCounts {
                products_needing_restock: anticipation.total_products_needing_restock,
                total_recommended_order: anticipation.total_recommended_order,
                urgent_products: anticipation.urgent.count,
            },
            pricing: PricingCounts {
                products_needing_price_adjustment: pricing.needing_increase.count
                    + pricing.needing_decrease.count,
                potential_revenue_increase: pricing.total_potential_revenue,
                products_with_adequate_price: pricing.adequate.count,
            },
            health: compute_health(alerts, anticipation, pricing),
        }
    }

    /// Advisories, most urgent first.
    pub fn generate_recommendations(
        &mut self,
        products: &[Product],
        history: Option<&ConsumptionHistory>,
    ) -> Vec<Recommendation> {
        let snapshot = self.snapshot(products, history);
        recommendations_from(&snapshot, self.config.anticipation.urgent_days)
    }
}

/// Builds the advisory list from a snapshot.
///
/// Sorting is stable, so advisories of equal priority keep the order in
/// which their conditions are checked.
pub fn recommendations_from(snapshot: &AnalyticsSnapshot, urgent_days: i64) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let alerts = &snapshot.alerts;

    if alerts.out_of_stock.count > 0 {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Urgent,
            category: RecommendationCategory::Stock,
            message: format!(
                "{} products out of stock. Restock immediately.",
                alerts.out_of_stock.count
            ),
            action: RecommendedAction::Restock,
            products: alerts.out_of_stock.products.iter().map(Product::to_ref).collect(),
        });
    }

    if alerts.critical_stock.count > 0 {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::High,
            category: RecommendationCategory::Stock,
            message: format!("{} products at critical stock.", alerts.critical_stock.count),
            action: RecommendedAction::Restock,
            products: alerts.critical_stock.products.iter().map(Product::to_ref).collect(),
        });
    }

    let urgent = &snapshot.anticipation.urgent;
    if urgent.count > 0 {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::High,
            category: RecommendationCategory::Anticipation,
            message: format!(
                "{} products will need restocking within {} days.",
                urgent.count, urgent_days
            ),
            action: RecommendedAction::Order,
            products: urgent.items.iter().map(|item| item.product.to_ref()).collect(),
        });
    }

    let increase = &snapshot.pricing.needing_increase;
    if increase.count > 0 {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Medium,
            category: RecommendationCategory::Pricing,
            message: format!("{} products priced below the recommendation.", increase.count),
            action: RecommendedAction::AdjustPrices,
            products: increase
                .items
                .iter()
                .map(|rec| ProductRef {
                    id: rec.product_id.clone(),
                    sku: rec.product_sku.clone(),
                    name: rec.product_name.clone(),
                })
                .collect(),
        });
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations
}
