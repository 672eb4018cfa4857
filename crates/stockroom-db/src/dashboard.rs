//! # Dashboard
//!
//! Reads the catalog and the ledger of one store and runs the analytics
//! engines over them.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products ─────────┬──────────────────────────────┐                     │
//! │                    │                              │                     │
//! │  sales ──► ConsumptionHistory (last history_days) │                     │
//! │                    │                              │                     │
//! │  pricing_config ──►│ Analytics::snapshot()        │                     │
//! │                    ▼                              ▼                     │
//! │             AnalyticsSnapshot ──► KpiReport  (inventory totals)         │
//! │                    │                                                    │
//! │                    └────────► recommendations                           │
//! │                                                                         │
//! │  sales ──► SalesStats                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engines run once per report; the KPI block and the advisories are
//! derived from the same snapshot. Consumption history covers the
//! `history_days` calendar days ending on the report date, zero-sale days
//! included; panels without an explicit date use the local calendar day.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use stockroom_core::alerts::{self, AlertSummary};
use stockroom_core::anticipation::project_restock;
use stockroom_core::kpi::{recommendations_from, AnalyticsSnapshot};
use stockroom_core::pricing::RandomSampler;
use stockroom_core::sales_stats::{self, SalesStats};
use stockroom_core::{
    Analytics, AnalyticsConfig, ConsumptionHistory, KpiReport, PricingEngine, PricingSummary, Product,
    Recommendation, RestockSummary, SaleRecord, StoreProfile,
};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::store::{read_list, Store};

// =============================================================================
// Cost Volatility
// =============================================================================

/// Where ingredient cost perturbation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostVolatility {
    /// Ingredient costs stay at their base value.
    #[default]
    Fixed,
    /// Reproducible draws.
    Seeded(u64),
    /// Draws seeded from the operating system.
    Random,
}

// =============================================================================
// Report
// =============================================================================

/// Everything the dashboard panels show, computed from one read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub profile: StoreProfile,
    pub kpis: KpiReport,
    pub snapshot: AnalyticsSnapshot,
    pub recommendations: Vec<Recommendation>,
    pub sales: SalesStats,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Analytics over one store.
#[derive(Debug)]
pub struct Dashboard<S> {
    store: Store<S>,
    config: AnalyticsConfig,
    volatility: CostVolatility,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Dashboard with the profile's default modules and numbers.
    pub fn for_profile(store: Store<S>) -> Self {
        let config = AnalyticsConfig::for_profile(store.profile());
        Self::with_config(store, config)
    }

    pub fn with_config(store: Store<S>, config: AnalyticsConfig) -> Self {
        Dashboard {
            store,
            config,
            volatility: CostVolatility::Fixed,
        }
    }

    pub fn with_volatility(mut self, volatility: CostVolatility) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Pricing engine for this store, saved pricing config applied.
    pub async fn pricing_engine(&self) -> DbResult<PricingEngine> {
        let saved = self.store.settings().pricing_config().await?;
        let engine = PricingEngine::new(self.config.pricing.clone().with_config(saved));

        Ok(match self.volatility {
            CostVolatility::Fixed => engine,
            CostVolatility::Seeded(seed) => engine.with_sampler(RandomSampler::seeded(seed)),
            CostVolatility::Random => engine.with_sampler(RandomSampler::from_entropy()),
        })
    }

    async fn analytics(&self) -> DbResult<Analytics> {
        let engine = self.pricing_engine().await?;
        let mut config = self.config.clone();
        config.pricing = engine.profile().clone();
        Ok(Analytics::with_pricing_engine(config, engine))
    }

    fn history(&self, sales: &[SaleRecord], today: NaiveDate) -> Option<ConsumptionHistory> {
        history_from(sales, today, self.config.anticipation.history_days)
    }

    async fn load(&self) -> DbResult<(Vec<Product>, Vec<SaleRecord>)> {
        let keys = self.store.keys();
        let products = read_list(self.store.kv(), &keys.products).await?;
        let sales = read_list(self.store.kv(), &keys.sales).await?;
        Ok((products, sales))
    }

    // =========================================================================
    // Full Report
    // =========================================================================

    /// Computes every panel as of `today`.
    pub async fn report(&self, today: NaiveDate) -> DbResult<DashboardReport> {
        let start = Instant::now();
        let (products, sales) = self.load().await?;
        let history = self.history(&sales, today);

        let mut analytics = self.analytics().await?;
        let snapshot = analytics.snapshot(&products, history.as_ref());
        let kpis = Analytics::report_from(&products, &snapshot);
        let recommendations = recommendations_from(&snapshot, self.config.anticipation.urgent_days);
        let sales = sales_stats::sales_stats(&sales, today);

        info!(
            profile = %self.store.profile(),
            products = products.len(),
            health = kpis.health.score,
            recommendations = recommendations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed dashboard report"
        );

        Ok(DashboardReport {
            profile: self.store.profile(),
            kpis,
            snapshot,
            recommendations,
            sales,
        })
    }

    /// Headline KPIs only.
    pub async fn kpis(&self) -> DbResult<KpiReport> {
        let start = Instant::now();
        let (products, sales) = self.load().await?;
        let history = self.history(&sales, local_today());

        let kpis = self.analytics().await?.calculate_kpis(&products, history.as_ref());
        debug!(
            health = kpis.health.score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed KPIs"
        );
        Ok(kpis)
    }

    /// Advisories, most urgent first.
    pub async fn recommendations(&self) -> DbResult<Vec<Recommendation>> {
        let (products, sales) = self.load().await?;
        let history = self.history(&sales, local_today());
        Ok(self
            .analytics()
            .await?
            .generate_recommendations(&products, history.as_ref()))
    }

    // =========================================================================
    // Panels
    // =========================================================================
    //
    // A panel runs its engine even when the module is off in the config;
    // opening the panel is an explicit request.

    /// Stock alert tiers with the configured thresholds.
    pub async fn alerts(&self) -> DbResult<AlertSummary> {
        let (products, _) = self.load().await?;
        Ok(alerts::classify(&products, &self.config.alerts))
    }

    /// Products with stock left but at or below `threshold`.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let (products, _) = self.load().await?;
        Ok(alerts::low_stock_products(&products, threshold))
    }

    /// Restock projection over `horizon_days`. Zero uses the configured horizon.
    pub async fn restock(&self, horizon_days: u32) -> DbResult<RestockSummary> {
        let (products, sales) = self.load().await?;
        let history = self.history(&sales, local_today());
        let config = self.config.anticipation.with_horizon(horizon_days);

        let summary = project_restock(&products, &config, history.as_ref());
        debug!(
            horizon_days = config.horizon_days,
            needing_restock = summary.total_products_needing_restock,
            "Projected restock"
        );
        Ok(summary)
    }

    /// Pricing analysis of the whole catalog.
    pub async fn pricing(&self) -> DbResult<PricingSummary> {
        let (products, _) = self.load().await?;
        Ok(self.pricing_engine().await?.summarize(&products))
    }

    /// Sales and financial figures as of `today`.
    pub async fn sales(&self, today: NaiveDate) -> DbResult<SalesStats> {
        let (_, sales) = self.load().await?;
        Ok(sales_stats::sales_stats(&sales, today))
    }
}

fn history_from(sales: &[SaleRecord], today: NaiveDate, window_days: u32) -> Option<ConsumptionHistory> {
    let history = ConsumptionHistory::from_sales(sales, today, window_days);
    (!history.is_empty()).then_some(history)
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
