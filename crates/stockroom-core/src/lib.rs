//! # stockroom-core: Pure Business Logic for the Stockroom Dashboards
//!
//! Every calculator behind the inventory dashboards lives here as a pure
//! function of the product list (and, where relevant, the sales ledger).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard UI (browser)                       │   │
//! │  │   Catalog ──► Stock alerts ──► Restock ──► Pricing ──► KPIs     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  alerts   │  │anticipation│  │  pricing  │  │    kpi    │  │   │
//! │  │   │ out/crit/ │  │ daily use, │  │ bands,    │  │ health,   │  │   │
//! │  │   │ low tiers │  │ reorder    │  │ margins   │  │ advisories│  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money    │  │   sale    │  │  catalog  │  │   │
//! │  │   │  Product  │  │   Money    │  │ SaleRecord│  │ search,   │  │   │
//! │  │   │           │  │ (CLP)      │  │ apply_sale│  │ import    │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Storage Layer)                   │   │
//! │  │      key-value ledger, sale transactions, CSV, configuration    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product and its creation input
//! - [`money`] - Whole-unit CLP amounts
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and lenient numeric coercion
//! - [`alerts`] - Stock alert tiers
//! - [`anticipation`] - Consumption estimates and restock projection
//! - [`pricing`] - Category bands, margins and price recommendations
//! - [`kpi`] - Health score, KPI report and advisories
//! - [`sale`] - Sale records and the in-memory sale step
//! - [`sales_stats`] - Revenue figures and trends
//! - [`catalog`] - Search, inventory totals and the import merge
//! - [`profile`] - Store profiles and the analytics configuration
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same products in, same report out (the random cost
//!    sampler is the one opt-in exception)
//! 2. **No I/O**: storage and spreadsheets belong to `stockroom-db`
//! 3. **Integer Money**: CLP has no minor unit, amounts are whole `i64` units
//! 4. **Never Fail on Data**: calculators coerce missing numbers to zero
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::pricing::{calculate_price, PricingProfile};
//! use stockroom_core::PriceCategory;
//!
//! // cost 10.000 at a 30% margin
//! assert_eq!(calculate_price(10_000.0, 30).units(), 13_000);
//!
//! let profile = PricingProfile::trading_cards();
//! assert_eq!(profile.margin_for(PriceCategory::Premium), 40);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod anticipation;
pub mod catalog;
pub mod error;
pub mod kpi;
pub mod money;
pub mod pricing;
pub mod profile;
pub mod sale;
pub mod sales_stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use alerts::{AlertSummary, AlertThresholds, StockAlert};
pub use anticipation::{AnticipationConfig, ConsumptionHistory, RestockSummary};
pub use catalog::{ImportReport, ImportRow, InventoryStats};
pub use error::{CoreError, CoreResult, ValidationError};
pub use kpi::{Analytics, HealthScore, HealthStatus, KpiReport, Recommendation};
pub use money::Money;
pub use pricing::{PriceAction, PriceCategory, PricingConfig, PricingEngine, PricingProfile, PricingSummary};
pub use profile::{AnalyticsConfig, AnalyticsModules, StoreProfile};
pub use sale::{SaleReceipt, SaleRecord};
pub use sales_stats::SalesStats;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency code shown next to every amount.
pub const CURRENCY: &str = "CLP";
