//! # Store Profiles
//!
//! One codebase serves three storefronts. A [`StoreProfile`] picks the
//! storage key prefix and the default analytics setup; [`AnalyticsConfig`]
//! is resolved once at startup and says which analytics modules run.
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────────────────┐
//! │ Profile      │ Key prefix   │ Modules                                 │
//! ├──────────────┼──────────────┼─────────────────────────────────────────┤
//! │ HenchoTcg    │ hencho_tcg_  │ anticipation, pricing                   │
//! │ Mochima      │ mochima_     │ alerts, pricing (ingredient volatility) │
//! │ Basic        │ (none)       │ alerts                                  │
//! └──────────────┴──────────────┴─────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::alerts::AlertThresholds;
use crate::anticipation::AnticipationConfig;
use crate::error::ValidationError;
use crate::pricing::PricingProfile;

// =============================================================================
// Store Profile
// =============================================================================

/// Which storefront the ledger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StoreProfile {
    /// Trading card shop.
    HenchoTcg,
    /// Japanese food counter.
    Mochima,
    /// Plain inventory without analytics beyond stock alerts.
    Basic,
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile::Basic
    }
}

impl StoreProfile {
    /// Prefix applied to every storage key of this profile.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            StoreProfile::HenchoTcg => "hencho_tcg_",
            StoreProfile::Mochima => "mochima_",
            StoreProfile::Basic => "",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StoreProfile::HenchoTcg => "Hencho TCG",
            StoreProfile::Mochima => "Mochima",
            StoreProfile::Basic => "Inventory",
        }
    }

    /// Default pricing numbers for this storefront.
    pub fn pricing_profile(&self) -> PricingProfile {
        match self {
            StoreProfile::Mochima => PricingProfile::food_counter(),
            StoreProfile::HenchoTcg | StoreProfile::Basic => PricingProfile::trading_cards(),
        }
    }

    /// Analytics modules enabled out of the box.
    pub fn default_modules(&self) -> AnalyticsModules {
        match self {
            StoreProfile::HenchoTcg => AnalyticsModules {
                alerts: false,
                anticipation: true,
                pricing: true,
            },
            StoreProfile::Mochima => AnalyticsModules {
                alerts: true,
                anticipation: false,
                pricing: true,
            },
            StoreProfile::Basic => AnalyticsModules {
                alerts: true,
                anticipation: false,
                pricing: false,
            },
        }
    }
}

impl fmt::Display for StoreProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreProfile::HenchoTcg => "hencho_tcg",
            StoreProfile::Mochima => "mochima",
            StoreProfile::Basic => "basic",
        };
        f.write_str(name)
    }
}

impl FromStr for StoreProfile {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "hencho_tcg" | "hencho" | "tcg" => Ok(StoreProfile::HenchoTcg),
            "mochima" => Ok(StoreProfile::Mochima),
            "basic" => Ok(StoreProfile::Basic),
            _ => Err(ValidationError::NotAllowed {
                field: "profile".to_string(),
                allowed: vec![
                    "hencho_tcg".to_string(),
                    "mochima".to_string(),
                    "basic".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Analytics Configuration
// =============================================================================

/// Optional analytics modules. Disabled modules report zeroed summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsModules {
    pub alerts: bool,
    pub anticipation: bool,
    pub pricing: bool,
}

/// Thresholds, horizon and pricing used by the dashboards of one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsConfig {
    pub modules: AnalyticsModules,
    pub alerts: AlertThresholds,
    pub anticipation: AnticipationConfig,
    pub pricing: PricingProfile,
}

impl AnalyticsConfig {
    /// Profile defaults.
    pub fn for_profile(profile: StoreProfile) -> Self {
        AnalyticsConfig {
            modules: profile.default_modules(),
            alerts: AlertThresholds::default(),
            anticipation: AnticipationConfig::default(),
            pricing: profile.pricing_profile(),
        }
    }

    /// Every module switched on, profile numbers kept.
    pub fn all_modules(profile: StoreProfile) -> Self {
        AnalyticsConfig {
            modules: AnalyticsModules {
                alerts: true,
                anticipation: true,
                pricing: true,
            },
            ..Self::for_profile(profile)
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::for_profile(StoreProfile::default())
    }
}
