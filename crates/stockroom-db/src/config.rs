//! # Store Configuration
//!
//! Which storefront this installation serves, where its ledger lives and
//! how the dashboards are tuned.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_PROFILE=mochima                                          │
//! │     STOCKROOM_DB_PATH=/var/lib/stockroom/mochima.db                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockroom.dashboard/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Basic profile, database in the platform data dir                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! profile = "hencho_tcg"   # hencho_tcg | mochima | basic
//!
//! [database]
//! path = "/var/lib/stockroom/hencho.db"
//! max_connections = 5
//!
//! [analytics]
//! anticipation = true      # omit to keep the profile default
//! low_stock_threshold = 10
//! critical_stock_threshold = 5
//! horizon_days = 7
//! urgent_days = 3
//! history_days = 28
//! volatility = "fixed"     # fixed | random
//! volatility_seed = 42     # optional, makes random draws reproducible
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stockroom_core::anticipation::MAX_HISTORY_DAYS;
use stockroom_core::{AnalyticsConfig, StoreProfile};
use tracing::{debug, info, warn};

use crate::dashboard::CostVolatility;
use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

const CONFIG_FILE_NAME: &str = "stockroom.toml";
const DATABASE_FILE_NAME: &str = "stockroom.db";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub profile: StoreProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Ingredient cost perturbation on the pricing panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityMode {
    #[default]
    Fixed,
    Random,
}

impl std::str::FromStr for VolatilityMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "off" => Ok(VolatilityMode::Fixed),
            "random" | "on" => Ok(VolatilityMode::Random),
            other => Err(DbError::InvalidConfig(format!(
                "Unknown volatility mode: '{}'. Valid options: fixed, random",
                other
            ))),
        }
    }
}

/// Dashboard tuning. Module switches left unset keep the profile default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anticipation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<bool>,

    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,

    #[serde(default = "default_critical_stock")]
    pub critical_stock_threshold: i64,

    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,

    #[serde(default = "default_urgent_days")]
    pub urgent_days: i64,

    /// Days of sales history behind the consumption rate.
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    #[serde(default)]
    pub volatility: VolatilityMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_seed: Option<u64>,
}

fn default_low_stock() -> i64 {
    10
}
fn default_critical_stock() -> i64 {
    5
}
fn default_horizon_days() -> u32 {
    7
}
fn default_urgent_days() -> i64 {
    3
}
fn default_history_days() -> u32 {
    28
}

impl Default for AnalyticsSection {
    fn default() -> Self {
        AnalyticsSection {
            alerts: None,
            anticipation: None,
            pricing: None,
            low_stock_threshold: default_low_stock(),
            critical_stock_threshold: default_critical_stock(),
            horizon_days: default_horizon_days(),
            urgent_days: default_urgent_days(),
            history_days: default_history_days(),
            volatility: VolatilityMode::default(),
            volatility_seed: None,
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Complete installation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub analytics: AnalyticsSection,
}

impl StoreConfig {
    /// Defaults for one profile.
    pub fn for_profile(profile: StoreProfile) -> Self {
        StoreConfig {
            store: StoreSection { profile },
            ..Self::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> DbResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DbError::ConfigWrite("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    pub fn validate(&self) -> DbResult<()> {
        let analytics = &self.analytics;

        if analytics.critical_stock_threshold < 0 {
            return Err(DbError::InvalidConfig(
                "critical_stock_threshold must not be negative".into(),
            ));
        }
        if analytics.low_stock_threshold < analytics.critical_stock_threshold {
            return Err(DbError::InvalidConfig(format!(
                "low_stock_threshold ({}) must be at least critical_stock_threshold ({})",
                analytics.low_stock_threshold, analytics.critical_stock_threshold
            )));
        }
        if analytics.horizon_days == 0 {
            return Err(DbError::InvalidConfig("horizon_days must be greater than 0".into()));
        }
        if analytics.history_days == 0 || analytics.history_days > MAX_HISTORY_DAYS {
            return Err(DbError::InvalidConfig(format!(
                "history_days must be between 1 and {}",
                MAX_HISTORY_DAYS
            )));
        }
        if analytics.urgent_days < 0 {
            return Err(DbError::InvalidConfig("urgent_days must not be negative".into()));
        }
        if self.database.max_connections == 0 {
            return Err(DbError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `STOCKROOM_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(profile) = lookup("STOCKROOM_PROFILE") {
            match profile.parse() {
                Ok(parsed) => {
                    debug!(profile = %profile, "Overriding store profile from environment");
                    self.store.profile = parsed;
                }
                Err(_) => warn!(profile = %profile, "Unknown store profile in environment"),
            }
        }

        if let Some(path) = lookup("STOCKROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(days) = lookup("STOCKROOM_HORIZON_DAYS") {
            if let Ok(d) = days.parse::<u32>() {
                self.analytics.horizon_days = d;
            }
        }

        if let Some(mode) = lookup("STOCKROOM_VOLATILITY") {
            match mode.parse() {
                Ok(parsed) => self.analytics.volatility = parsed,
                Err(_) => warn!(mode = %mode, "Unknown volatility mode in environment"),
            }
        }

        if let Some(seed) = lookup("STOCKROOM_VOLATILITY_SEED") {
            if let Ok(s) = seed.parse::<u64>() {
                self.analytics.volatility_seed = Some(s);
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "stockroom", "dashboard")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    pub fn profile(&self) -> StoreProfile {
        self.store.profile
    }

    /// Configured database file, else the platform data dir, else the
    /// working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.database.max_connections)
    }

    /// Profile defaults with this file's switches and numbers applied.
    pub fn analytics_config(&self) -> AnalyticsConfig {
        let mut config = AnalyticsConfig::for_profile(self.profile());
        let section = &self.analytics;

        if let Some(on) = section.alerts {
            config.modules.alerts = on;
        }
        if let Some(on) = section.anticipation {
            config.modules.anticipation = on;
        }
        if let Some(on) = section.pricing {
            config.modules.pricing = on;
        }

        config.alerts.low_stock = section.low_stock_threshold;
        config.alerts.critical_stock = section.critical_stock_threshold;
        config.anticipation = config.anticipation.with_horizon(section.horizon_days);
        config.anticipation.urgent_days = section.urgent_days;
        config.anticipation.history_days = section.history_days;
        config
    }

    pub fn cost_volatility(&self) -> CostVolatility {
        match (self.analytics.volatility, self.analytics.volatility_seed) {
            (VolatilityMode::Fixed, _) => CostVolatility::Fixed,
            (VolatilityMode::Random, Some(seed)) => CostVolatility::Seeded(seed),
            (VolatilityMode::Random, None) => CostVolatility::Random,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.profile(), StoreProfile::Basic);
        assert_eq!(config.analytics.horizon_days, 7);
        assert_eq!(config.analytics_config().anticipation.history_days, 28);
        assert!(config.validate().is_ok());

        let analytics = config.analytics_config();
        assert!(analytics.modules.alerts);
        assert!(!analytics.modules.pricing);
    }

    #[test]
    fn test_parse_file() {
        let text = r#"
            [store]
            profile = "hencho_tcg"

            [database]
            path = "/tmp/hencho.db"

            [analytics]
            alerts = true
            horizon_days = 14
            history_days = 56
            volatility = "random"
            volatility_seed = 42
        "#;
        let config: StoreConfig = toml::from_str(text).unwrap();

        assert_eq!(config.profile(), StoreProfile::HenchoTcg);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/hencho.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.cost_volatility(), CostVolatility::Seeded(42));

        let analytics = config.analytics_config();
        assert!(analytics.modules.alerts);
        assert!(analytics.modules.anticipation);
        assert!(analytics.modules.pricing);
        assert_eq!(analytics.anticipation.horizon_days, 14);
        assert_eq!(analytics.anticipation.history_days, 56);
        assert_eq!(analytics.alerts.low_stock, 10);
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();

        config.analytics.low_stock_threshold = 3;
        assert!(config.validate().is_err());

        config.analytics.low_stock_threshold = 10;
        config.analytics.horizon_days = 0;
        assert!(config.validate().is_err());

        config.analytics.horizon_days = 30;
        assert!(config.validate().is_ok());

        config.analytics.history_days = 0;
        assert!(config.validate().is_err());
        config.analytics.history_days = MAX_HISTORY_DAYS + 1;
        assert!(config.validate().is_err());
        config.analytics.history_days = MAX_HISTORY_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STOCKROOM_PROFILE", "mochima"),
            ("STOCKROOM_DB_PATH", "/data/mochima.db"),
            ("STOCKROOM_HORIZON_DAYS", "not-a-number"),
            ("STOCKROOM_VOLATILITY", "random"),
        ]);

        let mut config = StoreConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.profile(), StoreProfile::Mochima);
        assert_eq!(config.database_path(), PathBuf::from("/data/mochima.db"));
        assert_eq!(config.analytics.horizon_days, 7);
        assert_eq!(config.cost_volatility(), CostVolatility::Random);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("stockroom-config-{}.toml", uuid::Uuid::new_v4()));
        let mut config = StoreConfig::for_profile(StoreProfile::Mochima);
        config.analytics.anticipation = Some(true);
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[store]"));
        assert!(text.contains("profile = \"mochima\""));

        let loaded: StoreConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).unwrap();
    }
}
