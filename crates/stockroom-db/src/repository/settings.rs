//! # Settings Repository
//!
//! The login flag and the operator's pricing configuration.
//!
//! The login flag is a plain `"true"` under `isAuthenticated`; no
//! credential is ever stored. The pricing configuration overrides the
//! profile's bands and margins until it is reset.

use stockroom_core::{PricingConfig, PricingProfile};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::kv::KeyValueStore;
use crate::store::Store;

const AUTHENTICATED: &str = "true";

/// Repository for store settings.
#[derive(Debug)]
pub struct SettingsRepository<S> {
    store: Store<S>,
}

impl<S: KeyValueStore> SettingsRepository<S> {
    pub fn new(store: Store<S>) -> Self {
        SettingsRepository { store }
    }

    // =========================================================================
    // Login Flag
    // =========================================================================

    /// Marks the session as logged in when both fields are non-blank.
    ///
    /// Returns whether the flag was set.
    pub async fn login(&self, email: &str, password: &str) -> DbResult<bool> {
        if email.trim().is_empty() || password.trim().is_empty() {
            debug!("Login rejected, blank email or password");
            return Ok(false);
        }

        self.store.kv().set(&self.store.keys().auth, AUTHENTICATED).await?;
        info!("Logged in");
        Ok(true)
    }

    pub async fn logout(&self) -> DbResult<()> {
        self.store.kv().remove(&self.store.keys().auth).await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> DbResult<bool> {
        let flag = self.store.kv().get(&self.store.keys().auth).await?;
        Ok(flag.as_deref() == Some(AUTHENTICATED))
    }

    // =========================================================================
    // Pricing Configuration
    // =========================================================================

    /// The saved pricing config, or the profile defaults.
    ///
    /// A stored value that no longer parses is ignored with a warning.
    pub async fn pricing_config(&self) -> DbResult<PricingConfig> {
        let defaults = self.store.profile().pricing_profile().config;
        let key = &self.store.keys().pricing_config;

        let Some(raw) = self.store.kv().get(key).await? else {
            return Ok(defaults);
        };

        match serde_json::from_str::<PricingConfig>(&raw) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored pricing config is unreadable, using defaults");
                Ok(defaults)
            }
        }
    }

    /// Validates and stores a pricing config.
    pub async fn save_pricing_config(&self, config: &PricingConfig) -> DbResult<()> {
        config.validate()?;

        let _guard = self.store.lock().await;
        self.store
            .kv()
            .set(&self.store.keys().pricing_config, &serde_json::to_string(config)?)
            .await?;

        info!(
            premium_margin = config.margins.premium,
            standard_margin = config.margins.standard,
            basic_margin = config.margins.basic,
            "Saved pricing config"
        );
        Ok(())
    }

    /// Drops the saved config so the profile defaults apply again.
    pub async fn reset_pricing_config(&self) -> DbResult<()> {
        let _guard = self.store.lock().await;
        self.store.kv().remove(&self.store.keys().pricing_config).await?;
        info!("Reset pricing config to profile defaults");
        Ok(())
    }

    /// The profile's pricing numbers with the saved config applied.
    pub async fn pricing_profile(&self) -> DbResult<PricingProfile> {
        let config = self.pricing_config().await?;
        Ok(self.store.profile().pricing_profile().with_config(config))
    }
}
