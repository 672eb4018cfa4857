//! # Pricing Engine
//!
//! Recommends selling prices from cost, price band and margin.
//!
//! ## Recommendation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  cost ◄── explicit cost > 0                                             │
//! │       ◄── product.cost > 0                                              │
//! │       ◄── product.price × cost_estimate_ratio                           │
//! │       ◄── 0                                                             │
//! │    │                                                                    │
//! │    ├── + 30% of sampled ingredient cost, per ingredient in the name     │
//! │    ▼                                                                    │
//! │  category ◄── explicit, or band lookup on the current price             │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  recommended = round(cost × (1 + margin/100))                           │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  action: no current price │ increase (<90%) │ reduce (>110%) │ adequate │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cost Volatility
//! Ingredient costs are perturbed by `base × volatility × (u − 0.5)` where
//! `u` comes from a [`CostSampler`]. The default [`MidpointSampler`] always
//! returns 0.5, which makes every recommendation reproducible.
//! [`RandomSampler`] restores market-style jitter from any `rand::Rng`.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{round_half_up, Money};
use crate::types::Product;
use crate::validation::{validate_margin, ValidationResult};

/// Share of an ingredient's sampled cost added to the product cost.
const VARIABLE_COST_SHARE: f64 = 0.3;

/// Prices below this fraction of the recommendation should go up.
const INCREASE_BELOW: f64 = 0.9;

/// Prices above this multiple of the recommendation should come down.
const REDUCE_ABOVE: f64 = 1.1;

// =============================================================================
// Categories and Configuration
// =============================================================================

/// Price tier driving margin selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceCategory {
    Premium,
    Standard,
    Basic,
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceCategory::Premium => "premium",
            PriceCategory::Standard => "standard",
            PriceCategory::Basic => "basic",
        };
        f.write_str(label)
    }
}

/// A price range. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBand {
    pub min: Money,
    #[serde(default)]
    pub max: Option<Money>,
}

impl PriceBand {
    pub const fn new(min: i64, max: Option<i64>) -> Self {
        PriceBand {
            min: Money::from_units(min),
            max: match max {
                Some(m) => Some(Money::from_units(m)),
                None => None,
            },
        }
    }
}

/// Band boundaries for the three categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRanges {
    pub premium: PriceBand,
    pub standard: PriceBand,
    pub basic: PriceBand,
}

/// Margin percentage per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryMargins {
    pub premium: u32,
    pub standard: u32,
    pub basic: u32,
}

impl CategoryMargins {
    pub fn get(&self, category: PriceCategory) -> u32 {
        match category {
            PriceCategory::Premium => self.premium,
            PriceCategory::Standard => self.standard,
            PriceCategory::Basic => self.basic,
        }
    }
}

/// Operator-editable pricing settings, persisted as `<prefix>pricing_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub category_ranges: CategoryRanges,
    pub margins: CategoryMargins,
}

impl PricingConfig {
    /// Resolves the category of a current price.
    ///
    /// - premium: `price > premium.min`
    /// - standard: `standard.min < price <= standard.max`
    /// - basic: everything else
    pub fn category_for_price(&self, price: Money) -> PriceCategory {
        let ranges = &self.category_ranges;

        if price > ranges.premium.min {
            PriceCategory::Premium
        } else if price > ranges.standard.min && ranges.standard.max.map_or(true, |max| price <= max) {
            PriceCategory::Standard
        } else {
            PriceCategory::Basic
        }
    }

    /// Checks margins and band ordering before the config is saved.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_margin("margins.premium", self.margins.premium)?;
        validate_margin("margins.standard", self.margins.standard)?;
        validate_margin("margins.basic", self.margins.basic)?;

        let ranges = &self.category_ranges;
        for (name, band) in [
            ("categoryRanges.premium", ranges.premium),
            ("categoryRanges.standard", ranges.standard),
            ("categoryRanges.basic", ranges.basic),
        ] {
            if band.min.is_negative() {
                return Err(ValidationError::OutOfRange {
                    field: format!("{}.min", name),
                    min: 0,
                    max: i64::MAX,
                });
            }
            if let Some(max) = band.max {
                if max < band.min {
                    return Err(ValidationError::InvalidFormat {
                        field: name.to_string(),
                        reason: "max must not be below min".to_string(),
                    });
                }
            }
        }

        if ranges.premium.min < ranges.standard.min {
            return Err(ValidationError::InvalidFormat {
                field: "categoryRanges.premium.min".to_string(),
                reason: "must not be below the standard minimum".to_string(),
            });
        }

        Ok(())
    }
}

/// Ingredient whose market cost swings, detected by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariableCost {
    pub ingredient: String,
    pub base_cost: f64,
    pub volatility: f64,
}

impl VariableCost {
    pub fn new(ingredient: &str, base_cost: f64, volatility: f64) -> Self {
        VariableCost {
            ingredient: ingredient.to_string(),
            base_cost,
            volatility,
        }
    }
}

/// Everything the engine needs to price a catalog for one store profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingProfile {
    pub config: PricingConfig,
    /// Used when a category margin is configured as 0.
    pub default_margin: u32,
    /// Fraction of the current price assumed as cost when none is recorded.
    pub cost_estimate_ratio: f64,
    pub variable_costs: Vec<VariableCost>,
}

impl PricingProfile {
    /// Trading card shop: high-ticket boxes and singles.
    pub fn trading_cards() -> Self {
        PricingProfile {
            config: PricingConfig {
                category_ranges: CategoryRanges {
                    premium: PriceBand::new(50_000, None),
                    standard: PriceBand::new(25_000, Some(50_000)),
                    basic: PriceBand::new(0, Some(25_000)),
                },
                margins: CategoryMargins {
                    premium: 40,
                    standard: 30,
                    basic: 25,
                },
            },
            default_margin: 30,
            cost_estimate_ratio: 0.70,
            variable_costs: Vec::new(),
        }
    }

    /// Food counter: lower price points and perishable proteins.
    pub fn food_counter() -> Self {
        PricingProfile {
            config: PricingConfig {
                category_ranges: CategoryRanges {
                    premium: PriceBand::new(12_000, None),
                    standard: PriceBand::new(6_000, Some(12_000)),
                    basic: PriceBand::new(0, Some(6_000)),
                },
                margins: CategoryMargins {
                    premium: 40,
                    standard: 35,
                    basic: 30,
                },
            },
            default_margin: 35,
            cost_estimate_ratio: 0.65,
            variable_costs: vec![
                VariableCost::new("pollo", 3500.0, 0.15),
                VariableCost::new("salmon", 8000.0, 0.20),
                VariableCost::new("atun", 6000.0, 0.18),
            ],
        }
    }

    /// Same profile with an operator-saved config in place of the defaults.
    pub fn with_config(mut self, config: PricingConfig) -> Self {
        self.config = config;
        self
    }

    /// Margin for a category, falling back to the default when configured as 0.
    pub fn margin_for(&self, category: PriceCategory) -> u32 {
        match self.config.margins.get(category) {
            0 => self.default_margin,
            margin => margin,
        }
    }

    /// Variable-cost ingredients mentioned in a product name.
    ///
    /// Matching ignores case and accents, so "Salmón" matches `salmon`.
    pub fn detect_variable_ingredients(&self, product_name: &str) -> Vec<&VariableCost> {
        let name = fold_accents(product_name);
        self.variable_costs
            .iter()
            .filter(|vc| name.contains(&fold_accents(&vc.ingredient)))
            .collect()
    }
}

fn fold_accents(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

// =============================================================================
// Cost Sampling
// =============================================================================

/// Source of the uniform `[0, 1)` draw behind ingredient cost volatility.
pub trait CostSampler: Send + fmt::Debug {
    fn sample(&mut self) -> f64;
}

/// Always 0.5: ingredient costs stay at their base value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointSampler;

impl CostSampler for MidpointSampler {
    fn sample(&mut self) -> f64 {
        0.5
    }
}

/// Uniform draws from any random number generator.
#[derive(Debug, Clone)]
pub struct RandomSampler<R> {
    rng: R,
}

impl<R: Rng + Send + fmt::Debug> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        RandomSampler { rng }
    }
}

impl RandomSampler<StdRng> {
    /// Reproducible sampler for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        RandomSampler::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        RandomSampler::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send + fmt::Debug> CostSampler for RandomSampler<R> {
    fn sample(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

// =============================================================================
// Results
// =============================================================================

/// Suggested action for a product's current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceAction {
    NoCurrentPrice,
    IncreasePrice,
    ReducePrice,
    Adequate,
}

impl fmt::Display for PriceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceAction::NoCurrentPrice => "no current price",
            PriceAction::IncreasePrice => "increase price",
            PriceAction::ReducePrice => "reduce price",
            PriceAction::Adequate => "adequate",
        };
        f.write_str(label)
    }
}

/// Pricing analysis of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecommendation {
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    /// Resolved cost including ingredient surcharges, rounded.
    pub cost: Money,
    pub current_price: Option<Money>,
    pub recommended_price: Money,
    pub margin_percentage: u32,
    pub current_margin: Option<i64>,
    pub category: PriceCategory,
    pub variable_ingredients: Vec<String>,
    /// `recommended - current`, or `recommended` with no current price.
    pub price_difference: Money,
    pub recommendation: PriceAction,
}

/// Recommendations sharing an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecommendationBucket {
    pub count: usize,
    pub items: Vec<PriceRecommendation>,
}

impl RecommendationBucket {
    fn push(&mut self, item: PriceRecommendation) {
        self.count += 1;
        self.items.push(item);
    }
}

/// Catalog-wide pricing analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub total_products: usize,
    pub needing_increase: RecommendationBucket,
    pub needing_decrease: RecommendationBucket,
    pub adequate: RecommendationBucket,
    /// Sum of price differences over the increase and decrease buckets.
    pub total_potential_revenue: Money,
    pub recommendations: Vec<PriceRecommendation>,
}

// =============================================================================
// Free Functions
// =============================================================================

/// `round(cost × (1 + margin/100))`, or zero when cost is not positive.
pub fn calculate_price(cost: f64, margin_pct: u32) -> Money {
    if cost.is_nan() || cost <= 0.0 {
        return Money::zero();
    }
    Money::round_half_up(cost * (1.0 + margin_pct as f64 / 100.0))
}

/// Markup over cost in whole percent. Zero when cost or price is not positive.
pub fn calculate_margin(cost: f64, price: Money) -> i64 {
    if cost.is_nan() || cost <= 0.0 || !price.is_positive() {
        return 0;
    }
    round_half_up((price.as_f64() - cost) / cost * 100.0)
}

fn classify_action(current: Option<Money>, recommended: Money) -> PriceAction {
    let Some(current) = current else {
        return PriceAction::NoCurrentPrice;
    };

    let current = current.as_f64();
    let recommended = recommended.as_f64();

    if current < recommended * INCREASE_BELOW {
        PriceAction::IncreasePrice
    } else if current > recommended * REDUCE_ABOVE {
        PriceAction::ReducePrice
    } else {
        PriceAction::Adequate
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Prices products for one [`PricingProfile`].
#[derive(Debug)]
pub struct PricingEngine {
    profile: PricingProfile,
    sampler: Box<dyn CostSampler>,
}

impl PricingEngine {
    /// Deterministic engine using [`MidpointSampler`].
    pub fn new(profile: PricingProfile) -> Self {
        PricingEngine {
            profile,
            sampler: Box::new(MidpointSampler),
        }
    }

    /// Replaces the volatility source.
    pub fn with_sampler(mut self, sampler: impl CostSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn profile(&self) -> &PricingProfile {
        &self.profile
    }

    /// Current market cost of an ingredient, rounded.
    pub fn variable_cost(&mut self, ingredient: &VariableCost) -> f64 {
        let u = self.sampler.sample();
        let variation = ingredient.base_cost * ingredient.volatility * (u - 0.5);
        round_half_up(ingredient.base_cost + variation) as f64
    }

    fn resolve_cost(&self, product: &Product, explicit_cost: Option<Money>) -> f64 {
        if let Some(cost) = explicit_cost.filter(|c| c.is_positive()) {
            return cost.as_f64();
        }
        if let Some(cost) = product.known_cost() {
            return cost.as_f64();
        }
        if product.has_price() {
            return product.price.as_f64() * self.profile.cost_estimate_ratio;
        }
        0.0
    }

    /// Recommends a price for one product.
    pub fn recommend(
        &mut self,
        product: &Product,
        explicit_cost: Option<Money>,
        explicit_category: Option<PriceCategory>,
    ) -> PriceRecommendation {
        let mut cost = self.resolve_cost(product, explicit_cost);

        let ingredients: Vec<VariableCost> = self
            .profile
            .detect_variable_ingredients(&product.name)
            .into_iter()
            .cloned()
            .collect();
        for ingredient in &ingredients {
            cost += self.variable_cost(ingredient) * VARIABLE_COST_SHARE;
        }

        let category =
            explicit_category.unwrap_or_else(|| self.profile.config.category_for_price(product.price));
        let margin = self.profile.margin_for(category);
        let recommended = calculate_price(cost, margin);

        let current = Some(product.price).filter(|p| p.is_positive());
        let price_difference = match current {
            Some(price) => recommended - price,
            None => recommended,
        };

        PriceRecommendation {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_sku: product.sku.clone(),
            cost: Money::round_half_up(cost),
            current_price: current,
            recommended_price: recommended,
            margin_percentage: margin,
            current_margin: current.map(|price| calculate_margin(cost, price)),
            category,
            variable_ingredients: ingredients.into_iter().map(|i| i.ingredient).collect(),
            price_difference,
            recommendation: classify_action(current, recommended),
        }
    }

    /// Recommendations for every product, in catalog order.
    pub fn recommend_all(&mut self, products: &[Product]) -> Vec<PriceRecommendation> {
        products
            .iter()
            .map(|product| self.recommend(product, None, None))
            .collect()
    }

    /// Buckets recommendations by action and totals the actionable revenue.
    pub fn summarize(&mut self, products: &[Product]) -> PricingSummary {
        let recommendations = self.recommend_all(products);
        let mut summary = PricingSummary {
            total_products: products.len(),
            ..PricingSummary::default()
        };

        for rec in &recommendations {
            match rec.recommendation {
                PriceAction::IncreasePrice => summary.needing_increase.push(rec.clone()),
                PriceAction::ReducePrice => summary.needing_decrease.push(rec.clone()),
                PriceAction::Adequate => summary.adequate.push(rec.clone()),
                PriceAction::NoCurrentPrice => {}
            }
        }

        summary.total_potential_revenue = summary
            .needing_increase
            .items
            .iter()
            .chain(summary.needing_decrease.items.iter())
            .map(|rec| rec.price_difference)
            .sum();
        summary.recommendations = recommendations;
        summary
    }

    /// Returns copies of `products` priced at their recommendation.
    ///
    /// With `only_if_lower`, a product keeps its current price unless the
    /// recommendation is cheaper. The old price and `at` are recorded.
    pub fn apply_recommended_prices(
        &mut self,
        products: &[Product],
        only_if_lower: bool,
        at: DateTime<Utc>,
    ) -> Vec<Product> {
        products
            .iter()
            .map(|product| {
                let recommended = self.recommend(product, None, None).recommended_price;
                let new_price = if only_if_lower {
                    let current = if product.has_price() { product.price } else { recommended };
                    current.min(recommended)
                } else {
                    recommended
                };

                Product {
                    price: new_price,
                    previous_price: Some(product.price),
                    price_updated_at: Some(at),
                    ..product.clone()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(name: &str, price: i64, cost: Option<i64>) -> Product {
        Product {
            id: name.to_lowercase().replace(' ', "-"),
            sku: "SKU".to_string(),
            name: name.to_string(),
            quantity: 10,
            price: Money::from_units(price),
            cost: cost.map(Money::from_units),
            previous_price: None,
            price_updated_at: None,
        }
    }

    #[test]
    fn test_calculate_price_and_margin() {
        assert_eq!(calculate_price(10_000.0, 30).units(), 13_000);
        assert_eq!(calculate_price(0.0, 30).units(), 0);
        assert_eq!(calculate_price(-5.0, 30).units(), 0);
        assert_eq!(calculate_margin(10_000.0, Money::from_units(13_000)), 30);
        assert_eq!(calculate_margin(0.0, Money::from_units(13_000)), 0);
    }

    #[test]
    fn test_increase_and_adequate_labels() {
        let mut engine = PricingEngine::new(PricingProfile::trading_cards());

        let low = engine.recommend(
            &product("Sleeves", 11_000, None),
            Some(Money::from_units(10_000)),
            Some(PriceCategory::Standard),
        );
        assert_eq!(low.recommended_price.units(), 13_000);
        assert_eq!(low.recommendation, PriceAction::IncreasePrice);
        assert_eq!(low.price_difference.units(), 2_000);
        assert_eq!(low.current_margin, Some(10));

        let fair = engine.recommend(
            &product("Sleeves", 13_000, None),
            Some(Money::from_units(10_000)),
            Some(PriceCategory::Standard),
        );
        assert_eq!(fair.recommendation, PriceAction::Adequate);
        assert_eq!(fair.recommendation.to_string(), "adequate");
    }

    #[test]
    fn test_cost_resolution_order() {
        let mut engine = PricingEngine::new(PricingProfile::trading_cards());

        // recorded cost beats the estimate
        let rec = engine.recommend(&product("Deck Box", 20_000, Some(8_000)), None, None);
        assert_eq!(rec.cost.units(), 8_000);
        assert_eq!(rec.category, PriceCategory::Basic);
        assert_eq!(rec.recommended_price.units(), 10_000);
        assert_eq!(rec.recommendation, PriceAction::ReducePrice);

        // estimate: 20000 × 0.70
        let rec = engine.recommend(&product("Deck Box", 20_000, None), None, None);
        assert_eq!(rec.cost.units(), 14_000);

        // no price, no cost
        let rec = engine.recommend(&product("Mystery", 0, None), None, None);
        assert_eq!(rec.recommended_price.units(), 0);
        assert_eq!(rec.current_price, None);
        assert_eq!(rec.current_margin, None);
        assert_eq!(rec.recommendation, PriceAction::NoCurrentPrice);
    }

    #[test]
    fn test_category_bands() {
        let config = PricingProfile::trading_cards().config;
        assert_eq!(config.category_for_price(Money::from_units(60_000)), PriceCategory::Premium);
        assert_eq!(config.category_for_price(Money::from_units(50_000)), PriceCategory::Standard);
        assert_eq!(config.category_for_price(Money::from_units(25_001)), PriceCategory::Standard);
        assert_eq!(config.category_for_price(Money::from_units(25_000)), PriceCategory::Basic);
        assert_eq!(config.category_for_price(Money::zero()), PriceCategory::Basic);
    }

    #[test]
    fn test_zero_margin_uses_default() {
        let mut profile = PricingProfile::food_counter();
        profile.config.margins.basic = 0;
        assert_eq!(profile.margin_for(PriceCategory::Basic), 35);
        assert_eq!(profile.margin_for(PriceCategory::Premium), 40);
    }

    #[test]
    fn test_variable_ingredient_surcharge_is_deterministic_by_default() {
        let mut engine = PricingEngine::new(PricingProfile::food_counter());
        let bowl = product("Poke de Salmón", 9_000, Some(5_000));

        let first = engine.recommend(&bowl, None, None);
        let second = engine.recommend(&bowl, None, None);

        assert_eq!(first, second);
        assert_eq!(first.variable_ingredients, vec!["salmon".to_string()]);
        // 5000 + 0.3 × 8000
        assert_eq!(first.cost.units(), 7_400);
        assert_eq!(first.category, PriceCategory::Standard);
        assert_eq!(first.recommended_price.units(), 9_990);
    }

    #[test]
    fn test_random_sampler_stays_within_volatility() {
        let mut engine =
            PricingEngine::new(PricingProfile::food_counter()).with_sampler(RandomSampler::seeded(7));
        let pollo = VariableCost::new("pollo", 3500.0, 0.15);

        for _ in 0..50 {
            let cost = engine.variable_cost(&pollo);
            assert!((3237.0..=3763.0).contains(&cost), "cost {} out of range", cost);
        }
    }

    #[test]
    fn test_summary_counts_only_actionable_revenue() {
        let mut engine = PricingEngine::new(PricingProfile::trading_cards());
        let products = vec![
            product("Under", 10_000, Some(10_000)), // rec 12500 → increase +2500
            product("Over", 20_000, Some(10_000)),  // rec 12500 → reduce -7500
            product("Fair", 12_400, Some(10_000)),  // rec 12500 → adequate (+100 ignored)
            product("Unpriced", 0, Some(10_000)),   // no current price
        ];

        let summary = engine.summarize(&products);
        assert_eq!(summary.total_products, 4);
        assert_eq!(summary.needing_increase.count, 1);
        assert_eq!(summary.needing_decrease.count, 1);
        assert_eq!(summary.adequate.count, 1);
        assert_eq!(summary.total_potential_revenue.units(), -5_000);
        assert_eq!(summary.recommendations.len(), 4);
    }

    #[test]
    fn test_apply_recommended_prices() {
        let mut engine = PricingEngine::new(PricingProfile::trading_cards());
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        let products = vec![
            product("Under", 10_000, Some(10_000)),
            product("Over", 20_000, Some(10_000)),
        ];

        let updated = engine.apply_recommended_prices(&products, false, at);
        assert_eq!(updated[0].price.units(), 12_500);
        assert_eq!(updated[0].previous_price, Some(Money::from_units(10_000)));
        assert_eq!(updated[0].price_updated_at, Some(at));

        let lowered = engine.apply_recommended_prices(&products, true, at);
        assert_eq!(lowered[0].price.units(), 10_000);
        assert_eq!(lowered[1].price.units(), 12_500);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PricingProfile::trading_cards().config;
        assert!(config.validate().is_ok());

        config.margins.standard = 150;
        assert!(config.validate().is_err());

        let mut config = PricingProfile::trading_cards().config;
        config.category_ranges.premium.min = Money::from_units(1_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_stored_shape() {
        let json = r#"{
            "categoryRanges": {
                "premium": {"min": 50000, "max": null},
                "standard": {"min": 25000, "max": 50000},
                "basic": {"min": 0, "max": 25000}
            },
            "margins": {"premium": 45, "standard": 30, "basic": 25}
        }"#;
        let config: PricingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.margins.premium, 45);
        assert_eq!(config.category_ranges.premium.max, None);
    }
}
