//! # Domain Types
//!
//! Catalog types shared by every calculator and the ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   NewProduct    │   │   ProductRef    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  sku            │   │  id             │       │
//! │  │  sku (business) │   │  name           │   │  sku            │       │
//! │  │  name           │   │  quantity       │   │  name           │       │
//! │  │  quantity       │   │  price          │   └─────────────────┘       │
//! │  │  price / cost   │   │  cost?          │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: opaque string assigned at creation, never changes
//! - `sku`: human-readable natural key used to dedupe spreadsheet imports
//!
//! Products are persisted as a camelCase JSON array, so field names here
//! follow the stored shape (`previousPrice`, `priceUpdatedAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::{round_half_up, Money};

// =============================================================================
// Product
// =============================================================================

/// A catalog item tracked by the dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier, assigned when the product is first stored.
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    #[serde(default)]
    pub sku: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Units on hand. Never negative once stored.
    #[serde(default, deserialize_with = "lenient_count")]
    pub quantity: i64,

    /// Selling price per unit.
    #[serde(default)]
    pub price: Money,

    /// Unit cost, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Money>,

    /// Price before the last bulk "apply recommended prices".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_price: Option<Money>,

    /// When the price was last replaced by a recommendation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub price_updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Builds a product from creation input and an assigned id.
    ///
    /// Negative quantities are clamped to zero.
    pub fn from_new(id: impl Into<String>, new: NewProduct) -> Self {
        Product {
            id: id.into(),
            sku: new.sku,
            name: new.name,
            quantity: new.quantity.max(0),
            price: new.price,
            cost: new.cost,
            previous_price: None,
            price_updated_at: None,
        }
    }

    /// Units on hand, treating anything below zero as zero.
    #[inline]
    pub fn stock(&self) -> i64 {
        self.quantity.max(0)
    }

    /// Whether the product carries a usable selling price.
    #[inline]
    pub fn has_price(&self) -> bool {
        self.price.is_positive()
    }

    /// Unit cost if it is known and positive.
    #[inline]
    pub fn known_cost(&self) -> Option<Money> {
        self.cost.filter(|c| c.is_positive())
    }

    /// Stock valued at the selling price.
    #[inline]
    pub fn inventory_value(&self) -> Money {
        self.price.multiply_quantity(self.stock())
    }

    /// Lightweight reference used by alert and recommendation lists.
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id.clone(),
            sku: self.sku.clone(),
            name: self.name.clone(),
        }
    }
}

// =============================================================================
// New Product
// =============================================================================

/// Input for a manually created product (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    #[serde(default)]
    pub cost: Option<Money>,
}

// =============================================================================
// Product Patch
// =============================================================================

/// Partial edit from the product form. `None` fields are left as they are.
///
/// `cost: Some(None)` clears a known cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub cost: Option<Option<Money>>,
}

impl ProductPatch {
    /// Merges the patch into `product`. The id is never touched.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity.max(0);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(cost) = self.cost {
            product.cost = cost;
        }
    }
}

// =============================================================================
// Product Reference
// =============================================================================

/// Identity triple carried by dashboard recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef {
    pub id: String,
    pub sku: String,
    pub name: String,
}

// =============================================================================
// Lenient Numeric Fields
// =============================================================================

/// Accepts integers, floats or numeric strings; anything else is zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n,
        Raw::Float(f) => round_half_up(f),
        Raw::Text(s) => round_half_up(s.trim().parse::<f64>().unwrap_or(0.0)),
        Raw::Other(_) => 0,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(quantity: i64) -> NewProduct {
        NewProduct {
            sku: "MOCH001".to_string(),
            name: "Ramen Tonkotsu Premium".to_string(),
            quantity,
            price: Money::from_units(8500),
            cost: None,
        }
    }

    #[test]
    fn test_from_new_clamps_quantity() {
        let product = Product::from_new("p-1", new_product(-4));
        assert_eq!(product.quantity, 0);
        assert_eq!(product.id, "p-1");
    }

    #[test]
    fn test_inventory_value() {
        let product = Product::from_new("p-1", new_product(25));
        assert_eq!(product.inventory_value().units(), 212_500);
    }

    #[test]
    fn test_patch_keeps_id_and_unset_fields() {
        let mut product = Product::from_new("p-1", new_product(25));
        product.cost = Some(Money::from_units(5000));

        ProductPatch {
            name: Some("Ramen Shoyu".to_string()),
            quantity: Some(-3),
            ..ProductPatch::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.id, "p-1");
        assert_eq!(product.name, "Ramen Shoyu");
        assert_eq!(product.quantity, 0);
        assert_eq!(product.price.units(), 8500);
        assert_eq!(product.cost, Some(Money::from_units(5000)));

        ProductPatch {
            cost: Some(None),
            ..ProductPatch::default()
        }
        .apply_to(&mut product);
        assert_eq!(product.cost, None);
    }

    #[test]
    fn test_persisted_shape_is_camel_case() {
        let mut product = Product::from_new("p-1", new_product(5));
        product.previous_price = Some(Money::from_units(8000));

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["previousPrice"], 8000);
        assert!(json.get("cost").is_none());
        assert!(json.get("priceUpdatedAt").is_none());
    }

    #[test]
    fn test_lenient_legacy_json() {
        let json = r#"{"id":"1","sku":"A","name":"Pack","quantity":"7","price":"1500.4"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.quantity, 7);
        assert_eq!(product.price.units(), 1500);

        let missing = r#"{"id":"2","quantity":null}"#;
        let product: Product = serde_json::from_str(missing).unwrap();
        assert_eq!(product.quantity, 0);
        assert!(product.price.is_zero());
    }
}
