//! # Input Checks
//!
//! Operator input is validated; spreadsheet cells are coerced.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product form / sell form / pricing settings                            │
//! │      validate_*  ──►  ValidationError the operator can fix              │
//! │                                                                         │
//! │  CSV cells / legacy stored numbers                                      │
//! │      coerce_*    ──►  never rejected, malformed numbers become 0        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust
//! use stockroom_core::validation::{coerce_count, validate_quantity, validate_sku};
//!
//! assert!(validate_sku("MOCH001").is_ok());
//! assert!(validate_quantity(0).is_err());
//!
//! assert_eq!(coerce_count("12.6"), 13);
//! assert_eq!(coerce_count("lots"), 0);
//! ```

use crate::error::ValidationError;
use crate::money::{round_half_up, Money};

pub type ValidationResult<T> = Result<T, ValidationError>;

const SKU_MAX: usize = 50;
const NAME_MAX: usize = 200;
const QUERY_MAX: usize = 100;

/// Largest stock count a spreadsheet cell can set.
pub const MAX_CELL_QUANTITY: i64 = 1_000_000_000;
/// Largest price or cost a spreadsheet cell can set, in pesos.
pub const MAX_CELL_MONEY: i64 = 1_000_000_000_000;

/// Trimmed text no longer than `max` characters.
fn bounded<'a>(field: &str, raw: &'a str, max: usize) -> ValidationResult<&'a str> {
    let text = raw.trim();
    if text.chars().count() > max {
        return Err(ValidationError::TooLong { field: field.into(), max });
    }
    Ok(text)
}

/// Like [`bounded`] but blank is rejected.
fn required<'a>(field: &str, raw: &'a str, max: usize) -> ValidationResult<&'a str> {
    let text = bounded(field, raw, max)?;
    if text.is_empty() {
        return Err(ValidationError::Required { field: field.into() });
    }
    Ok(text)
}

fn within(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field: field.into(), min, max })
    }
}

// =============================================================================
// Operator Input
// =============================================================================

/// SKUs are codes like `MOCH001` or `TCG-BOX_01`: letters, digits, `-`, `_`.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = required("sku", sku, SKU_MAX)?;
    let is_code_char = |c: char| c.is_alphanumeric() || matches!(c, '-' | '_');

    match sku.chars().find(|c| !is_code_char(*c)) {
        None => Ok(()),
        Some(bad) => Err(ValidationError::InvalidFormat {
            field: "sku".into(),
            reason: format!("unexpected character {bad:?}"),
        }),
    }
}

pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, NAME_MAX).map(|_| ())
}

/// Returns the trimmed search term. Blank matches every product.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    bounded("query", query, QUERY_MAX).map(str::to_owned)
}

/// Units in a single sale.
///
/// ```text
/// Sell (qty: 5) ─► validate_quantity ─► stock check in the sale transaction
///                        └─ qty <= 0 ─► MustBePositive { field: "quantity" }
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty > 0 {
        Ok(())
    } else {
        Err(ValidationError::MustBePositive { field: "quantity".into() })
    }
}

/// Prices and costs may be zero, never negative.
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    within(field, amount.units(), 0, i64::MAX)
}

pub fn validate_margin(field: &str, pct: u32) -> ValidationResult<()> {
    within(field, i64::from(pct), 0, 100)
}

// =============================================================================
// Spreadsheet Cells
// =============================================================================

/// Blank, malformed or non-finite text reads as 0.
pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Stock counts round half-up into `0..=MAX_CELL_QUANTITY`.
pub fn coerce_count(raw: &str) -> i64 {
    round_half_up(coerce_number(raw)).clamp(0, MAX_CELL_QUANTITY)
}

/// Prices and costs round half-up into `0..=MAX_CELL_MONEY`.
pub fn coerce_money(raw: &str) -> Money {
    Money::from_units(round_half_up(coerce_number(raw)).clamp(0, MAX_CELL_MONEY))
}

/// A blank cost cell means the product has no cost recorded.
pub fn coerce_optional_money(raw: &str) -> Option<Money> {
    (!raw.trim().is_empty()).then(|| coerce_money(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        for ok in ["MOCH001", "TCG-BOX_01", "  PKM003  "] {
            assert!(validate_sku(ok).is_ok(), "{ok}");
        }

        assert!(matches!(validate_sku("   "), Err(ValidationError::Required { .. })));
        assert!(matches!(
            validate_sku(&"X".repeat(SKU_MAX + 1)),
            Err(ValidationError::TooLong { max: SKU_MAX, .. })
        ));
        let Err(ValidationError::InvalidFormat { reason, .. }) = validate_sku("PKM 003") else {
            panic!("space should be rejected");
        };
        assert_eq!(reason, "unexpected character ' '");
    }

    #[test]
    fn test_validate_name_and_query() {
        assert!(validate_product_name("Gyoza de Cerdo").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"ñ".repeat(NAME_MAX)).is_ok());
        assert!(validate_product_name(&"ñ".repeat(NAME_MAX + 1)).is_err());

        assert_eq!(validate_search_query("  ramen ").unwrap(), "ramen");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(QUERY_MAX + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(5000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_and_margin() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(matches!(
            validate_price("cost", Money::from_units(-1)),
            Err(ValidationError::OutOfRange { min: 0, .. })
        ));
        assert!(validate_margin("margins.premium", 100).is_ok());
        assert!(validate_margin("margins.premium", 101).is_err());
    }

    #[test]
    fn test_coercion() {
        assert_eq!(coerce_number(" 12.5 "), 12.5);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_count("-3"), 0);
        assert_eq!(coerce_count("2.5"), 3);
        assert_eq!(coerce_money("8499.5").units(), 8500);
        assert_eq!(coerce_optional_money(""), None);
        assert_eq!(coerce_optional_money("x"), Some(Money::zero()));
    }

    #[test]
    fn test_coercion_clamps_to_cell_range() {
        assert_eq!(coerce_count("9000000000000000000"), MAX_CELL_QUANTITY);
        assert_eq!(coerce_count("1e300"), MAX_CELL_QUANTITY);
        assert_eq!(coerce_money("-500"), Money::zero());
        assert_eq!(coerce_money("-0.4"), Money::zero());
        assert_eq!(coerce_money("1e20").units(), MAX_CELL_MONEY);
        assert_eq!(coerce_optional_money("-1200"), Some(Money::zero()));
    }
}
