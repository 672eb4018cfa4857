//! # Spreadsheet Import/Export
//!
//! Catalog files are single-sheet CSV tables. Import maps columns by
//! case-insensitive English or Spanish header aliases; export writes English
//! headers and leaves the product id out.
//!
//! ## Header Aliases
//! ```text
//! ┌────────────┬──────────────────────────┬────────────────────────────────┐
//! │ Field      │ Accepted headers         │ Missing / malformed cell       │
//! ├────────────┼──────────────────────────┼────────────────────────────────┤
//! │ sku        │ sku                      │ ITEM<n>                        │
//! │ name       │ name, nombre             │ Product <n>                    │
//! │ quantity   │ quantity, cantidad       │ 0                              │
//! │ price      │ price, precio            │ 0                              │
//! │ cost       │ cost, costo              │ none (column optional)         │
//! └────────────┴──────────────────────────┴────────────────────────────────┘
//! ```
//! `<n>` is the 1-based data row number.

use std::io::{Read, Write};

use chrono::NaiveDate;
use stockroom_core::catalog::ImportRow;
use stockroom_core::validation::{coerce_count, coerce_money, coerce_optional_money};
use stockroom_core::{Product, StoreProfile};
use tracing::debug;

use crate::error::DbResult;

/// Header row written on export.
pub const EXPORT_HEADERS: [&str; 5] = ["SKU", "Name", "Quantity", "Price", "Cost"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Sku,
    Name,
    Quantity,
    Price,
    Cost,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_lowercase().as_str() {
            "sku" => Some(Column::Sku),
            "name" | "nombre" => Some(Column::Name),
            "quantity" | "cantidad" => Some(Column::Quantity),
            "price" | "precio" => Some(Column::Price),
            "cost" | "costo" => Some(Column::Cost),
            _ => None,
        }
    }
}

/// Rows read from a catalog file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub rows: Vec<ImportRow>,
    /// Whether the file had a cost column at all.
    pub has_cost_column: bool,
}

// =============================================================================
// Import
// =============================================================================

/// Reads catalog rows from CSV.
///
/// Blank lines are skipped and do not advance the placeholder counter.
/// Any parse error aborts the whole read.
pub fn parse_products<R: Read>(reader: R) -> DbResult<ParsedSheet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<Option<Column>> = csv_reader.headers()?.iter().map(Column::from_header).collect();
    let position = |column: Column| columns.iter().position(|c| *c == Some(column));
    let (sku_at, name_at, quantity_at, price_at, cost_at) = (
        position(Column::Sku),
        position(Column::Name),
        position(Column::Quantity),
        position(Column::Price),
        position(Column::Cost),
    );

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |at: Option<usize>| at.and_then(|i| record.get(i));
        rows.push(ImportRow::new(
            rows.len(),
            cell(sku_at),
            cell(name_at),
            coerce_count(cell(quantity_at).unwrap_or("")),
            coerce_money(cell(price_at).unwrap_or("")),
            cell(cost_at).and_then(coerce_optional_money),
        ));
    }

    debug!(rows = rows.len(), has_cost_column = cost_at.is_some(), "Parsed catalog sheet");
    Ok(ParsedSheet {
        rows,
        has_cost_column: cost_at.is_some(),
    })
}

// =============================================================================
// Export
// =============================================================================

/// Writes the catalog as CSV, one product per row, in catalog order.
pub fn write_products<W: Write>(writer: W, products: &[Product]) -> DbResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    for product in products {
        let quantity = product.quantity.to_string();
        let price = product.price.units().to_string();
        let cost = product.cost.map(|c| c.units().to_string()).unwrap_or_default();
        csv_writer.write_record([
            product.sku.as_str(),
            product.name.as_str(),
            quantity.as_str(),
            price.as_str(),
            cost.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// CSV text of the catalog.
pub fn export_to_string(products: &[Product]) -> DbResult<String> {
    let mut buffer = Vec::new();
    write_products(&mut buffer, products)?;
    String::from_utf8(buffer).map_err(|e| crate::error::DbError::Spreadsheet(e.to_string()))
}

/// Suggested download name, e.g. `inventory_mochima_2026-10-18.csv`.
pub fn export_file_name(profile: StoreProfile, date: NaiveDate) -> String {
    format!("inventory_{}_{}.csv", profile, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::Money;

    fn product(sku: &str, name: &str, quantity: i64, price: i64, cost: Option<i64>) -> Product {
        Product {
            id: format!("id-{}", sku),
            sku: sku.to_string(),
            name: name.to_string(),
            quantity,
            price: Money::from_units(price),
            cost: cost.map(Money::from_units),
            previous_price: None,
            price_updated_at: None,
        }
    }

    #[test]
    fn test_spanish_headers_any_case() {
        let csv = "SKU,Nombre,CANTIDAD,precio\nMOCH001,Ramen Tonkotsu Premium,25,8500\n";
        let sheet = parse_products(csv.as_bytes()).unwrap();

        assert!(!sheet.has_cost_column);
        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.sku, "MOCH001");
        assert_eq!(row.name, "Ramen Tonkotsu Premium");
        assert_eq!(row.quantity, 25);
        assert_eq!(row.price.units(), 8500);
        assert_eq!(row.cost, None);
    }

    #[test]
    fn test_placeholders_and_malformed_numbers() {
        let csv = "sku,name,quantity,price,cost\n,,abc,,\n\nPKM001,,3,45000,31500\n";
        let sheet = parse_products(csv.as_bytes()).unwrap();

        assert!(sheet.has_cost_column);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].sku, "ITEM1");
        assert_eq!(sheet.rows[0].name, "Product 1");
        assert_eq!(sheet.rows[0].quantity, 0);
        assert!(sheet.rows[0].price.is_zero());
        assert_eq!(sheet.rows[0].cost, None);
        assert_eq!(sheet.rows[1].name, "Product 2");
        assert_eq!(sheet.rows[1].cost, Some(Money::from_units(31500)));
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let csv = "Category,SKU,Price\nCards,PKM002,25000\n";
        let sheet = parse_products(csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows[0].sku, "PKM002");
        assert_eq!(sheet.rows[0].price.units(), 25000);
        assert_eq!(sheet.rows[0].quantity, 0);
    }

    #[test]
    fn test_broken_file_is_rejected() {
        let bytes: &[u8] = b"sku,name\nA1,\xff\xfe\n";
        assert!(parse_products(bytes).is_err());
    }

    #[test]
    fn test_export_then_import_keeps_tuples() {
        let products = vec![
            product("PKM001", "Charizard VMAX, Brillante", 5, 45000, None),
            product("MOCH002", "Sushi Nigiri Salmón", 30, 12000, Some(7000)),
        ];

        let text = export_to_string(&products).unwrap();
        assert!(text.starts_with("SKU,Name,Quantity,Price,Cost\n"));
        assert!(!text.contains("id-PKM001"));

        let sheet = parse_products(text.as_bytes()).unwrap();
        let tuples: Vec<(String, String, i64, i64, Option<Money>)> = sheet
            .rows
            .into_iter()
            .map(|r| (r.sku, r.name, r.quantity, r.price.units(), r.cost))
            .collect();
        assert_eq!(
            tuples,
            vec![
                ("PKM001".to_string(), "Charizard VMAX, Brillante".to_string(), 5, 45000, None),
                (
                    "MOCH002".to_string(),
                    "Sushi Nigiri Salmón".to_string(),
                    30,
                    12000,
                    Some(Money::from_units(7000))
                ),
            ]
        );
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            export_file_name(StoreProfile::HenchoTcg, date),
            "inventory_hencho_tcg_2026-10-18.csv"
        );
    }
}
