//! Figures for the sales and financial panels, derived from the sales ledger.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::sale::{sale_date_label, SaleRecord};

/// Number of sales listed in the "recent sales" panel.
pub const RECENT_SALES_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub total_revenue: Money,
    pub sales_count: usize,
    pub revenue_today: Money,
    pub sales_today: usize,
    /// Month-over-month revenue change in percent.
    pub monthly_trend: f64,
    /// Sale count of the last 7 days against the 7 before, in percent.
    pub weekly_order_trend: f64,
    pub recent: Vec<SaleRecord>,
}

pub fn total_revenue(sales: &[SaleRecord]) -> Money {
    sales.iter().map(|s| s.total_value).sum()
}

/// Sales whose stored day label matches `date`.
pub fn sales_on(sales: &[SaleRecord], date: NaiveDate) -> Vec<SaleRecord> {
    let label = sale_date_label(date);
    sales.iter().filter(|s| s.date == label).cloned().collect()
}

/// The last `limit` sales, newest first.
pub fn recent_sales(sales: &[SaleRecord], limit: usize) -> Vec<SaleRecord> {
    sales.iter().rev().take(limit).cloned().collect()
}

fn month_revenue(sales: &[SaleRecord], year: i32, month: u32) -> Money {
    sales
        .iter()
        .filter(|s| {
            let day = s.local_date();
            day.year() == year && day.month() == month
        })
        .map(|s| s.total_value)
        .sum()
}

/// Revenue change of the month containing `today` against the month before.
///
/// 100 when last month had no revenue but this one does, 0 when neither did.
pub fn monthly_trend(sales: &[SaleRecord], today: NaiveDate) -> f64 {
    let (year, month) = (today.year(), today.month());
    let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };

    let current = month_revenue(sales, year, month);
    let previous = month_revenue(sales, prev_year, prev_month);

    percent_change(current.as_f64(), previous.as_f64())
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Sales count over `today` and the six days before, against the prior week.
pub fn weekly_order_trend(sales: &[SaleRecord], today: NaiveDate) -> f64 {
    let week = |offset: i64| -> Vec<String> {
        (offset..offset + 7)
            .map(|i| sale_date_label(today - Duration::days(i)))
            .collect()
    };
    let last_week = week(0);
    let previous_week = week(7);

    let count_in = |days: &[String]| sales.iter().filter(|s| days.contains(&s.date)).count() as f64;
    percent_change(count_in(&last_week), count_in(&previous_week))
}

pub fn sales_stats(sales: &[SaleRecord], today: NaiveDate) -> SalesStats {
    let todays = sales_on(sales, today);

    SalesStats {
        total_revenue: total_revenue(sales),
        sales_count: sales.len(),
        revenue_today: total_revenue(&todays),
        sales_today: todays.len(),
        monthly_trend: monthly_trend(sales, today),
        weekly_order_trend: weekly_order_trend(sales, today),
        recent: recent_sales(sales, RECENT_SALES_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::{TimeZone, Utc};

    fn sale(id: &str, units: i64, price: i64, y: i32, m: u32, d: u32) -> SaleRecord {
        let product = Product {
            id: "p-1".to_string(),
            sku: "HTCG01".to_string(),
            name: "Booster".to_string(),
            quantity: 100,
            price: Money::from_units(price),
            cost: None,
            previous_price: None,
            price_updated_at: None,
        };
        SaleRecord::new(id, &product, units, Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_totals_and_today() {
        let sales = vec![
            sale("1", 2, 1_000, 2026, 10, 14),
            sale("2", 1, 5_000, 2026, 10, 15),
            sale("3", 3, 1_000, 2026, 10, 15),
        ];
        let today = sales[1].local_date();

        let stats = sales_stats(&sales, today);
        assert_eq!(stats.total_revenue.units(), 10_000);
        assert_eq!(stats.sales_count, 3);
        assert_eq!(stats.sales_today, 2);
        assert_eq!(stats.revenue_today.units(), 8_000);
        assert_eq!(stats.recent[0].id, "3");
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let sales: Vec<SaleRecord> = (1..=8)
            .map(|i| sale(&i.to_string(), 1, 100, 2026, 10, i))
            .collect();
        let recent = recent_sales(&sales, RECENT_SALES_LIMIT);
        let ids: Vec<&str> = recent.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["8", "7", "6", "5", "4"]);
    }

    #[test]
    fn test_monthly_trend() {
        let sales = vec![
            sale("1", 1, 10_000, 2026, 9, 15),
            sale("2", 1, 15_000, 2026, 10, 15),
        ];
        let today = sales[1].local_date();
        assert_eq!(monthly_trend(&sales, today), 50.0);

        let only_current = vec![sale("1", 1, 15_000, 2026, 10, 15)];
        assert_eq!(monthly_trend(&only_current, today), 100.0);
        assert_eq!(monthly_trend(&[], today), 0.0);
    }

    #[test]
    fn test_weekly_order_trend() {
        let sales = vec![
            sale("1", 1, 100, 2026, 10, 2),
            sale("2", 1, 100, 2026, 10, 12),
            sale("3", 1, 100, 2026, 10, 15),
        ];
        let today = sales[2].local_date();
        // two sales this week, one the week before
        assert_eq!(weekly_order_trend(&sales, today), 100.0);
        assert_eq!(weekly_order_trend(&sales[1..], today), 100.0);
        assert_eq!(weekly_order_trend(&[], today), 0.0);
    }

    #[test]
    fn test_trend_wraps_january() {
        let sales = vec![
            sale("1", 1, 20_000, 2025, 12, 15),
            sale("2", 1, 10_000, 2026, 1, 15),
        ];
        let today = sales[1].local_date();
        assert_eq!(monthly_trend(&sales, today), -50.0);
    }
}
