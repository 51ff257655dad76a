//! Units-sold metrics over the raw order lines.

use chrono::Datelike;

use super::agg::{arg_max, arg_min, group_sum, rank, same_name};
use super::{Period, SortOrder};
use crate::schema::SaleRow;

fn in_period<'a>(sales: &'a [SaleRow], period: Period) -> impl Iterator<Item = &'a SaleRow> {
    sales.iter().filter(move |r| period.matches(*r))
}

fn by_product<'a>(rows: impl Iterator<Item = &'a SaleRow>) -> Vec<(String, i64)> {
    group_sum(rows.map(|r| (r.product.clone(), r.sold_quantity)))
}

fn by_vendor<'a>(rows: impl Iterator<Item = &'a SaleRow>) -> Vec<(String, i64)> {
    group_sum(rows.map(|r| (r.vendor.clone(), r.sold_quantity)))
}

/// Units sold across every product in `period`.
pub fn total_units_sold(sales: &[SaleRow], period: Period) -> i64 {
    in_period(sales, period).map(|r| r.sold_quantity).sum()
}

/// Units of exactly `product` (case-insensitive) in `period`.
pub fn product_units_sold(sales: &[SaleRow], product: &str, period: Period) -> i64 {
    in_period(sales, period)
        .filter(|r| same_name(&r.product, product))
        .map(|r| r.sold_quantity)
        .sum()
}

/// Units sold through exactly `vendor`, over all dates.
pub fn vendor_units_sold(sales: &[SaleRow], vendor: &str) -> i64 {
    sales
        .iter()
        .filter(|r| same_name(&r.vendor, vendor))
        .map(|r| r.sold_quantity)
        .sum()
}

pub fn compare_units_sold(sales: &[SaleRow], first: Period, second: Period) -> (i64, i64) {
    (
        total_units_sold(sales, first),
        total_units_sold(sales, second),
    )
}

pub fn top_product(sales: &[SaleRow], period: Period) -> Option<(String, i64)> {
    arg_max(by_product(in_period(sales, period)))
}

pub fn worst_product(sales: &[SaleRow], period: Period) -> Option<(String, i64)> {
    arg_min(by_product(in_period(sales, period)))
}

pub fn top_vendor(sales: &[SaleRow], period: Period) -> Option<(String, i64)> {
    arg_max(by_vendor(in_period(sales, period)))
}

/// Best `n` vendors by units for a calendar month (1-12), optionally within one year.
pub fn top_vendors_in_month(
    sales: &[SaleRow],
    month: u32,
    year: Option<i32>,
    n: usize,
) -> Vec<(String, i64)> {
    let rows = sales.iter().filter(|r| {
        r.order_date.map_or(false, |d| {
            d.month() == month && year.map_or(true, |y| d.year() == y)
        })
    });
    rank(by_vendor(rows), SortOrder::Descending, n)
}

/// Best-selling product of a single week.
pub fn highest_units_sold_product(sales: &[SaleRow], period: Period) -> Option<(String, i64)> {
    top_product(sales, period)
}

pub fn top_n_products(
    sales: &[SaleRow],
    n: usize,
    period: Period,
    order: SortOrder,
) -> Vec<(String, i64)> {
    rank(by_product(in_period(sales, period)), order, n)
}

/// Weekly unit totals, optionally for one product, ordered by (year, week).
/// Rows whose date did not parse are left out.
pub fn units_by_week(sales: &[SaleRow], product: Option<&str>) -> Vec<((i32, u32), i64)> {
    let rows = sales
        .iter()
        .filter(|r| product.map_or(true, |p| same_name(&r.product, p)))
        .filter_map(|r| Some(((r.year?, r.week?), r.sold_quantity)));
    let mut weeks = group_sum(rows);
    weeks.sort_by_key(|(key, _)| *key);
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::iso_week_key;
    use chrono::NaiveDate;

    fn row(product: &str, vendor: &str, y: i32, m: u32, d: u32, qty: i64) -> SaleRow {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let (week, year) = iso_week_key(date);
        SaleRow {
            product: product.into(),
            vendor: vendor.into(),
            order_date: Some(date),
            week: Some(week),
            year: Some(year),
            sold_quantity: qty,
        }
    }

    fn sample() -> Vec<SaleRow> {
        vec![
            row("Lettuce", "Dubai Marina", 2024, 6, 3, 10),
            row("Thyme", "Palm Jumeirah", 2024, 6, 4, 30),
            row("Lettuce", "Palm Jumeirah", 2024, 6, 9, 15),
            row("Basil", "Dubai Marina", 2024, 6, 10, 7),
            row("Thyme", "JLT", 2024, 7, 2, 5),
        ]
    }

    #[test]
    fn week_totals() {
        let s = sample();
        assert_eq!(total_units_sold(&s, Period::week(23)), 55);
        assert_eq!(total_units_sold(&s, Period::week(30)), 0);
        assert_eq!(total_units_sold(&s, Period::ALL), 67);
        assert_eq!(total_units_sold(&s, Period::new(Some(23), Some(2023))), 0);
    }

    #[test]
    fn week_total_ignores_row_order() {
        let mut s = sample();
        let before = total_units_sold(&s, Period::week(23));
        s.reverse();
        assert_eq!(total_units_sold(&s, Period::week(23)), before);
    }

    #[test]
    fn product_totals_are_exact_and_case_insensitive() {
        let mut s = sample();
        s.push(row(" LETTUCE  ", "JLT", 2024, 6, 5, 1));
        s.push(row("Lettuce Mix", "JLT", 2024, 6, 5, 100));
        assert_eq!(product_units_sold(&s, "lettuce", Period::week(23)), 26);
        assert_eq!(product_units_sold(&s, "Lettuce", Period::ALL), 26);
    }

    #[test]
    fn undated_rows_still_count_for_vendor_totals() {
        let mut s = sample();
        s.push(SaleRow {
            product: "Kale".into(),
            vendor: "JLT".into(),
            order_date: None,
            week: None,
            year: None,
            sold_quantity: 4,
        });
        assert_eq!(vendor_units_sold(&s, "jlt"), 9);
        assert_eq!(total_units_sold(&s, Period::week(27)), 5);
    }

    #[test]
    fn rankings() {
        let s = sample();
        assert_eq!(top_product(&s, Period::ALL), Some(("Thyme".into(), 35)));
        assert_eq!(worst_product(&s, Period::ALL), Some(("Basil".into(), 7)));
        assert_eq!(
            top_vendor(&s, Period::week(23)),
            Some(("Palm Jumeirah".into(), 45))
        );
        assert_eq!(top_vendor(&s, Period::week(40)), None);
        assert_eq!(
            top_n_products(&s, 2, Period::ALL, SortOrder::Descending),
            vec![("Thyme".to_string(), 35), ("Lettuce".to_string(), 25)]
        );
        assert_eq!(
            top_n_products(&s, 1, Period::ALL, SortOrder::Ascending),
            vec![("Basil".to_string(), 7)]
        );
    }

    #[test]
    fn ranking_is_deterministic_on_ties() {
        let s = vec![
            row("Kale", "A", 2024, 6, 3, 5),
            row("Mint", "A", 2024, 6, 3, 5),
            row("Frisee", "A", 2024, 6, 3, 5),
        ];
        let first = top_n_products(&s, 3, Period::ALL, SortOrder::Descending);
        for _ in 0..10 {
            assert_eq!(top_n_products(&s, 3, Period::ALL, SortOrder::Descending), first);
        }
        assert_eq!(first[0].0, "Kale");
        assert_eq!(highest_units_sold_product(&s, Period::week(23)), Some(("Kale".into(), 5)));
    }

    #[test]
    fn month_ranking() {
        let s = sample();
        assert_eq!(
            top_vendors_in_month(&s, 7, None, 5),
            vec![("JLT".to_string(), 5)]
        );
        assert!(top_vendors_in_month(&s, 7, Some(2023), 5).is_empty());
        assert_eq!(top_vendors_in_month(&s, 6, Some(2024), 1)[0].0, "Palm Jumeirah");
    }

    #[test]
    fn weekly_series() {
        let s = sample();
        assert_eq!(
            units_by_week(&s, Some("lettuce")),
            vec![((2024, 23), 25)]
        );
        assert_eq!(units_by_week(&s, None).len(), 3);
    }

    #[test]
    fn compare_two_weeks() {
        let s = sample();
        assert_eq!(
            compare_units_sold(&s, Period::week(23), Period::week(24)),
            (55, 7)
        );
    }
}
