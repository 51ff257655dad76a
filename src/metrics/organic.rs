use super::agg::{arg_max, arg_min, group_mean, mean, rank, same_name};
use super::{Period, SortOrder};
use crate::schema::OrganicRow;

fn in_period<'a>(rows: &'a [OrganicRow], period: Period) -> impl Iterator<Item = &'a OrganicRow> {
    rows.iter().filter(move |r| period.matches(*r))
}

fn for_product<'a>(
    rows: &'a [OrganicRow],
    product: &'a str,
    period: Period,
) -> impl Iterator<Item = &'a OrganicRow> {
    in_period(rows, period).filter(move |r| same_name(&r.product, product))
}

/// Highest-COGS product rows of the period, one entry per row.
pub fn top_products_by_cogs(rows: &[OrganicRow], period: Period, n: usize) -> Vec<(String, f64)> {
    let items = in_period(rows, period)
        .filter_map(|r| Some((r.product.clone(), r.cogs?)))
        .collect();
    rank(items, SortOrder::Descending, n)
}

pub fn highest_cogs_product(rows: &[OrganicRow], period: Period) -> Option<(String, f64)> {
    arg_max(in_period(rows, period).filter_map(|r| Some((r.product.clone(), r.cogs?))))
}

/// Week whose average organic share is highest.
pub fn week_with_highest_organic_share(rows: &[OrganicRow], year: Option<i32>) -> Option<(u32, f64)> {
    let per_week = group_mean(
        in_period(rows, Period::new(None, year))
            .filter_map(|r| Some((r.week?, r.organic_share_pct?))),
    );
    arg_max(per_week)
}

pub fn lowest_organic_share_product(rows: &[OrganicRow], period: Period) -> Option<(String, f64)> {
    arg_min(
        in_period(rows, period).filter_map(|r| Some((r.product.clone(), r.organic_share_pct?))),
    )
}

/// Mean organic share of sales % for one product.
pub fn organic_share_of_sales(rows: &[OrganicRow], product: &str, period: Period) -> Option<f64> {
    mean(for_product(rows, product, period).filter_map(|r| r.organic_share_pct))
}

/// Mean net income per SKU for one product, week by week (ascending).
pub fn weekly_ni_organic(rows: &[OrganicRow], product: &str, year: Option<i32>) -> Vec<(u32, f64)> {
    let mut weeks = group_mean(
        for_product(rows, product, Period::new(None, year))
            .filter_map(|r| Some((r.week?, r.net_income_per_sku?))),
    );
    weeks.sort_by_key(|(w, _)| *w);
    weeks
}

pub fn avg_ni_sku_organic(rows: &[OrganicRow], period: Period) -> Option<f64> {
    mean(in_period(rows, period).filter_map(|r| r.avg_ni_sku_fixed))
}

pub fn total_organic_sv(rows: &[OrganicRow], period: Period) -> f64 {
    in_period(rows, period).filter_map(|r| r.daily_organic_sv).sum()
}

pub fn highest_daily_organic_sv_product(rows: &[OrganicRow], period: Period) -> Option<(String, f64)> {
    arg_max(in_period(rows, period).filter_map(|r| Some((r.product.clone(), r.daily_organic_sv?))))
}
