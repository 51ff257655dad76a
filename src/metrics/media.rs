use super::agg::{arg_max, group_mean, group_sum, mean, name_contains, rank, same_name, unique};
use super::{Period, SortOrder};
use crate::schema::MediaRow;

/// A rankable media column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMeasure {
    UnitsSold,
    DailyMsv,
    SharePct,
    Cpa,
    Cogs,
    NiPerSku,
    TotalDailyNi,
}

impl MediaMeasure {
    pub fn value(self, row: &MediaRow) -> Option<f64> {
        match self {
            MediaMeasure::UnitsSold => row.media_units_sold,
            MediaMeasure::DailyMsv => row.daily_msv,
            MediaMeasure::SharePct => row.media_share_pct,
            MediaMeasure::Cpa => row.cpa,
            MediaMeasure::Cogs => row.cogs,
            MediaMeasure::NiPerSku => row.ni_per_sku,
            MediaMeasure::TotalDailyNi => row.total_daily_ni_media,
        }
    }

    /// Additive measures are summed per product; rates are averaged.
    pub fn is_additive(self) -> bool {
        matches!(
            self,
            MediaMeasure::UnitsSold | MediaMeasure::Cogs | MediaMeasure::TotalDailyNi
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaMeasure::UnitsSold => "media units sold",
            MediaMeasure::DailyMsv => "daily MSV",
            MediaMeasure::SharePct => "media share %",
            MediaMeasure::Cpa => "CPA",
            MediaMeasure::Cogs => "COGS",
            MediaMeasure::NiPerSku => "NI per SKU",
            MediaMeasure::TotalDailyNi => "total daily NI",
        }
    }
}

fn in_period<'a>(rows: &'a [MediaRow], period: Period) -> impl Iterator<Item = &'a MediaRow> {
    rows.iter().filter(move |r| period.matches(*r))
}

pub fn avg_ni_per_sku_media(rows: &[MediaRow], period: Period) -> Option<f64> {
    mean(in_period(rows, period).filter_map(|r| r.ni_per_sku))
}

/// Mean NI per SKU for every product whose name contains `product`.
pub fn avg_ni_per_sku_media_by_product(rows: &[MediaRow], product: &str) -> Option<f64> {
    mean(
        rows.iter()
            .filter(|r| name_contains(&r.product, product))
            .filter_map(|r| r.ni_per_sku),
    )
}

pub fn negative_ni_products(rows: &[MediaRow], period: Period) -> Vec<String> {
    unique(
        in_period(rows, period)
            .filter(|r| r.ni_per_sku.map_or(false, |v| v < 0.0))
            .map(|r| r.product.as_str()),
    )
}

pub fn positive_ni_products(rows: &[MediaRow], period: Period) -> Vec<String> {
    unique(
        in_period(rows, period)
            .filter(|r| r.ni_per_sku.map_or(false, |v| v > 0.0))
            .map(|r| r.product.as_str()),
    )
}

/// Product row with the highest total daily NI in the period.
pub fn top_ni_product_media(rows: &[MediaRow], period: Period) -> Option<(String, f64)> {
    arg_max(in_period(rows, period).filter_map(|r| Some((r.product.clone(), r.total_daily_ni_media?))))
}

pub fn total_ni_media(rows: &[MediaRow], period: Period) -> f64 {
    in_period(rows, period).filter_map(|r| r.total_daily_ni_media).sum()
}

/// Week of the single highest daily MSV reading.
pub fn week_with_highest_daily_msv(rows: &[MediaRow], year: Option<i32>) -> Option<(u32, f64)> {
    arg_max(in_period(rows, Period::new(None, year)).filter_map(|r| Some((r.week?, r.daily_msv?))))
}

/// Group products by `measure` (sum or mean per [`MediaMeasure::is_additive`]), sort, keep `n`.
pub fn rank_media_products(
    rows: &[MediaRow],
    period: Period,
    measure: MediaMeasure,
    n: usize,
    order: SortOrder,
) -> Vec<(String, f64)> {
    let values = in_period(rows, period).filter_map(|r| Some((r.product.clone(), measure.value(r)?)));
    let grouped = if measure.is_additive() {
        group_sum(values)
    } else {
        group_mean(values)
    };
    rank(grouped, order, n)
}

pub fn top_products_by_media_units(rows: &[MediaRow], period: Period, n: usize) -> Vec<(String, f64)> {
    rank_media_products(rows, period, MediaMeasure::UnitsSold, n, SortOrder::Descending)
}

/// Media units sold for exactly `product` in `period`.
pub fn product_media_units(rows: &[MediaRow], product: &str, period: Period) -> f64 {
    in_period(rows, period)
        .filter(|r| same_name(&r.product, product))
        .filter_map(|r| r.media_units_sold)
        .sum()
}

/// Mean CPA, optionally for one product.
pub fn avg_cpa(rows: &[MediaRow], product: Option<&str>, period: Period) -> Option<f64> {
    mean(
        in_period(rows, period)
            .filter(|r| product.map_or(true, |p| same_name(&r.product, p)))
            .filter_map(|r| r.cpa),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: &str, week: u32, units: f64, msv: f64, cpa: f64, ni: f64, total: f64) -> MediaRow {
        MediaRow {
            product: product.into(),
            week: Some(week),
            year: Some(2024),
            media_units_sold: Some(units),
            daily_msv: Some(msv),
            media_share_pct: Some(10.0),
            cpa: Some(cpa),
            cogs: Some(1.0),
            ni_per_sku: Some(ni),
            total_daily_ni_media: Some(total),
        }
    }

    fn sample() -> Vec<MediaRow> {
        vec![
            row("Krispr Premium Thyme", 23, 12.0, 4.0, 2.0, -0.5, 10.0),
            row("Kale", 23, 30.0, 9.0, 4.0, 1.5, 25.0),
            row("Krispr Premium Thyme", 23, 8.0, 2.0, 6.0, -0.25, 5.0),
            row("Kale", 24, 3.0, 11.0, 1.0, 2.0, -4.0),
        ]
    }

    #[test]
    fn net_income() {
        let s = sample();
        assert_eq!(total_ni_media(&s, Period::week(23)), 40.0);
        assert_eq!(total_ni_media(&s, Period::week(30)), 0.0);
        assert_eq!(top_ni_product_media(&s, Period::week(23)), Some(("Kale".into(), 25.0)));
        assert_eq!(top_ni_product_media(&s, Period::week(30)), None);
        assert_eq!(negative_ni_products(&s, Period::week(23)), vec!["Krispr Premium Thyme"]);
        assert_eq!(positive_ni_products(&s, Period::ALL), vec!["Kale"]);
        assert_eq!(avg_ni_per_sku_media(&s, Period::week(24)), Some(2.0));
        assert_eq!(avg_ni_per_sku_media_by_product(&s, "thyme"), Some(-0.375));
    }

    #[test]
    fn rankings_respect_measure_kind() {
        let s = sample();
        assert_eq!(
            top_products_by_media_units(&s, Period::week(23), 3),
            vec![("Kale".to_string(), 30.0), ("Krispr Premium Thyme".to_string(), 20.0)]
        );
        // CPA is a rate: thyme averages (2 + 6) / 2
        assert_eq!(
            rank_media_products(&s, Period::week(23), MediaMeasure::Cpa, 1, SortOrder::Descending),
            vec![("Krispr Premium Thyme".to_string(), 4.0)]
        );
        assert_eq!(week_with_highest_daily_msv(&s, None), Some((24, 11.0)));
        assert_eq!(product_media_units(&s, "krispr premium thyme", Period::week(23)), 20.0);
        assert_eq!(product_media_units(&s, "kale", Period::week(30)), 0.0);
        assert_eq!(avg_cpa(&s, Some("kale"), Period::ALL), Some(2.5));
        assert_eq!(avg_cpa(&[], None, Period::ALL), None);
    }
}
