//! Organic vs media comparisons for a single product.

use super::agg::{mean, same_name};
use super::Period;
use crate::schema::{MediaRow, OrganicRow};

fn organic_for<'a>(
    rows: &'a [OrganicRow],
    product: &'a str,
    period: Period,
) -> impl Iterator<Item = &'a OrganicRow> {
    rows.iter()
        .filter(move |r| period.matches(*r) && same_name(&r.product, product))
}

fn media_for<'a>(
    rows: &'a [MediaRow],
    product: &'a str,
    period: Period,
) -> impl Iterator<Item = &'a MediaRow> {
    rows.iter()
        .filter(move |r| period.matches(*r) && same_name(&r.product, product))
}

/// (organic share %, media share %), each averaged independently.
pub fn compare_share(
    organic: &[OrganicRow],
    media: &[MediaRow],
    product: &str,
    period: Period,
) -> (Option<f64>, Option<f64>) {
    (
        mean(organic_for(organic, product, period).filter_map(|r| r.organic_share_pct)),
        mean(media_for(media, product, period).filter_map(|r| r.media_share_pct)),
    )
}

/// (organic units, media units), each summed.
pub fn compare_units(
    organic: &[OrganicRow],
    media: &[MediaRow],
    product: &str,
    period: Period,
) -> (f64, f64) {
    (
        organic_for(organic, product, period)
            .filter_map(|r| r.org_units_sold)
            .sum(),
        media_for(media, product, period)
            .filter_map(|r| r.media_units_sold)
            .sum(),
    )
}

/// (organic daily SV, media daily SV, organic minus media). The gap is only
/// computed when both sides have data.
pub fn daily_sv_gap(
    organic: &[OrganicRow],
    media: &[MediaRow],
    product: &str,
    period: Period,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    let org = mean(organic_for(organic, product, period).filter_map(|r| r.daily_organic_sv));
    let med = mean(media_for(media, product, period).filter_map(|r| r.daily_msv));
    let gap = match (org, med) {
        (Some(o), Some(m)) => Some(o - m),
        _ => None,
    };
    (org, med, gap)
}

pub fn total_channel_units(
    organic: &[OrganicRow],
    media: &[MediaRow],
    product: &str,
    period: Period,
) -> f64 {
    let (org, med) = compare_units(organic, media, product, period);
    org + med
}
