use super::agg::{arg_min, mean, same_name};
use super::Period;
use crate::schema::{ChangeRow, OverallRow};

/// Week-over-week % deltas for one week of the change sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekChange {
    pub week: u32,
    pub year: Option<i32>,
    pub avg_tcs_media: Option<f64>,
    pub avg_ni_sku_media: Option<f64>,
    pub total_daily_ni_media: Option<f64>,
    pub total_daily_ni_organic: Option<f64>,
    pub avg_overall_daily_sv: Option<f64>,
    pub avg_daily_msv: Option<f64>,
    pub avg_daily_osv: Option<f64>,
    pub media_share_pct: Option<f64>,
    pub organic_share_pct: Option<f64>,
}

fn in_period<'a>(rows: &'a [ChangeRow], period: Period) -> impl Iterator<Item = &'a ChangeRow> {
    rows.iter().filter(move |r| period.matches(*r))
}

pub fn avg_overall_daily_sv(change: &[ChangeRow], period: Period) -> Option<f64> {
    mean(in_period(change, period).filter_map(|r| r.avg_overall_daily_sv))
}

pub fn avg_daily_osv(change: &[ChangeRow], period: Period) -> Option<f64> {
    mean(in_period(change, period).filter_map(|r| r.avg_daily_osv))
}

pub fn week_with_lowest_avg_overall_sv(change: &[ChangeRow], year: Option<i32>) -> Option<(u32, f64)> {
    arg_min(
        in_period(change, Period::new(None, year))
            .filter_map(|r| Some((r.week?, r.avg_overall_daily_sv?))),
    )
}

/// Media share % of `second` minus that of `first`; `None` if either week has no data.
pub fn change_in_media_share(change: &[ChangeRow], first: Period, second: Period) -> Option<f64> {
    let a = mean(in_period(change, first).filter_map(|r| r.media_share_pct))?;
    let b = mean(in_period(change, second).filter_map(|r| r.media_share_pct))?;
    Some(b - a)
}

/// The % change columns of the first change row matching `period`.
pub fn week_change_summary(change: &[ChangeRow], period: Period) -> Option<WeekChange> {
    let r = in_period(change, period).find(|r| r.week.is_some())?;
    Some(WeekChange {
        week: r.week?,
        year: r.year,
        avg_tcs_media: r.avg_tcs_media_change,
        avg_ni_sku_media: r.avg_ni_sku_media_change,
        total_daily_ni_media: r.total_daily_ni_media_change,
        total_daily_ni_organic: r.total_daily_ni_organic_change,
        avg_overall_daily_sv: r.avg_overall_daily_sv_change,
        avg_daily_msv: r.avg_daily_msv_change,
        avg_daily_osv: r.avg_daily_osv_change,
        media_share_pct: r.media_share_pct_change,
        organic_share_pct: r.organic_share_pct_change,
    })
}

/// Sum of "Total Units sold" on the overall sheet, optionally for one product.
pub fn overall_total_units(overall: &[OverallRow], product: Option<&str>, period: Period) -> f64 {
    overall
        .iter()
        .filter(|r| period.matches(*r))
        .filter(|r| product.map_or(true, |p| same_name(&r.product, p)))
        .filter_map(|r| r.total_units_sold)
        .sum()
}
