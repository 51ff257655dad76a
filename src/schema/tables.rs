use chrono::NaiveDate;

/// Rows that carry a (week, year) key.
pub trait WeeklyRow {
    fn week(&self) -> Option<u32>;
    fn year(&self) -> Option<i32>;
}

/// Rows that belong to one product.
pub trait ProductRow {
    fn product(&self) -> &str;
}

/// One order line from the raw sales sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub product: String,
    pub vendor: String,
    pub order_date: Option<NaiveDate>,
    /// ISO week of `order_date`; `None` when the date did not parse.
    pub week: Option<u32>,
    /// ISO week-year of `order_date`.
    pub year: Option<i32>,
    pub sold_quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganicRow {
    pub product: String,
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub cogs: Option<f64>,
    pub daily_organic_sv: Option<f64>,
    pub organic_share_pct: Option<f64>,
    pub net_income_per_sku: Option<f64>,
    pub total_daily_ni: Option<f64>,
    pub org_units_sold: Option<f64>,
    pub avg_ni_sku_fixed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRow {
    pub product: String,
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub media_units_sold: Option<f64>,
    pub daily_msv: Option<f64>,
    pub media_share_pct: Option<f64>,
    pub cpa: Option<f64>,
    pub cogs: Option<f64>,
    pub ni_per_sku: Option<f64>,
    pub total_daily_ni_media: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallRow {
    pub product: String,
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub total_units_sold: Option<f64>,
    pub invoiced_supplied: Option<f64>,
    pub overall_sv: Option<f64>,
    pub media_units_sold: Option<f64>,
    pub daily_media_sv: Option<f64>,
    pub org_units_sold: Option<f64>,
    pub daily_org_sv: Option<f64>,
    pub media_share_pct: Option<f64>,
    pub organic_share_pct: Option<f64>,
}

/// One week of the aggregated "Overall Avg & Change" sheet. `*_change` fields are
/// week-over-week percentage deltas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeRow {
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub avg_tcs_media: Option<f64>,
    pub avg_tcs_media_change: Option<f64>,
    pub avg_ni_sku_media: Option<f64>,
    pub avg_ni_sku_media_change: Option<f64>,
    pub total_daily_ni_media: Option<f64>,
    pub total_daily_ni_media_change: Option<f64>,
    pub avg_tcs_organic: Option<f64>,
    pub avg_ni_sku_organic: Option<f64>,
    pub total_daily_ni_organic: Option<f64>,
    pub total_daily_ni_organic_change: Option<f64>,
    pub avg_overall_daily_sv: Option<f64>,
    pub avg_overall_daily_sv_change: Option<f64>,
    pub avg_daily_msv: Option<f64>,
    pub avg_daily_msv_change: Option<f64>,
    pub avg_daily_osv: Option<f64>,
    pub avg_daily_osv_change: Option<f64>,
    pub media_share_pct: Option<f64>,
    pub media_share_pct_change: Option<f64>,
    pub organic_share_pct: Option<f64>,
    pub organic_share_pct_change: Option<f64>,
}

macro_rules! weekly_row {
    ($($ty:ty),+) => {
        $(impl WeeklyRow for $ty {
            fn week(&self) -> Option<u32> {
                self.week
            }
            fn year(&self) -> Option<i32> {
                self.year
            }
        })+
    };
}

macro_rules! product_row {
    ($($ty:ty),+) => {
        $(impl ProductRow for $ty {
            fn product(&self) -> &str {
                &self.product
            }
        })+
    };
}

weekly_row!(SaleRow, OrganicRow, MediaRow, OverallRow, ChangeRow);
product_row!(SaleRow, OrganicRow, MediaRow, OverallRow);
