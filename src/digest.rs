//! Bounded text excerpt of the dataset for questions no rule answers.
//!
//! Each sheet is filtered by the question's product (substring), week and year,
//! capped, projected onto a fixed column list and rendered as an aligned text
//! table. Sheets with nothing left after filtering are omitted.

use serde::Deserialize;

use crate::format::number;
use crate::intent::Intent;
use crate::metrics::{name_contains, Period};
use crate::schema::{
    ChangeRow, Dataset, MediaRow, OrganicRow, OverallRow, ProductRow, SaleRow, WeeklyRow,
};

/// Handed to the summarizer when every sheet filters down to nothing.
pub const NO_RELEVANT_DATA: &str = "No relevant data was matched from the sheets, but try to interpret the user's question based on general logic or respond helpfully if possible.";

/// Maximum rows per sheet section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigestLimits {
    pub raw_sales: usize,
    pub organic: usize,
    pub media: usize,
    pub overall: usize,
    pub change: usize,
}

impl Default for DigestLimits {
    fn default() -> Self {
        Self {
            raw_sales: 30,
            organic: 30,
            media: 30,
            overall: 30,
            change: 10,
        }
    }
}

/// Fixed-width text table, every column right-aligned.
struct TextTable {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &'static [&'static str]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let mut out = aligned(self.headers.iter().copied(), &widths);
        for row in &self.rows {
            out.push('\n');
            out.push_str(&aligned(row.iter().map(String::as_str), &widths));
        }
        out
    }
}

fn aligned<'s>(cells: impl Iterator<Item = &'s str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{:>width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
}

fn cell(v: Option<f64>) -> String {
    v.map(number).unwrap_or_else(|| "-".to_string())
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn select<'a, R: WeeklyRow + 'a>(
    rows: Option<&'a [R]>,
    period: Period,
    product: impl Fn(&R) -> bool + 'a,
    cap: usize,
) -> impl Iterator<Item = &'a R> + 'a {
    rows.unwrap_or_default()
        .iter()
        .filter(move |r| period.matches(*r) && product(*r))
        .take(cap)
}

fn raw_section(rows: Option<&[SaleRow]>, intent: &Intent, cap: usize) -> TextTable {
    let mut t = TextTable::new(&["Product", "Vendor", "Order Date", "Sold Quantity"]);
    for r in select(rows, intent.period(), by_product(intent), cap) {
        t.push(vec![
            r.product.clone(),
            r.vendor.clone(),
            opt(r.order_date),
            r.sold_quantity.to_string(),
        ]);
    }
    t
}

fn organic_section(rows: Option<&[OrganicRow]>, intent: &Intent, cap: usize) -> TextTable {
    let mut t = TextTable::new(&[
        "Year",
        "Week",
        "Product Name",
        "COGS",
        "Daily Organic SV",
        "Organic Share of Sales %",
        "Total Daily Net Income Organic",
    ]);
    for r in select(rows, intent.period(), by_product(intent), cap) {
        t.push(vec![
            opt(r.year),
            opt(r.week),
            r.product.clone(),
            cell(r.cogs),
            cell(r.daily_organic_sv),
            cell(r.organic_share_pct),
            cell(r.total_daily_ni),
        ]);
    }
    t
}

fn media_section(rows: Option<&[MediaRow]>, intent: &Intent, cap: usize) -> TextTable {
    let mut t = TextTable::new(&[
        "Year",
        "Week",
        "Product Name",
        "COGS",
        "CPA",
        "Daily MSV",
        "Media Units Sold",
        "Media Share %",
        "NI per SKU",
        "Total Daily NI Media",
    ]);
    for r in select(rows, intent.period(), by_product(intent), cap) {
        t.push(vec![
            opt(r.year),
            opt(r.week),
            r.product.clone(),
            cell(r.cogs),
            cell(r.cpa),
            cell(r.daily_msv),
            cell(r.media_units_sold),
            cell(r.media_share_pct),
            cell(r.ni_per_sku),
            cell(r.total_daily_ni_media),
        ]);
    }
    t
}

fn overall_section(rows: Option<&[OverallRow]>, intent: &Intent, cap: usize) -> TextTable {
    let mut t = TextTable::new(&[
        "Year",
        "Week",
        "Product Name",
        "Total Units sold",
        "Invoiced/ Supplied",
        "Overall SV",
        "Media Units Sold",
        "Daily Media SV",
        "Org Units sold",
        "Daily Org SV",
        "Media share of sales %",
        "Organic Share of sales%",
    ]);
    for r in select(rows, intent.period(), by_product(intent), cap) {
        t.push(vec![
            opt(r.year),
            opt(r.week),
            r.product.clone(),
            cell(r.total_units_sold),
            cell(r.invoiced_supplied),
            cell(r.overall_sv),
            cell(r.media_units_sold),
            cell(r.daily_media_sv),
            cell(r.org_units_sold),
            cell(r.daily_org_sv),
            cell(r.media_share_pct),
            cell(r.organic_share_pct),
        ]);
    }
    t
}

// The change sheet is per week, not per product.
fn change_section(rows: Option<&[ChangeRow]>, intent: &Intent, cap: usize) -> TextTable {
    let mut t = TextTable::new(&[
        "Week",
        "Year",
        "Avg TCS Media",
        "Avg TCS Media % Change",
        "Avg NI SKU Media",
        "Avg NI SKU Media % Change",
        "Total Daily NI Media",
        "Total Daily NI Media % Change",
        "Avg TCS Organic (Fixed)",
        "Avg NI SKU Organic (Fixed)",
        "Total Daily NI Organic",
        "Total Daily NI Organic % Change",
        "Avg Overall Daily SV",
        "Avg Overall Daily SV % Change",
        "Avg Daily MSV",
        "Avg Daily MSV % Change",
        "Avg Daily OSV",
        "Avg Daily OSV % Change",
        "Media Share %",
        "Media Share % % Change",
        "Organic Share %",
        "Organic Share % % Change",
    ]);
    for r in select(rows, intent.period(), |_| true, cap) {
        t.push(vec![
            opt(r.week),
            opt(r.year),
            cell(r.avg_tcs_media),
            cell(r.avg_tcs_media_change),
            cell(r.avg_ni_sku_media),
            cell(r.avg_ni_sku_media_change),
            cell(r.total_daily_ni_media),
            cell(r.total_daily_ni_media_change),
            cell(r.avg_tcs_organic),
            cell(r.avg_ni_sku_organic),
            cell(r.total_daily_ni_organic),
            cell(r.total_daily_ni_organic_change),
            cell(r.avg_overall_daily_sv),
            cell(r.avg_overall_daily_sv_change),
            cell(r.avg_daily_msv),
            cell(r.avg_daily_msv_change),
            cell(r.avg_daily_osv),
            cell(r.avg_daily_osv_change),
            cell(r.media_share_pct),
            cell(r.media_share_pct_change),
            cell(r.organic_share_pct),
            cell(r.organic_share_pct_change),
        ]);
    }
    t
}

/// Substring match on the question's product; no product keeps every row.
fn by_product<R: ProductRow>(intent: &Intent) -> impl Fn(&R) -> bool + '_ {
    move |r| {
        intent
            .product
            .as_deref()
            .map_or(true, |p| name_contains(r.product(), p))
    }
}

/// Digest of every sheet for `intent`, or [`NO_RELEVANT_DATA`] when all
/// sections come out empty.
pub fn build_digest(dataset: &Dataset, intent: &Intent, limits: &DigestLimits) -> String {
    let sections = [
        (
            "Raw Filtered",
            raw_section(dataset.raw_sales.as_deref(), intent, limits.raw_sales),
        ),
        (
            "Organic Filtered",
            organic_section(dataset.organic.as_deref(), intent, limits.organic),
        ),
        (
            "Media Filtered",
            media_section(dataset.media.as_deref(), intent, limits.media),
        ),
        (
            "Overall Filtered",
            overall_section(dataset.overall.as_deref(), intent, limits.overall),
        ),
        (
            "Change Filtered",
            change_section(dataset.change.as_deref(), intent, limits.change),
        ),
    ];

    let mut out = String::new();
    for (title, table) in sections.iter().filter(|(_, t)| !t.is_empty()) {
        out.push_str(&format!("\n### {}:\n{}\n", title, table.render()));
    }
    if out.trim().is_empty() {
        NO_RELEVANT_DATA.to_string()
    } else {
        out
    }
}
