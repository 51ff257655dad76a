//! Column catalog: the canonical name of every logical column plus the header
//! spellings the workbook is known to use for it.

use std::collections::HashMap;

use super::SchemaError;
use crate::{dates, workbook::Cell};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Canonical name, used in error messages.
    pub name: &'static str,
    /// Accepted header spellings, compared after [`header_key`].
    pub aliases: &'static [&'static str],
}

const fn col(name: &'static str, aliases: &'static [&'static str]) -> Column {
    Column { name, aliases }
}

// ─── keys ────────────────────────────────────────────────────────────
pub const PRODUCT: Column = col("Product", &["Product", "Item Description", "Product Name"]);
pub const VENDOR: Column = col("Vendor", &["Vendor", "Vendor Name"]);
pub const ORDER_DATE: Column = col("OrderDate", &["OrderDate", "Local Order Date", "Order Date"]);
pub const SOLD_QUANTITY: Column = col("SoldQuantity", &["SoldQuantity", "Sold Quantity"]);
pub const WEEK: Column = col("Week", &["Week"]);
pub const YEAR: Column = col("Year", &["Year"]);

// ─── organic ─────────────────────────────────────────────────────────
pub const COGS: Column = col("COGS", &["COGS"]);
pub const DAILY_ORGANIC_SV: Column = col("DailyOrganicSV", &["DailyOrganicSV", "Daily Organic SV"]);
pub const ORGANIC_SHARE_PCT: Column = col(
    "OrganicSharePct",
    &["OrganicSharePct", "Organic Share of Sales %"],
);
pub const NET_INCOME_PER_SKU: Column = col(
    "NetIncomePerSKU",
    &["NetIncomePerSKU", "Net Income Per SKU Organic (Excl. Tax)"],
);
pub const TOTAL_DAILY_NI: Column = col(
    "TotalDailyNI",
    &["TotalDailyNI", "Total Daily Net Income Organic (Excl. Tax)"],
);
pub const ORG_UNITS_SOLD: Column = col("OrgUnitsSold", &["OrgUnitsSold", "Org Units sold"]);
pub const AVG_NI_SKU_FIXED: Column = col(
    "AvgNiSkuFixed",
    &["AvgNiSkuFixed", "Avg NI SKU Organic (Fixed)"],
);

// ─── media ───────────────────────────────────────────────────────────
pub const MEDIA_UNITS_SOLD: Column = col("MediaUnitsSold", &["MediaUnitsSold", "Media Units Sold"]);
pub const DAILY_MSV: Column = col("DailyMSV", &["DailyMSV", "Daily MSV"]);
pub const MEDIA_SHARE_PCT: Column = col("MediaSharePct", &["MediaSharePct", "Media Share %"]);
pub const CPA: Column = col("CPA", &["CPA"]);
pub const NI_PER_SKU: Column = col("NIPerSKU", &["NIPerSKU", "NI per SKU"]);
pub const TOTAL_DAILY_NI_MEDIA: Column = col(
    "TotalDailyNIMedia",
    &["TotalDailyNIMedia", "Total Daily NI Media"],
);

// ─── overall ─────────────────────────────────────────────────────────
pub const TOTAL_UNITS_SOLD: Column = col("TotalUnitsSold", &["TotalUnitsSold", "Total Units sold"]);
pub const INVOICED_SUPPLIED: Column = col(
    "InvoicedSupplied",
    &["InvoicedSupplied", "Invoiced/ Supplied", "Invoiced/Supplied"],
);
pub const OVERALL_SV: Column = col("OverallSV", &["OverallSV", "Overall SV"]);
pub const DAILY_MEDIA_SV: Column = col("DailyMediaSV", &["DailyMediaSV", "Daily Media SV"]);
pub const DAILY_ORG_SV: Column = col("DailyOrgSV", &["DailyOrgSV", "Daily Org SV"]);
pub const OVERALL_MEDIA_SHARE_PCT: Column = col(
    "MediaSharePct",
    &["MediaSharePct", "Media share of sales %"],
);
pub const OVERALL_ORGANIC_SHARE_PCT: Column = col(
    "OrganicSharePct",
    &["OrganicSharePct", "Organic Share of sales%", "Organic Share of sales %"],
);

// ─── overall avg & change ────────────────────────────────────────────
pub const AVG_TCS_MEDIA: Column = col("AvgTcsMedia", &["Avg TCS Media"]);
pub const AVG_TCS_MEDIA_CHANGE: Column = col("AvgTcsMediaChange", &["Avg TCS Media % Change"]);
pub const AVG_NI_SKU_MEDIA: Column = col("AvgNiSkuMedia", &["Avg NI SKU Media"]);
pub const AVG_NI_SKU_MEDIA_CHANGE: Column = col(
    "AvgNiSkuMediaChange",
    &["Avg NI SKU Media % Change"],
);
pub const CHANGE_TOTAL_DAILY_NI_MEDIA: Column = col("TotalDailyNIMedia", &["Total Daily NI Media"]);
pub const TOTAL_DAILY_NI_MEDIA_CHANGE: Column = col(
    "TotalDailyNIMediaChange",
    &["Total Daily NI Media % Change"],
);
pub const AVG_TCS_ORGANIC: Column = col("AvgTcsOrganic", &["Avg TCS Organic (Fixed)"]);
pub const AVG_NI_SKU_ORGANIC: Column = col("AvgNiSkuOrganic", &["Avg NI SKU Organic (Fixed)"]);
pub const TOTAL_DAILY_NI_ORGANIC: Column = col("TotalDailyNIOrganic", &["Total Daily NI Organic"]);
pub const TOTAL_DAILY_NI_ORGANIC_CHANGE: Column = col(
    "TotalDailyNIOrganicChange",
    &["Total Daily NI Organic % Change"],
);
pub const AVG_OVERALL_DAILY_SV: Column = col("AvgOverallDailySV", &["Avg Overall Daily SV"]);
pub const AVG_OVERALL_DAILY_SV_CHANGE: Column = col(
    "AvgOverallDailySVChange",
    &["Avg Overall Daily SV % Change"],
);
pub const AVG_DAILY_MSV: Column = col("AvgDailyMSV", &["Avg Daily MSV"]);
pub const AVG_DAILY_MSV_CHANGE: Column = col("AvgDailyMSVChange", &["Avg Daily MSV % Change"]);
pub const AVG_DAILY_OSV: Column = col("AvgDailyOSV", &["Avg Daily OSV"]);
pub const AVG_DAILY_OSV_CHANGE: Column = col("AvgDailyOSVChange", &["Avg Daily OSV % Change"]);
pub const CHANGE_MEDIA_SHARE_PCT: Column = col("MediaSharePct", &["Media Share %"]);
pub const MEDIA_SHARE_PCT_CHANGE: Column = col("MediaSharePctChange", &["Media Share % % Change"]);
pub const CHANGE_ORGANIC_SHARE_PCT: Column = col("OrganicSharePct", &["Organic Share %"]);
pub const ORGANIC_SHARE_PCT_CHANGE: Column = col(
    "OrganicSharePctChange",
    &["Organic Share % % Change"],
);

/// Which sheet a table lives on and which of its columns must be present.
#[derive(Debug)]
pub struct TableSpec {
    /// Canonical sheet name; the first of `sheet_names`.
    pub name: &'static str,
    pub sheet_names: &'static [&'static str],
    pub required: &'static [Column],
    pub optional: &'static [Column],
}

pub const RAW_SALES: TableSpec = TableSpec {
    name: "Raw Data - Date Wise",
    sheet_names: &["Raw Data - Date Wise", "RawSales", "Raw Data"],
    required: &[PRODUCT, VENDOR, ORDER_DATE, SOLD_QUANTITY],
    optional: &[],
};

pub const ORGANIC: TableSpec = TableSpec {
    name: "Organic",
    sheet_names: &["Organic"],
    required: &[
        PRODUCT,
        WEEK,
        COGS,
        DAILY_ORGANIC_SV,
        ORGANIC_SHARE_PCT,
        NET_INCOME_PER_SKU,
        TOTAL_DAILY_NI,
    ],
    optional: &[YEAR, ORG_UNITS_SOLD, AVG_NI_SKU_FIXED],
};

pub const MEDIA: TableSpec = TableSpec {
    name: "Media",
    sheet_names: &["Media"],
    required: &[
        PRODUCT,
        WEEK,
        MEDIA_UNITS_SOLD,
        DAILY_MSV,
        MEDIA_SHARE_PCT,
        CPA,
        COGS,
        NI_PER_SKU,
        TOTAL_DAILY_NI_MEDIA,
    ],
    optional: &[YEAR],
};

pub const OVERALL: TableSpec = TableSpec {
    name: "Overall",
    sheet_names: &["Overall"],
    required: &[PRODUCT, WEEK, TOTAL_UNITS_SOLD, OVERALL_SV],
    optional: &[
        YEAR,
        INVOICED_SUPPLIED,
        MEDIA_UNITS_SOLD,
        DAILY_MEDIA_SV,
        ORG_UNITS_SOLD,
        DAILY_ORG_SV,
        OVERALL_MEDIA_SHARE_PCT,
        OVERALL_ORGANIC_SHARE_PCT,
    ],
};

pub const CHANGE: TableSpec = TableSpec {
    name: "Overall Avg & Change",
    sheet_names: &["Overall Avg & Change", "Change", "Overall Change"],
    required: &[
        WEEK,
        AVG_TCS_MEDIA,
        AVG_NI_SKU_MEDIA,
        CHANGE_TOTAL_DAILY_NI_MEDIA,
        AVG_TCS_ORGANIC,
        AVG_NI_SKU_ORGANIC,
        TOTAL_DAILY_NI_ORGANIC,
        AVG_OVERALL_DAILY_SV,
        AVG_DAILY_MSV,
        AVG_DAILY_OSV,
        CHANGE_MEDIA_SHARE_PCT,
        CHANGE_ORGANIC_SHARE_PCT,
    ],
    optional: &[
        YEAR,
        AVG_TCS_MEDIA_CHANGE,
        AVG_NI_SKU_MEDIA_CHANGE,
        TOTAL_DAILY_NI_MEDIA_CHANGE,
        TOTAL_DAILY_NI_ORGANIC_CHANGE,
        AVG_OVERALL_DAILY_SV_CHANGE,
        AVG_DAILY_MSV_CHANGE,
        AVG_DAILY_OSV_CHANGE,
        MEDIA_SHARE_PCT_CHANGE,
        ORGANIC_SHARE_PCT_CHANGE,
    ],
};

/// Comparison key for a header: trimmed, inner whitespace collapsed, lowercased.
pub fn header_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trim and collapse inner whitespace of an entity name, keeping its case.
pub fn clean_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

static EMPTY: Cell = Cell::Empty;

/// Header positions of one sheet, resolved against its [`TableSpec`].
#[derive(Debug)]
pub struct ColumnMap {
    index: HashMap<&'static str, usize>,
}

impl ColumnMap {
    /// Fails with every missing required column, never just the first.
    pub fn resolve(spec: &TableSpec, headers: &[String]) -> Result<Self, SchemaError> {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
        let position = |column: &Column| {
            column.aliases.iter().find_map(|alias| {
                let alias = header_key(alias);
                keys.iter().position(|k| *k == alias)
            })
        };

        let mut index = HashMap::new();
        let mut missing = Vec::new();
        for column in spec.required {
            match position(column) {
                Some(i) => {
                    index.insert(column.name, i);
                }
                None => missing.push(column.name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: spec.name.to_string(),
                missing,
            });
        }
        for column in spec.optional {
            if let Some(i) = position(column) {
                index.insert(column.name, i);
            }
        }

        Ok(Self { index })
    }

    pub fn has(&self, column: Column) -> bool {
        self.index.contains_key(column.name)
    }

    /// The row's cell for `column`; `Empty` if the column is absent or the row is short.
    pub fn cell<'r>(&self, row: &'r [Cell], column: Column) -> &'r Cell {
        self.index
            .get(column.name)
            .and_then(|&i| row.get(i))
            .unwrap_or(&EMPTY)
    }

    pub fn text(&self, row: &[Cell], column: Column) -> String {
        match self.cell(row, column) {
            Cell::Text(s) => clean_name(s),
            Cell::Empty => String::new(),
            other => other.to_string(),
        }
    }

    pub fn number(&self, row: &[Cell], column: Column) -> Option<f64> {
        match self.cell(row, column) {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => parse_number(s),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Whole week number in 1..=53.
    pub fn week(&self, row: &[Cell], column: Column) -> Option<u32> {
        let v = self.number(row, column)?;
        if v.fract() != 0.0 || !(1.0..=53.0).contains(&v) {
            return None;
        }
        Some(v as u32)
    }

    pub fn year(&self, row: &[Cell], column: Column) -> Option<i32> {
        let v = self.number(row, column)?;
        if v.fract() != 0.0 || !(1900.0..=2999.0).contains(&v) {
            return None;
        }
        Some(v as i32)
    }

    pub fn date(&self, row: &[Cell], column: Column) -> Option<NaiveDate> {
        dates::cell_to_date(self.cell(row, column))
    }
}

/// Numeric text as spreadsheets export it: `1,234.5`, `12%`, `" 7 "`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_matches('"').trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
