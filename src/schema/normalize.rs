use tracing::{debug, info, warn};

use super::columns::*;
use super::{ChangeRow, Dataset, MediaRow, OrganicRow, OverallRow, SaleRow, SchemaError};
use crate::{dates, workbook::Workbook, workbook::Cell};

/// Turn every known sheet of `workbook` into its typed table.
///
/// - absent sheet → `None`
/// - present sheet missing a required column → `None`, with the
///   `SchemaError::MissingColumns` kept in `Dataset::invalid` for `require_*`
/// - present sheet with no rows → `Some(vec![])`
#[tracing::instrument(level = "debug", skip(workbook), fields(sheets = workbook.len()))]
pub fn normalize(workbook: &Workbook) -> Dataset {
    let mut invalid = Vec::new();
    let dataset = Dataset {
        raw_sales: keep_valid(load_table(workbook, &RAW_SALES, sale_row), &mut invalid),
        organic: keep_valid(load_table(workbook, &ORGANIC, organic_row), &mut invalid),
        media: keep_valid(load_table(workbook, &MEDIA, media_row), &mut invalid),
        overall: keep_valid(load_table(workbook, &OVERALL, overall_row), &mut invalid),
        change: keep_valid(load_table(workbook, &CHANGE, change_row), &mut invalid),
        invalid,
    };
    info!(
        raw_sales = count(&dataset.raw_sales),
        organic = count(&dataset.organic),
        media = count(&dataset.media),
        overall = count(&dataset.overall),
        change = count(&dataset.change),
        invalid = dataset.invalid.len(),
        "normalized dataset"
    );
    dataset
}

fn keep_valid<T>(
    table: Result<Option<Vec<T>>, SchemaError>,
    invalid: &mut Vec<SchemaError>,
) -> Option<Vec<T>> {
    table.unwrap_or_else(|e| {
        warn!(error = %e, "sheet failed validation");
        invalid.push(e);
        None
    })
}

fn count<T>(rows: &Option<Vec<T>>) -> i64 {
    rows.as_ref().map_or(-1, |r| r.len() as i64)
}

fn load_table<T>(
    workbook: &Workbook,
    spec: &TableSpec,
    build: fn(&ColumnMap, &[Cell]) -> T,
) -> Result<Option<Vec<T>>, SchemaError> {
    let Some((sheet_name, sheet)) = workbook.find_sheet(spec.sheet_names) else {
        debug!(
            table = spec.name,
            available = ?workbook.sheet_names().collect::<Vec<_>>(),
            "sheet not present"
        );
        return Ok(None);
    };

    let columns = ColumnMap::resolve(spec, &sheet.headers)?;
    let rows: Vec<T> = sheet
        .rows
        .iter()
        .filter(|row| !row.iter().all(Cell::is_empty))
        .map(|row| build(&columns, row))
        .collect();

    debug!(table = spec.name, sheet = sheet_name, rows = rows.len(), "loaded table");
    Ok(Some(rows))
}

fn sale_row(cols: &ColumnMap, row: &[Cell]) -> SaleRow {
    let order_date = cols.date(row, ORDER_DATE);
    if order_date.is_none() && !cols.cell(row, ORDER_DATE).is_empty() {
        debug!(value = %cols.cell(row, ORDER_DATE), "unparseable order date; row excluded from week filters");
    }
    // Week/Year always come from the order date, never from a stored column.
    let (week, year) = order_date.map(dates::iso_week_key).unzip();

    SaleRow {
        product: cols.text(row, PRODUCT),
        vendor: cols.text(row, VENDOR),
        order_date,
        week,
        year,
        sold_quantity: cols
            .number(row, SOLD_QUANTITY)
            .map(|v| v.round() as i64)
            .unwrap_or(0),
    }
}

fn organic_row(cols: &ColumnMap, row: &[Cell]) -> OrganicRow {
    OrganicRow {
        product: cols.text(row, PRODUCT),
        week: cols.week(row, WEEK),
        year: cols.year(row, YEAR),
        cogs: cols.number(row, COGS),
        daily_organic_sv: cols.number(row, DAILY_ORGANIC_SV),
        organic_share_pct: cols.number(row, ORGANIC_SHARE_PCT),
        net_income_per_sku: cols.number(row, NET_INCOME_PER_SKU),
        total_daily_ni: cols.number(row, TOTAL_DAILY_NI),
        org_units_sold: cols.number(row, ORG_UNITS_SOLD),
        avg_ni_sku_fixed: cols.number(row, AVG_NI_SKU_FIXED),
    }
}

fn media_row(cols: &ColumnMap, row: &[Cell]) -> MediaRow {
    MediaRow {
        product: cols.text(row, PRODUCT),
        week: cols.week(row, WEEK),
        year: cols.year(row, YEAR),
        media_units_sold: cols.number(row, MEDIA_UNITS_SOLD),
        daily_msv: cols.number(row, DAILY_MSV),
        media_share_pct: cols.number(row, MEDIA_SHARE_PCT),
        cpa: cols.number(row, CPA),
        cogs: cols.number(row, COGS),
        ni_per_sku: cols.number(row, NI_PER_SKU),
        total_daily_ni_media: cols.number(row, TOTAL_DAILY_NI_MEDIA),
    }
}

fn overall_row(cols: &ColumnMap, row: &[Cell]) -> OverallRow {
    OverallRow {
        product: cols.text(row, PRODUCT),
        week: cols.week(row, WEEK),
        year: cols.year(row, YEAR),
        total_units_sold: cols.number(row, TOTAL_UNITS_SOLD),
        invoiced_supplied: cols.number(row, INVOICED_SUPPLIED),
        overall_sv: cols.number(row, OVERALL_SV),
        media_units_sold: cols.number(row, MEDIA_UNITS_SOLD),
        daily_media_sv: cols.number(row, DAILY_MEDIA_SV),
        org_units_sold: cols.number(row, ORG_UNITS_SOLD),
        daily_org_sv: cols.number(row, DAILY_ORG_SV),
        media_share_pct: cols.number(row, OVERALL_MEDIA_SHARE_PCT),
        organic_share_pct: cols.number(row, OVERALL_ORGANIC_SHARE_PCT),
    }
}

fn change_row(cols: &ColumnMap, row: &[Cell]) -> ChangeRow {
    ChangeRow {
        week: cols.week(row, WEEK),
        year: cols.year(row, YEAR),
        avg_tcs_media: cols.number(row, AVG_TCS_MEDIA),
        avg_tcs_media_change: cols.number(row, AVG_TCS_MEDIA_CHANGE),
        avg_ni_sku_media: cols.number(row, AVG_NI_SKU_MEDIA),
        avg_ni_sku_media_change: cols.number(row, AVG_NI_SKU_MEDIA_CHANGE),
        total_daily_ni_media: cols.number(row, CHANGE_TOTAL_DAILY_NI_MEDIA),
        total_daily_ni_media_change: cols.number(row, TOTAL_DAILY_NI_MEDIA_CHANGE),
        avg_tcs_organic: cols.number(row, AVG_TCS_ORGANIC),
        avg_ni_sku_organic: cols.number(row, AVG_NI_SKU_ORGANIC),
        total_daily_ni_organic: cols.number(row, TOTAL_DAILY_NI_ORGANIC),
        total_daily_ni_organic_change: cols.number(row, TOTAL_DAILY_NI_ORGANIC_CHANGE),
        avg_overall_daily_sv: cols.number(row, AVG_OVERALL_DAILY_SV),
        avg_overall_daily_sv_change: cols.number(row, AVG_OVERALL_DAILY_SV_CHANGE),
        avg_daily_msv: cols.number(row, AVG_DAILY_MSV),
        avg_daily_msv_change: cols.number(row, AVG_DAILY_MSV_CHANGE),
        avg_daily_osv: cols.number(row, AVG_DAILY_OSV),
        avg_daily_osv_change: cols.number(row, AVG_DAILY_OSV_CHANGE),
        media_share_pct: cols.number(row, CHANGE_MEDIA_SHARE_PCT),
        media_share_pct_change: cols.number(row, MEDIA_SHARE_PCT_CHANGE),
        organic_share_pct: cols.number(row, CHANGE_ORGANIC_SHARE_PCT),
        organic_share_pct_change: cols.number(row, ORGANIC_SHARE_PCT_CHANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::RawSheet;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const RAW_HEADERS: [&str; 4] = [
        "Item Description",
        "Vendor Name",
        "Local Order Date",
        "Sold Quantity",
    ];

    fn sale(product: &str, vendor: &str, date: &str, qty: i64) -> Vec<Cell> {
        vec![product.into(), vendor.into(), date.into(), qty.into()]
    }

    #[test]
    fn absent_sheets_are_none() {
        let ds = normalize(&Workbook::new());
        assert_eq!(ds, Dataset::default());
    }

    #[test]
    fn empty_sheet_is_not_a_schema_error() {
        let wb = Workbook::new().with_sheet("Raw Data - Date Wise", RawSheet::new(RAW_HEADERS));
        let ds = normalize(&wb);
        assert_eq!(ds.raw_sales, Some(vec![]));
    }

    #[test]
    fn missing_columns_are_named() {
        let wb = Workbook::new().with_sheet(
            "Raw Data - Date Wise",
            RawSheet::new(["Item Description", "Local Order Date"])
                .with_row(vec!["Kale".into(), "2024-06-03".into()]),
        );
        let ds = normalize(&wb);
        assert_eq!(ds.raw_sales, None);
        let err = ds.require_sales().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                table: "Raw Data - Date Wise".into(),
                missing: vec!["Vendor".into(), "SoldQuantity".into()],
            }
        );
        assert_eq!(
            err.to_string(),
            "Sheet `Raw Data - Date Wise` is missing required columns: Vendor, SoldQuantity"
        );
    }

    #[test]
    fn derives_iso_week_and_trims_headers() {
        let wb = Workbook::new().with_sheet(
            "raw data - date wise",
            RawSheet::new([" Item Description", "Vendor Name ", " Local Order Date ", "Sold Quantity"])
                .with_row(sale("  Lettuce ", "Dubai  Marina", "2024-06-03", 10))
                .with_row(sale("Lettuce", "Dubai Marina", "garbage", 5)),
        );
        let rows = normalize(&wb).raw_sales.unwrap();

        assert_eq!(rows[0].product, "Lettuce");
        assert_eq!(rows[0].vendor, "Dubai Marina");
        assert_eq!(rows[0].order_date, NaiveDate::from_ymd_opt(2024, 6, 3));
        assert_eq!((rows[0].week, rows[0].year), (Some(23), Some(2024)));

        // bad date: kept, but without a week key
        assert_eq!(rows[1].sold_quantity, 5);
        assert_eq!((rows[1].week, rows[1].year), (None, None));
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let base = RawSheet::new(RAW_HEADERS)
            .with_row(sale("Thyme", "Palm Jumeirah", "2024-05-28", 40))
            .with_row(sale("Thyme", "Palm Jumeirah", "2024-06-04", 55));
        let wb = Workbook::new().with_sheet("Raw Data - Date Wise", base.clone());
        let first = normalize(&wb);
        assert_eq!(first, normalize(&wb));

        // a stale Week/Year pair written back onto the sheet is ignored
        let mut stale = RawSheet::new(RAW_HEADERS.iter().copied().chain(["Week", "Year"]));
        for row in &base.rows {
            let mut r = row.clone();
            r.push(Cell::Number(1.0));
            r.push(Cell::Number(1999.0));
            stale.push_row(r);
        }
        let again = normalize(&Workbook::new().with_sheet("Raw Data - Date Wise", stale));
        assert_eq!(first.raw_sales, again.raw_sales);
    }

    #[test]
    fn organic_sheet_with_optional_year_missing() {
        let wb = Workbook::new().with_sheet(
            "Organic",
            RawSheet::new([
                "Week",
                "PRODUCT NAME",
                "COGS",
                "Daily Organic SV",
                "Organic Share of Sales %",
                "Net Income Per SKU Organic (Excl. Tax)",
                "Total Daily Net Income Organic (Excl. Tax)",
            ])
            .with_row(vec![
                Cell::Number(23.0),
                "Basil".into(),
                Cell::Number(12.5),
                "3.5".into(),
                "41%".into(),
                Cell::Empty,
                Cell::Number(-2.0),
            ]),
        );
        let rows = normalize(&wb).organic.unwrap();
        assert_eq!(
            rows[0],
            OrganicRow {
                product: "Basil".into(),
                week: Some(23),
                year: None,
                cogs: Some(12.5),
                daily_organic_sv: Some(3.5),
                organic_share_pct: Some(41.0),
                net_income_per_sku: None,
                total_daily_ni: Some(-2.0),
                org_units_sold: None,
                avg_ni_sku_fixed: None,
            }
        );
    }

    #[test]
    fn bad_table_only_blocks_itself() {
        let wb = Workbook::new()
            .with_sheet(
                "Raw Data - Date Wise",
                RawSheet::new(RAW_HEADERS).with_row(sale("Kale", "FreshCo", "2024-06-03", 4)),
            )
            .with_sheet("Media", RawSheet::new(["Week", "Product Name"]));
        let ds = normalize(&wb);
        assert_eq!(ds.require_sales().unwrap().len(), 1);
        assert_eq!(ds.media, None);
        match ds.require_media() {
            Err(SchemaError::MissingColumns { table, missing }) => {
                assert_eq!(table, "Media");
                assert!(missing.contains(&"CPA".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
        // an absent sheet is still reported as absent, not as invalid
        assert_eq!(
            ds.require_organic(),
            Err(SchemaError::MissingTable("Organic".into()))
        );
    }
}
