use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta};

use crate::workbook::Cell;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y"];

/// Spreadsheet serial day numbers past this are not real dates (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Excel / Lotus serial (days since 1899-12-30, fractional part = time of day).
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Parse a textual order date. Slash dates with the year last are month-first.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Best-effort date out of any cell kind.
pub fn cell_to_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(v) => excel_serial_to_datetime(*v).map(|dt| dt.date()),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// ISO week number and the ISO week-year it belongs to.
pub fn iso_week_key(date: NaiveDate) -> (u32, i32) {
    let w = date.iso_week();
    (w.week(), w.year())
}
