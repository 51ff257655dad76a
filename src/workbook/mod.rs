// src/workbook/mod.rs
use anyhow::Result;
use chrono::NaiveDateTime;
use std::{collections::BTreeMap, fmt};

mod csv_dir;
mod spreadsheet;

pub use csv_dir::{read_csv_sheet, CsvDirectory};
pub use spreadsheet::SpreadsheetFile;

/// A single loosely typed value, as it came out of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Blank or whitespace-only text becomes `Empty`; everything else stays text.
    /// Typing happens later, per column, in the normalizer.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

/// One worksheet: the header row plus every data row below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// Header cells exactly as the sheet spells them (untrimmed).
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

/// A named bundle of sheets, i.e. one snapshot of the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: BTreeMap<String, RawSheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, sheet: RawSheet) {
        self.sheets.insert(name.into(), sheet);
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: RawSheet) -> Self {
        self.insert(name, sheet);
        self
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    /// Look a sheet up by any of `names`, ignoring case and surrounding whitespace.
    /// The first name in `names` that resolves wins.
    pub fn find_sheet(&self, names: &[&str]) -> Option<(&str, &RawSheet)> {
        names.iter().find_map(|wanted| {
            let wanted = wanted.trim();
            self.sheets
                .iter()
                .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
                .map(|(name, sheet)| (name.as_str(), sheet))
        })
    }
}

/// Anything that can hand the engine a fresh workbook snapshot.
pub trait DatasetSource {
    fn load(&self) -> Result<Workbook>;
}

/// An already materialized snapshot; each load hands out a copy.
impl DatasetSource for Workbook {
    fn load(&self) -> Result<Workbook> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_sheet_ignores_case_and_padding() {
        let wb = Workbook::new()
            .with_sheet(" Raw Data - Date Wise ", RawSheet::new(["Product"]))
            .with_sheet("Media", RawSheet::new(["Product Name"]));

        let (name, _) = wb.find_sheet(&["raw data - date wise"]).unwrap();
        assert_eq!(name, " Raw Data - Date Wise ");
        assert!(wb.find_sheet(&["Organic"]).is_none());
    }

    #[test]
    fn find_sheet_prefers_earlier_alias() {
        let wb = Workbook::new()
            .with_sheet("Change", RawSheet::new(["Week"]))
            .with_sheet("Overall Avg & Change", RawSheet::new(["Week", "year"]));

        let (name, sheet) = wb.find_sheet(&["Overall Avg & Change", "Change"]).unwrap();
        assert_eq!(name, "Overall Avg & Change");
        assert_eq!(sheet.headers.len(), 2);
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(Cell::from("   ").is_empty());
        assert_eq!(Cell::from(" Thyme "), Cell::Text(" Thyme ".into()));
    }
}
