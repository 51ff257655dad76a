use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::PathBuf;
use tracing::debug;

use super::{Cell, DatasetSource, RawSheet, Workbook};
use crate::dates;

/// An `.xlsx` / `.xlsm` / `.xls` / `.ods` file on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct SpreadsheetFile {
    path: PathBuf,
}

impl SpreadsheetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for SpreadsheetFile {
    #[tracing::instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Workbook> {
        let mut book = open_workbook_auto(&self.path)
            .with_context(|| format!("Failed to open workbook: {:?}", self.path))?;

        let mut workbook = Workbook::new();
        for name in book.sheet_names().to_owned() {
            let range = book
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet `{}`", name))?;

            let mut rows = range.rows();
            let Some(header_row) = rows.next() else {
                debug!(sheet = %name, "empty sheet");
                workbook.insert(name, RawSheet::default());
                continue;
            };

            let mut sheet = RawSheet::new(header_row.iter().map(header_text));
            for row in rows {
                let cells: Vec<Cell> = row.iter().map(convert_cell).collect();
                if cells.iter().all(Cell::is_empty) {
                    continue;
                }
                sheet.push_row(cells);
            }
            debug!(sheet = %name, rows = sheet.rows.len(), "loaded sheet");
            workbook.insert(name, sheet);
        }

        Ok(workbook)
    }
}

fn header_text(value: &Data) -> String {
    match value {
        Data::String(s) => s.clone(),
        other => convert_cell(other).to_string(),
    }
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(v) => Cell::Bool(*v),
        Data::String(s) => Cell::from_text(s),
        Data::DateTime(v) => dates::excel_serial_to_datetime(v.as_f64())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Number(v.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
    }
}
