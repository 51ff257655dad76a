use anyhow::{Context, Result};
use csv::ReaderBuilder;
use glob::glob;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};
use tracing::{debug, warn};

use super::{Cell, DatasetSource, RawSheet, Workbook};

/// A directory holding one `<sheet name>.csv` per worksheet.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DatasetSource for CsvDirectory {
    #[tracing::instrument(level = "info", skip(self), fields(dir = %self.dir.display()))]
    fn load(&self) -> Result<Workbook> {
        if !self.dir.is_dir() {
            anyhow::bail!("{} is not a directory", self.dir.display());
        }

        let pattern = format!("{}/*.csv", self.dir.display());
        let mut workbook = Workbook::new();

        for entry in glob(&pattern).with_context(|| format!("bad glob pattern {}", pattern))? {
            let path = entry?;
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("skipping non UTF-8 file name {:?}", path);
                continue;
            };

            let file = File::open(&path)
                .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
            let sheet = read_csv_sheet(BufReader::new(file))
                .with_context(|| format!("Failed to parse {:?}", path))?;
            debug!(sheet = name, rows = sheet.rows.len(), "loaded csv sheet");
            workbook.insert(name, sheet);
        }

        Ok(workbook)
    }
}

/// Parse one CSV stream: first record is the header row, every later record a data row.
pub fn read_csv_sheet<R: Read>(reader: R) -> Result<RawSheet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows are padded later by the normalizer
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut sheet = RawSheet::new(headers);

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        let row: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        sheet.push_row(row);
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor};
    use tempfile::tempdir;

    #[test]
    fn reads_headers_and_skips_blank_lines() -> Result<()> {
        let text = "Item Description,Vendor Name,Local Order Date,Sold Quantity\n\
                    Lettuce,Dubai Marina,2024-06-03,10\n\
                    ,,,\n\
                    Thyme,Palm Jumeirah,2024-06-04,\n";
        let sheet = read_csv_sheet(Cursor::new(text))?;

        assert_eq!(sheet.headers[1], "Vendor Name");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0], Cell::Text("Lettuce".into()));
        assert_eq!(sheet.rows[1][3], Cell::Empty);
        Ok(())
    }

    #[test]
    fn loads_one_sheet_per_file() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("Media.csv"), "Year,Week,Product Name\n2024,23,Kale\n")?;
        fs::write(
            dir.path().join("Overall Avg & Change.csv"),
            "Week,year\n23,2024\n24,2024\n",
        )?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let wb = CsvDirectory::new(dir.path()).load()?;
        assert_eq!(wb.len(), 2);
        let (_, change) = wb.find_sheet(&["overall avg & change"]).unwrap();
        assert_eq!(change.rows.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = CsvDirectory::new("/definitely/not/here").load().unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
