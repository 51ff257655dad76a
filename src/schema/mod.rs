pub mod columns;
mod normalize;
mod tables;

pub use columns::{TableSpec, CHANGE, MEDIA, ORGANIC, OVERALL, RAW_SALES};
pub use normalize::normalize;
pub use tables::{
    ChangeRow, MediaRow, OrganicRow, OverallRow, ProductRow, SaleRow, WeeklyRow,
};

use thiserror::Error;

/// Structural problems with the workbook. Empty sheets are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Sheet `{table}` is missing required columns: {}", .missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },
    #[error("Sheet `{0}` is not available in the current dataset")]
    MissingTable(String),
}

/// The normalized tables of one workbook snapshot. `None` means the sheet was absent
/// or failed validation; in the latter case its error is kept in `invalid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub raw_sales: Option<Vec<SaleRow>>,
    pub organic: Option<Vec<OrganicRow>>,
    pub media: Option<Vec<MediaRow>>,
    pub overall: Option<Vec<OverallRow>>,
    pub change: Option<Vec<ChangeRow>>,
    pub invalid: Vec<SchemaError>,
}

impl SchemaError {
    pub fn table(&self) -> &str {
        match self {
            SchemaError::MissingColumns { table, .. } => table,
            SchemaError::MissingTable(table) => table,
        }
    }
}

impl Dataset {
    fn require<'a, T>(&'a self, rows: &'a Option<Vec<T>>, spec: &TableSpec) -> Result<&'a [T], SchemaError> {
        if let Some(err) = self.invalid.iter().find(|e| e.table() == spec.name) {
            return Err(err.clone());
        }
        rows.as_deref()
            .ok_or_else(|| SchemaError::MissingTable(spec.name.to_string()))
    }

    pub fn require_sales(&self) -> Result<&[SaleRow], SchemaError> {
        self.require(&self.raw_sales, &RAW_SALES)
    }

    pub fn require_organic(&self) -> Result<&[OrganicRow], SchemaError> {
        self.require(&self.organic, &ORGANIC)
    }

    pub fn require_media(&self) -> Result<&[MediaRow], SchemaError> {
        self.require(&self.media, &MEDIA)
    }

    pub fn require_overall(&self) -> Result<&[OverallRow], SchemaError> {
        self.require(&self.overall, &OVERALL)
    }

    pub fn require_change(&self) -> Result<&[ChangeRow], SchemaError> {
        self.require(&self.change, &CHANGE)
    }
}
