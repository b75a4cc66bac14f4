//! Sheet-oriented row sources.
//!
//! The engine never touches files. Anything that can list sheet names and
//! hand back rows of display text can feed a reconciliation.

use crate::error::ReconError;

pub trait TabularSource {
    /// Name used in error messages (usually the file path).
    fn name(&self) -> &str;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// All rows of one sheet, each cell rendered as text. Column positions
    /// are absolute: cell `i` of a row is spreadsheet column `i`.
    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, ReconError>;
}

/// Workbook held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    name: String,
    sheets: Vec<(String, Vec<Vec<String>>)>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
        }
    }

    /// Append a sheet.
    pub fn with_sheet<R, C, S>(mut self, sheet: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.push((sheet.into(), rows));
        self
    }
}

impl TabularSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, ReconError> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| ReconError::SheetNotFound {
                name: self.name.clone(),
                sheet: sheet.to_string(),
            })
    }
}
