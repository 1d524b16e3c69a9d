//! XLSX export pipeline.
//!
//! Worksheets collect sink calls in memory; nothing touches the ZIP archive
//! until [`XlsxWorkbook::to_bytes`] serializes every sheet at once.

pub(crate) mod drawing;
pub(crate) mod package;
pub(crate) mod sheet_writer;
pub(crate) mod styles;
pub(crate) mod worksheet;

use std::path::Path;
use tracing::info;

use crate::error::{Result, SheetboxError};

pub use worksheet::Worksheet;

const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// A workbook under construction.
#[derive(Debug, Default)]
pub struct XlsxWorkbook {
    sheets: Vec<Worksheet>,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a worksheet. Without a name it becomes "SheetN".
    pub fn add_worksheet(&mut self, name: Option<&str>) -> Result<&mut Worksheet> {
        let name = match name {
            Some(name) => {
                self.check_name(name)?;
                name.to_string()
            }
            None => {
                let mut n = self.sheets.len() + 1;
                while self.has_sheet(&format!("Sheet{n}")) {
                    n += 1;
                }
                format!("Sheet{n}")
            }
        };
        self.sheets.push(Worksheet::new(name));
        let idx = self.sheets.len() - 1;
        self.sheets
            .get_mut(idx)
            .ok_or_else(|| SheetboxError::Render("worksheet vanished".into()))
    }

    fn has_sheet(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(name))
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(SheetboxError::Render("sheet name is empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME {
            return Err(SheetboxError::Render(format!(
                "sheet name '{name}' exceeds {MAX_SHEET_NAME} characters"
            )));
        }
        if let Some(ch) = name.chars().find(|c| FORBIDDEN.contains(c)) {
            return Err(SheetboxError::Render(format!(
                "sheet name '{name}' contains '{ch}'"
            )));
        }
        if self.has_sheet(name) {
            return Err(SheetboxError::Render(format!(
                "duplicate sheet name '{name}'"
            )));
        }
        Ok(())
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    /// Serialize to XLSX bytes. An empty workbook gets one blank sheet,
    /// since Excel refuses files without any.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return package::write_package(&[Worksheet::new("Sheet1".into())]);
        }
        package::write_package(&self.sheets)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(path = %path.as_ref().display(), bytes = bytes.len(), "workbook saved");
        Ok(())
    }
}
