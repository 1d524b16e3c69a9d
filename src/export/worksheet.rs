//! In-memory worksheet that collects sink calls until the workbook is
//! serialized.

use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

use crate::cell_ref::cell_ref;
use crate::error::{Result, SheetboxError};
use crate::sink::{CellSink, FormatId};
use crate::types::{CellValue, CommentOptions, ImageOptions, ImageSource, Styles};

#[derive(Debug, Clone)]
pub(crate) struct CellEntry {
    pub value: CellValue,
    pub format: Option<FormatId>,
}

/// Inclusive merged block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl MergeRange {
    fn overlaps(&self, other: &MergeRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }

    pub fn to_ref(self) -> String {
        format!(
            "{}:{}",
            cell_ref(self.first_row, self.first_col),
            cell_ref(self.last_row, self.last_col)
        )
    }
}

/// An image anchored at a cell, with its bytes already loaded.
#[derive(Debug, Clone)]
pub(crate) struct ImageAnchor {
    pub row: u32,
    pub col: u32,
    pub data: Vec<u8>,
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
    pub options: ImageOptions,
}

#[derive(Debug, Clone)]
pub(crate) struct Note {
    pub row: u32,
    pub col: u32,
    pub text: String,
    pub options: CommentOptions,
}

/// One worksheet of an [`XlsxWorkbook`](super::XlsxWorkbook).
///
/// Format handles are local to the sheet; they become workbook-wide cell
/// formats only when the package is written.
#[derive(Debug, Default)]
pub struct Worksheet {
    pub(crate) name: String,
    pub(crate) cells: BTreeMap<(u32, u32), CellEntry>,
    pub(crate) merges: Vec<MergeRange>,
    pub(crate) row_heights: BTreeMap<u32, f64>,
    pub(crate) col_widths: BTreeMap<u32, f64>,
    pub(crate) images: Vec<ImageAnchor>,
    pub(crate) notes: Vec<Note>,
    pub(crate) formats: Vec<Styles>,
}

impl Worksheet {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last used `(row, col)`, counting merges; `None` for an empty sheet.
    pub fn max_cell(&self) -> Option<(u32, u32)> {
        let cells = self.cells.keys().copied();
        let merges = self.merges.iter().map(|m| (m.last_row, m.last_col));
        cells
            .chain(merges)
            .fold(None, |acc: Option<(u32, u32)>, (r, c)| match acc {
                Some((mr, mc)) => Some((mr.max(r), mc.max(c))),
                None => Some((r, c)),
            })
    }

    fn put(&mut self, row: u32, col: u32, value: CellValue, format: Option<FormatId>) {
        if value.is_empty() && format.is_none() {
            self.cells.remove(&(row, col));
            return;
        }
        self.cells.insert((row, col), CellEntry { value, format });
    }
}

impl CellSink for Worksheet {
    fn add_format(&mut self, styles: &Styles) -> Result<FormatId> {
        self.formats.push(styles.clone());
        Ok(FormatId(self.formats.len() - 1))
    }

    fn write(&mut self, row: u32, col: u32, value: &CellValue, format: Option<FormatId>) -> Result<()> {
        self.put(row, col, value.clone(), format);
        Ok(())
    }

    fn merge_range(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        value: &CellValue,
        format: Option<FormatId>,
    ) -> Result<()> {
        let range = MergeRange {
            first_row: first_row.min(last_row),
            first_col: first_col.min(last_col),
            last_row: first_row.max(last_row),
            last_col: first_col.max(last_col),
        };
        if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&range)) {
            return Err(SheetboxError::Render(format!(
                "merge {} overlaps merge {}",
                range.to_ref(),
                existing.to_ref()
            )));
        }
        // Blank cells carry the format so borders cover the whole block
        for row in range.first_row..=range.last_row {
            for col in range.first_col..=range.last_col {
                self.put(row, col, CellValue::Empty, format);
            }
        }
        self.put(range.first_row, range.first_col, value.clone(), format);
        if range.first_row != range.last_row || range.first_col != range.last_col {
            self.merges.push(range);
        }
        Ok(())
    }

    fn insert_image(
        &mut self,
        row: u32,
        col: u32,
        source: &ImageSource,
        options: &ImageOptions,
    ) -> Result<()> {
        let data = source.read()?;
        let reader = image::ImageReader::new(Cursor::new(&data)).with_guessed_format()?;
        let extension = match reader.format() {
            Some(image::ImageFormat::Png) => "png",
            Some(image::ImageFormat::Jpeg) => "jpeg",
            other => {
                return Err(SheetboxError::Render(format!(
                    "unsupported image format {other:?} for {}",
                    source.label()
                )))
            }
        };
        let (width, height) = reader.into_dimensions()?;
        debug!(image = %source.label(), width, height, row, col, "image anchored");
        self.images.push(ImageAnchor {
            row,
            col,
            data,
            extension,
            width,
            height,
            options: options.clone(),
        });
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        self.row_heights.insert(row, height);
        Ok(())
    }

    fn set_column_width(&mut self, first_col: u32, last_col: u32, width: f64) -> Result<()> {
        for col in first_col.min(last_col)..=first_col.max(last_col) {
            self.col_widths.insert(col, width);
        }
        Ok(())
    }

    fn write_comment(
        &mut self,
        row: u32,
        col: u32,
        text: &str,
        options: &CommentOptions,
    ) -> Result<()> {
        self.notes.retain(|n| (n.row, n.col) != (row, col));
        self.notes.push(Note {
            row,
            col,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_fills_block_and_records_range() {
        let mut sheet = Worksheet::new("S".into());
        let f = sheet.add_format(&Styles::new().with("border", 1)).unwrap();
        sheet
            .merge_range(1, 1, 2, 3, &CellValue::from("title"), Some(f))
            .unwrap();
        assert_eq!(sheet.cells.len(), 6);
        assert_eq!(sheet.merges.len(), 1);
        assert_eq!(sheet.merges[0].to_ref(), "B2:D3");
        assert_eq!(sheet.max_cell(), Some((2, 3)));
    }

    #[test]
    fn test_overlapping_merges_rejected() {
        let mut sheet = Worksheet::new("S".into());
        sheet.merge_range(0, 0, 1, 1, &CellValue::from("a"), None).unwrap();
        assert!(sheet.merge_range(1, 1, 2, 2, &CellValue::from("b"), None).is_err());
    }

    #[test]
    fn test_blank_without_format_is_dropped() {
        let mut sheet = Worksheet::new("S".into());
        sheet.write(0, 0, &CellValue::Empty, None).unwrap();
        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.max_cell(), None);
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let mut sheet = Worksheet::new("S".into());
        let source = ImageSource::Bytes {
            name: "text/plain".into(),
            data: b"not an image".to_vec().into(),
        };
        assert!(sheet
            .insert_image(0, 0, &source, &ImageOptions::default())
            .is_err());
    }
}
