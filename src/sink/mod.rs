//! Cell sink abstraction.
//!
//! The render pass only ever talks to a [`CellSink`]; the XLSX exporter and
//! the in-memory [`RecordingSink`] are the two implementations shipped here.

mod recording;

pub use recording::{RecordingSink, SinkOp};

use crate::error::Result;
use crate::types::{CellValue, CommentOptions, ImageOptions, ImageSource, Styles};

/// Opaque handle to a registered format, valid only for the sink that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(pub usize);

/// Target surface for resolved writes. Coordinates are zero-based.
pub trait CellSink {
    /// Register a style map and return a handle for it.
    ///
    /// Callers cache handles by structural equality, so a sink may assume
    /// each distinct map is registered once per sheet.
    fn add_format(&mut self, styles: &Styles) -> Result<FormatId>;

    /// Write a scalar.
    fn write(&mut self, row: u32, col: u32, value: &CellValue, format: Option<FormatId>) -> Result<()>;

    /// Write a scalar into the top-left of an inclusive block and merge it.
    fn merge_range(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        value: &CellValue,
        format: Option<FormatId>,
    ) -> Result<()>;

    fn insert_image(
        &mut self,
        row: u32,
        col: u32,
        source: &ImageSource,
        options: &ImageOptions,
    ) -> Result<()>;

    /// Height in points.
    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()>;

    /// Width in character units, applied to the inclusive column range.
    fn set_column_width(&mut self, first_col: u32, last_col: u32, width: f64) -> Result<()>;

    /// Attach a note to a cell.
    fn write_comment(
        &mut self,
        _row: u32,
        _col: u32,
        _text: &str,
        _options: &CommentOptions,
    ) -> Result<()> {
        // Sinks without comment support drop them
        Ok(())
    }
}

impl<S: CellSink + ?Sized> CellSink for &mut S {
    fn add_format(&mut self, styles: &Styles) -> Result<FormatId> {
        (**self).add_format(styles)
    }

    fn write(&mut self, row: u32, col: u32, value: &CellValue, format: Option<FormatId>) -> Result<()> {
        (**self).write(row, col, value, format)
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
        (**self).merge_range(first_row, first_col, last_row, last_col, value, format)
    }

    fn insert_image(
        &mut self,
        row: u32,
        col: u32,
        source: &ImageSource,
        options: &ImageOptions,
    ) -> Result<()> {
        (**self).insert_image(row, col, source, options)
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        (**self).set_row_height(row, height)
    }

    fn set_column_width(&mut self, first_col: u32, last_col: u32, width: f64) -> Result<()> {
        (**self).set_column_width(first_col, last_col, width)
    }

    fn write_comment(
        &mut self,
        row: u32,
        col: u32,
        text: &str,
        options: &CommentOptions,
    ) -> Result<()> {
        (**self).write_comment(row, col, text, options)
    }
}
