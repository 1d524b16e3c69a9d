//! In-memory sink that records every call, for tests and dry runs.

use serde::Serialize;

use super::{CellSink, FormatId};
use crate::error::Result;
use crate::types::{CellValue, CommentOptions, ImageOptions, ImageSource, Styles};

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SinkOp {
    Write {
        row: u32,
        col: u32,
        value: CellValue,
        #[serde(skip)]
        format: Option<FormatId>,
    },
    Merge {
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        value: CellValue,
        #[serde(skip)]
        format: Option<FormatId>,
    },
    Image {
        row: u32,
        col: u32,
        source: String,
        options: ImageOptions,
    },
    RowHeight {
        row: u32,
        height: f64,
    },
    ColumnWidth {
        first_col: u32,
        last_col: u32,
        width: f64,
    },
    Comment {
        row: u32,
        col: u32,
        text: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
    formats: Vec<Styles>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Styles registered under `id`.
    pub fn format(&self, id: FormatId) -> Option<&Styles> {
        self.formats.get(id.0)
    }

    pub fn format_count(&self) -> usize {
        self.formats.len()
    }

    /// Plain (unmerged) writes as `(row, col, value, format)`.
    pub fn writes(&self) -> impl Iterator<Item = (u32, u32, &CellValue, Option<FormatId>)> {
        self.ops.iter().filter_map(|op| match op {
            SinkOp::Write {
                row,
                col,
                value,
                format,
            } => Some((*row, *col, value, *format)),
            _ => None,
        })
    }

    /// The last value written at `(row, col)`, merged or not.
    pub fn value_at(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Write {
                row: r,
                col: c,
                value,
                ..
            }
            | SinkOp::Merge {
                first_row: r,
                first_col: c,
                value,
                ..
            } if *r == row && *c == col => Some(value),
            _ => None,
        })
    }

    /// Styles behind the last write at `(row, col)`.
    pub fn styles_at(&self, row: u32, col: u32) -> Option<&Styles> {
        let format = self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Write {
                row: r,
                col: c,
                format,
                ..
            }
            | SinkOp::Merge {
                first_row: r,
                first_col: c,
                format,
                ..
            } if *r == row && *c == col => Some(*format),
            _ => None,
        })??;
        self.format(format)
    }
}

impl CellSink for RecordingSink {
    fn add_format(&mut self, styles: &Styles) -> Result<FormatId> {
        self.formats.push(styles.clone());
        Ok(FormatId(self.formats.len() - 1))
    }

    fn write(&mut self, row: u32, col: u32, value: &CellValue, format: Option<FormatId>) -> Result<()> {
        self.ops.push(SinkOp::Write {
            row,
            col,
            value: value.clone(),
            format,
        });
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
        self.ops.push(SinkOp::Merge {
            first_row,
            first_col,
            last_row,
            last_col,
            value: value.clone(),
            format,
        });
        Ok(())
    }

    fn insert_image(
        &mut self,
        row: u32,
        col: u32,
        source: &ImageSource,
        options: &ImageOptions,
    ) -> Result<()> {
        self.ops.push(SinkOp::Image {
            row,
            col,
            source: source.label(),
            options: options.clone(),
        });
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        self.ops.push(SinkOp::RowHeight { row, height });
        Ok(())
    }

    fn set_column_width(&mut self, first_col: u32, last_col: u32, width: f64) -> Result<()> {
        self.ops.push(SinkOp::ColumnWidth {
            first_col,
            last_col,
            width,
        });
        Ok(())
    }

    fn write_comment(
        &mut self,
        row: u32,
        col: u32,
        text: &str,
        _options: &CommentOptions,
    ) -> Result<()> {
        self.ops.push(SinkOp::Comment {
            row,
            col,
            text: text.to_string(),
        });
        Ok(())
    }
}
