//! Render pass: walk a bound [`Layout`] and issue sink calls.
//!
//! - [`Writer`] owns the global format and the per-sheet style cache
//! - `table` expands Table nodes into header and data writes
//! - `printer` is the diagnostic traversal

mod printer;
mod table;

pub use printer::{print_layout, print_to_string};

use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, SheetboxError};
use crate::layout::{Layout, NodeId};
use crate::node::{Cell, Image, NodeKind};
use crate::sink::{CellSink, FormatId};
use crate::table::default_num_format;
use crate::types::Styles;

/// Walks a bound layout into one sheet's sink.
///
/// Style maps are merged over the global format and registered with the
/// sink once per distinct result; the cache is never shared between sheets.
pub struct Writer<'a, S: CellSink + ?Sized> {
    pub(crate) sink: &'a mut S,
    global_format: Styles,
    formats: HashMap<Styles, Option<FormatId>>,
    pub(crate) fast: bool,
}

impl<'a, S: CellSink + ?Sized> Writer<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            global_format: Styles::new(),
            formats: HashMap::new(),
            fast: false,
        }
    }

    /// Styles merged beneath every written style.
    pub fn global_format(mut self, styles: Styles) -> Self {
        self.global_format = styles;
        self
    }

    /// Skip table writes for empty values.
    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    /// Resolve a style map to a sink handle; an empty merged map has none.
    pub fn format(&mut self, styles: &Styles) -> Result<Option<FormatId>> {
        let merged = Styles::layered(&self.global_format, styles);
        if let Some(&id) = self.formats.get(&merged) {
            return Ok(id);
        }
        let id = if merged.is_empty() {
            None
        } else {
            Some(self.sink.add_format(&merged)?)
        };
        self.formats.insert(merged, id);
        Ok(id)
    }

    /// Number of distinct style maps seen so far.
    pub fn cached_formats(&self) -> usize {
        self.formats.len()
    }

    pub fn render(&mut self, layout: &Layout) -> Result<()> {
        let root = layout.root();
        if !layout.is_bound() {
            return Err(SheetboxError::UnboundAccess {
                node: layout.describe(root),
            });
        }
        self.visit(layout, root)?;
        debug!(formats = self.formats.len(), "layout rendered");
        Ok(())
    }

    fn visit(&mut self, layout: &Layout, id: NodeId) -> Result<()> {
        match layout[id].kind() {
            NodeKind::Row | NodeKind::Col | NodeKind::Container => {
                for &child in layout[id].children() {
                    self.visit(layout, child)?;
                }
                Ok(())
            }
            NodeKind::Cell(cell) => self.write_cell(layout, id, cell),
            NodeKind::Image(image) => self.insert_image(layout, id, image),
            NodeKind::Table(table) => table::expand(self, layout, id, table),
        }
    }

    fn write_cell(&mut self, layout: &Layout, id: NodeId, cell: &Cell) -> Result<()> {
        let instance = layout.instance(id)?;
        let (row, col) = (instance.row, instance.col);
        let slot = &layout[id];
        let rowspan = slot.rowspan().unwrap_or(1).max(1);
        let colspan = slot.colspan().unwrap_or(1).max(1);

        let format = match cell.value.temporal_kind() {
            Some(kind) if !slot.styles().contains_key("num_format") => {
                self.format(&slot.styles().clone().with("num_format", default_num_format(kind)))?
            }
            _ => self.format(slot.styles())?,
        };

        if let Some(height) = cell.height.filter(|_| rowspan == 1) {
            self.sink.set_row_height(row, height)?;
        }
        if let Some(width) = cell.width.filter(|_| colspan == 1) {
            self.sink.set_column_width(col, col, width)?;
        }
        if rowspan == 1 && colspan == 1 {
            self.sink.write(row, col, &cell.value, format)?;
        } else {
            self.sink.merge_range(
                row,
                col,
                row.saturating_add(rowspan - 1),
                col.saturating_add(colspan - 1),
                &cell.value,
                format,
            )?;
        }
        if let Some(text) = &cell.comment {
            self.sink.write_comment(row, col, text, &cell.comment_options)?;
        }
        Ok(())
    }

    fn insert_image(&mut self, layout: &Layout, id: NodeId, image: &Image) -> Result<()> {
        let instance = layout.instance(id)?;
        self.sink
            .insert_image(instance.row, instance.col, &image.source, &image.options)
    }
}

/// Render a bound layout with no global format, fast mode off.
pub fn render<S: CellSink + ?Sized>(layout: &Layout, sink: &mut S) -> Result<()> {
    Writer::new(sink).render(layout)
}
