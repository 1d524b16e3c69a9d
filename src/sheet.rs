//! Sheet and Book: the top-level entry points tying binding, rendering and
//! the XLSX sink together.

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::export::XlsxWorkbook;
use crate::layout::{BoxSnapshot, Layout};
use crate::node::Node;
use crate::render::{print_layout, Writer};
use crate::sink::CellSink;
use crate::types::Styles;

/// One bound layout plus the settings used to render it.
///
/// The tree is bound when the sheet is created, so layout errors surface
/// before any output exists.
#[derive(Debug)]
pub struct Sheet {
    layout: Layout,
    name: Option<String>,
    global_format: Styles,
    fast: bool,
}

impl Sheet {
    /// Bind `root` with its top-left corner at `(start_row, start_col)`.
    pub fn new(root: Node, start_row: u32, start_col: u32) -> Result<Self> {
        let layout = Layout::new(root).bind(start_row, start_col)?;
        Ok(Self {
            layout,
            name: None,
            global_format: Styles::new(),
            fast: false,
        })
    }

    /// Stack several roots vertically in an implicit column.
    pub fn from_nodes(
        roots: impl IntoIterator<Item = Node>,
        start_row: u32,
        start_col: u32,
    ) -> Result<Self> {
        Self::new(Node::col(roots), start_row, start_col)
    }

    /// Worksheet tab name; defaults to "SheetN".
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn global_format(mut self, styles: Styles) -> Self {
        self.global_format = styles;
        self
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Render into any sink with a fresh style cache.
    pub fn write_to<S: CellSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        Writer::new(sink)
            .global_format(self.global_format.clone())
            .fast(self.fast)
            .render(&self.layout)
    }

    /// Render into a new worksheet of an existing workbook.
    pub fn attach(&self, workbook: &mut XlsxWorkbook) -> Result<()> {
        let worksheet = workbook.add_worksheet(self.name.as_deref())?;
        self.write_to(worksheet)
    }

    /// A one-sheet workbook as XLSX bytes.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = XlsxWorkbook::new();
        self.attach(&mut workbook)?;
        workbook.to_bytes()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut workbook = XlsxWorkbook::new();
        self.attach(&mut workbook)?;
        workbook.save(path)
    }

    /// Diagnostic dump, one line per node.
    pub fn print(&self, out: &mut impl Write) -> Result<()> {
        print_layout(&self.layout, out)
    }

    pub fn snapshot(&self) -> Result<Vec<BoxSnapshot>> {
        self.layout.snapshot()
    }
}

/// Append-only collection of sheets written as one workbook, one tab each.
#[derive(Debug, Default)]
pub struct Book {
    sheets: Vec<Sheet>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Render every sheet into its own worksheet.
    pub fn to_workbook(&self) -> Result<XlsxWorkbook> {
        let mut workbook = XlsxWorkbook::new();
        for sheet in &self.sheets {
            sheet.attach(&mut workbook)?;
        }
        Ok(workbook)
    }

    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        self.to_workbook()?.to_bytes()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_workbook()?.save(path.as_ref())?;
        info!(sheets = self.sheets.len(), "book written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::types::{CellValue, StyleValue};

    #[test]
    fn test_list_roots_stack_vertically() {
        let sheet = Sheet::from_nodes([Node::cell("a"), Node::cell("b")], 2, 1).unwrap();
        let mut sink = RecordingSink::new();
        sheet.write_to(&mut sink).unwrap();
        assert_eq!(sink.value_at(2, 1), Some(&CellValue::from("a")));
        assert_eq!(sink.value_at(3, 1), Some(&CellValue::from("b")));
    }

    #[test]
    fn test_global_format_sits_under_cell_styles() {
        let sheet = Sheet::new(
            Node::row([Node::cell("x").style("bold", false), Node::cell("y")]),
            0,
            0,
        )
        .unwrap()
        .global_format(Styles::new().with("bold", true).with("font_size", 9));
        let mut sink = RecordingSink::new();
        sheet.write_to(&mut sink).unwrap();

        let x = sink.styles_at(0, 0).unwrap();
        assert_eq!(x.get("bold"), Some(&StyleValue::Bool(false)));
        assert_eq!(x.get("font_size"), Some(&StyleValue::Int(9)));
        let y = sink.styles_at(0, 1).unwrap();
        assert_eq!(y.get("bold"), Some(&StyleValue::Bool(true)));
    }

    #[test]
    fn test_bind_errors_surface_at_construction() {
        let tree = Node::row([Node::cell("a").grow(), Node::cell("b").grow()]).colspan(4);
        assert!(Sheet::new(tree, 0, 0).is_err());
    }

    #[test]
    fn test_book_keeps_one_tab_per_sheet() {
        let mut book = Book::new();
        book.add_sheet(Sheet::new(Node::cell("one"), 0, 0).unwrap().name("First"));
        book.add_sheet(Sheet::new(Node::cell("two"), 0, 0).unwrap());
        let workbook = book.to_workbook().unwrap();
        let names: Vec<&str> = workbook.worksheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["First", "Sheet2"]);
    }
}
