//! sheetbox - declarative box layout for spreadsheets
//!
//! Build a tree of rows, columns, cells, images and tables, bind it to
//! absolute grid coordinates, then render the bound tree into a cell sink:
//! - Explicit spans, offsets and a single growing child per row/column
//! - Tables expanded from record collections with per-record style rules
//! - Merged cells, images, comments, row heights and column widths
//! - Real `.xlsx` output, or any [`CellSink`] implementation
//!
//! # Usage
//!
//! ```
//! use sheetbox::{Node, Sheet, Table};
//!
//! let table = Table::new(
//!     vec![sheetbox::Value::map([("name", "ann")])],
//!     [("name", "Name")],
//! );
//! let sheet = Sheet::new(
//!     Node::col([
//!         Node::cell("Staff").colspan(3).style("bold", true),
//!         Node::row([Node::table(table), Node::cell("note").grow()]),
//!     ]),
//!     0,
//!     0,
//! )?;
//! let bytes = sheet.to_xlsx_bytes()?;
//! assert!(bytes.starts_with(b"PK"));
//! # Ok::<(), sheetbox::SheetboxError>(())
//! ```

pub mod cell_ref;
pub mod color;
pub mod document;
pub mod error;
pub mod export;
pub mod layout;
pub mod node;
pub mod numfmt;
pub mod path;
pub mod render;
pub mod sheet;
pub mod sink;
pub mod table;
pub mod types;

pub use document::Document;
pub use error::{Result, SheetboxError};
pub use export::{Worksheet, XlsxWorkbook};
pub use layout::{bind, Layout};
pub use node::{Cell, Image, Node, NodeKind};
pub use render::{render, Writer};
pub use sheet::{Book, Sheet};
pub use sink::{CellSink, FormatId, RecordingSink};
pub use table::{Callback, CellStyle, Column, ColumnType, RowHeight, Table};
pub use types::*;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Build an XLSX file from a JSON layout document.
///
/// # Errors
/// Returns an error if the document is malformed or its layout cannot be bound.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn build_xlsx(document: &str) -> std::result::Result<Vec<u8>, JsValue> {
    let book = Document::from_json(document)?.into_book()?;
    Ok(book.to_xlsx_bytes()?)
}

/// Bind a JSON layout document and return every sheet's bound boxes.
///
/// # Errors
/// Returns an error if the document is malformed or its layout cannot be bound.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn layout_json(document: &str) -> std::result::Result<JsValue, JsValue> {
    let book = Document::from_json(document)?.into_book()?;
    let snapshots = book
        .sheets()
        .iter()
        .map(Sheet::snapshot)
        .collect::<Result<Vec<_>>>()?;
    serde_wasm_bindgen::to_value(&snapshots)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
