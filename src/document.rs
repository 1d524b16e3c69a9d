//! JSON layout documents.
//!
//! A document describes one sheet (or a list of sheets) as data, so layouts
//! can be authored without writing Rust. Style attributes may be given as a
//! map or as a `"key: value; key: value"` string; both become [`Styles`]
//! before anything reaches the binder.
//!
//! ```json
//! {
//!   "name": "Report",
//!   "start_cell": "B2",
//!   "root": {
//!     "type": "col",
//!     "children": [
//!       { "type": "cell", "value": "Title", "colspan": 3, "style": "bold: true" },
//!       { "type": "table", "data": [{"a": 1}], "columns": [["a", "A"]] }
//!     ]
//!   }
//! }
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::path::Path;

use crate::cell_ref::parse_cell_ref;
use crate::error::{Result, SheetboxError};
use crate::node::{Cell, Image, Node};
use crate::path::FieldPath;
use crate::sheet::{Book, Sheet};
use crate::table::{Callback, CellStyle, Column, RowHeight, StyleRule, Table};
use crate::types::{CellValue, CommentOptions, ImageOptions, ImageSource, Styles, Value};

/// Styles as written in a document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StyleDoc {
    Css(String),
    Map(Styles),
}

impl StyleDoc {
    pub fn to_styles(&self) -> Result<Styles> {
        match self {
            Self::Css(css) => Styles::from_css(css),
            Self::Map(styles) => Ok(styles.clone()),
        }
    }
}

/// Condition of a document style rule: `attr` must resolve to `equals`.
#[derive(Debug, Clone, Deserialize)]
pub struct WhenDoc {
    pub attr: String,
    pub equals: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDoc {
    pub style: StyleDoc,
    pub when: WhenDoc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellStyleDoc {
    Uniform(StyleDoc),
    Rules(Vec<RuleDoc>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableDoc {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    pub columns: Vec<serde_json::Value>,
    pub col_width: Option<f64>,
    pub row_height: Option<f64>,
    pub border: Option<i64>,
    pub cell_style: Option<CellStyleDoc>,
    pub datetime_format: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
}

/// Node variants, tagged by `"type"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindDoc {
    Row,
    Col,
    #[serde(rename = "box")]
    Container,
    Cell {
        #[serde(default)]
        value: serde_json::Value,
        width: Option<f64>,
        height: Option<f64>,
        comment: Option<String>,
        #[serde(default)]
        comment_options: CommentOptions,
    },
    Image {
        src: String,
        #[serde(default)]
        options: ImageOptions,
    },
    Table(TableDoc),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDoc {
    #[serde(flatten)]
    pub kind: KindDoc,
    pub rowspan: Option<u32>,
    pub colspan: Option<u32>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub grow: bool,
    pub style: Option<StyleDoc>,
    #[serde(default)]
    pub children: Vec<ChildDoc>,
}

/// A child entry: bare text is shorthand for a Cell holding it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChildDoc {
    Text(String),
    Node(NodeDoc),
}

impl ChildDoc {
    pub fn into_node(self) -> Result<Node> {
        match self {
            Self::Text(text) => Ok(Node::cell(text)),
            Self::Node(node) => node.into_node(),
        }
    }
}

/// One sheet: a root node (or a list of roots) plus render settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetDoc {
    pub name: Option<String>,
    /// `[row, col]`, zero-based
    pub start: Option<(u32, u32)>,
    /// A1-style alternative to `start`
    pub start_cell: Option<String>,
    pub global_format: Option<StyleDoc>,
    #[serde(default)]
    pub fast: bool,
    pub root: Option<NodeDoc>,
    #[serde(default)]
    pub roots: Vec<NodeDoc>,
}

/// A whole document: a single sheet or `{"sheets": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Book { sheets: Vec<SheetDoc> },
    Sheet(SheetDoc),
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build and bind every sheet.
    pub fn into_book(self) -> Result<Book> {
        let mut book = Book::new();
        match self {
            Self::Book { sheets } => {
                for sheet in sheets {
                    book.add_sheet(sheet.into_sheet()?);
                }
            }
            Self::Sheet(sheet) => book.add_sheet(sheet.into_sheet()?),
        }
        Ok(book)
    }
}

impl SheetDoc {
    pub fn into_sheet(self) -> Result<Sheet> {
        let (row, col) = match (&self.start_cell, self.start) {
            (Some(reference), _) => parse_cell_ref(reference).ok_or_else(|| {
                SheetboxError::Render(format!("invalid start cell '{reference}'"))
            })?,
            (None, Some(start)) => start,
            (None, None) => (0, 0),
        };

        let mut sheet = match (self.root, self.roots.is_empty()) {
            (Some(root), true) => Sheet::new(root.into_node()?, row, col)?,
            (None, false) => Sheet::from_nodes(
                self.roots
                    .into_iter()
                    .map(NodeDoc::into_node)
                    .collect::<Result<Vec<_>>>()?,
                row,
                col,
            )?,
            (Some(_), false) => {
                return Err(SheetboxError::Render(
                    "a sheet takes either `root` or `roots`, not both".into(),
                ))
            }
            (None, true) => {
                return Err(SheetboxError::Render("a sheet needs `root` or `roots`".into()))
            }
        };

        if let Some(name) = self.name {
            sheet = sheet.name(name);
        }
        if let Some(global) = &self.global_format {
            sheet = sheet.global_format(global.to_styles()?);
        }
        Ok(sheet.fast(self.fast))
    }
}

impl NodeDoc {
    pub fn into_node(self) -> Result<Node> {
        let node = match self.kind {
            KindDoc::Row => Node::row([]),
            KindDoc::Col => Node::col([]),
            KindDoc::Container => Node::container([]),
            KindDoc::Cell {
                value,
                width,
                height,
                comment,
                comment_options,
            } => {
                let mut cell = Cell::new(cell_value(value)?).comment_options(comment_options);
                if let Some(width) = width {
                    cell = cell.width(width);
                }
                if let Some(height) = height {
                    cell = cell.height(height);
                }
                if let Some(text) = comment {
                    cell = cell.comment(text);
                }
                Node::from(cell)
            }
            KindDoc::Image { src, options } => {
                Node::from(Image::new(ImageSource::parse(&src)?).options(options))
            }
            KindDoc::Table(table) => Node::table(table.into_table()?),
        };

        // Tables size themselves; only explicit spans override that
        let mut node = node.offset(self.offset).set_grow(self.grow);
        if let Some(rowspan) = self.rowspan {
            node = node.rowspan(rowspan);
        }
        if let Some(colspan) = self.colspan {
            node = node.colspan(colspan);
        }
        if let Some(style) = &self.style {
            node = node.styles(&style.to_styles()?);
        }
        let children = self
            .children
            .into_iter()
            .map(ChildDoc::into_node)
            .collect::<Result<Vec<_>>>()?;
        Ok(node.children(children))
    }
}

impl TableDoc {
    fn into_table(self) -> Result<Table> {
        let data = self.data.into_iter().map(Value::from).collect();
        let mut table = Table::with_column_configs(data, &self.columns)?;
        if let Some(width) = self.col_width {
            table = table.col_width(width);
        }
        if let Some(height) = self.row_height {
            table = table.row_height(RowHeight::Fixed(height));
        }
        if let Some(border) = self.border {
            table = table.border(border);
        }
        if let Some(format) = self.datetime_format {
            table = table.datetime_format(format);
        }
        if let Some(format) = self.date_format {
            table = table.date_format(format);
        }
        if let Some(format) = self.time_format {
            table = table.time_format(format);
        }
        match self.cell_style {
            Some(CellStyleDoc::Uniform(style)) => {
                table = table.cell_style(CellStyle::Uniform(style.to_styles()?));
            }
            Some(CellStyleDoc::Rules(rules)) => {
                let rules = rules
                    .into_iter()
                    .map(RuleDoc::into_rule)
                    .collect::<Result<Vec<_>>>()?;
                table = table.cell_style(CellStyle::Rules(rules));
            }
            None => {}
        }
        Ok(table)
    }
}

impl RuleDoc {
    fn into_rule(self) -> Result<StyleRule> {
        let styles = self.style.to_styles()?;
        let path = FieldPath::parse(&self.when.attr);
        let expected = Value::from(self.when.equals);
        let condition = Callback::<Column, bool>::unary(move |record| {
            path.resolve(record).is_ok_and(|v| *v == expected)
        });
        Ok(StyleRule { styles, condition })
    }
}

/// Scalars map directly; `{"date": ..}`, `{"datetime": ..}` and `{"time": ..}`
/// objects carry ISO-8601 temporal values.
fn cell_value(value: serde_json::Value) -> Result<CellValue> {
    if let serde_json::Value::Object(map) = &value {
        if let (1, Some((kind, serde_json::Value::String(text)))) =
            (map.len(), map.iter().next())
        {
            let parsed = match kind.as_str() {
                "date" => text.parse::<NaiveDate>().map(CellValue::Date).ok(),
                "datetime" => text.parse::<NaiveDateTime>().map(CellValue::DateTime).ok(),
                "time" => text.parse::<NaiveTime>().map(CellValue::Time).ok(),
                _ => None,
            };
            if let Some(parsed) = parsed {
                return Ok(parsed);
            }
            return Err(SheetboxError::Render(format!(
                "cannot read {kind} value '{text}'"
            )));
        }
    }
    let value = Value::from(value);
    value.to_cell_value().ok_or_else(|| {
        SheetboxError::Render(format!("a cell cannot hold a {}", value.kind_name()))
    })
}
