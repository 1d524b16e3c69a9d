//! Authoring API for layout trees.
//!
//! A [`Node`] owns its children outright, so a child can only ever have one
//! parent. Parent links, bound coordinates and resolved spans live in the
//! [`Layout`](crate::layout::Layout) arena the tree is moved into for binding.
//!
//! ```
//! use sheetbox::{Cell, Node};
//!
//! let tree = Node::col([
//!     Node::row([Node::from(Cell::new("hello").comment("greeting")).offset(2).grow()]),
//!     Node::row(["a".into(), "b".into()]),
//! ])
//! .colspan(8)
//! .style("border", 1);
//! # let _ = tree;
//! ```

use crate::table::Table;
use crate::types::{CellValue, CommentOptions, ImageOptions, ImageSource, StyleValue, Styles};

/// Layout primitive variants. The set is closed; every pass matches on it.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Children tile left to right.
    Row,
    /// Children tile top to bottom.
    Col,
    Cell(Cell),
    Image(Image),
    Table(Box<Table>),
    /// Plain box with no layout axis; it cannot lay out children.
    Container,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Row => "Row",
            Self::Col => "Col",
            Self::Cell(_) => "Cell",
            Self::Image(_) => "Image",
            Self::Table(_) => "Table",
            Self::Container => "Box",
        }
    }

    /// Cells, images and tables size themselves from their own fields.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Cell(_) | Self::Image(_) | Self::Table(_))
    }
}

/// Cell payload: one scalar plus optional fixed dimensions and a comment.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub value: CellValue,
    /// Fixed column width, applied when the cell spans a single column
    pub width: Option<f64>,
    /// Fixed row height, applied when the cell spans a single row
    pub height: Option<f64>,
    pub comment: Option<String>,
    pub comment_options: CommentOptions,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn comment_options(mut self, options: CommentOptions) -> Self {
        self.comment_options = options;
        self
    }
}

/// Image payload.
#[derive(Debug, Clone)]
pub struct Image {
    pub source: ImageSource,
    pub options: ImageOptions,
}

impl Image {
    pub fn new(source: impl Into<ImageSource>) -> Self {
        Self {
            source: source.into(),
            options: ImageOptions::default(),
        }
    }

    pub fn options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }
}

/// An unbound layout node as authored.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) rowspan: Option<u32>,
    pub(crate) colspan: Option<u32>,
    pub(crate) offset: u32,
    pub(crate) grow: bool,
    pub(crate) styles: Styles,
    pub(crate) children: Vec<Node>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            rowspan: None,
            colspan: None,
            offset: 0,
            grow: false,
            styles: Styles::new(),
            children: Vec::new(),
        }
    }

    /// A row; its children are placed left to right.
    pub fn row(children: impl IntoIterator<Item = Node>) -> Self {
        Self::with_kind(NodeKind::Row).children(children)
    }

    /// A column; its children are placed top to bottom.
    pub fn col(children: impl IntoIterator<Item = Node>) -> Self {
        Self::with_kind(NodeKind::Col).children(children)
    }

    /// A generic box. Binding fails if it is given children.
    pub fn container(children: impl IntoIterator<Item = Node>) -> Self {
        Self::with_kind(NodeKind::Container).children(children)
    }

    pub fn cell(value: impl Into<CellValue>) -> Self {
        Cell::new(value).into()
    }

    pub fn image(source: impl Into<ImageSource>) -> Self {
        Image::new(source).into()
    }

    pub fn table(table: Table) -> Self {
        table.into()
    }

    /// Rows occupied; zero means "unset", like an absent span.
    pub fn rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = (rowspan > 0).then_some(rowspan);
        self
    }

    /// Columns occupied; zero means "unset", like an absent span.
    pub fn colspan(mut self, colspan: u32) -> Self {
        self.colspan = (colspan > 0).then_some(colspan);
        self
    }

    /// Leading gap along the parent's layout axis.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Claim the remaining space along the parent's layout axis.
    pub fn grow(mut self) -> Self {
        self.grow = true;
        self
    }

    pub fn set_grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key, value);
        self
    }

    /// Apply a whole style map; keys already set on the node are replaced.
    pub fn styles(mut self, styles: &Styles) -> Self {
        self.styles.update(styles);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn style_map(&self) -> &Styles {
        &self.styles
    }

    pub fn spans(&self) -> (Option<u32>, Option<u32>) {
        (self.rowspan, self.colspan)
    }
}

/// Raw text children are promoted to cells.
impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::cell(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::cell(text)
    }
}

impl From<Cell> for Node {
    fn from(cell: Cell) -> Self {
        Node::with_kind(NodeKind::Cell(cell))
    }
}

impl From<Image> for Node {
    fn from(image: Image) -> Self {
        Node::with_kind(NodeKind::Image(image))
    }
}

/// A table occupies one header row plus one row per record, and one
/// column per configured column. The spans are set as-is, so a table
/// without columns is zero columns wide.
impl From<Table> for Node {
    fn from(mut table: Table) -> Self {
        let rowspan = u32::try_from(table.data.len().saturating_add(1)).unwrap_or(u32::MAX);
        let colspan = u32::try_from(table.columns.len()).unwrap_or(u32::MAX);
        let styles = std::mem::take(&mut table.styles);
        let mut node = Node::with_kind(NodeKind::Table(Box::new(table)));
        node.rowspan = Some(rowspan);
        node.colspan = Some(colspan);
        node.styles = styles;
        node
    }
}
