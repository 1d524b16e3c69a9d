//! Table configuration: a fixed grid of one header row plus one row per
//! record, with one grid column per [`Column`].
//!
//! Tables are primitives for the binder; their interior is expanded straight
//! into sink writes by [`crate::render`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SheetboxError};
use crate::path::FieldPath;
use crate::types::{
    CellValue, CommentOptions, ImageOptions, StyleValue, Styles, TemporalKind, Value,
};

/// Default column width when neither the column nor the table sets one.
pub const DEFAULT_COL_WIDTH: f64 = 15.0;
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";
pub const DEFAULT_TIME_FORMAT: &str = "hh:mm:ss";

pub fn default_num_format(kind: TemporalKind) -> &'static str {
    match kind {
        TemporalKind::DateTime => DEFAULT_DATETIME_FORMAT,
        TemporalKind::Date => DEFAULT_DATE_FORMAT,
        TemporalKind::Time => DEFAULT_TIME_FORMAT,
    }
}

/// A record callback whose arity is fixed when it is configured.
///
/// `A` is the second argument: the [`Column`] for render/condition callbacks,
/// the zero-based data index for row heights.
pub enum Callback<A, R> {
    Nullary(Arc<dyn Fn() -> R + Send + Sync>),
    Unary(Arc<dyn Fn(&Value) -> R + Send + Sync>),
    Binary(Arc<dyn Fn(&Value, &A) -> R + Send + Sync>),
}

impl<A, R> Callback<A, R> {
    pub fn nullary(f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self::Nullary(Arc::new(f))
    }

    pub fn unary(f: impl Fn(&Value) -> R + Send + Sync + 'static) -> Self {
        Self::Unary(Arc::new(f))
    }

    pub fn binary(f: impl Fn(&Value, &A) -> R + Send + Sync + 'static) -> Self {
        Self::Binary(Arc::new(f))
    }

    pub fn call(&self, record: &Value, arg: &A) -> R {
        match self {
            Self::Nullary(f) => f(),
            Self::Unary(f) => f(record),
            Self::Binary(f) => f(record, arg),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Nullary(f) => Self::Nullary(Arc::clone(f)),
            Self::Unary(f) => Self::Unary(Arc::clone(f)),
            Self::Binary(f) => Self::Binary(Arc::clone(f)),
        }
    }
}

impl<A, R> fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback(arity={})", self.arity())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    /// The resolved value is an image reference inserted at the cell.
    Image,
}

/// One table column.
#[derive(Debug, Clone)]
pub struct Column {
    pub title: String,
    pub attr: Option<FieldPath>,
    pub render: Option<Callback<Column, CellValue>>,
    pub width: Option<f64>,
    pub kind: ColumnType,
    pub options: ImageOptions,
    /// Highest-precedence style for this column's data cells
    pub format: Option<Styles>,
    pub title_comment: Option<String>,
    pub title_comment_options: CommentOptions,
}

impl Column {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            attr: None,
            render: None,
            width: None,
            kind: ColumnType::Text,
            options: ImageOptions::default(),
            format: None,
            title_comment: None,
            title_comment_options: CommentOptions::default(),
        }
    }

    pub fn attr(mut self, path: &str) -> Self {
        self.attr = Some(FieldPath::parse(path));
        self
    }

    pub fn render(mut self, render: Callback<Column, CellValue>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Insert the resolved value as an image instead of writing it.
    pub fn image(mut self, options: ImageOptions) -> Self {
        self.kind = ColumnType::Image;
        self.options = options;
        self
    }

    pub fn format(mut self, format: Styles) -> Self {
        self.format = Some(format);
        self
    }

    pub fn title_comment(mut self, text: impl Into<String>, options: CommentOptions) -> Self {
        self.title_comment = Some(text.into());
        self.title_comment_options = options;
        self
    }

    /// Parse a loosely typed column config: either an `[attr, title]` pair
    /// or an object with at least a `title`.
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        match config {
            serde_json::Value::Array(items) => match items.as_slice() {
                [serde_json::Value::String(attr), serde_json::Value::String(title)] => {
                    Ok(Self::new(title.as_str()).attr(attr))
                }
                _ => Err(SheetboxError::MalformedColumnConfig(format!(
                    "pair must be exactly 2 strings (attr, title), got {} element(s)",
                    items.len()
                ))),
            },
            serde_json::Value::Object(_) => {
                let spec: ColumnSpec = serde_json::from_value(config.clone())
                    .map_err(|e| SheetboxError::MalformedColumnConfig(e.to_string()))?;
                spec.into_column()
            }
            other => Err(SheetboxError::MalformedColumnConfig(format!(
                "expected a pair or an object, got {other}"
            ))),
        }
    }
}

/// `(attr, title)` pair.
impl From<(&str, &str)> for Column {
    fn from((attr, title): (&str, &str)) -> Self {
        Self::new(title).attr(attr)
    }
}

/// Structured column descriptor as it appears in JSON documents.
#[derive(Debug, Deserialize)]
struct ColumnSpec {
    title: Option<String>,
    attr: Option<String>,
    width: Option<f64>,
    #[serde(rename = "type", default)]
    kind: ColumnType,
    #[serde(default)]
    options: ImageOptions,
    format: Option<Styles>,
    title_comment: Option<String>,
    #[serde(default)]
    title_comment_options: CommentOptions,
}

impl ColumnSpec {
    fn into_column(self) -> Result<Column> {
        let title = self.title.ok_or_else(|| {
            SheetboxError::MalformedColumnConfig("column descriptor is missing `title`".into())
        })?;
        Ok(Column {
            title,
            attr: self.attr.as_deref().map(FieldPath::parse),
            render: None,
            width: self.width,
            kind: self.kind,
            options: self.options,
            format: self.format,
            title_comment: self.title_comment,
            title_comment_options: self.title_comment_options,
        })
    }
}

/// A conditional style: applied to a data cell when `condition` holds.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub styles: Styles,
    pub condition: Callback<Column, bool>,
}

/// Per-cell styling of data rows.
#[derive(Debug, Clone)]
pub enum CellStyle {
    /// Applied to every data cell.
    Uniform(Styles),
    /// Evaluated in order; later matches override earlier ones key by key.
    Rules(Vec<StyleRule>),
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::Rules(Vec::new())
    }
}

/// Data row height.
#[derive(Debug, Clone)]
pub enum RowHeight {
    Fixed(f64),
    /// Called with the record and its zero-based index; `None` leaves the
    /// row at its default height.
    Computed(Callback<usize, Option<f64>>),
}

/// A table over a record collection.
#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) data: Vec<Value>,
    pub(crate) columns: Vec<Column>,
    pub(crate) col_width: f64,
    pub(crate) row_height: Option<RowHeight>,
    pub(crate) cell_style: CellStyle,
    pub(crate) datetime_format: Option<String>,
    pub(crate) date_format: Option<String>,
    pub(crate) time_format: Option<String>,
    /// Table-level style; moved onto the node when the table is placed.
    pub(crate) styles: Styles,
}

impl Table {
    pub fn new<D, C>(data: D, columns: C) -> Self
    where
        D: IntoIterator,
        D::Item: Into<Value>,
        C: IntoIterator,
        C::Item: Into<Column>,
    {
        Self {
            data: data.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().map(Into::into).collect(),
            col_width: DEFAULT_COL_WIDTH,
            row_height: None,
            cell_style: CellStyle::default(),
            datetime_format: None,
            date_format: None,
            time_format: None,
            styles: Styles::new().with("border", 1),
        }
    }

    /// Build from any serializable records (structs become maps).
    pub fn from_records<T: Serialize>(records: &[T], columns: Vec<Column>) -> Result<Self> {
        let data = records
            .iter()
            .map(|r| serde_json::to_value(r).map(Value::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(data, columns))
    }

    /// Build from loosely typed column configs (see [`Column::from_config`]).
    pub fn with_column_configs(
        data: Vec<Value>,
        configs: &[serde_json::Value],
    ) -> Result<Self> {
        let columns = configs
            .iter()
            .map(Column::from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(data, columns))
    }

    /// Default width for columns that do not set one.
    pub fn col_width(mut self, width: f64) -> Self {
        if width > 0.0 {
            self.col_width = width;
        }
        self
    }

    pub fn row_height(mut self, height: RowHeight) -> Self {
        self.row_height = Some(height);
        self
    }

    pub fn border(mut self, border: i64) -> Self {
        self.styles.insert("border", border);
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key, value);
        self
    }

    pub fn cell_style(mut self, cell_style: CellStyle) -> Self {
        self.cell_style = cell_style;
        self
    }

    /// Add a conditional style rule parsed from a `"key: value; ..."` string.
    pub fn style_rule(mut self, css: &str, condition: Callback<Column, bool>) -> Result<Self> {
        let styles = Styles::from_css(css)?;
        let rule = StyleRule { styles, condition };
        match &mut self.cell_style {
            CellStyle::Rules(rules) => rules.push(rule),
            CellStyle::Uniform(_) => self.cell_style = CellStyle::Rules(vec![rule]),
        }
        Ok(self)
    }

    pub fn datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = Some(format.into());
        self
    }

    /// Number format injected for temporal values of `kind`.
    pub fn num_format_for(&self, kind: TemporalKind) -> &str {
        let configured = match kind {
            TemporalKind::DateTime => self.datetime_format.as_deref(),
            TemporalKind::Date => self.date_format.as_deref(),
            TemporalKind::Time => self.time_format.as_deref(),
        };
        configured.unwrap_or_else(|| default_num_format(kind))
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}
