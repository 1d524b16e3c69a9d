//! Structured error types for sheetbox.
//!
//! Every failure is synchronous and aborts the current bind or render; there
//! is no partial output mode.

use crate::layout::Axis;

/// All errors that can occur while building, binding or rendering a sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetboxError {
    /// A node needs a span along `axis` but nothing can supply one.
    #[error("{node} {axis} is not determinable: {reason}")]
    SizeIndeterminate {
        /// Description of the offending node.
        node: String,
        /// Axis that could not be resolved.
        axis: Axis,
        /// What was tried.
        reason: String,
    },

    /// More than one child of the same row/col is marked `grow`.
    #[error("only one child of {container} can grow")]
    MultipleGrow {
        /// Description of the container.
        container: String,
    },

    /// A direction was requested for a node whose parent is not a row or col.
    #[error("{node} has no layout direction (parent must be a row or col)")]
    InvalidParentRelation {
        /// Description of the offending node.
        node: String,
    },

    /// Coordinates or spans were read before the node was bound.
    #[error("{node} is not bound yet")]
    UnboundAccess {
        /// Description of the offending node.
        node: String,
    },

    /// The layout was already bound; binding is write-once.
    #[error("layout is already bound")]
    AlreadyBound,

    /// A table column configuration could not be understood.
    #[error("malformed column config: {0}")]
    MalformedColumnConfig(String),

    /// A field path could not be resolved against a record.
    #[error("field path `{path}`: {reason}")]
    FieldPath {
        /// The full path as written.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A style string could not be parsed.
    #[error("Style parse failed: {0}")]
    Style(String),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Image header decoding error.
    #[error("Image: {0}")]
    Image(#[from] image::ImageError),

    /// Data URI decoding error.
    #[error("Base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetboxError>;

#[cfg(feature = "wasm")]
impl From<SheetboxError> for wasm_bindgen::JsValue {
    fn from(e: SheetboxError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
