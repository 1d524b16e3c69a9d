use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;

/// Options for image insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_scale: Option<f64>,
    /// Pixel offset from the anchor cell's left edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<u32>,
    /// Pixel offset from the anchor cell's top edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<u32>,
    /// 1 = move and size with cells, 2 = move only, 3 = fixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_position: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ImageOptions {
    pub fn scale(mut self, x: f64, y: f64) -> Self {
        self.x_scale = Some(x);
        self.y_scale = Some(y);
        self
    }
}

/// Options for cell comments (notes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_scale: Option<f64>,
    /// Background color of the comment box (#RRGGBB or a color name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    /// In-memory image; `name` is used for diagnostics only.
    Bytes { name: String, data: Arc<[u8]> },
}

impl ImageSource {
    /// Interpret a file reference: `data:<mime>;base64,<payload>` URIs are
    /// decoded in memory, anything else is a filesystem path.
    pub fn parse(reference: &str) -> Result<Self> {
        if let Some(rest) = reference.strip_prefix("data:") {
            if let Some((meta, payload)) = rest.split_once(',') {
                if meta.ends_with(";base64") {
                    let data = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
                    let name = meta.trim_end_matches(";base64").to_string();
                    return Ok(Self::Bytes {
                        name,
                        data: data.into(),
                    });
                }
            }
        }
        Ok(Self::Path(PathBuf::from(reference)))
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { name, data } => format!("<{name}, {} bytes>", data.len()),
        }
    }

    /// Load the raw bytes.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(p) => Ok(std::fs::read(p)?),
            Self::Bytes { data, .. } => Ok(data.to_vec()),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        Self::Path(PathBuf::from(s))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}
