use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SheetboxError};

/// A single style attribute value.
///
/// Floats are kept in their textual form so that style maps stay hashable;
/// the export layer parses them back where a number is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged, try_from = "serde_json::Value")]
pub enum StyleValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl StyleValue {
    /// Interpret a raw textual value: `true`/`false`, integers, else text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" | "True" => Self::Bool(true),
            "false" | "False" => Self::Bool(false),
            _ => raw
                .parse::<i64>()
                .map_or_else(|_| Self::Str(raw.to_string()), Self::Int),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => Some(*n as f64),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Truthiness: non-zero ints, `true`, non-empty strings other than "0".
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Str(s) => !s.is_empty() && s != "0" && s != "false",
        }
    }
}

impl TryFrom<serde_json::Value> for StyleValue {
    type Error = String;

    fn try_from(v: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        match v {
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => Ok(n
                .as_i64()
                .map_or_else(|| Self::Str(n.to_string()), Self::Int)),
            serde_json::Value::String(s) => Ok(Self::Str(s)),
            other => Err(format!("unsupported style value: {other}")),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for StyleValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for StyleValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        Self::Str(n.to_string())
    }
}

/// Structured style attributes (`bg_color`, `border`, `num_format`, ...).
///
/// Ordered so that structurally equal maps hash equally; the render layer
/// relies on that to share one sink format per distinct map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles(BTreeMap<String, StyleValue>);

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CSS-like `"key: value; key: value"` string.
    pub fn from_css(css: &str) -> Result<Self> {
        let mut styles = Self::new();
        for decl in css.split(';') {
            let decl = decl.trim();
            if decl.is_empty() {
                continue;
            }
            let (key, value) = decl
                .split_once(':')
                .ok_or_else(|| SheetboxError::Style(format!("expected `key: value`, got `{decl}`")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SheetboxError::Style(format!(
                    "expected `key: value`, got `{decl}`"
                )));
            }
            styles.insert(key, StyleValue::parse(value));
        }
        Ok(styles)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn update(&mut self, other: &Styles) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Fill in keys from `defaults` that `self` does not set.
    pub fn inherit(&mut self, defaults: &Styles) {
        for (k, v) in &defaults.0 {
            self.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    /// `base` with `overlay` applied on top.
    pub fn layered(base: &Styles, overlay: &Styles) -> Styles {
        let mut out = base.clone();
        out.update(overlay);
        out
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for Styles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Typed views used by the XLSX export layer
// ============================================================================

/// Border line styles, indexed like xlsxwriter's integer border codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Thin,
            2 => Self::Medium,
            3 => Self::Dashed,
            4 => Self::Dotted,
            5 => Self::Thick,
            6 => Self::Double,
            7 => Self::Hair,
            8 => Self::MediumDashed,
            9 => Self::DashDot,
            10 => Self::MediumDashDot,
            11 => Self::DashDotDot,
            12 => Self::MediumDashDotDot,
            13 => Self::SlantDashDot,
            _ => return None,
        })
    }

    /// Attribute value used in `styles.xml`.
    pub fn as_xml(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Thick => "thick",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashed => "mediumDashed",
            Self::DashDot => "dashDot",
            Self::MediumDashDot => "mediumDashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HAlign {
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HAlign {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "fill" => Self::Fill,
            "justify" => Self::Justify,
            "center_across" | "centre_across" => Self::CenterContinuous,
            "distributed" => Self::Distributed,
            _ => return None,
        })
    }

    pub fn as_xml(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Fill => "fill",
            Self::Justify => "justify",
            Self::CenterContinuous => "centerContinuous",
            Self::Distributed => "distributed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VAlign {
    Top,
    Center, // Note: Excel uses "center" not "middle"
    Bottom,
    Justify,
    Distributed,
}

impl VAlign {
    /// Accepts both `valign` spellings and the vertical values of `align`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "top" => Self::Top,
            "vcenter" => Self::Center,
            "bottom" => Self::Bottom,
            "vjustify" => Self::Justify,
            "vdistributed" => Self::Distributed,
            _ => return None,
        })
    }

    pub fn as_xml(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
            Self::Justify => "justify",
            Self::Distributed => "distributed",
        }
    }
}

/// Underline style for font formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnderlineStyle {
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl UnderlineStyle {
    /// xlsxwriter codes: 1 single, 2 double, 33 single accounting, 34 double accounting.
    pub fn from_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Bool(true) => Some(Self::Single),
            StyleValue::Bool(false) => None,
            other => match other.as_int()? {
                1 => Some(Self::Single),
                2 => Some(Self::Double),
                33 => Some(Self::SingleAccounting),
                34 => Some(Self::DoubleAccounting),
                _ => None,
            },
        }
    }

    pub fn as_xml(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::SingleAccounting => "singleAccounting",
            Self::DoubleAccounting => "doubleAccounting",
        }
    }
}

/// Pattern fill types from ECMA-376 Part 1, Section 18.18.55, indexed like
/// xlsxwriter's integer pattern codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternType {
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl PatternType {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Solid,
            2 => Self::MediumGray,
            3 => Self::DarkGray,
            4 => Self::LightGray,
            5 => Self::DarkHorizontal,
            6 => Self::DarkVertical,
            7 => Self::DarkDown,
            8 => Self::DarkUp,
            9 => Self::DarkGrid,
            10 => Self::DarkTrellis,
            11 => Self::LightHorizontal,
            12 => Self::LightVertical,
            13 => Self::LightDown,
            14 => Self::LightUp,
            15 => Self::LightGrid,
            16 => Self::LightTrellis,
            17 => Self::Gray125,
            18 => Self::Gray0625,
            _ => return None,
        })
    }

    pub fn as_xml(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::MediumGray => "mediumGray",
            Self::DarkGray => "darkGray",
            Self::LightGray => "lightGray",
            Self::DarkHorizontal => "darkHorizontal",
            Self::DarkVertical => "darkVertical",
            Self::DarkDown => "darkDown",
            Self::DarkUp => "darkUp",
            Self::DarkGrid => "darkGrid",
            Self::DarkTrellis => "darkTrellis",
            Self::LightHorizontal => "lightHorizontal",
            Self::LightVertical => "lightVertical",
            Self::LightDown => "lightDown",
            Self::LightUp => "lightUp",
            Self::LightGrid => "lightGrid",
            Self::LightTrellis => "lightTrellis",
            Self::Gray125 => "gray125",
            Self::Gray0625 => "gray0625",
        }
    }
}
