//! Translates style maps into the `styles.xml` part.
//!
//! Each distinct map becomes one cell format (`<xf>`); fonts, fills, borders
//! and number formats are interned so identical components are shared.

use quick_xml::escape::escape;
use std::fmt::Write as _;
use tracing::warn;

use crate::color::resolve_color;
use crate::numfmt::{builtin_id, FIRST_CUSTOM_ID};
use crate::types::{
    BorderStyle, HAlign, PatternType, StyleValue, Styles, UnderlineStyle, VAlign,
};

const KNOWN_KEYS: &[&str] = &[
    "bold",
    "italic",
    "underline",
    "font_strikeout",
    "font_name",
    "font_size",
    "font_color",
    "color",
    "num_format",
    "align",
    "valign",
    "text_wrap",
    "rotation",
    "indent",
    "shrink",
    "pattern",
    "bg_color",
    "fg_color",
    "border",
    "border_color",
    "top",
    "bottom",
    "left",
    "right",
    "top_color",
    "bottom_color",
    "left_color",
    "right_color",
    "locked",
    "hidden",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Font {
    name: String,
    /// Kept textual so fonts compare exactly
    size: String,
    bold: bool,
    italic: bool,
    strike: bool,
    underline: Option<UnderlineStyle>,
    color: Option<String>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: "11".to_string(),
            bold: false,
            italic: false,
            strike: false,
            underline: None,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fill {
    pattern: PatternType,
    fg: Option<String>,
    bg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Side {
    style: BorderStyle,
    color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Border {
    left: Side,
    right: Side,
    top: Side,
    bottom: Side,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Alignment {
    horizontal: Option<HAlign>,
    vertical: Option<VAlign>,
    wrap: bool,
    shrink: bool,
    rotation: Option<i64>,
    indent: Option<i64>,
}

impl Alignment {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Protection {
    locked: bool,
    hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Xf {
    num_fmt: u32,
    font: usize,
    fill: usize,
    border: usize,
    alignment: Alignment,
    protection: Option<Protection>,
}

/// Workbook-wide format registry.
#[derive(Debug)]
pub(crate) struct StyleTable {
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    borders: Vec<Border>,
    num_fmts: Vec<(u32, String)>,
    xfs: Vec<Xf>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            fonts: vec![Font::default()],
            // Excel requires these two fills first
            fills: vec![
                Fill {
                    pattern: PatternType::None,
                    fg: None,
                    bg: None,
                },
                Fill {
                    pattern: PatternType::Gray125,
                    fg: None,
                    bg: None,
                },
            ],
            borders: vec![Border::default()],
            num_fmts: Vec::new(),
            xfs: vec![Xf {
                num_fmt: 0,
                font: 0,
                fill: 0,
                border: 0,
                alignment: Alignment::default(),
                protection: None,
            }],
        }
    }
}

fn intern<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    match items.iter().position(|existing| *existing == item) {
        Some(idx) => idx,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

fn flag(styles: &Styles, key: &str) -> bool {
    styles.get(key).is_some_and(StyleValue::is_truthy)
}

fn color(styles: &Styles, key: &str) -> Option<String> {
    let value = styles.get(key)?;
    let resolved = resolve_color(value);
    if resolved.is_none() {
        warn!(key, ?value, "unrecognized color");
    }
    resolved
}

fn border_code(styles: &Styles, key: &str) -> Option<BorderStyle> {
    let value = styles.get(key)?;
    let resolved = value.as_int().and_then(BorderStyle::from_code);
    if resolved.is_none() {
        warn!(key, ?value, "unrecognized border style");
    }
    resolved
}

impl StyleTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a style map and return its cell format index.
    pub(crate) fn register(&mut self, styles: &Styles) -> u32 {
        for (key, _) in styles.iter() {
            if !KNOWN_KEYS.contains(&key) {
                warn!(key, "style key not supported by the xlsx writer");
            }
        }

        let xf = Xf {
            num_fmt: self.num_fmt_id(styles),
            font: intern(&mut self.fonts, font(styles)),
            fill: intern(&mut self.fills, fill(styles)),
            border: intern(&mut self.borders, border(styles)),
            alignment: alignment(styles),
            protection: protection(styles),
        };
        let idx = intern(&mut self.xfs, xf);
        u32::try_from(idx).unwrap_or(u32::MAX)
    }

    fn num_fmt_id(&mut self, styles: &Styles) -> u32 {
        let Some(value) = styles.get("num_format") else {
            return 0;
        };
        if let StyleValue::Int(id) = value {
            return u32::try_from(*id).unwrap_or(0);
        }
        let code = match value.as_str() {
            Some(code) => code,
            None => return 0,
        };
        if let Some(id) = builtin_id(code) {
            return id;
        }
        if let Some((id, _)) = self.num_fmts.iter().find(|(_, c)| c == code) {
            return *id;
        }
        let id = FIRST_CUSTOM_ID + u32::try_from(self.num_fmts.len()).unwrap_or(0);
        self.num_fmts.push((id, code.to_string()));
        id
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.num_fmts.is_empty() {
            let _ = write!(out, "<numFmts count=\"{}\">", self.num_fmts.len());
            for (id, code) in &self.num_fmts {
                let _ = write!(
                    out,
                    "<numFmt numFmtId=\"{id}\" formatCode=\"{}\"/>",
                    escape(code.as_str())
                );
            }
            out.push_str("</numFmts>");
        }

        let _ = write!(out, "<fonts count=\"{}\">", self.fonts.len());
        for font in &self.fonts {
            write_font(&mut out, font);
        }
        out.push_str("</fonts>");

        let _ = write!(out, "<fills count=\"{}\">", self.fills.len());
        for fill in &self.fills {
            write_fill(&mut out, fill);
        }
        out.push_str("</fills>");

        let _ = write!(out, "<borders count=\"{}\">", self.borders.len());
        for border in &self.borders {
            write_border(&mut out, border);
        }
        out.push_str("</borders>");

        out.push_str(
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );

        let _ = write!(out, "<cellXfs count=\"{}\">", self.xfs.len());
        for xf in &self.xfs {
            write_xf(&mut out, xf);
        }
        out.push_str("</cellXfs>");

        out.push_str(
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        );
        out.push_str("</styleSheet>");
        out
    }
}

fn font(styles: &Styles) -> Font {
    let mut font = Font::default();
    if let Some(name) = styles.get("font_name").and_then(StyleValue::as_str) {
        font.name = name.to_string();
    }
    if let Some(size) = styles.get("font_size").and_then(StyleValue::as_f64) {
        font.size = size.to_string();
    }
    font.bold = flag(styles, "bold");
    font.italic = flag(styles, "italic");
    font.strike = flag(styles, "font_strikeout");
    font.underline = styles.get("underline").and_then(UnderlineStyle::from_value);
    font.color = color(styles, "font_color").or_else(|| color(styles, "color"));
    font
}

fn fill(styles: &Styles) -> Fill {
    let bg = color(styles, "bg_color");
    let fg = color(styles, "fg_color");
    let pattern = match styles.get("pattern") {
        Some(value) => value
            .as_int()
            .and_then(PatternType::from_code)
            .unwrap_or_else(|| {
                warn!(?value, "unrecognized fill pattern");
                PatternType::None
            }),
        None if bg.is_some() || fg.is_some() => PatternType::Solid,
        None => PatternType::None,
    };
    match pattern {
        PatternType::None => Fill {
            pattern,
            fg: None,
            bg: None,
        },
        // A solid fill shows its foreground; bg_color alone means "fill with this"
        PatternType::Solid => Fill {
            pattern,
            fg: fg.or(bg),
            bg: None,
        },
        _ => Fill { pattern, fg, bg },
    }
}

fn border(styles: &Styles) -> Border {
    let all = border_code(styles, "border").unwrap_or_default();
    let all_color = color(styles, "border_color");
    let side = |key: &str, color_key: &str| Side {
        style: border_code(styles, key).unwrap_or(all),
        color: color(styles, color_key).or_else(|| all_color.clone()),
    };
    Border {
        left: side("left", "left_color"),
        right: side("right", "right_color"),
        top: side("top", "top_color"),
        bottom: side("bottom", "bottom_color"),
    }
}

fn alignment(styles: &Styles) -> Alignment {
    let mut alignment = Alignment::default();
    // `align` takes both horizontal and vertical values
    if let Some(value) = styles.get("align").and_then(StyleValue::as_str) {
        match (HAlign::parse(value), VAlign::parse(value)) {
            (Some(h), _) => alignment.horizontal = Some(h),
            (None, Some(v)) => alignment.vertical = Some(v),
            (None, None) => warn!(value, "unrecognized alignment"),
        }
    }
    if let Some(value) = styles.get("valign").and_then(StyleValue::as_str) {
        match VAlign::parse(value) {
            Some(v) => alignment.vertical = Some(v),
            None => warn!(value, "unrecognized vertical alignment"),
        }
    }
    alignment.wrap = flag(styles, "text_wrap");
    alignment.shrink = flag(styles, "shrink");
    alignment.rotation = styles.get("rotation").and_then(StyleValue::as_int);
    alignment.indent = styles.get("indent").and_then(StyleValue::as_int);
    alignment
}

fn protection(styles: &Styles) -> Option<Protection> {
    if !styles.contains_key("locked") && !styles.contains_key("hidden") {
        return None;
    }
    Some(Protection {
        locked: styles.get("locked").map_or(true, StyleValue::is_truthy),
        hidden: flag(styles, "hidden"),
    })
}

fn write_color(out: &mut String, tag: &str, argb: Option<&String>) {
    if let Some(argb) = argb {
        let _ = write!(out, "<{tag} rgb=\"{argb}\"/>");
    }
}

fn write_font(out: &mut String, font: &Font) {
    out.push_str("<font>");
    if font.bold {
        out.push_str("<b/>");
    }
    if font.italic {
        out.push_str("<i/>");
    }
    if font.strike {
        out.push_str("<strike/>");
    }
    if let Some(underline) = font.underline {
        let _ = write!(out, "<u val=\"{}\"/>", underline.as_xml());
    }
    let _ = write!(out, "<sz val=\"{}\"/>", font.size);
    write_color(out, "color", font.color.as_ref());
    let _ = write!(out, "<name val=\"{}\"/>", escape(font.name.as_str()));
    out.push_str("<family val=\"2\"/></font>");
}

fn write_fill(out: &mut String, fill: &Fill) {
    let _ = write!(out, "<fill><patternFill patternType=\"{}\"", fill.pattern.as_xml());
    if fill.fg.is_none() && fill.bg.is_none() {
        out.push_str("/></fill>");
        return;
    }
    out.push('>');
    write_color(out, "fgColor", fill.fg.as_ref());
    match &fill.bg {
        Some(bg) => write_color(out, "bgColor", Some(bg)),
        None => out.push_str("<bgColor indexed=\"64\"/>"),
    }
    out.push_str("</patternFill></fill>");
}

fn write_side(out: &mut String, tag: &str, side: &Side) {
    if side.style == BorderStyle::None {
        let _ = write!(out, "<{tag}/>");
        return;
    }
    let _ = write!(out, "<{tag} style=\"{}\">", side.style.as_xml());
    match &side.color {
        Some(argb) => write_color(out, "color", Some(argb)),
        None => out.push_str("<color auto=\"1\"/>"),
    }
    let _ = write!(out, "</{tag}>");
}

fn write_border(out: &mut String, border: &Border) {
    out.push_str("<border>");
    write_side(out, "left", &border.left);
    write_side(out, "right", &border.right);
    write_side(out, "top", &border.top);
    write_side(out, "bottom", &border.bottom);
    out.push_str("<diagonal/></border>");
}

fn write_xf(out: &mut String, xf: &Xf) {
    let _ = write!(
        out,
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        xf.num_fmt, xf.font, xf.fill, xf.border
    );
    if xf.num_fmt != 0 {
        out.push_str(" applyNumberFormat=\"1\"");
    }
    if xf.font != 0 {
        out.push_str(" applyFont=\"1\"");
    }
    if xf.fill != 0 {
        out.push_str(" applyFill=\"1\"");
    }
    if xf.border != 0 {
        out.push_str(" applyBorder=\"1\"");
    }
    if !xf.alignment.is_default() {
        out.push_str(" applyAlignment=\"1\"");
    }
    if xf.protection.is_some() {
        out.push_str(" applyProtection=\"1\"");
    }
    if xf.alignment.is_default() && xf.protection.is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if !xf.alignment.is_default() {
        let a = &xf.alignment;
        out.push_str("<alignment");
        if let Some(h) = a.horizontal {
            let _ = write!(out, " horizontal=\"{}\"", h.as_xml());
        }
        if let Some(v) = a.vertical {
            let _ = write!(out, " vertical=\"{}\"", v.as_xml());
        }
        if let Some(rotation) = a.rotation {
            // Negative angles are stored as 90 + |angle|
            let rotation = if rotation < 0 { 90 - rotation } else { rotation };
            let _ = write!(out, " textRotation=\"{rotation}\"");
        }
        if a.wrap {
            out.push_str(" wrapText=\"1\"");
        }
        if let Some(indent) = a.indent {
            let _ = write!(out, " indent=\"{indent}\"");
        }
        if a.shrink {
            out.push_str(" shrinkToFit=\"1\"");
        }
        out.push_str("/>");
    }
    if let Some(p) = &xf.protection {
        let _ = write!(
            out,
            "<protection locked=\"{}\" hidden=\"{}\"/>",
            u8::from(p.locked),
            u8::from(p.hidden)
        );
    }
    out.push_str("</xf>");
}
