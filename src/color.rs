//! Color resolution for style values.
//!
//! Accepts `#RRGGBB`, `RRGGBB`, `AARRGGBB`, the color names xlsxwriter
//! understands, and integer indices into Excel's legacy palette. Everything
//! resolves to the 8-digit ARGB form `styles.xml` expects.

use crate::types::StyleValue;

/// Excel's 64 indexed colors (legacy palette)
pub const INDEXED_COLORS: [&str; 64] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0", "#808080",
    "#9999FF", "#993366", "#FFFFCC", "#CCFFFF", "#660066", "#FF8080", "#0066CC", "#CCCCFF",
    "#000080", "#FF00FF", "#FFFF00", "#00FFFF", "#800080", "#800000", "#008080", "#0000FF",
    "#00CCFF", "#CCFFFF", "#CCFFCC", "#FFFF99", "#99CCFF", "#FF99CC", "#CC99FF", "#FFCC99",
    "#3366FF", "#33CCCC", "#99CC00", "#FFCC00", "#FF9900", "#FF6600", "#666699", "#969696",
    "#003366", "#339966", "#003300", "#333300", "#993300", "#993366", "#333399", "#333333",
];

const NAMED_COLORS: [(&str, &str); 16] = [
    ("black", "#000000"),
    ("blue", "#0000FF"),
    ("brown", "#800000"),
    ("cyan", "#00FFFF"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("lime", "#00FF00"),
    ("magenta", "#FF00FF"),
    ("navy", "#000080"),
    ("orange", "#FF6600"),
    ("pink", "#FF00FF"),
    ("purple", "#800080"),
    ("red", "#FF0000"),
    ("silver", "#C0C0C0"),
    ("white", "#FFFFFF"),
    ("yellow", "#FFFF00"),
];

/// Resolve a style value to `AARRGGBB`, or `None` if it is not a color.
pub fn resolve_color(value: &StyleValue) -> Option<String> {
    match value {
        StyleValue::Str(s) => resolve_color_str(s),
        StyleValue::Int(n) => usize::try_from(*n)
            .ok()
            .and_then(|idx| INDEXED_COLORS.get(idx))
            .and_then(|hex| hex_to_argb(hex)),
        StyleValue::Bool(_) => None,
    }
}

pub fn resolve_color_str(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(argb) = hex_to_argb(raw) {
        return Some(argb);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        .and_then(|(_, hex)| hex_to_argb(hex))
}

fn hex_to_argb(raw: &str) -> Option<String> {
    let hex = raw.trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(format!("FF{}", hex.to_ascii_uppercase())),
        8 => Some(hex.to_ascii_uppercase()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(resolve_color_str("#ff0000").as_deref(), Some("FFFF0000"));
        assert_eq!(resolve_color_str("00ff00").as_deref(), Some("FF00FF00"));
        assert_eq!(resolve_color_str("80112233").as_deref(), Some("80112233"));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(resolve_color_str("Yellow").as_deref(), Some("FFFFFF00"));
        assert_eq!(resolve_color_str("navy").as_deref(), Some("FF000080"));
        assert!(resolve_color_str("chartreuse-ish").is_none());
    }

    #[test]
    fn test_indexed_palette() {
        assert_eq!(resolve_color(&StyleValue::Int(2)).as_deref(), Some("FFFF0000"));
        assert!(resolve_color(&StyleValue::Int(64)).is_none());
        assert!(resolve_color(&StyleValue::Int(-1)).is_none());
        assert!(resolve_color(&StyleValue::Bool(true)).is_none());
    }
}
