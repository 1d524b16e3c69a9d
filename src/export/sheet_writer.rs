//! Generates worksheet XML from a [`Worksheet`].
//!
//! Strings are written inline (`t="inlineStr"`), so the package needs no
//! shared string table.

use quick_xml::escape::escape;
use std::fmt::Write as _;

use super::worksheet::{CellEntry, Worksheet};
use crate::cell_ref::{cell_ref, col_to_letter};
use crate::types::CellValue;

/// Relationship ids of the parts a worksheet points at.
#[derive(Debug, Default, Clone)]
pub(crate) struct SheetRels {
    pub drawing: Option<String>,
    pub legacy_drawing: Option<String>,
}

/// Write a complete worksheet XML string.
///
/// `xf_ids` maps the sheet's local format ids to workbook cell format
/// indices.
pub(crate) fn write_sheet_xml(sheet: &Worksheet, xf_ids: &[u32], rels: &SheetRels) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    // <dimension>
    let dimension = match sheet.max_cell() {
        Some((row, col)) => format!("A1:{}", cell_ref(row, col)),
        None => "A1".to_string(),
    };
    let _ = writeln!(out, "<dimension ref=\"{dimension}\"/>");

    out.push_str("<sheetFormatPr defaultRowHeight=\"15\"/>\n");

    // <cols>, one element per run of equal widths
    if !sheet.col_widths.is_empty() {
        out.push_str("<cols>\n");
        let mut runs: Vec<(u32, u32, f64)> = Vec::new();
        for (&col, &width) in &sheet.col_widths {
            if let Some(last) = runs.last_mut() {
                if last.1 + 1 == col && (last.2 - width).abs() < f64::EPSILON {
                    last.1 = col;
                    continue;
                }
            }
            runs.push((col, col, width));
        }
        for (first, last, width) in runs {
            // XLSX is 1-based
            let _ = writeln!(
                out,
                "<col min=\"{}\" max=\"{}\" width=\"{:.4}\" customWidth=\"1\"/>",
                first + 1,
                last + 1,
                width
            );
        }
        out.push_str("</cols>\n");
    }

    // <sheetData>
    out.push_str("<sheetData>\n");
    write_sheet_data(&mut out, sheet, xf_ids);
    out.push_str("</sheetData>\n");

    // <mergeCells>
    if !sheet.merges.is_empty() {
        let _ = writeln!(out, "<mergeCells count=\"{}\">", sheet.merges.len());
        for merge in &sheet.merges {
            let _ = writeln!(out, "<mergeCell ref=\"{}\"/>", merge.to_ref());
        }
        out.push_str("</mergeCells>\n");
    }

    out.push_str(
        r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
    );
    out.push('\n');

    if let Some(id) = &rels.drawing {
        let _ = writeln!(out, "<drawing r:id=\"{id}\"/>");
    }
    if let Some(id) = &rels.legacy_drawing {
        let _ = writeln!(out, "<legacyDrawing r:id=\"{id}\"/>");
    }

    out.push_str("</worksheet>");
    out
}

/// Write all cell rows into `<sheetData>`.
fn write_sheet_data(out: &mut String, sheet: &Worksheet, xf_ids: &[u32]) {
    // Rows that only carry a height still need a <row> element
    let mut rows: Vec<u32> = sheet.cells.keys().map(|&(r, _)| r).collect();
    rows.extend(sheet.row_heights.keys().copied());
    rows.sort_unstable();
    rows.dedup();

    for row in rows {
        let _ = write!(out, "<row r=\"{}\"", u64::from(row) + 1);
        if let Some(height) = sheet.row_heights.get(&row) {
            let _ = write!(out, " ht=\"{height:.2}\" customHeight=\"1\"");
        }
        out.push('>');

        for (&(_, col), entry) in sheet.cells.range((row, 0)..=(row, u32::MAX)) {
            write_cell(out, row, col, entry, xf_ids);
        }

        out.push_str("</row>\n");
    }
}

/// Write a single `<c>` element.
fn write_cell(out: &mut String, row: u32, col: u32, entry: &CellEntry, xf_ids: &[u32]) {
    let _ = write!(out, "<c r=\"{}{}\"", col_to_letter(col), u64::from(row) + 1);

    // Style index
    if let Some(xf) = entry.format.and_then(|f| xf_ids.get(f.0)).filter(|&&xf| xf != 0) {
        let _ = write!(out, " s=\"{xf}\"");
    }

    match &entry.value {
        CellValue::Empty => out.push_str("/>"),
        CellValue::String(s) => {
            // Use inline string to avoid a shared string table
            out.push_str(" t=\"inlineStr\"><is>");
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                out.push_str("<t xml:space=\"preserve\">");
            } else {
                out.push_str("<t>");
            }
            out.push_str(&escape(s.as_str()));
            out.push_str("</t></is></c>");
        }
        CellValue::Bool(b) => {
            let _ = write!(out, " t=\"b\"><v>{}</v></c>", u8::from(*b));
        }
        CellValue::Number(n) if n.is_finite() => {
            let _ = write!(out, "><v>{n}</v></c>");
        }
        CellValue::Number(_) => out.push_str(" t=\"e\"><v>#NUM!</v></c>"),
        temporal => {
            let serial = temporal.excel_serial().unwrap_or_default();
            let _ = write!(out, "><v>{serial}</v></c>");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::CellSink;
    use crate::types::Styles;
    use chrono::NaiveDate;

    #[test]
    fn test_cells_rows_and_merges() {
        let mut sheet = Worksheet::new("S".into());
        let f = sheet.add_format(&Styles::new().with("bold", true)).unwrap();
        sheet.write(0, 0, &CellValue::from("a & b"), Some(f)).unwrap();
        sheet.write(0, 2, &CellValue::Number(2.5), None).unwrap();
        sheet.write(3, 1, &CellValue::Bool(true), None).unwrap();
        sheet.merge_range(5, 0, 5, 2, &CellValue::from(" pad "), None).unwrap();
        sheet.set_row_height(8, 30.0).unwrap();
        sheet.set_column_width(0, 2, 20.0).unwrap();

        let xml = write_sheet_xml(&sheet, &[7], &SheetRels::default());
        assert!(xml.contains(r#"<dimension ref="A1:C6"/>"#));
        assert!(xml.contains(r#"<c r="A1" s="7" t="inlineStr"><is><t>a &amp; b</t></is></c>"#));
        assert!(xml.contains(r#"<c r="C1"><v>2.5</v></c>"#));
        assert!(xml.contains(r#"<c r="B4" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<t xml:space="preserve"> pad </t>"#));
        assert!(xml.contains(r#"<mergeCell ref="A6:C6"/>"#));
        assert!(xml.contains(r#"<row r="9" ht="30.00" customHeight="1"></row>"#));
        assert!(xml.contains(r#"<col min="1" max="3" width="20.0000" customWidth="1"/>"#));
    }

    #[test]
    fn test_dates_are_serials() {
        let mut sheet = Worksheet::new("S".into());
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        sheet.write(0, 0, &CellValue::Date(day), None).unwrap();
        let xml = write_sheet_xml(&sheet, &[], &SheetRels::default());
        assert!(xml.contains(r#"<c r="A1"><v>45292</v></c>"#));
    }
}
