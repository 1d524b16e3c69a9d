//! End-to-end tests for JSON layout documents: parse, bind, render to a
//! recording sink and to an XLSX package.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use common::{attr_values, read_part, sheet_cells};
use sheetbox::{CellValue, Document, RecordingSink, SheetboxError};
use test_case::test_case;

const REPORT: &str = r#"{
    "sheets": [
        {
            "name": "Summary",
            "start": [1, 0],
            "global_format": {"font_name": "Arial"},
            "root": {
                "type": "col",
                "rowspan": 6,
                "children": [
                    {"type": "cell", "value": "Team report", "colspan": 3, "style": "bold: true; align: center"},
                    {"type": "table", "data": [
                        {"who": "ann", "hours": 12},
                        {"who": "bo", "hours": null}
                    ], "columns": [["who", "Who"], {"title": "Hours", "attr": "hours", "width": 8}]},
                    {"type": "cell", "value": "footer", "grow": true}
                ]
            }
        },
        {
            "name": "Notes",
            "roots": [
                {"type": "cell", "value": "first", "comment": "from the doc"},
                {"type": "cell", "value": "second", "offset": 1}
            ]
        }
    ]
}"#;

// ============================================================================
// BINDING
// ============================================================================

#[test]
fn test_report_document_renders() {
    let book = Document::from_json(REPORT).unwrap().into_book().unwrap();
    assert_eq!(book.len(), 2);

    let mut sink = RecordingSink::new();
    book.sheets()[0].write_to(&mut sink).unwrap();
    assert_eq!(sink.value_at(1, 0), Some(&CellValue::from("Team report")));
    assert_eq!(sink.value_at(2, 0), Some(&CellValue::from("Who")));
    assert_eq!(sink.value_at(3, 1), Some(&CellValue::Number(12.0)));
    // header plus two records leave two rows for the growing footer
    assert_eq!(sink.value_at(5, 0), Some(&CellValue::from("footer")));
    let footer = sink.styles_at(5, 0).unwrap();
    assert_eq!(footer.get("font_name").and_then(|v| v.as_str()), Some("Arial"));
}

#[test]
fn test_roots_stack_with_offsets() {
    let book = Document::from_json(REPORT).unwrap().into_book().unwrap();
    let mut sink = RecordingSink::new();
    book.sheets()[1].write_to(&mut sink).unwrap();
    assert_eq!(sink.value_at(0, 0), Some(&CellValue::from("first")));
    assert_eq!(sink.value_at(2, 0), Some(&CellValue::from("second")));
}

#[test]
fn test_text_children_are_cells() {
    let json = r#"{"root": {"type": "row", "children": ["a", "b", {"type": "cell", "value": 3}]}}"#;
    let book = Document::from_json(json).unwrap().into_book().unwrap();
    let mut sink = RecordingSink::new();
    book.sheets()[0].write_to(&mut sink).unwrap();
    assert_eq!(sink.value_at(0, 0), Some(&CellValue::from("a")));
    assert_eq!(sink.value_at(0, 1), Some(&CellValue::from("b")));
    assert_eq!(sink.value_at(0, 2), Some(&CellValue::Number(3.0)));
}

// ============================================================================
// XLSX
// ============================================================================

#[test]
fn test_report_document_to_xlsx() {
    let xlsx = Document::from_json(REPORT)
        .unwrap()
        .into_book()
        .unwrap()
        .to_xlsx_bytes()
        .unwrap();

    let workbook = read_part(&xlsx, "xl/workbook.xml");
    assert_eq!(attr_values(&workbook, "sheet", "name"), vec!["Summary", "Notes"]);

    let summary = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    let cells = sheet_cells(&summary);
    assert_eq!(cells["A2"].text, "Team report");
    assert_eq!(cells["B3"].text, "Hours");
    assert!(attr_values(&summary, "mergeCell", "ref").contains(&"A2:C2".to_string()));

    let comments = read_part(&xlsx, "xl/comments2.xml");
    assert_eq!(attr_values(&comments, "comment", "ref"), vec!["A1"]);
}

#[test]
fn test_document_from_file() {
    let path = std::env::temp_dir().join(format!("sheetbox-doc-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"root": {"type": "cell", "value": true}}"#).unwrap();
    let book = Document::from_path(&path).unwrap().into_book().unwrap();
    std::fs::remove_file(&path).ok();

    let mut sink = RecordingSink::new();
    book.sheets()[0].write_to(&mut sink).unwrap();
    assert_eq!(sink.value_at(0, 0), Some(&CellValue::Bool(true)));
}

// ============================================================================
// ERRORS
// ============================================================================

#[test_case(r#"{"root": {"type": "hexagon"}}"# ; "unknown node type")]
#[test_case(r#"{"root": {"type": "cell", "value": [1, 2]}}"# ; "list value")]
#[test_case(r#"{"start_cell": "1A", "root": {"type": "cell"}}"# ; "bad start cell")]
#[test_case(r#"{"name": "x"}"# ; "no root")]
fn test_rejected_documents(json: &str) {
    let result = Document::from_json(json).and_then(Document::into_book);
    assert!(result.is_err(), "accepted {json}");
}

#[test]
fn test_layout_errors_surface_from_documents() {
    let json = r#"{"root": {"type": "row", "colspan": 3, "children": [
        {"type": "cell", "grow": true},
        {"type": "cell", "grow": true}
    ]}}"#;
    let result = Document::from_json(json).unwrap().into_book();
    assert!(matches!(result, Err(SheetboxError::MultipleGrow { .. })));
}
