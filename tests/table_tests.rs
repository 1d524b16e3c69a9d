//! Tests for table expansion: header and data coordinates, value extraction,
//! fast mode and the style precedence of data cells.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use chrono::NaiveDate;
use common::{count_ops, write_coords};
use sheetbox::sink::SinkOp;
use sheetbox::table::CellStyle;
use sheetbox::{
    bind, render, Callback, CellValue, Column, Node, RecordingSink, RowHeight, SheetboxError,
    Styles, Table, Value, Writer,
};
use test_case::test_case;

fn people() -> Vec<Value> {
    vec![
        Value::map([("name", Value::from("ann")), ("age", Value::from(31))]),
        Value::map([("name", Value::from("bo")), ("age", Value::from(45))]),
        Value::map([("name", Value::from("cy")), ("age", Value::Null)]),
    ]
}

fn render_table(table: Table, start: (u32, u32)) -> RecordingSink {
    let layout = bind(Node::table(table), start.0, start.1).unwrap();
    let mut sink = RecordingSink::new();
    render(&layout, &mut sink).unwrap();
    sink
}

// ============================================================================
// EXPANSION SHAPE
// ============================================================================

#[test_case(1, 0 ; "one column no data")]
#[test_case(2, 3 ; "two columns three records")]
#[test_case(4, 10 ; "four columns ten records")]
fn test_write_counts_and_coordinates(columns: usize, records: usize) {
    let cols: Vec<Column> = (0..columns)
        .map(|i| Column::new(format!("C{i}")).attr("v"))
        .collect();
    let data: Vec<Value> = (0..records)
        .map(|i| Value::map([("v", Value::from(format!("r{i}")))]))
        .collect();
    let sink = render_table(Table::new(data, cols), (2, 3));

    let coords = write_coords(&sink);
    assert_eq!(coords.len(), columns + records * columns);
    let headers: Vec<_> = coords.iter().filter(|(r, _)| *r == 2).collect();
    assert_eq!(headers.len(), columns);
    for record in 0..records {
        for column in 0..columns {
            let row = 2 + 1 + u32::try_from(record).unwrap();
            let col = 3 + u32::try_from(column).unwrap();
            assert_eq!(
                sink.value_at(row, col),
                Some(&CellValue::from(format!("r{record}")))
            );
        }
    }
}

#[test]
fn test_table_occupies_header_plus_records() {
    let layout = bind(
        Node::col([
            Node::table(Table::new(people(), [("name", "Name"), ("age", "Age")])),
            Node::cell("below"),
        ]),
        0,
        0,
    )
    .unwrap();
    let table = layout[layout.root()].children()[0];
    let below = layout[layout.root()].children()[1];
    assert_eq!(layout.rows(table).unwrap(), 4);
    assert_eq!(layout.cols(table).unwrap(), 2);
    assert_eq!(layout.row(below).unwrap(), 4);
}

#[test]
fn test_headers_set_widths() {
    let table = Table::new(
        people(),
        [Column::new("Name").attr("name").width(30.0), Column::new("Age").attr("age")],
    )
    .col_width(12.0);
    let sink = render_table(table, (0, 0));
    let widths: Vec<(u32, f64)> = sink
        .ops
        .iter()
        .filter_map(|op| match op {
            SinkOp::ColumnWidth { first_col, width, .. } => Some((*first_col, *width)),
            _ => None,
        })
        .collect();
    assert_eq!(widths, vec![(0, 30.0), (1, 12.0)]);
    assert_eq!(sink.value_at(0, 0), Some(&CellValue::from("Name")));
}

// ============================================================================
// VALUES
// ============================================================================

#[test]
fn test_nested_paths_and_safe_navigation() {
    let data = vec![
        Value::from(serde_json::json!({"a": {"b": {"c": 1}}})),
        Value::from(serde_json::json!({"a": null})),
    ];
    let table = Table::new(data, [("a?.b?.c", "C")]);
    let sink = render_table(table, (0, 0));
    assert_eq!(sink.value_at(1, 0), Some(&CellValue::Number(1.0)));
    assert_eq!(sink.value_at(2, 0), Some(&CellValue::Empty));
}

#[test]
fn test_render_callbacks_by_arity() {
    let table = Table::new(
        people(),
        [
            Column::new("Const").render(Callback::nullary(|| CellValue::from("k"))),
            Column::new("Upper").render(Callback::unary(|record| {
                match record {
                    Value::Map(m) => match m.get("name") {
                        Some(Value::String(s)) => CellValue::from(s.to_uppercase()),
                        _ => CellValue::Empty,
                    },
                    _ => CellValue::Empty,
                }
            })),
            Column::new("Title").render(Callback::binary(|_, column: &Column| {
                CellValue::from(column.title.clone())
            })),
        ],
    );
    let sink = render_table(table, (0, 0));
    assert_eq!(sink.value_at(1, 0), Some(&CellValue::from("k")));
    assert_eq!(sink.value_at(2, 1), Some(&CellValue::from("BO")));
    assert_eq!(sink.value_at(3, 2), Some(&CellValue::from("Title")));
}

#[test]
fn test_attr_wins_over_render() {
    let column = Column::new("Name")
        .attr("name")
        .render(Callback::nullary(|| CellValue::from("ignored")));
    let sink = render_table(Table::new(people(), [column]), (0, 0));
    assert_eq!(sink.value_at(1, 0), Some(&CellValue::from("ann")));
}

#[test]
fn test_column_without_source_fails() {
    let layout = bind(Node::table(Table::new(people(), [Column::new("Empty")])), 0, 0).unwrap();
    let mut sink = RecordingSink::new();
    assert!(matches!(
        render(&layout, &mut sink),
        Err(SheetboxError::MalformedColumnConfig(_))
    ));
}

#[test]
fn test_fast_mode_skips_only_empty_values() {
    let table = Table::new(people(), [("name", "Name"), ("age", "Age")]);
    let layout = bind(Node::table(table), 0, 0).unwrap();

    let mut slow = RecordingSink::new();
    Writer::new(&mut slow).render(&layout).unwrap();
    let mut fast = RecordingSink::new();
    Writer::new(&mut fast).fast(true).render(&layout).unwrap();

    let is_write = |op: &SinkOp| matches!(op, SinkOp::Write { .. });
    assert_eq!(count_ops(&slow, is_write), 2 + 3 * 2);
    assert_eq!(count_ops(&fast, is_write), 2 + 3 * 2 - 1);
    let non_empty = |sink: &RecordingSink| {
        sink.writes()
            .filter(|(_, _, v, _)| !v.is_empty())
            .map(|(r, c, v, _)| (r, c, v.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(non_empty(&slow), non_empty(&fast));
}

#[test]
fn test_row_heights_fixed_and_computed() {
    let fixed = render_table(
        Table::new(people(), [("name", "Name")]).row_height(RowHeight::Fixed(22.0)),
        (0, 0),
    );
    let heights = |sink: &RecordingSink| {
        sink.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::RowHeight { row, height } => Some((*row, *height)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(heights(&fixed), vec![(1, 22.0), (2, 22.0), (3, 22.0)]);

    let computed = render_table(
        Table::new(people(), [("name", "Name")]).row_height(RowHeight::Computed(
            Callback::binary(|_, index: &usize| (*index == 1).then_some(40.0)),
        )),
        (0, 0),
    );
    assert_eq!(heights(&computed), vec![(2, 40.0)]);
}

// ============================================================================
// STYLE PRECEDENCE
// ============================================================================

#[test]
fn test_style_rule_only_on_matching_record() {
    let table = Table::new(people(), [("name", "Name"), ("age", "Age")])
        .style_rule(
            "bg_color: yellow",
            Callback::unary(|record| {
                matches!(record, Value::Map(m) if m.get("name") == Some(&Value::from("bo")))
            }),
        )
        .unwrap();
    let sink = render_table(table, (0, 0));

    let matching = sink.styles_at(2, 0).unwrap();
    let plain = sink.styles_at(1, 0).unwrap();
    assert_eq!(
        matching.get("bg_color").and_then(|v| v.as_str()),
        Some("yellow")
    );
    assert!(!plain.contains_key("bg_color"));
    // everything else is shared
    let stripped: Styles = matching
        .iter()
        .filter(|(key, _)| *key != "bg_color")
        .map(|(key, value)| (key, value.clone()))
        .collect();
    assert_eq!(&stripped, plain);
}

#[test]
fn test_later_rules_override_earlier() {
    let table = Table::new(people(), [("name", "Name")])
        .cell_style(CellStyle::Rules(Vec::new()))
        .style_rule("color: red", Callback::nullary(|| true))
        .unwrap()
        .style_rule("color: blue", Callback::nullary(|| true))
        .unwrap();
    let sink = render_table(table, (0, 0));
    let styles = sink.styles_at(1, 0).unwrap();
    assert_eq!(styles.get("color").and_then(|v| v.as_str()), Some("blue"));
}

#[test]
fn test_temporal_format_yields_to_rules_and_columns() {
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let data = vec![
        Value::map([("d", Value::from(day))]),
        Value::map([("d", Value::from(day))]),
    ];
    let table = Table::new(data.clone(), [Column::new("Day").attr("d")])
        .date_format("dd/mm/yyyy")
        .style_rule("num_format: d mmm", Callback::nullary(|| true))
        .unwrap();
    let sink = render_table(table, (0, 0));
    // a matching rule set num_format first, so the table date format is not injected
    let styles = sink.styles_at(1, 0).unwrap();
    assert_eq!(styles.get("num_format").and_then(|v| v.as_str()), Some("d mmm"));

    let plain = render_table(
        Table::new(data.clone(), [Column::new("Day").attr("d")]).date_format("dd/mm/yyyy"),
        (0, 0),
    );
    let styles = plain.styles_at(1, 0).unwrap();
    assert_eq!(
        styles.get("num_format").and_then(|v| v.as_str()),
        Some("dd/mm/yyyy")
    );

    let column_wins = render_table(
        Table::new(
            data,
            [Column::new("Day")
                .attr("d")
                .format(Styles::new().with("num_format", "yyyy"))],
        ),
        (0, 0),
    );
    let styles = column_wins.styles_at(1, 0).unwrap();
    assert_eq!(styles.get("num_format").and_then(|v| v.as_str()), Some("yyyy"));
}
