//! Table expansion: header row at the table's corner, one row per record.

use tracing::debug;

use super::Writer;
use crate::error::{Result, SheetboxError};
use crate::layout::{Layout, NodeId};
use crate::sink::CellSink;
use crate::table::{CellStyle, Column, ColumnType, RowHeight, Table};
use crate::types::{CellValue, ImageSource, Styles, Value};

pub(super) fn expand<S: CellSink + ?Sized>(
    writer: &mut Writer<'_, S>,
    layout: &Layout,
    id: NodeId,
    table: &Table,
) -> Result<()> {
    let instance = layout.instance(id)?;
    let (top, left) = (instance.row, instance.col);
    let table_styles = layout[id].styles();

    let header_format = writer.format(table_styles)?;
    for (index, column) in table.columns().iter().enumerate() {
        let col = left.saturating_add(grid_offset(index)?);
        let width = column.width.unwrap_or(table.col_width);
        writer.sink.set_column_width(col, col, width)?;
        writer
            .sink
            .write(top, col, &CellValue::from(column.title.as_str()), header_format)?;
        if let Some(text) = &column.title_comment {
            writer
                .sink
                .write_comment(top, col, text, &column.title_comment_options)?;
        }
    }

    let mut skipped = 0usize;
    for (index, record) in table.data().iter().enumerate() {
        let row = top.saturating_add(1).saturating_add(grid_offset(index)?);
        if let Some(height) = row_height(table, record, index) {
            writer.sink.set_row_height(row, height)?;
        }
        for (col_index, column) in table.columns().iter().enumerate() {
            let col = left.saturating_add(grid_offset(col_index)?);
            let value = cell_value(column, record)?;

            if column.kind == ColumnType::Image {
                match &value {
                    CellValue::String(reference) if !reference.is_empty() => {
                        let source = ImageSource::parse(reference)?;
                        writer.sink.insert_image(row, col, &source, &column.options)?;
                    }
                    v if v.is_empty() => skipped += 1,
                    other => {
                        return Err(SheetboxError::Render(format!(
                            "image column `{}` needs a file reference, got `{other}`",
                            column.title
                        )))
                    }
                }
                continue;
            }

            if writer.fast && value.is_empty() {
                skipped += 1;
                continue;
            }
            let styles = data_styles(table, table_styles, column, record, &value);
            let format = writer.format(&styles)?;
            writer.sink.write(row, col, &value, format)?;
        }
    }

    debug!(
        rows = table.data().len(),
        cols = table.columns().len(),
        skipped,
        "table expanded"
    );
    Ok(())
}

/// Value for one data cell: the field path wins over the render callback.
fn cell_value(column: &Column, record: &Value) -> Result<CellValue> {
    if let Some(path) = &column.attr {
        let value = path.resolve(record)?;
        return value.to_cell_value().ok_or_else(|| {
            SheetboxError::Render(format!(
                "field `{path}` holds a {}, not a scalar",
                value.kind_name()
            ))
        });
    }
    match &column.render {
        Some(render) => Ok(render.call(record, column)),
        None => Err(SheetboxError::MalformedColumnConfig(format!(
            "column `{}` has neither `attr` nor `render`",
            column.title
        ))),
    }
}

/// Style for one data cell, lowest precedence first: table style, cell
/// style rules, temporal number format (only when still unset), column
/// format.
fn data_styles(
    table: &Table,
    table_styles: &Styles,
    column: &Column,
    record: &Value,
    value: &CellValue,
) -> Styles {
    let mut styles = table_styles.clone();
    match &table.cell_style {
        CellStyle::Uniform(uniform) => styles.update(uniform),
        CellStyle::Rules(rules) => {
            for rule in rules {
                if rule.condition.call(record, column) {
                    styles.update(&rule.styles);
                }
            }
        }
    }
    if let Some(kind) = value.temporal_kind() {
        if !styles.contains_key("num_format") {
            styles.insert("num_format", table.num_format_for(kind));
        }
    }
    if let Some(format) = &column.format {
        styles.update(format);
    }
    styles
}

fn row_height(table: &Table, record: &Value, index: usize) -> Option<f64> {
    match table.row_height.as_ref()? {
        RowHeight::Fixed(height) => Some(*height),
        RowHeight::Computed(callback) => callback.call(record, &index),
    }
}

fn grid_offset(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| SheetboxError::Render(format!("table index {index} exceeds the grid")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::layout::bind;
    use crate::node::Node;
    use crate::sink::{RecordingSink, SinkOp};
    use crate::table::Callback;
    use chrono::NaiveDate;

    fn people() -> Vec<Value> {
        vec![
            Value::map([("name", Value::from("Ann")), ("age", Value::from(31))]),
            Value::map([("name", Value::from("Bob")), ("age", Value::Null)]),
        ]
    }

    fn expand_into(node: Node, fast: bool) -> RecordingSink {
        let layout = bind(node, 0, 0).unwrap();
        let mut sink = RecordingSink::new();
        Writer::new(&mut sink).fast(fast).render(&layout).unwrap();
        sink
    }

    #[test]
    fn test_header_and_data_coordinates() {
        let table = Table::new(people(), [("name", "Name"), ("age", "Age")]);
        let sink = expand_into(Node::row([Node::cell("x"), table.into()]), false);
        assert_eq!(sink.value_at(0, 1), Some(&CellValue::from("Name")));
        assert_eq!(sink.value_at(0, 2), Some(&CellValue::from("Age")));
        assert_eq!(sink.value_at(1, 1), Some(&CellValue::from("Ann")));
        assert_eq!(sink.value_at(1, 2), Some(&CellValue::Number(31.0)));
        assert_eq!(sink.value_at(2, 2), Some(&CellValue::Empty));
        // 1 cell + 2 headers + 4 data cells
        assert_eq!(sink.writes().count(), 7);
    }

    #[test]
    fn test_fast_mode_skips_empty() {
        let table = Table::new(people(), [("name", "Name"), ("age", "Age")]);
        let sink = expand_into(table.into(), true);
        assert_eq!(sink.writes().count(), 5);
        // Bob keeps his name; his null age is never written
        assert!(sink.value_at(2, 0).is_some());
        assert!(sink.value_at(2, 1).is_none());
    }

    #[test]
    fn test_column_widths_and_row_heights() {
        let table = Table::new(people(), [Column::from(("name", "Name")).width(40.0), ("age", "Age").into()])
            .col_width(11.0)
            .row_height(RowHeight::Computed(Callback::binary(|_, i: &usize| {
                (*i == 1).then_some(25.0)
            })));
        let sink = expand_into(table.into(), false);
        assert!(sink.ops.contains(&SinkOp::ColumnWidth { first_col: 0, last_col: 0, width: 40.0 }));
        assert!(sink.ops.contains(&SinkOp::ColumnWidth { first_col: 1, last_col: 1, width: 11.0 }));
        let heights: Vec<_> = sink
            .ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::RowHeight { row, height } => Some((*row, *height)),
                _ => None,
            })
            .collect();
        assert_eq!(heights, vec![(2, 25.0)]);
    }

    #[test]
    fn test_temporal_format_precedence() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let data = vec![
            Value::map([("d", Value::from(day)), ("flag", Value::from(true))]),
            Value::map([("d", Value::from(day)), ("flag", Value::from(false))]),
        ];
        let table = Table::new(data, [("d", "Day")])
            .date_format("dd/mm/yyyy")
            .style_rule(
                "num_format: mmm yyyy",
                Callback::unary(|r| matches!(r, Value::Map(m) if m.get("flag") == Some(&Value::Bool(true)))),
            )
            .unwrap();
        let sink = expand_into(table.into(), false);
        let flagged = sink.styles_at(1, 0).unwrap();
        let plain = sink.styles_at(2, 0).unwrap();
        assert_eq!(flagged.get("num_format").and_then(|v| v.as_str()), Some("mmm yyyy"));
        assert_eq!(plain.get("num_format").and_then(|v| v.as_str()), Some("dd/mm/yyyy"));
    }

    #[test]
    fn test_column_format_wins() {
        let table = Table::new(people(), [Column::from(("name", "Name")).format(Styles::new().with("border", 5))])
            .cell_style(CellStyle::Uniform(Styles::new().with("border", 3)));
        let sink = expand_into(table.into(), false);
        let styles = sink.styles_at(1, 0).unwrap();
        assert_eq!(styles.get("border").and_then(|v| v.as_int()), Some(5));
        let header = sink.styles_at(0, 0).unwrap();
        assert_eq!(header.get("border").and_then(|v| v.as_int()), Some(1));
    }

    #[test]
    fn test_image_column_inserts() {
        let data = vec![
            Value::map([("pic", "logo.png")]),
            Value::map([("pic", "")]),
        ];
        let table = Table::new(
            data,
            [Column::new("Pic").attr("pic").image(Default::default())],
        );
        let sink = expand_into(table.into(), false);
        let images = sink
            .ops
            .iter()
            .filter(|op| matches!(op, SinkOp::Image { row: 1, col: 0, .. }))
            .count();
        assert_eq!(images, 1);
        assert_eq!(sink.writes().count(), 1);
    }

    #[test]
    fn test_column_without_source_fails() {
        let table = Table::new(people(), [Column::new("Nothing")]);
        let layout = bind(table.into(), 0, 0).unwrap();
        let mut sink = RecordingSink::new();
        assert!(matches!(
            Writer::new(&mut sink).render(&layout),
            Err(SheetboxError::MalformedColumnConfig(_))
        ));
    }
}
