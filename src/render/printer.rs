//! Diagnostic dump of a bound layout. Not a stable format.

use std::io::Write;

use crate::error::Result;
use crate::layout::{Layout, NodeId};
use crate::node::NodeKind;

/// One line per node: kind, `row:col`, and for cells the value and spans.
pub fn print_layout(layout: &Layout, out: &mut impl Write) -> Result<()> {
    print_node(layout, layout.root(), 0, out)
}

pub fn print_to_string(layout: &Layout) -> Result<String> {
    let mut buf = Vec::new();
    print_layout(layout, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn print_node(layout: &Layout, id: NodeId, depth: usize, out: &mut impl Write) -> Result<()> {
    let instance = layout.instance(id)?;
    let slot = &layout[id];
    let indent = "  ".repeat(depth);
    match slot.kind() {
        NodeKind::Cell(cell) => writeln!(
            out,
            "{indent}write Cell {} at {}:{} (rowspan={}, colspan={})",
            cell.value,
            instance.row,
            instance.col,
            slot.rowspan().unwrap_or(1),
            slot.colspan().unwrap_or(1)
        )?,
        kind => writeln!(out, "{indent}write {} at {}:{}", kind.name(), instance.row, instance.col)?,
    }
    for &child in slot.children() {
        print_node(layout, child, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::bind;
    use crate::node::Node;

    #[test]
    fn test_print_lines() {
        let layout = bind(
            Node::col([Node::row([Node::cell("a"), Node::cell("b").colspan(2)])]),
            1,
            0,
        )
        .unwrap();
        let text = print_to_string(&layout).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "write Col at 1:0",
                "  write Row at 1:0",
                "    write Cell a at 1:0 (rowspan=1, colspan=1)",
                "    write Cell b at 1:1 (rowspan=1, colspan=2)",
            ]
        );
    }
}
