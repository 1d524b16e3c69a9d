//! Span inheritance and grow resolution for a child about to be placed.

use tracing::debug;

use super::span::Span;
use super::tree::{Axis, Layout, NodeId};
use crate::error::{Result, SheetboxError};
use crate::node::NodeKind;

impl Layout {
    /// Axis along which children of `id` are tiled.
    pub(crate) fn tiling_axis(&self, id: NodeId, child: NodeId) -> Result<Axis> {
        match self[id].kind {
            NodeKind::Row => Ok(Axis::Horizontal),
            NodeKind::Col => Ok(Axis::Vertical),
            _ => Err(SheetboxError::InvalidParentRelation {
                node: self.describe(child),
            }),
        }
    }

    /// Fill in the spans `child` takes from its container `parent`.
    ///
    /// The child inherits the container's cross-axis span when it has none.
    /// A growing child along the tiling axis receives whatever its container
    /// has left after its offset and every sibling.
    pub(crate) fn assign_child_span(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let tiling = self.tiling_axis(parent, child)?;
        let cross = tiling.cross();
        if self[child].span(cross).is_none() {
            let inherited = self[parent].span(cross);
            self[child].set_span(cross, inherited);
        }

        if !self[child].grow {
            return Ok(());
        }
        let siblings: Vec<NodeId> = self[parent]
            .children
            .iter()
            .copied()
            .filter(|&id| id != child)
            .collect();
        if siblings.iter().any(|&id| self[id].grow) {
            return Err(SheetboxError::MultipleGrow {
                container: self.describe(parent),
            });
        }
        if let Some(span) = self[child].span(tiling) {
            debug!(node = %self.describe(child), span, %tiling, "explicit span kept on growing node");
            return Ok(());
        }

        let available = match self[parent].span(tiling) {
            Some(span) => span,
            None => {
                let span = self.span_from_neighbours(parent, child, tiling)?;
                self[parent].set_span(tiling, Some(span));
                span
            }
        };

        let mut taken = self[child].offset;
        for &sibling in &siblings {
            match self.resolve_span(sibling, tiling, true)? {
                Span::Fixed(span) => taken = taken.saturating_add(span),
                Span::Undetermined => {
                    return Err(SheetboxError::SizeIndeterminate {
                        node: self.describe(sibling),
                        axis: tiling,
                        reason: "sibling of a growing node has no fixed size".to_string(),
                    })
                }
            }
        }
        if taken >= available {
            return Err(SheetboxError::SizeIndeterminate {
                node: self.describe(child),
                axis: tiling,
                reason: format!("no space left: {available} available, {taken} taken"),
            });
        }

        let span = available - taken;
        debug!(node = %self.describe(child), span, available, taken, %tiling, "resolved growing node");
        self[child].set_span(tiling, Some(span));
        Ok(())
    }

    /// A container without its own span borrows the widest determinable
    /// span among itself and its siblings.
    fn span_from_neighbours(&self, parent: NodeId, child: NodeId, axis: Axis) -> Result<u32> {
        let Some(grandparent) = self[parent].parent else {
            return Err(SheetboxError::SizeIndeterminate {
                node: self.describe(child),
                axis,
                reason: "its container has no size and no parent to take one from".to_string(),
            });
        };
        let mut widest: Option<u32> = None;
        for &neighbour in &self[grandparent].children {
            if let Span::Fixed(span) = self.resolve_span(neighbour, axis, false)? {
                widest = Some(widest.map_or(span, |w| w.max(span)));
            }
        }
        widest.ok_or_else(|| SheetboxError::SizeIndeterminate {
            node: self.describe(child),
            axis,
            reason: "no neighbour of its container has a determinable size".to_string(),
        })
    }
}
