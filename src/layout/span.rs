//! Span estimation and bound extents.
//!
//! Estimation works on unbound subtrees and may answer [`Span::Undetermined`]
//! for growing nodes. Bound extents are exact and require the subtree to be
//! placed first.

use super::tree::{Axis, Layout, NodeId};
use crate::error::{Result, SheetboxError};
use crate::node::NodeKind;

/// Result of estimating a subtree's span along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Fixed(u32),
    /// The node grows and its size depends on its siblings.
    Undetermined,
}

impl Span {
    pub fn fixed(self) -> Option<u32> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::Undetermined => None,
        }
    }
}

impl Layout {
    /// Estimate the columns `id` would occupy, including its offset.
    ///
    /// With `raises` set, a growing node is an error instead of
    /// [`Span::Undetermined`].
    pub fn resolve_cols(&self, id: NodeId, raises: bool) -> Result<Span> {
        self.resolve_span(id, Axis::Horizontal, raises)
    }

    /// Estimate the rows `id` would occupy, including its offset.
    pub fn resolve_rows(&self, id: NodeId, raises: bool) -> Result<Span> {
        self.resolve_span(id, Axis::Vertical, raises)
    }

    pub(crate) fn resolve_span(&self, id: NodeId, axis: Axis, raises: bool) -> Result<Span> {
        let slot = &self[id];
        if let Some(span) = slot.span(axis) {
            return Ok(Span::Fixed(span.saturating_add(slot.offset)));
        }
        if slot.grow {
            return if raises {
                Err(SheetboxError::SizeIndeterminate {
                    node: self.describe(id),
                    axis,
                    reason: "it grows, so its size depends on its siblings".to_string(),
                })
            } else {
                Ok(Span::Undetermined)
            };
        }

        // Children are measured by explicit span alone; their own offsets
        // only count when they have to be estimated recursively.
        let mut widest = 1;
        for &child in &slot.children {
            let span = match self[child].span(axis) {
                Some(span) => Some(span),
                None => self.resolve_span(child, axis, raises)?.fixed(),
            };
            if let Some(span) = span {
                widest = widest.max(span);
            }
        }
        Ok(Span::Fixed(widest.saturating_add(slot.offset)))
    }

    /// Bound column extent of `id`, counting its offset when its parent
    /// is a Row.
    pub fn cols(&self, id: NodeId) -> Result<u32> {
        self.extent(id, Axis::Horizontal)
    }

    /// Bound row extent of `id`, counting its offset when its parent is a
    /// Col.
    pub fn rows(&self, id: NodeId) -> Result<u32> {
        self.extent(id, Axis::Vertical)
    }

    pub(crate) fn extent(&self, id: NodeId, axis: Axis) -> Result<u32> {
        let slot = &self[id];
        // The root is placed at the start cell; it has no axis to offset along
        let offset = match slot.parent {
            Some(_) if self.direction(id)? == axis => slot.offset,
            _ => 0,
        };
        if let Some(span) = slot.span(axis) {
            return Ok(span.saturating_add(offset));
        }
        if slot.kind.is_primitive() {
            return Ok(offset.saturating_add(1));
        }

        self.ensure_children_bound(id)?;
        let tiles = matches!(
            (&slot.kind, axis),
            (NodeKind::Row, Axis::Horizontal) | (NodeKind::Col, Axis::Vertical)
        );
        let mut total: u32 = 0;
        for &child in &slot.children {
            let extent = self.extent(child, axis)?;
            total = if tiles {
                total.saturating_add(extent)
            } else {
                total.max(extent)
            };
        }
        Ok(total.saturating_add(offset))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn first_child(layout: &Layout) -> NodeId {
        layout[layout.root()].children()[0]
    }

    #[test]
    fn test_explicit_span_plus_offset() {
        let layout = Layout::new(Node::row([Node::cell("a").colspan(3).offset(2)]));
        let id = first_child(&layout);
        assert_eq!(layout.resolve_cols(id, true).unwrap(), Span::Fixed(5));
    }

    #[test]
    fn test_leaf_estimates_one() {
        let layout = Layout::new(Node::cell("a"));
        assert_eq!(layout.resolve_cols(layout.root(), true).unwrap(), Span::Fixed(1));
        assert_eq!(layout.resolve_rows(layout.root(), true).unwrap(), Span::Fixed(1));
    }

    #[test]
    fn test_grow_undetermined_or_error() {
        let layout = Layout::new(Node::row([Node::cell("a").grow()]));
        let id = first_child(&layout);
        assert_eq!(layout.resolve_cols(id, false).unwrap(), Span::Undetermined);
        assert!(matches!(
            layout.resolve_cols(id, true),
            Err(SheetboxError::SizeIndeterminate { .. })
        ));
    }

    #[test]
    fn test_estimate_takes_max_of_children() {
        let layout = Layout::new(Node::col([
            Node::row([Node::cell("a"), Node::cell("b")]).colspan(4),
            Node::cell("c").colspan(2),
            Node::cell("d").grow(),
        ]));
        assert_eq!(
            layout.resolve_cols(layout.root(), false).unwrap(),
            Span::Fixed(4)
        );
    }

    #[test]
    fn test_estimate_with_growing_child_and_raises() {
        let layout = Layout::new(Node::col([Node::row([Node::cell("d").grow()])]));
        assert!(layout.resolve_cols(layout.root(), true).is_err());
        assert_eq!(
            layout.resolve_cols(layout.root(), false).unwrap(),
            Span::Fixed(1)
        );
    }

    #[test]
    fn test_root_extent_ignores_offset() {
        let layout = Layout::new(Node::cell("a").offset(3));
        assert_eq!(layout.cols(layout.root()).unwrap(), 1);
    }

    #[test]
    fn test_extent_under_plain_box_has_no_direction() {
        let layout = Layout::new(Node::container([Node::cell("a")]));
        let id = first_child(&layout);
        assert!(matches!(
            layout.cols(id),
            Err(SheetboxError::InvalidParentRelation { .. })
        ));
    }
}
