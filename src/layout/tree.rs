//! Arena holding a flattened layout tree and its bound instances.
//!
//! Nodes refer to each other by [`NodeId`]; a node's bound instance is a
//! write-once [`InstanceId`] into a second arena. No reference cycles.

use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{Result, SheetboxError};
use crate::node::{Node, NodeKind};
use crate::types::Styles;

/// Index of a node in its [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a bound instance in its [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

/// A grid axis, also used as the layout direction a parent imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    /// Columns; the direction of children of a Row.
    Horizontal,
    /// Rows; the direction of children of a Col.
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Horizontal => "width",
            Self::Vertical => "height",
        })
    }
}

/// One node in the arena.
#[derive(Debug)]
pub struct BoxSlot {
    pub(crate) kind: NodeKind,
    pub(crate) rowspan: Option<u32>,
    pub(crate) colspan: Option<u32>,
    pub(crate) offset: u32,
    pub(crate) grow: bool,
    pub(crate) styles: Styles,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) instance: Option<InstanceId>,
}

impl BoxSlot {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn rowspan(&self) -> Option<u32> {
        self.rowspan
    }

    pub fn colspan(&self) -> Option<u32> {
        self.colspan
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn grow(&self) -> bool {
        self.grow
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    /// Explicit or resolved span along `axis`.
    pub fn span(&self, axis: Axis) -> Option<u32> {
        match axis {
            Axis::Horizontal => self.colspan,
            Axis::Vertical => self.rowspan,
        }
    }

    pub(crate) fn set_span(&mut self, axis: Axis, span: Option<u32>) {
        match axis {
            Axis::Horizontal => self.colspan = span,
            Axis::Vertical => self.rowspan = span,
        }
    }
}

/// The bound counterpart of a node: its absolute top-left corner.
#[derive(Debug, Clone)]
pub struct Instance {
    pub node: NodeId,
    pub row: u32,
    pub col: u32,
    pub parent: Option<InstanceId>,
    pub children: Vec<InstanceId>,
}

/// Serializable view of one bound node, in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxSnapshot {
    pub kind: &'static str,
    pub depth: usize,
    pub row: u32,
    pub col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
}

/// A layout tree flattened into an arena.
///
/// Created unbound by [`Layout::new`]; [`Layout::bind`] places every node.
#[derive(Debug)]
pub struct Layout {
    pub(crate) boxes: Vec<BoxSlot>,
    pub(crate) instances: Vec<Instance>,
    root: NodeId,
}

impl Layout {
    pub fn new(root: Node) -> Self {
        let mut layout = Self {
            boxes: Vec::new(),
            instances: Vec::new(),
            root: NodeId(0),
        };
        layout.root = layout.push(root, None);
        layout
    }

    fn push(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let Node {
            kind,
            rowspan,
            colspan,
            offset,
            grow,
            styles,
            children,
        } = node;
        let id = NodeId(self.boxes.len());
        self.boxes.push(BoxSlot {
            kind,
            rowspan,
            colspan,
            offset,
            grow,
            styles,
            parent,
            children: Vec::with_capacity(children.len()),
            instance: None,
        });
        for child in children {
            let child_id = self.push(child, Some(id));
            self[id].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// All node ids in depth-first (declaration) order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.boxes.len()).map(NodeId)
    }

    pub fn is_bound(&self) -> bool {
        self[self.root].instance.is_some()
    }

    pub fn instance(&self, id: NodeId) -> Result<&Instance> {
        match self[id].instance {
            Some(instance) => Ok(&self[instance]),
            None => Err(SheetboxError::UnboundAccess {
                node: self.describe(id),
            }),
        }
    }

    /// Bound row of `id`.
    pub fn row(&self, id: NodeId) -> Result<u32> {
        self.instance(id).map(|i| i.row)
    }

    /// Bound column of `id`.
    pub fn col(&self, id: NodeId) -> Result<u32> {
        self.instance(id).map(|i| i.col)
    }

    /// Direction imposed by the parent: Row -> horizontal, Col -> vertical.
    pub fn direction(&self, id: NodeId) -> Result<Axis> {
        let parent = self[id]
            .parent
            .ok_or_else(|| SheetboxError::InvalidParentRelation {
                node: self.describe(id),
            })?;
        match self[parent].kind {
            NodeKind::Row => Ok(Axis::Horizontal),
            NodeKind::Col => Ok(Axis::Vertical),
            _ => Err(SheetboxError::InvalidParentRelation {
                node: self.describe(id),
            }),
        }
    }

    /// Short label for diagnostics, e.g. `Cell "total" (#4)`.
    pub fn describe(&self, id: NodeId) -> String {
        match &self[id].kind {
            NodeKind::Cell(cell) => {
                let mut text = cell.value.to_string();
                if text.chars().count() > 24 {
                    text = text.chars().take(21).collect::<String>() + "...";
                }
                format!("Cell {text:?} (#{})", id.0)
            }
            NodeKind::Image(image) => format!("Image {} (#{})", image.source.label(), id.0),
            kind => format!("{} (#{})", kind.name(), id.0),
        }
    }

    pub(crate) fn ensure_children_bound(&self, id: NodeId) -> Result<()> {
        match self[id]
            .children
            .iter()
            .find(|&&child| self[child].instance.is_none())
        {
            Some(&child) => Err(SheetboxError::UnboundAccess {
                node: self.describe(child),
            }),
            None => Ok(()),
        }
    }

    /// Depth-first list of every bound node.
    pub fn snapshot(&self) -> Result<Vec<BoxSnapshot>> {
        let mut out = Vec::with_capacity(self.boxes.len());
        self.snapshot_into(self.root, 0, &mut out)?;
        Ok(out)
    }

    fn snapshot_into(&self, id: NodeId, depth: usize, out: &mut Vec<BoxSnapshot>) -> Result<()> {
        let instance = self.instance(id)?;
        let slot = &self[id];
        out.push(BoxSnapshot {
            kind: slot.kind.name(),
            depth,
            row: instance.row,
            col: instance.col,
            rowspan: slot.rowspan,
            colspan: slot.colspan,
        });
        for &child in &slot.children {
            self.snapshot_into(child, depth + 1, out)?;
        }
        Ok(())
    }
}

// Ids are only minted by this arena, so lookups are in bounds.
#[allow(clippy::indexing_slicing)]
impl Index<NodeId> for Layout {
    type Output = BoxSlot;

    fn index(&self, id: NodeId) -> &BoxSlot {
        &self.boxes[id.0]
    }
}

#[allow(clippy::indexing_slicing)]
impl IndexMut<NodeId> for Layout {
    fn index_mut(&mut self, id: NodeId) -> &mut BoxSlot {
        &mut self.boxes[id.0]
    }
}

#[allow(clippy::indexing_slicing)]
impl Index<InstanceId> for Layout {
    type Output = Instance;

    fn index(&self, id: InstanceId) -> &Instance {
        &self.instances[id.0]
    }
}

#[allow(clippy::indexing_slicing)]
impl IndexMut<InstanceId> for Layout {
    fn index_mut(&mut self, id: InstanceId) -> &mut Instance {
        &mut self.instances[id.0]
    }
}

impl InstanceId {
    pub(crate) fn next(layout: &Layout) -> Self {
        Self(layout.instances.len())
    }
}
