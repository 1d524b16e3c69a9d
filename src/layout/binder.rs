//! Depth-first binding pass.

use tracing::{debug, trace};

use super::tree::{Axis, Instance, InstanceId, Layout, NodeId};
use crate::error::{Result, SheetboxError};

impl Layout {
    /// Place every node, starting with the root at `(start_row, start_col)`.
    ///
    /// Consumes the layout so a failed bind never leaves a half-placed tree
    /// behind. Binding an already bound layout fails with
    /// [`SheetboxError::AlreadyBound`].
    pub fn bind(mut self, start_row: u32, start_col: u32) -> Result<Self> {
        if self.is_bound() {
            return Err(SheetboxError::AlreadyBound);
        }
        let root = self.root();
        self.place(root, start_row, start_col, None)?;
        debug!(nodes = self.len(), start_row, start_col, "layout bound");
        Ok(self)
    }

    fn place(
        &mut self,
        id: NodeId,
        row: u32,
        col: u32,
        parent: Option<InstanceId>,
    ) -> Result<InstanceId> {
        if self[id].instance.is_some() {
            return Err(SheetboxError::AlreadyBound);
        }
        let instance = InstanceId::next(self);
        self.instances.push(Instance {
            node: id,
            row,
            col,
            parent,
            children: Vec::new(),
        });
        self[id].instance = Some(instance);
        trace!(node = %self.describe(id), row, col, "placed");

        self.place_children(id, instance, row, col)?;
        Ok(instance)
    }

    fn place_children(&mut self, id: NodeId, instance: InstanceId, row: u32, col: u32) -> Result<()> {
        let children = self[id].children.clone();
        let Some(&first) = children.first() else {
            return Ok(());
        };
        let axis = self.tiling_axis(id, first)?;
        let inherited = self[id].styles.clone();

        let (mut row, mut col) = (row, col);
        for child in children {
            self[child].styles.inherit(&inherited);
            self.assign_child_span(id, child)?;
            let offset = self[child].offset;
            let placed = match axis {
                Axis::Horizontal => {
                    let placed = self.place(child, row, col.saturating_add(offset), Some(instance))?;
                    col = col.saturating_add(self.cols(child)?);
                    placed
                }
                Axis::Vertical => {
                    let placed = self.place(child, row.saturating_add(offset), col, Some(instance))?;
                    row = row.saturating_add(self.rows(child)?);
                    placed
                }
            };
            self[instance].children.push(placed);
        }
        Ok(())
    }
}
