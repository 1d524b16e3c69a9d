//! Layout resolution: from an authored [`Node`] tree to absolute grid
//! coordinates.
//!
//! This module handles:
//! - Flattening the tree into an arena with parent links ([`Layout`])
//! - Estimating spans of unbound subtrees (`span`)
//! - Filling in the span of a growing child (`grow`)
//! - The depth-first binding pass that assigns every node a row and column
//!   (`binder`)

mod binder;
mod grow;
mod span;
mod tree;

pub use span::Span;
pub use tree::{Axis, BoxSlot, BoxSnapshot, Instance, InstanceId, Layout, NodeId};

use crate::error::Result;
use crate::node::Node;

/// Bind `root` with its top-left corner at `(start_row, start_col)`.
pub fn bind(root: Node, start_row: u32, start_col: u32) -> Result<Layout> {
    Layout::new(root).bind(start_row, start_col)
}
