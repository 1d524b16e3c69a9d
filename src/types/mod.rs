//! Data types shared by the layout, table and export layers.

mod options;
mod style;
mod value;

pub use options::*;
pub use style::*;
pub use value::*;
