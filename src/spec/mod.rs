//! Spec layer: specification tables + validated column layouts.
//!
//! It owns:
//! - the declared datatype mapping (TEXT/BOOLEAN/INTEGER/FLOAT)
//! - loading `<prefix>.csv` into a `Specification`

pub mod column;
pub mod load;

pub use column::{ColumnSpec, DataType, Specification};
pub use load::load_spec_file;
