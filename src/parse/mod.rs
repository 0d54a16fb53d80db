//! Fixed-width parsing of data files into typed records.

pub mod fixed;
pub mod record;

pub use fixed::{parse_data_file, parse_lines};
pub use record::{Dataset, Record, Value};
