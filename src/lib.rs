//! Fixed-width text to NDJSON conversion.
//!
//! A data file `<prefix>_<rest>.txt` is sliced according to the column layout
//! in `<prefix>.csv` and written as `<prefix>_<rest>.ndjson`, one JSON object
//! per input line.

pub mod driver;
pub mod error;
pub mod parse;
pub mod render;
pub mod spec;

pub type Result<T> = anyhow::Result<T>;

pub use driver::{BatchReport, Config, derive_spec_key, process_file_pair, run};
pub use error::ConvertError;
