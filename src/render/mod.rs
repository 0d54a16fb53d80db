//! Output rendering: NDJSON, one record per line.

pub mod ndjson;

pub use ndjson::write_ndjson;
