//! Specification tables (`<prefix>.csv`).
//!
//! CSV shape:
//!
//! ```text
//! column name,width,datatype
//! id,3,INTEGER
//! flag,1,BOOLEAN
//! ```
//!
//! Header order is free and extra columns are ignored. Rows are read into
//! `RawColumn` and then validated into a `Specification`.

use crate::error::ConvertError;
use crate::spec::{ColumnSpec, DataType, Specification};
use log::info;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

const REQUIRED_HEADERS: [&str; 3] = ["column name", "width", "datatype"];

/// Raw row shape as it appears in the specification table.
#[derive(Debug, Clone, Deserialize)]
struct RawColumn {
    #[serde(rename = "column name")]
    name: String,
    width: String,
    datatype: String,
}

/// Load and validate the specification table at `path`.
pub fn load_spec_file(path: &Path) -> Result<Specification, ConvertError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConvertError::not_found(path, "specification file missing"),
        _ => ConvertError::io(path, e),
    })?;

    let raw = read_raw_columns(&text).map_err(|reason| ConvertError::format(path, reason))?;
    let spec = validate_and_build(&raw).map_err(|reason| ConvertError::format(path, reason))?;

    info!(
        "Specification file {} loaded successfully ({} columns, line width {}).",
        path.display(),
        spec.columns.len(),
        spec.line_width()
    );
    Ok(spec)
}

/// Read CSV text into raw rows, paired with their 1-based line number.
fn read_raw_columns(text: &str) -> Result<Vec<(u64, RawColumn)>, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| format!("cannot read header row: {}", e))?
        .clone();
    for required in REQUIRED_HEADERS {
        if !headers.iter().any(|h| h == required) {
            return Err(format!(
                "missing required column {:?} (header: {:?})",
                required,
                headers.iter().collect::<Vec<_>>()
            ));
        }
    }

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| format!("unparsable row: {}", e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawColumn = record
            .deserialize(Some(&headers))
            .map_err(|e| format!("line {}: {}", line, e))?;
        out.push((line, raw));
    }
    Ok(out)
}

/// Validate raw rows:
/// - at least one column
/// - non-empty, unique column names
/// - widths are positive integers whose total fits in `usize`
/// - datatypes are known
fn validate_and_build(raw: &[(u64, RawColumn)]) -> Result<Specification, String> {
    if raw.is_empty() {
        return Err("specification contains no columns".to_string());
    }

    let mut total: usize = 0;
    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(raw.len());
    for (line, col) in raw {
        if col.name.is_empty() {
            return Err(format!("line {}: empty column name", line));
        }
        if !seen.insert(col.name.as_str()) {
            return Err(format!("line {}: duplicate column name {:?}", line, col.name));
        }

        let width = match col.width.parse::<usize>() {
            Ok(0) => return Err(format!("line {}: width of {:?} must be > 0", line, col.name)),
            Ok(w) => w,
            Err(_) => {
                return Err(format!(
                    "line {}: width {:?} of {:?} is not a positive integer",
                    line, col.width, col.name
                ));
            }
        };
        total = total
            .checked_add(width)
            .ok_or_else(|| format!("line {}: total line width overflows", line))?;

        let data_type = DataType::from_declared(&col.datatype)
            .map_err(|e| format!("line {}: column {:?}: {}", line, col.name, e))?;

        columns.push(ColumnSpec {
            name: col.name.clone(),
            width,
            data_type,
        });
    }

    Ok(Specification::new(columns))
}
