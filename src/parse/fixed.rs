use crate::error::ConvertError;
use crate::parse::record::{Dataset, Record};
use crate::spec::Specification;
use log::info;
use std::fs;
use std::path::Path;

/// Parse a fixed-width data file into one record per line.
///
/// Every line must be exactly `spec.line_width()` characters long; the first
/// mismatch or unconvertible field aborts the whole file.
pub fn parse_data_file(path: &Path, spec: &Specification) -> Result<Dataset, ConvertError> {
    let bytes = fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        ConvertError::parse(path, line, "line is not valid UTF-8")
    })?;
    let data = parse_lines(&text, spec)
        .map_err(|(line, reason)| ConvertError::parse(path, line, reason))?;

    info!(
        "Data file {} parsed successfully ({} records).",
        path.display(),
        data.len()
    );
    Ok(data)
}

/// Parse fixed-width text. Errors carry the 1-based line number.
pub fn parse_lines(text: &str, spec: &Specification) -> Result<Dataset, (usize, String)> {
    let expected = spec.line_width();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut out = Dataset::new();
    // `lines()` drops the final terminator and strips `\r` before `\n`.
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        out.push(parse_line(line, spec, expected).map_err(|reason| (lno, reason))?);
    }
    Ok(out)
}

fn parse_line(line: &str, spec: &Specification, expected: usize) -> Result<Record, String> {
    let actual = line.chars().count();
    if actual != expected {
        return Err(format!(
            "line is {} characters wide, specification expects {}",
            actual, expected
        ));
    }

    let mut record = Record::with_capacity(spec.columns.len());
    let mut rest = line;
    for col in &spec.columns {
        // Byte offset of the end of this field; widths are in characters.
        let end = rest
            .char_indices()
            .nth(col.width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (raw, tail) = rest.split_at(end);
        rest = tail;

        let value = col
            .data_type
            .convert(raw)
            .map_err(|e| format!("column {:?} ({}): {}", col.name, col.data_type, e))?;
        record.push(col.name.as_str(), value);
    }
    Ok(record)
}
