use crate::error::ConvertError;
use crate::parse::Dataset;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write one compact JSON object per record to `path`, replacing any
/// existing file.
pub fn write_ndjson(data: &Dataset, path: &Path) -> Result<(), ConvertError> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_records(data, &mut out).map_err(|e| ConvertError::io(path, e))?;
    out.flush().map_err(|e| ConvertError::io(path, e))?;

    info!("NDJSON file written: {}", path.display());
    Ok(())
}

/// Serialize records to any writer, one per line, in order.
pub fn write_records<W: Write>(data: &Dataset, mut out: W) -> io::Result<()> {
    for record in data {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
