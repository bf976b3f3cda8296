use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{info, warn};
use serde::Serialize;

use crate::PaddockError;

/// Writes one JSON document per line. Records that fail to serialize are
/// logged and skipped. Returns the number of lines written.
pub fn write_json_lines<T: Serialize>(
    file: &Path,
    records: impl IntoIterator<Item = T>,
) -> Result<usize, PaddockError> {
    let output_file = File::create(file).map_err(|e| PaddockError::WriterError { source: e })?;
    let mut output_file_writer = BufWriter::new(output_file);
    let mut written = 0;
    for record in records {
        match serde_json::to_string(&record) {
            Ok(line) => {
                writeln!(output_file_writer, "{}", line)
                    .map_err(|e| PaddockError::WriterError { source: e })?;
                written += 1;
            }
            Err(e) => warn!("Error while serializing record for output file: {}", e),
        }
    }
    output_file_writer
        .flush()
        .map_err(|e| PaddockError::WriterError { source: e })?;
    info!("Wrote {} records to {:?}", written, file);
    Ok(written)
}
