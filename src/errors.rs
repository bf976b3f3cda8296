// Error types for paddock

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum PaddockError {
    // Record loading errors
    #[snafu(display("Table {entity} has no {column} column"))]
    MissingKeyColumn {
        entity: &'static str,
        column: &'static str,
    },
    #[snafu(display("Could not decode {entity} record"))]
    RecordDecodeError {
        entity: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("Invalid record file: {path}"))]
    InvalidRecordFile { path: String },
    #[snafu(display("Error loading record file"))]
    RecordLoaderError { source: io::Error },

    // Presentation errors
    #[snafu(display("Invalid column catalog: {reason}"))]
    InvalidColumnCatalog { reason: String },

    // Errors for the table writer
    #[snafu(display("Error writing output file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing output"))]
    OutputSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}
