//! Data input: delimited files to typed records.

mod parser;
mod records;
mod source;

pub use parser::{Parser, ParserConfig};
pub use records::{is_missing_cell, read_cell, RecordOptions, RecordReader, TrainingData, SET_SEPARATOR};
pub use source::{ColumnProfile, DataTable, SourceMetadata};
