//! Conversion of parsed tables into typed records, and labeled training pairs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::source::DataTable;
use crate::error::{BlockingError, Result};
use crate::model::DataModel;
use crate::record::{FieldValue, IdentifiedRecord, Record, RecordId};
use crate::variables::VariableType;

/// Separator between elements of a set-valued cell.
pub const SET_SEPARATOR: char = ';';

/// How table cells become records.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Column holding the record id. Row positions are used when unset.
    pub id_column: Option<String>,
}

/// Converts table rows into records shaped for a data model.
///
/// Field `i` of every record is column `i` of the table. Set, price and
/// lat/long variables decide how their column is read; every other
/// column stays text.
#[derive(Debug, Clone)]
pub struct RecordReader {
    kinds: Vec<VariableType>,
    options: RecordOptions,
}

impl RecordReader {
    pub fn new(model: &DataModel) -> Self {
        Self::with_options(model, RecordOptions::default())
    }

    pub fn with_options(model: &DataModel, options: RecordOptions) -> Self {
        let field_kinds = model.field_kinds();
        let width = field_kinds.last().map(|(index, _)| index + 1).unwrap_or(0);
        let mut kinds = vec![VariableType::Text; width];
        for (index, kind) in field_kinds {
            kinds[index] = kind;
        }
        Self { kinds, options }
    }

    /// Read every row of the table.
    pub fn read(&self, table: &DataTable) -> Result<Vec<IdentifiedRecord>> {
        if self.kinds.len() > table.column_count() {
            return Err(BlockingError::Configuration(format!(
                "model reads field {} but the table has {} columns",
                self.kinds.len() - 1,
                table.column_count()
            )));
        }

        let id_column = match &self.options.id_column {
            Some(name) => Some(table.column_index(name).ok_or_else(|| {
                BlockingError::Lookup(format!("id column '{}' not found", name))
            })?),
            None => None,
        };

        let records = table
            .rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let id = match id_column {
                    Some(column) => parse_id(&cells[column], row, column)?,
                    None => row as RecordId,
                };
                let fields = self.read_row(cells, row)?;
                Ok(IdentifiedRecord::new(id, fields))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(records = records.len(), "read records from table");
        Ok(records)
    }

    fn read_row(&self, cells: &[String], row: usize) -> Result<Record> {
        cells
            .iter()
            .enumerate()
            .map(|(column, cell)| {
                let kind = self.kinds.get(column).copied().unwrap_or(VariableType::Text);
                read_cell(cell, kind, row, column)
            })
            .collect()
    }
}

fn parse_id(cell: &str, row: usize, column: usize) -> Result<RecordId> {
    cell.trim().parse().map_err(|_| BlockingError::Parse {
        row,
        column,
        message: format!("'{}' is not a record id", cell),
    })
}

/// Returns true for cells that mean "no value".
///
/// `-` and `.` stay text.
pub fn is_missing_cell(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || ["na", "n/a", "null", "none", "nan"]
            .iter()
            .any(|null| trimmed.eq_ignore_ascii_case(null))
}

/// Read one cell as the given kind of value.
pub fn read_cell(cell: &str, kind: VariableType, row: usize, column: usize) -> Result<FieldValue> {
    if is_missing_cell(cell) {
        return Ok(FieldValue::Missing);
    }

    let parse_error = |message: String| BlockingError::Parse {
        row,
        column,
        message,
    };

    match kind {
        VariableType::Set => Ok(FieldValue::set(
            cell.split(SET_SEPARATOR)
                .map(str::trim)
                .filter(|element| !element.is_empty()),
        )),
        VariableType::Price => {
            let cleaned: String = cell
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ','))
                .collect();
            cleaned
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| parse_error(format!("'{}' is not a price", cell)))
        }
        VariableType::LatLong => {
            let parts: Vec<&str> = cell
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split([',', ' '])
                .filter(|part| !part.is_empty())
                .collect();
            match parts.as_slice() {
                [lat, lng] => match (lat.parse::<f64>(), lng.parse::<f64>()) {
                    (Ok(lat), Ok(lng)) => Ok(FieldValue::LatLong(lat, lng)),
                    _ => Err(parse_error(format!("'{}' is not a lat/long pair", cell))),
                },
                _ => Err(parse_error(format!("'{}' is not a lat/long pair", cell))),
            }
        }
        _ => Ok(FieldValue::text(cell)),
    }
}

/// Labeled record pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(rename = "match", default)]
    pub matches: Vec<(IdentifiedRecord, IdentifiedRecord)>,
    #[serde(default)]
    pub distinct: Vec<(IdentifiedRecord, IdentifiedRecord)>,
}

impl TrainingData {
    /// Load training pairs from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BlockingError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let data = serde_json::from_reader(BufReader::new(file))?;
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.matches.len() + self.distinct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.distinct.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::variables::VariableDefinition;

    #[test]
    fn test_missing_cells() {
        for cell in ["", "  ", "NA", "n/a", "None", "NaN", "null"] {
            assert!(is_missing_cell(cell), "{:?}", cell);
            assert_eq!(read_cell(cell, VariableType::Price, 0, 0).unwrap(), FieldValue::Missing);
        }
        for cell in ["0", "-", ".", "donald"] {
            assert!(!is_missing_cell(cell), "{:?}", cell);
        }
    }

    fn model() -> DataModel {
        DataModel::new(&[
            VariableDefinition::field(1, VariableType::String),
            VariableDefinition::field(2, VariableType::Set),
            VariableDefinition::field(3, VariableType::Price),
            VariableDefinition::field(4, VariableType::LatLong),
        ])
        .unwrap()
    }

    #[test]
    fn test_read_cells_by_kind() {
        let table = Parser::new()
            .parse_bytes(
                b"id,name,tags,price,location\n\
                  10,donald duck,a; b;;,$1200,\"12.5, -3\"\n\
                  11,NA,,,\n",
            )
            .unwrap();

        let records = RecordReader::new(&model()).read(&table).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.fields[0], FieldValue::text("10"));
        assert_eq!(first.fields[1], FieldValue::text("donald duck"));
        assert_eq!(first.fields[2], FieldValue::set(["a", "b"]));
        assert_eq!(first.fields[3], FieldValue::Number(1200.0));
        assert_eq!(first.fields[4], FieldValue::LatLong(12.5, -3.0));

        assert!(records[1].fields[1..].iter().all(|v| *v == FieldValue::Missing));
    }

    #[test]
    fn test_id_column() {
        let table = Parser::new()
            .parse_bytes(b"id,name,tags,price,location\n10,a,,,\n11,b,,,\n")
            .unwrap();
        let reader = RecordReader::with_options(
            &model(),
            RecordOptions {
                id_column: Some("id".to_string()),
            },
        );
        let ids: Vec<RecordId> = reader.read(&table).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_bad_price_reports_position() {
        let table = Parser::new()
            .parse_bytes(b"id,name,tags,price,location\n1,a,,cheap,\n")
            .unwrap();
        let err = RecordReader::new(&model()).read(&table).unwrap_err();
        assert!(matches!(err, BlockingError::Parse { row: 0, column: 3, .. }));
    }

    #[test]
    fn test_table_too_narrow() {
        let table = Parser::new().parse_bytes(b"id,name\n1,a\n").unwrap();
        assert!(matches!(
            RecordReader::new(&model()).read(&table),
            Err(BlockingError::Configuration(_))
        ));
    }

    #[test]
    fn test_lat_long_forms() {
        assert_eq!(
            read_cell("(1.5, 2)", VariableType::LatLong, 0, 0).unwrap(),
            FieldValue::LatLong(1.5, 2.0)
        );
        assert_eq!(
            read_cell("1.5 2", VariableType::LatLong, 0, 0).unwrap(),
            FieldValue::LatLong(1.5, 2.0)
        );
        assert!(read_cell("1.5", VariableType::LatLong, 0, 0).is_err());
    }

    #[test]
    fn test_training_data_json() {
        let json = r#"{
            "match": [[{"id": 1, "fields": ["donald"]}, {"id": 2, "fields": ["don"]}]],
            "distinct": []
        }"#;
        let data: TrainingData = serde_json::from_str(json).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.matches[0].1.fields[0], FieldValue::text("don"));
    }
}
