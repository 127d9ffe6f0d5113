//! Parsed tables and what blocking needs to know about them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::records::is_missing_cell;

/// Missing and distinct counts of one column.
///
/// A column with missing cells wants `has_missing` on the variables that
/// read it; a column with few distinct values makes coarse blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub missing: usize,
    /// Distinct present cells, compared after trimming.
    pub distinct: usize,
}

impl ColumnProfile {
    pub fn has_missing(&self) -> bool {
        self.missing > 0
    }
}

/// The file a table was read from, identified by content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub path: PathBuf,
    /// `sha256:<hex>` of the raw bytes. Covers over equal hashes are equal.
    pub hash: String,
    /// Delimiter family: csv, tsv, csv-semicolon, psv.
    pub format: String,
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn describe(path: &Path, hash: String, format: String, table: &DataTable) -> Self {
        Self {
            path: path.to_path_buf(),
            hash,
            format,
            row_count: table.row_count(),
            columns: table.profile(),
            loaded_at: Utc::now(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.has_missing())
    }
}

/// Raw cells of a delimited file. Every row is padded to the header width.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: u8,
}

impl DataTable {
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map_or("", String::as_str))
    }

    /// Missing and distinct counts for every column, in header order.
    pub fn profile(&self) -> Vec<ColumnProfile> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut missing = 0;
                let mut seen: HashSet<&str> = HashSet::new();
                for cell in self.column(index) {
                    if is_missing_cell(cell) {
                        missing += 1;
                    } else {
                        seen.insert(cell.trim());
                    }
                }
                ColumnProfile {
                    name: name.clone(),
                    missing,
                    distinct: seen.len(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::from_rows(
            vec!["id".into(), "city".into(), "tags".into()],
            vec![
                vec!["1".into(), "duckburg".into(), "a;b".into()],
                vec!["2".into(), "".into(), "a;b".into()],
                vec!["3".into(), "duckburg ".into(), "NA".into()],
                vec!["4".into(), "n/a".into(), "c".into()],
            ],
            b',',
        )
    }

    #[test]
    fn test_profile_counts_missing_and_distinct() {
        let profile = table().profile();
        assert_eq!(
            profile[1],
            ColumnProfile {
                name: "city".to_string(),
                missing: 2,
                distinct: 1,
            }
        );
        assert_eq!(profile[2].missing, 1);
        assert_eq!(profile[2].distinct, 2);
        assert!(!profile[0].has_missing());
    }

    #[test]
    fn test_describe_reports_columns_needing_missing() {
        let table = table();
        let source = SourceMetadata::describe(
            Path::new("data/people.csv"),
            "sha256:00".to_string(),
            "csv".to_string(),
            &table,
        );
        assert_eq!(source.file_name(), "people.csv");
        assert_eq!(source.row_count, 4);
        assert_eq!(source.column_count(), 3);
        let names: Vec<&str> = source.columns_with_missing().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["city", "tags"]);
    }

    #[test]
    fn test_column_lookup() {
        let table = table();
        assert_eq!(table.column_index("tags"), Some(2));
        assert_eq!(table.column_index("nope"), None);
        let ids: Vec<&str> = table.column(0).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(table.column(9).count(), 4);
    }
}
