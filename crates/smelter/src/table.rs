//! In-memory tabular data and delimited-file loading.
//!
//! Cells are stored as strings; a missing value is the empty string. Values
//! that contain only whitespace are *blank*, not missing. The distinction
//! matters to the missing-value detector, which flags blanks as probable
//! unencoded missing data.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SmelterError};

/// Delimiters considered during sniffing, in preference order.
const CANDIDATE_DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Parsed tabular data held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a table from column names and row-major data. Short rows are
    /// padded with empty cells; long rows are truncated to the column count.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { columns, rows }
    }

    /// Column names in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over all values of a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Iterate over all values of a column by name.
    pub fn column_values_by_name(&self, name: &str) -> Result<impl Iterator<Item = &str>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| SmelterError::UnknownColumn(name.to_string()))?;
        Ok(self.column_values(index))
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Get a cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(String::as_str))
    }

    /// Set a cell value. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Append a new column filled with `fill`.
    pub fn add_column(&mut self, name: String, fill: String) {
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }

    /// Remove a column by name. Returns false if the column does not exist.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
        true
    }

    /// Rename a column. Returns false if the column does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(index) => {
                self.columns[index] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Keep only the rows for which `keep` returns true. Returns the number
    /// of rows removed.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize, &[String]) -> bool) -> usize {
        let before = self.rows.len();
        let mut index = 0;
        self.rows.retain(|row| {
            let keep_row = keep(index, row);
            index += 1;
            keep_row
        });
        before - self.rows.len()
    }

    /// Whether a cell value is missing (the empty string).
    pub fn is_missing(value: &str) -> bool {
        value.is_empty()
    }

    /// Whether a cell value is blank: non-empty but only whitespace.
    pub fn is_blank(value: &str) -> bool {
        !value.is_empty() && value.trim().is_empty()
    }

    /// Approximate memory footprint of the held data, in bytes.
    pub fn memory_bytes(&self) -> usize {
        let header_bytes: usize = self.columns.iter().map(String::len).sum();
        let cell_bytes: usize = self
            .rows
            .iter()
            .map(|row| row.iter().map(String::len).sum::<usize>())
            .sum();
        header_bytes + cell_bytes
    }
}

/// Metadata about a loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Full path to the file.
    pub path: std::path::PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format tag (csv, tsv, ...).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
}

/// Options for reading a delimited file.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Delimiter byte; None sniffs from the first lines.
    pub delimiter: Option<u8>,
    /// Whether the first row is a header.
    pub has_header: bool,
    /// Maximum data rows to load (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
        }
    }
}

/// Load a CSV/TSV file into a [`DataTable`], returning it with source
/// metadata. Only delimited text is supported; other formats are the
/// responsibility of external adapters.
pub fn read_delimited(path: impl AsRef<Path>, options: &ReadOptions) -> Result<(DataTable, SourceInfo)> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| SmelterError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| SmelterError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let hash = format!("sha256:{:x}", hasher.finalize());

    let delimiter = match options.delimiter {
        Some(d) => d,
        None => sniff_delimiter(&contents)?,
    };

    let table = parse_delimited(&contents, delimiter, options)?;

    let format = match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    };

    let info = SourceInfo {
        path: path.to_path_buf(),
        hash,
        size_bytes: contents.len() as u64,
        format: format.to_string(),
        row_count: table.row_count(),
        column_count: table.column_count(),
    };

    Ok((table, info))
}

/// Parse delimited bytes into a table.
fn parse_delimited(bytes: &[u8], delimiter: u8, options: &ReadOptions) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = if options.has_header {
        reader.headers()?.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        if let Some(max) = options.max_rows {
            if rows.len() >= max {
                break;
            }
        }
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let columns = if columns.is_empty() {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        (1..=width).map(|i| format!("column_{i}")).collect()
    } else {
        columns
    };

    if columns.is_empty() {
        return Err(SmelterError::EmptyData("no columns found".to_string()));
    }
    if rows.is_empty() {
        return Err(SmelterError::EmptyData("no data rows found".to_string()));
    }

    Ok(DataTable::new(columns, rows))
}

/// Pick the delimiter whose per-line count is most consistent across the
/// first few lines.
fn sniff_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(SNIFF_LINES)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SmelterError::EmptyData("no lines to sniff".to_string()));
    }

    let mut best = (b',', 0usize);
    for &delim in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| unquoted_count(l, delim)).collect();
        let first = counts[0];
        if first == 0 {
            continue;
        }
        let consistent = counts.iter().all(|&c| c == first);
        // Consistent counts win outright; tab gets a nudge because it rarely
        // appears inside field values.
        let score = if consistent { first * 1000 } else { first } + usize::from(delim == b'\t');
        if score > best.1 {
            best = (delim, score);
        }
    }

    Ok(best.0)
}

/// Count delimiter occurrences outside double quotes.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter as char && !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_column_access() {
        let t = table(vec!["a", "b"], vec![vec!["1", "x"], vec!["2", "y"]]);
        assert_eq!(t.column_index("b"), Some(1));
        assert_eq!(t.column_values(0).collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(t.get(1, 1), Some("y"));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let t = table(vec!["a", "b", "c"], vec![vec!["1"]]);
        assert_eq!(t.get(0, 2), Some(""));
    }

    #[test]
    fn test_drop_and_rename_column() {
        let mut t = table(vec!["a", "b"], vec![vec!["1", "x"]]);
        assert!(t.rename_column("b", "label"));
        assert!(t.drop_column("a"));
        assert_eq!(t.columns(), &["label".to_string()]);
        assert_eq!(t.get(0, 0), Some("x"));
        assert!(!t.drop_column("missing"));
    }

    #[test]
    fn test_missing_and_blank() {
        assert!(DataTable::is_missing(""));
        assert!(!DataTable::is_missing(" "));
        assert!(DataTable::is_blank("   "));
        assert!(!DataTable::is_blank(""));
        assert!(!DataTable::is_blank("x"));
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a,b,c\n1,2,3\n").unwrap(), b',');
        assert_eq!(sniff_delimiter(b"a\tb\tc\n1\t2\t3\n").unwrap(), b'\t');
        assert_eq!(sniff_delimiter(b"a;b\n1;2\n").unwrap(), b';');
    }

    #[test]
    fn test_read_delimited_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"name,age\nAlice,30\nBob,25\n")
            .expect("write");

        let (table, info) = read_delimited(file.path(), &ReadOptions::default()).unwrap();
        assert_eq!(table.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(info.format, "csv");
        assert!(info.hash.starts_with("sha256:"));
    }

    #[test]
    fn test_read_empty_file_is_error() {
        let file = NamedTempFile::new().expect("temp file");
        let result = read_delimited(file.path(), &ReadOptions::default());
        assert!(matches!(result, Err(SmelterError::EmptyData(_))));
    }
}
