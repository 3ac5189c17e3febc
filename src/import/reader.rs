//! Decoding of uploaded lead export files into raw records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One record of a lead export: column name to cell text.
///
/// Columns are kept sorted so that anything derived by scanning the record
/// (the insight map in particular) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell text for a column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("file has no header row")]
    MissingHeader,
    #[error("failed to open export: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a delimited export from disk.
pub fn read_csv_file(path: &Path, delimiter: u8) -> Result<Vec<RawRow>, ReadError> {
    let bytes = std::fs::read(path)?;
    log::debug!("loaded {} bytes from {}", bytes.len(), path.display());
    read_csv(&bytes, delimiter)
}

/// Decode a delimited export into raw rows.
///
/// Headers are trimmed and a leading UTF-8 byte order mark is ignored. Short
/// records are tolerated (missing trailing cells are simply absent), extra
/// cells beyond the header are discarded, and fully blank lines are skipped.
pub fn read_csv(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRow>, ReadError> {
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    if headers.iter().all(|header| header.is_empty()) {
        return Err(ReadError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut blank_lines = 0usize;

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            blank_lines += 1;
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    log::debug!(
        "read {} rows with {} columns ({} blank lines skipped)",
        rows.len(),
        headers.len(),
        blank_lines
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_keyed_by_header() {
        let csv = "Property Address,Property City,Phone\n12 Oak Ln,Reno,775-555-0100\n";
        let rows = read_csv(csv.as_bytes(), b',').expect("valid csv");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Property Address"), Some("12 Oak Ln"));
        assert_eq!(rows[0].get("Property City"), Some("Reno"));
        assert_eq!(rows[0].get("Phone"), Some("775-555-0100"));
    }

    #[test]
    fn strips_bom_and_trims_headers() {
        let csv = "\u{feff} Property Address ,Property City\n1 Main St,Elko\n";
        let rows = read_csv(csv.as_bytes(), b',').expect("valid csv");

        assert_eq!(rows[0].get("Property Address"), Some("1 Main St"));
    }

    #[test]
    fn tolerates_short_records_and_blank_lines() {
        let csv = "A,B,C\n1,2\n,,\n4,5,6\n";
        let rows = read_csv(csv.as_bytes(), b',').expect("valid csv");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("C"), None);
        assert_eq!(rows[1].get("C"), Some("6"));
    }

    #[test]
    fn supports_tab_delimiter() {
        let csv = "Property Address\tProperty City\n9 Elm\tSparks\n";
        let rows = read_csv(csv.as_bytes(), b'\t').expect("valid tsv");

        assert_eq!(rows[0].get("Property City"), Some("Sparks"));
    }

    #[test]
    fn reads_export_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut file, b"Vortex ID;Property City\nV1;Reno\n")
            .expect("write export");

        let rows = read_csv_file(file.path(), b';').expect("readable file");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Vortex ID"), Some("V1"));

        let missing = read_csv_file(Path::new("/nonexistent/export.csv"), b',').unwrap_err();
        assert!(matches!(missing, ReadError::Io(_)));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_csv(b"", b',').unwrap_err();
        assert!(matches!(err, ReadError::MissingHeader));
    }
}
