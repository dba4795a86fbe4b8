//! Delimited spreadsheet parsing.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{Error, Result};

/// A parsed table: one header row and the data rows under it.
///
/// Every row has exactly as many cells as there are headers. Short rows are
/// padded with empty strings and surplus cells are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Parse delimited text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the header row is missing or has
    /// an empty name, when there are no data rows, or when a cell is not
    /// valid UTF-8. Completely empty lines are ignored; a row of empty
    /// cells (`,,`) is kept.
    ///
    /// Repeated headers get a numeric suffix (`Name`, `Name_1`, `Name_2`)
    /// so every column can be mapped by name.
    pub fn parse(data: &[u8], delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(data);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(String::is_empty) {
            return Err(Error::parse("the file has no header row"));
        }
        if let Some(pos) = headers.iter().position(String::is_empty) {
            return Err(Error::parse(format!("column {} has no header", pos + 1)));
        }
        let headers = dedupe_headers(headers);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> = record
                .iter()
                .take(headers.len())
                .map(str::to_string)
                .collect();
            cells.resize(headers.len(), String::new());
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(Error::parse("the file contains no data rows"));
        }

        debug!(columns = headers.len(), rows = rows.len(), "Parsed sheet");
        Ok(Self { headers, rows })
    }

    /// Read and parse a file. A `.tsv` extension selects tab delimiting;
    /// anything else uses `default_delimiter`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`Error::ParseFailure`] as for [`Sheet::parse`].
    pub fn from_path(path: &Path, default_delimiter: u8) -> Result<Self> {
        let data = std::fs::read(path)?;
        let delimiter = if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
        {
            b'\t'
        } else {
            default_delimiter
        };
        Self::parse(&data, delimiter)
    }

    /// Column headers in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a parsed sheet; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, if present.
    #[must_use]
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut unique = header.clone();
        let mut n = 0;
        while seen.contains(&unique) {
            n += 1;
            unique = format!("{header}_{n}");
        }
        if unique != header {
            debug!(%header, renamed = %unique, "Renamed duplicate header");
        }
        seen.insert(unique.clone());
        out.push(unique);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let sheet = Sheet::parse(b"Full Name,Org,Country\nAda,Society,UK\n", b',').unwrap();
        assert_eq!(sheet.headers(), ["Full Name", "Org", "Country"]);
        assert_eq!(sheet.rows(), [vec!["Ada", "Society", "UK"]]);
        assert_eq!(sheet.column("Org"), Some(1));
        assert_eq!(sheet.column("Email"), None);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let sheet = Sheet::parse(b"Name,Org,Bio\nAda\nGrace,Navy,Hi,extra\n", b',').unwrap();
        assert_eq!(sheet.rows()[0], vec!["Ada", "", ""]);
        assert_eq!(sheet.rows()[1], vec!["Grace", "Navy", "Hi"]);
    }

    #[test]
    fn test_quoted_cells() {
        let sheet = Sheet::parse(b"Name,Bio\n\"Lovelace, Ada\",\"Said \"\"hi\"\"\"\n", b',').unwrap();
        assert_eq!(sheet.rows()[0], vec!["Lovelace, Ada", "Said \"hi\""]);
    }

    #[test]
    fn test_empty_line_ignored_but_empty_cells_kept() {
        let sheet = Sheet::parse(b"Name,Org\nAda,S\n\n,\nGrace,N\n", b',').unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.rows()[1], vec!["", ""]);
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let sheet = Sheet::parse(b"Name,Org,Name,Name_1,Name\nA,B,C,D,E\n", b',').unwrap();
        assert_eq!(sheet.headers(), ["Name", "Org", "Name_1", "Name_1_1", "Name_2"]);
        assert_eq!(sheet.column("Name_1"), Some(2));
        assert_eq!(sheet.column("Name_2"), Some(4));
    }

    #[test]
    fn test_tab_delimited() {
        let sheet = Sheet::parse(b"Name\tOrg\nAda\tSociety\n", b'\t').unwrap();
        assert_eq!(sheet.rows()[0], vec!["Ada", "Society"]);
    }

    #[test]
    fn test_no_rows_fails() {
        let err = Sheet::parse(b"Name,Org\n", b',').unwrap_err();
        assert!(matches!(err, Error::ParseFailure { .. }));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            Sheet::parse(b"", b',').unwrap_err(),
            Error::ParseFailure { .. }
        ));
    }

    #[test]
    fn test_blank_header_fails() {
        let err = Sheet::parse(b"Name,,Org\nA,B,C\n", b',').unwrap_err();
        assert!(err.to_string().contains("column 2"));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = Sheet::parse(b"Name,Org\n\xff\xfe,x\n", b',').unwrap_err();
        assert!(matches!(err, Error::ParseFailure { .. }));
    }

    #[test]
    fn test_from_path_tsv_extension() {
        let path = std::env::temp_dir().join(format!("nodedir_sheet_{}.tsv", std::process::id()));
        std::fs::write(&path, "Name\tOrg\nAda\tSociety\n").unwrap();

        let sheet = Sheet::from_path(&path, b',').unwrap();
        assert_eq!(sheet.headers(), ["Name", "Org"]);
        assert_eq!(sheet.len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Sheet::from_path(Path::new("/nonexistent/file.csv"), b',').unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
