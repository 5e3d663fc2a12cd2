//! Read-only view of the scraped listings CSV

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Values treated as missing, matching the usual CSV "NA" conventions
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Failures loading or querying the listings file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV file '{}' not found. Please run the scraper first.", .0.display())]
    NotFound(PathBuf),

    #[error("CSV file '{}' is empty. No data to process.", .0.display())]
    Empty(PathBuf),

    #[error("Failed to read or process CSV file: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to read or process CSV file: {0}")]
    Parse(#[from] csv::Error),

    #[error("Failed to read or process CSV file: missing column '{0}'")]
    MissingColumn(String),

    #[error("Failed to read or process CSV file: expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Whether a raw CSV value counts as missing
pub fn is_na(value: &str) -> bool {
    NA_VALUES.contains(&value)
}

/// The listings file as untyped rows keyed by its own header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV bytes; a file with no content at all is [`StoreError::Empty`].
    ///
    /// Short rows are accepted and padded with missing values; rows longer
    /// than the header are rejected.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self, StoreError> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(StoreError::Empty(path.to_path_buf()));
        }

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(body);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(StoreError::TooManyFields {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Read and parse the file at `path`
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(StoreError::Read(e)),
        };
        Self::parse(&bytes, path)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
