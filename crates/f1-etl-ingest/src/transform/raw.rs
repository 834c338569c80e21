//! Raw CSV datasets: a header plus rows of string fields

use crate::dataset::Dataset;
use crate::error::SchemaError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A dataset exactly as read from disk, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    pub dataset: Dataset,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawDataset {
    pub fn new(dataset: Dataset, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            dataset,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|f| f.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read a CSV file into a [`RawDataset`]
pub fn read_dataset(dataset: Dataset, path: &Path) -> Result<RawDataset, SchemaError> {
    let file = std::fs::File::open(path).map_err(|e| read_error(dataset, path, e))?;
    let raw = read_from(dataset, file).map_err(|e| read_error(dataset, path, e))?;
    debug!(dataset = %dataset, rows = raw.len(), path = %path.display(), "Dataset read");
    Ok(raw)
}

/// Parse CSV from any reader; fields that are not valid UTF-8 are decoded as Latin-1
pub fn read_from<R: Read>(dataset: Dataset, reader: R) -> Result<RawDataset, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers: Vec<String> = csv_reader.byte_headers()?.iter().map(decode_field).collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        rows.push(record.iter().map(decode_field).collect());
    }

    Ok(RawDataset {
        dataset,
        headers,
        rows,
    })
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 code points map one to one onto the first 256 chars
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn read_error(dataset: Dataset, path: &Path, err: impl std::fmt::Display) -> SchemaError {
    SchemaError::Read {
        dataset,
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_from_utf8() {
        let csv = "driverId,forename,surname\n1,Lewis,Hamilton\n2,Kimi,Räikkönen\n";
        let raw = read_from(Dataset::Drivers, csv.as_bytes()).unwrap();
        assert_eq!(raw.headers, ["driverId", "forename", "surname"]);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[1][2], "Räikkönen");
    }

    #[test]
    fn test_latin1_fields_are_decoded() {
        let mut csv = b"driverId,forename,surname\n3,Sergio,P".to_vec();
        csv.push(0xE9); // 'é' in Latin-1
        csv.extend_from_slice(b"rez\n");

        let raw = read_from(Dataset::Drivers, csv.as_slice()).unwrap();
        assert_eq!(raw.rows[0][2], "Pérez");
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let csv = "\u{feff}constructorId,name\n1,McLaren\n";
        let raw = read_from(Dataset::Constructors, csv.as_bytes()).unwrap();
        assert_eq!(raw.column_position("constructorId"), Some(0));
    }

    #[test]
    fn test_sentinel_survives_reading() {
        let csv = "resultId,points\n1,\\N\n";
        let raw = read_from(Dataset::Results, csv.as_bytes()).unwrap();
        assert_eq!(raw.rows[0][1], "\\N");
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let csv = "constructorId,name\n1,McLaren,extra\n";
        assert!(read_from(Dataset::Constructors, csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_dataset_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_dataset(Dataset::Races, &dir.path().join("races.csv")).unwrap_err();
        assert!(matches!(err, SchemaError::Read { dataset: Dataset::Races, .. }));
    }
}
