//! Header-driven CSV readers for import files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::error::{CsvError, RowError};
use crate::rows::{BottleRow, DistilleryRow, RawBottleRow, RawDistilleryRow};

const DISTILLERY_COLUMNS: &[&str] = &["name", "latitude", "longitude"];
const BOTTLE_COLUMNS: &[&str] = &["distillery_name", "name"];

/// Rows accepted from a file alongside the records that were rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRows<T> {
    /// Records that decoded and validated, in file order.
    pub rows: Vec<T>,
    /// Records that were skipped, in file order.
    pub rejected: Vec<RowError>,
}

impl<T> Default for ParsedRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Parse distillery records from any reader.
///
/// # Errors
///
/// Returns [`CsvError`] when the header row is unreadable or lacks one of the
/// `name`, `latitude`, or `longitude` columns.
pub fn read_distilleries<R: Read>(source: R) -> Result<ParsedRows<DistilleryRow>, CsvError> {
    parse_rows(builder().from_reader(source), DISTILLERY_COLUMNS, |raw: RawDistilleryRow, line| {
        raw.validate(line)
    })
}

/// Parse bottle records from any reader.
///
/// # Errors
///
/// Returns [`CsvError`] when the header row is unreadable or lacks the
/// `distillery_name` or `name` column.
pub fn read_bottles<R: Read>(source: R) -> Result<ParsedRows<BottleRow>, CsvError> {
    parse_rows(builder().from_reader(source), BOTTLE_COLUMNS, |raw: RawBottleRow, line| {
        raw.validate(line)
    })
}

/// Parse a distillery file from disk.
///
/// # Errors
///
/// Returns [`CsvError::Io`] when the file cannot be opened, otherwise the
/// errors of [`read_distilleries`].
pub fn read_distilleries_from_path(path: &Path) -> Result<ParsedRows<DistilleryRow>, CsvError> {
    read_distilleries(open(path)?)
}

/// Parse a bottle file from disk.
///
/// # Errors
///
/// Returns [`CsvError::Io`] when the file cannot be opened, otherwise the
/// errors of [`read_bottles`].
pub fn read_bottles_from_path(path: &Path) -> Result<ParsedRows<BottleRow>, CsvError> {
    read_bottles(open(path)?)
}

fn open(path: &Path) -> Result<File, CsvError> {
    File::open(path).map_err(|error| CsvError::Io {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::All);
    builder
}

fn parse_rows<R, Raw, Row, F>(
    mut reader: Reader<R>,
    required_columns: &[&'static str],
    validate: F,
) -> Result<ParsedRows<Row>, CsvError>
where
    R: Read,
    Raw: DeserializeOwned,
    F: Fn(Raw, u64) -> Result<Row, RowError>,
{
    let headers = reader
        .headers()
        .map_err(|error| CsvError::Header {
            message: error.to_string(),
        })?
        .clone();
    check_columns(&headers, required_columns)?;

    let mut parsed = ParsedRows::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                let line = error.position().map_or(0, csv::Position::line);
                parsed.rejected.push(RowError::Malformed {
                    line,
                    message: error.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map_or(0, csv::Position::line);
        let outcome = record
            .deserialize::<Raw>(Some(&headers))
            .map_err(|error| RowError::Malformed {
                line,
                message: error.to_string(),
            })
            .and_then(|raw| validate(raw, line));
        match outcome {
            Ok(row) => parsed.rows.push(row),
            Err(error) => parsed.rejected.push(error),
        }
    }
    Ok(parsed)
}

fn check_columns(headers: &StringRecord, required: &[&'static str]) -> Result<(), CsvError> {
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(CsvError::MissingColumn { column });
        }
    }
    Ok(())
}
