//! Delimited-table loading.
//!
//! The raw bytes are first walked with the `csv` reader to check the header
//! and the field count of every record, so that a malformed file fails with
//! a line number. polars then parses the same bytes into a typed frame.

use csv::{ErrorKind, ReaderBuilder};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

/// Cell contents read as missing.
pub const NULL_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "-NaN", "-nan", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Reads a delimited file with a header row into a [`DataFrame`].
///
/// # Errors
///
/// - [`AnalysisError::FileNotFound`] if `path` does not exist.
/// - [`AnalysisError::Parse`] if a row has a different number of fields than
///   the header, or the header has empty or duplicate names.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_csv(path: impl AsRef<Path>, delimiter: u8) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalysisError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => AnalysisError::Io(e),
    })?;

    let frame = load_from_reader(file, delimiter)?;
    let (rows, columns) = frame.shape();
    info!(rows, columns, "Table loaded");
    Ok(frame)
}

/// Same as [`load_csv`] over any reader.
pub fn load_from_reader<R: Read>(mut reader: R, delimiter: u8) -> Result<DataFrame> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    check_records(&bytes, delimiter)?;

    let parse_options = CsvParseOptions::default()
        .with_separator(delimiter)
        .with_null_values(Some(NullValues::AllColumns(
            NULL_VALUES.iter().map(|v| (*v).into()).collect(),
        )));

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    for column in frame.get_columns() {
        debug!(column = %column.name(), dtype = %column.dtype(), nulls = column.null_count(), "Column inferred");
    }
    Ok(frame)
}

fn check_records(bytes: &[u8], delimiter: u8) -> Result<()> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    check_headers(&headers)?;

    for record in rdr.byte_records() {
        record.map_err(unequal_lengths_as_parse)?;
    }
    Ok(())
}

fn check_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, name) in headers.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(AnalysisError::Parse {
                line: 1,
                message: format!("header field {} is empty", idx + 1),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(AnalysisError::Parse {
                line: 1,
                message: format!("duplicate column name `{name}`"),
            });
        }
    }
    Ok(())
}

fn unequal_lengths_as_parse(err: csv::Error) -> AnalysisError {
    if let ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return AnalysisError::Parse {
            line: pos.as_ref().map_or(0, |p| p.line()),
            message: format!("expected {expected_len} fields, found {len}"),
        };
    }
    AnalysisError::Csv(err)
}
