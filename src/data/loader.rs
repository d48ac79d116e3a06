//! CSV Data Loader Module
//! Reads the movie CSV into a Polars DataFrame.
//!
//! Records are terminated by `\n`. Quoted free-text fields (overviews,
//! taglines) may contain newlines and carriage returns without splitting the
//! logical row.

use crate::data::columns::str_values;
use csv::{ReaderBuilder, Terminator};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV at line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
}

/// Loads CSV files into DataFrames.
pub struct MovieLoader;

impl MovieLoader {
    /// Load a CSV file, rejecting structurally malformed input.
    pub fn load_csv(file_path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let path = file_path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoaderError::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "read input file");

        let records = Self::check_structure(&bytes)?;
        debug!(records, "CSV structure verified");

        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Self::blank_to_null(&mut df)?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded CSV"
        );
        Ok(df)
    }

    /// Verify every record has as many fields as the header.
    ///
    /// Returns the number of data records.
    fn check_structure(bytes: &[u8]) -> Result<usize, LoaderError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(bytes);

        let header_len = rdr.headers().map_err(Self::parse_error)?.len();
        if header_len == 0 {
            return Err(LoaderError::Parse {
                line: 1,
                message: "missing header row".to_string(),
            });
        }

        let mut records = 0usize;
        for record in rdr.records() {
            record.map_err(Self::parse_error)?;
            records += 1;
        }
        Ok(records)
    }

    /// Treat empty text cells (`""`) as missing, like unquoted empty fields.
    fn blank_to_null(df: &mut DataFrame) -> Result<(), LoaderError> {
        let text_columns: Vec<PlSmallStr> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String)
            .map(|c| c.name().clone())
            .collect();

        for name in text_columns {
            let values = str_values(df, name.as_str())?;
            let blanks = values.iter().filter(|v| v.as_deref() == Some("")).count();
            if blanks == 0 {
                continue;
            }
            let values: Vec<Option<String>> = values
                .into_iter()
                .map(|v| v.filter(|s| !s.is_empty()))
                .collect();
            df.with_column(Column::new(name.clone(), values))?;
            debug!(column = %name, blanks, "empty text cells read as missing");
        }
        Ok(())
    }

    fn parse_error(err: csv::Error) -> LoaderError {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => format!("expected {} fields, found {}", expected_len, len),
            _ => err.to_string(),
        };
        LoaderError::Parse { line, message }
    }

    /// Get list of column names from a DataFrame.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Fail on the first column in `names` that the frame lacks.
    pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<(), LoaderError> {
        let present = Self::get_columns(df);
        match names.iter().find(|name| !present.iter().any(|c| c == *name)) {
            Some(missing) => Err(LoaderError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }
}
