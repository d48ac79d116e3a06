//! Data Cleaner Module
//! Parses list-like text columns and fills missing values.

use crate::data::columns::{f64_values, present, str_values};
use crate::stats::StatsCalculator;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Columns holding text renderings of lists, e.g. `"['Action', 'Drama']"`.
pub const LIST_COLUMNS: [&str; 2] = ["genres", "production_companies"];

/// Fill value for a missing tagline.
pub const NO_TAGLINE: &str = "No tagline";

/// Text a missing list cell is coerced to before parsing.
const MISSING_TEXT: &str = "nan";

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Parse one list-like cell.
///
/// A missing cell is read as the text `nan`, so it yields `["nan"]`.
pub fn parse_list_cell(cell: Option<&str>) -> Vec<String> {
    cell.unwrap_or(MISSING_TEXT)
        .trim_matches(|c| c == '[' || c == ']')
        .replace('\'', "")
        .split(',')
        .map(|item| item.trim().to_string())
        .collect()
}

/// Handles the cleaning passes over the raw movie table.
pub struct DataCleaner;

impl DataCleaner {
    /// Run every cleaning pass: list parsing, then missing-value fills.
    pub fn clean(df: &DataFrame) -> Result<DataFrame, CleanError> {
        let mut df = df.clone();
        Self::parse_list_columns(&mut df)?;
        Self::fill_missing(&mut df)?;
        Ok(df)
    }

    /// Replace each list-like text column with a `List(String)` column.
    pub fn parse_list_columns(df: &mut DataFrame) -> Result<(), CleanError> {
        for name in LIST_COLUMNS {
            let rows: Vec<Series> = str_values(df, name)?
                .iter()
                .map(|cell| {
                    let items = parse_list_cell(cell.as_deref());
                    Series::new(PlSmallStr::EMPTY, items)
                })
                .collect();
            df.with_column(Column::new(name.into(), rows))?;
            debug!(column = name, "parsed list column");
        }
        Ok(())
    }

    /// Fill tagline, budget and revenue with constants, then runtime with
    /// the median of the runtimes that are present.
    pub fn fill_missing(df: &mut DataFrame) -> Result<(), CleanError> {
        let taglines: Vec<String> = str_values(df, "tagline")?
            .into_iter()
            .map(|v| v.unwrap_or_else(|| NO_TAGLINE.to_string()))
            .collect();
        df.with_column(Column::new("tagline".into(), taglines))?;

        for name in ["budget", "revenue"] {
            let filled: Vec<f64> = f64_values(df, name)?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            df.with_column(Column::new(name.into(), filled))?;
        }

        let runtimes = f64_values(df, "runtime")?;
        let observed = present(&runtimes);
        let missing = runtimes.len() - observed.len();
        let runtime_median = StatsCalculator::median(&observed);
        if runtime_median.is_nan() {
            warn!("no runtime values present; runtime left unfilled");
        } else {
            let filled: Vec<f64> = runtimes
                .into_iter()
                .map(|v| match v {
                    Some(x) if !x.is_nan() => x,
                    _ => runtime_median,
                })
                .collect();
            df.with_column(Column::new("runtime".into(), filled))?;
        }

        info!(
            runtime_median,
            runtime_filled = missing,
            "filled missing values"
        );
        Ok(())
    }
}
