//! Load -> clean -> derive -> insights, run once top to bottom.

use crate::charts::ChartRenderer;
use crate::data::{CleanError, DataCleaner, DataDeriver, DeriveError, LoaderError, MovieLoader};
use crate::insights::{InsightError, InsightGenerator, Insights};
use polars::prelude::DataFrame;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Columns every analysis relies on.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "genres",
    "production_companies",
    "tagline",
    "budget",
    "revenue",
    "runtime",
    "release_date",
    "vote_average",
    "popularity",
    "original_language",
    "title",
];

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Clean(#[from] CleanError),
    #[error(transparent)]
    Derive(#[from] DeriveError),
    #[error(transparent)]
    Insight(#[from] InsightError),
}

/// Load a CSV and return the cleaned table with derived columns.
pub fn prepare(path: &Path) -> Result<DataFrame, PipelineError> {
    let raw = MovieLoader::load_csv(path)?;
    MovieLoader::require_columns(&raw, &REQUIRED_COLUMNS)?;
    let cleaned = DataCleaner::clean(&raw)?;
    let derived = DataDeriver::derive(&cleaned)?;
    info!(rows = derived.height(), "table ready");
    Ok(derived)
}

/// Full run: prepare the table, then every analysis against `renderer`.
pub fn run(path: &Path, renderer: &mut dyn ChartRenderer) -> Result<Insights, PipelineError> {
    let df = prepare(path)?;
    let insights = InsightGenerator::new(renderer).run(&df)?;
    Ok(insights)
}
