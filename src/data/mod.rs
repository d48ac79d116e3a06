//! Data module - CSV loading, cleaning and derived columns

pub mod columns;
mod cleaner;
mod deriver;
mod loader;

pub use cleaner::{parse_list_cell, CleanError, DataCleaner, LIST_COLUMNS, NO_TAGLINE};
pub use deriver::{parse_release_year, roi, DataDeriver, DeriveError};
pub use loader::{LoaderError, MovieLoader};
