//! Movie Insights - exploratory analysis of a movie CSV dataset
//!
//! Loads the table, cleans list-like and missing columns, derives ROI,
//! profit and release year, then produces ten charts with one insight
//! sentence each.

pub mod charts;
pub mod config;
pub mod data;
pub mod insights;
pub mod pipeline;
pub mod stats;
