//! Stats module - numeric summaries used by the insights

mod calculator;

pub use calculator::{CorrelationMatrix, Histogram, StatsCalculator, Summary};
