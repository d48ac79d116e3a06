//! Derived Columns Module
//! Adds `roi`, `profit` and `release_year` to the cleaned table.

use crate::data::columns::{f64_values, str_values};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Return on investment. A zero budget divides by one, so the result equals
/// the revenue.
pub fn roi(revenue: f64, budget: f64) -> f64 {
    let divisor = if budget == 0.0 { 1.0 } else { budget };
    (revenue - budget) / divisor
}

/// Calendar year of a release date, or `None` when it does not parse.
pub fn parse_release_year(date: Option<&str>) -> Option<i32> {
    let s = date?.trim();
    if s.is_empty() {
        return None;
    }
    // Year only, or year and month.
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok();
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d.year());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.year());
    }
    chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.year())
}

/// Computes derived columns from already-cleaned ones.
pub struct DataDeriver;

impl DataDeriver {
    pub fn derive(df: &DataFrame) -> Result<DataFrame, DeriveError> {
        let budgets = f64_values(df, "budget")?;
        let revenues = f64_values(df, "revenue")?;

        let (rois, profits): (Vec<Option<f64>>, Vec<Option<f64>>) = revenues
            .iter()
            .zip(budgets.iter())
            .map(|(revenue, budget)| match (revenue, budget) {
                (Some(r), Some(b)) => (Some(roi(*r, *b)), Some(r - b)),
                _ => (None, None),
            })
            .unzip();

        let years: Vec<Option<i32>> = str_values(df, "release_date")?
            .iter()
            .map(|d| parse_release_year(d.as_deref()))
            .collect();
        let undated = years.iter().filter(|y| y.is_none()).count();

        let mut df = df.clone();
        df.with_column(Column::new("roi".into(), rois))?;
        df.with_column(Column::new("profit".into(), profits))?;
        df.with_column(Column::new("release_year".into(), years))?;

        info!(rows = df.height(), undated, "derived roi, profit, release_year");
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::i32_values;

    #[test]
    fn test_roi_zero_budget_equals_revenue() {
        assert_eq!(roi(50.0, 0.0), 50.0);
        assert_eq!(roi(300.0, 100.0), 2.0);
        assert_eq!(roi(100.0, 200.0), -0.5);
    }

    #[test]
    fn test_parse_release_year_formats() {
        assert_eq!(parse_release_year(Some("2019-04-24")), Some(2019));
        assert_eq!(parse_release_year(Some("1999/12/31")), Some(1999));
        assert_eq!(parse_release_year(Some("2008-07-16T00:00:00")), Some(2008));
        assert_eq!(parse_release_year(Some("2021-03-01T10:00:00+02:00")), Some(2021));
        assert_eq!(parse_release_year(Some("12/25/2019")), Some(2019));
        assert_eq!(parse_release_year(Some("July 16, 2008")), Some(2008));
        assert_eq!(parse_release_year(Some("2019")), Some(2019));
        assert_eq!(parse_release_year(Some("2019-04")), Some(2019));
    }

    #[test]
    fn test_parse_release_year_invalid() {
        assert_eq!(parse_release_year(None), None);
        assert_eq!(parse_release_year(Some("")), None);
        assert_eq!(parse_release_year(Some("soon")), None);
        assert_eq!(parse_release_year(Some("2019-13-40")), None);
    }

    #[test]
    fn test_derive_adds_columns() {
        let df = df!(
            "budget" => [0.0, 100.0, 200.0],
            "revenue" => [50.0, 300.0, 100.0],
            "release_date" => [Some("2001-05-01"), Some("not a date"), None]
        )
        .unwrap();

        let out = DataDeriver::derive(&df).unwrap();
        assert_eq!(
            f64_values(&out, "roi").unwrap(),
            vec![Some(50.0), Some(2.0), Some(-0.5)]
        );
        assert_eq!(
            f64_values(&out, "profit").unwrap(),
            vec![Some(50.0), Some(200.0), Some(-100.0)]
        );
        assert_eq!(i32_values(&out, "release_year").unwrap(), vec![Some(2001), None, None]);
    }
}
