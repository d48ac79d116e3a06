//! Typed column extraction.
//!
//! Every helper looks the column up by name, so an analysis that needs a
//! column the CSV lacks fails with `ColumnNotFound` instead of skipping.

use polars::prelude::*;

/// Float values of a column; nulls stay `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Integer values of a column; nulls stay `None`.
pub fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let column = df.column(name)?.cast(&DataType::Int32)?;
    Ok(column.i32()?.into_iter().collect())
}

/// Text values of a column; nulls stay `None`.
pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let ca = column.as_materialized_series().str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Values of a `List(String)` column. A null row becomes an empty list.
pub fn list_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Vec<String>>> {
    let ca = df.column(name)?.as_materialized_series().list()?;
    let mut rows = Vec::with_capacity(ca.len());
    for item in ca.into_iter() {
        let row = match item {
            Some(series) => series
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
            None => Vec::new(),
        };
        rows.push(row);
    }
    Ok(rows)
}

/// Drop nulls and NaNs.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_errors() {
        let df = DataFrame::new(vec![Column::new("a".into(), [1.0f64, 2.0])]).unwrap();
        assert!(f64_values(&df, "b").is_err());
        assert!(str_values(&df, "b").is_err());
    }

    #[test]
    fn test_integer_column_reads_as_float() {
        let df = DataFrame::new(vec![Column::new("budget".into(), [Some(10i64), None])]).unwrap();
        assert_eq!(f64_values(&df, "budget").unwrap(), vec![Some(10.0), None]);
    }

    #[test]
    fn test_present_skips_null_and_nan() {
        assert_eq!(present(&[Some(1.0), None, Some(f64::NAN), Some(3.0)]), vec![1.0, 3.0]);
    }
}
