//! Aggregates behind each insight.
//!
//! These read the cleaned table and return plain values; rendering and
//! sentence formatting happen in the generator.

use crate::data::columns::{f64_values, i32_values, present, str_values};
use crate::stats::{CorrelationMatrix, StatsCalculator, Summary};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 6] = [
    "budget",
    "revenue",
    "vote_average",
    "popularity",
    "runtime",
    "roi",
];

#[derive(Debug, Clone)]
pub struct LanguageSummary {
    pub top: Vec<(String, usize)>,
    pub distinct: usize,
    pub mode: Option<String>,
}

pub fn rating_summary(df: &DataFrame) -> PolarsResult<Summary> {
    Ok(StatsCalculator::describe(&present(&f64_values(df, "vote_average")?)))
}

pub fn runtime_summary(df: &DataFrame) -> PolarsResult<Summary> {
    Ok(StatsCalculator::describe(&present(&f64_values(df, "runtime")?)))
}

/// Present values of a numeric column.
pub fn numeric_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    Ok(present(&f64_values(df, name)?))
}

/// One row per (movie, genre) pair.
fn explode_genres(df: &DataFrame, with: &[&str]) -> PolarsResult<DataFrame> {
    let mut columns = vec!["genres"];
    columns.extend_from_slice(with);
    df.select(columns)?.explode(["genres"])
}

/// Most frequent genres after exploding the list column.
pub fn top_genres(df: &DataFrame, n: usize) -> PolarsResult<Vec<(String, usize)>> {
    let exploded = explode_genres(df, &[])?;
    let genres = str_values(&exploded, "genres")?;
    let mut counts = StatsCalculator::value_counts(genres.into_iter().flatten());
    counts.truncate(n);
    Ok(counts)
}

/// Highest-grossing titles, revenue descending. Equal revenues keep table order.
pub fn top_movies_by_revenue(df: &DataFrame, n: usize) -> PolarsResult<Vec<(String, f64)>> {
    let titles = str_values(df, "title")?;
    let revenues = f64_values(df, "revenue")?;
    let mut movies: Vec<(String, f64)> = titles
        .into_iter()
        .zip(revenues)
        .filter_map(|(title, revenue)| Some((title.unwrap_or_default(), revenue?)))
        .filter(|(_, revenue)| !revenue.is_nan())
        .collect();
    movies.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    movies.truncate(n);
    Ok(movies)
}

pub fn language_summary(df: &DataFrame, n: usize) -> PolarsResult<LanguageSummary> {
    let languages: Vec<String> = str_values(df, "original_language")?
        .into_iter()
        .flatten()
        .collect();
    let mut top = StatsCalculator::value_counts(&languages);
    top.truncate(n);
    Ok(LanguageSummary {
        top,
        distinct: StatsCalculator::n_unique(&languages),
        mode: StatsCalculator::mode(&languages),
    })
}

pub fn feature_correlations(df: &DataFrame) -> PolarsResult<CorrelationMatrix> {
    let mut columns = Vec::with_capacity(CORRELATION_COLUMNS.len());
    for name in CORRELATION_COLUMNS {
        let values = f64_values(df, name)?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        columns.push((name.to_string(), values));
    }
    Ok(StatsCalculator::correlation_matrix(&columns))
}

/// Mean ROI per genre, highest first.
pub fn roi_by_genre(df: &DataFrame, n: usize) -> PolarsResult<Vec<(String, f64)>> {
    let exploded = explode_genres(df, &["roi"])?;
    let genres = str_values(&exploded, "genres")?;
    let rois = f64_values(&exploded, "roi")?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (genre, roi) in genres.into_iter().zip(rois) {
        if let (Some(genre), Some(roi)) = (genre, roi) {
            groups.entry(genre).or_default().push(roi);
        }
    }

    let mut means: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(genre, values)| (genre, StatsCalculator::mean(&values)))
        .filter(|(_, mean)| !mean.is_nan())
        .collect();
    means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    means.truncate(n);
    Ok(means)
}

/// Total revenue per release year, oldest first. Undated movies are skipped.
pub fn revenue_by_year(df: &DataFrame) -> PolarsResult<Vec<(i32, f64)>> {
    let years = i32_values(df, "release_year")?;
    let revenues = f64_values(df, "revenue")?;

    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (year, revenue) in years.into_iter().zip(revenues) {
        if let Some(year) = year {
            *totals.entry(year).or_insert(0.0) += revenue.unwrap_or(0.0);
        }
    }
    Ok(totals.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataCleaner, DataDeriver};

    fn table() -> DataFrame {
        let raw = df!(
            "title" => ["A", "B", "C", "D"],
            "genres" => [
                Some("['Drama', 'Action']"),
                Some("['Action']"),
                Some("['Drama', 'Comedy']"),
                None
            ],
            "production_companies" => [Some("['X']"), Some("['Y']"), None, None],
            "tagline" => [Some("t"), None, None, None],
            "budget" => [Some(100.0), Some(0.0), Some(50.0), None],
            "revenue" => [Some(300.0), Some(20.0), Some(25.0), Some(5.0)],
            "runtime" => [Some(100.0), Some(120.0), None, Some(90.0)],
            "release_date" => [Some("2001-01-01"), Some("2001-06-01"), Some("1999-02-02"), Some("??")],
            "vote_average" => [Some(7.0), Some(6.0), None, Some(8.0)],
            "popularity" => [10.0, 20.0, 30.0, 40.0],
            "original_language" => [Some("fr"), Some("en"), Some("en"), Some("fr")]
        )
        .unwrap();
        DataDeriver::derive(&DataCleaner::clean(&raw).unwrap()).unwrap()
    }

    #[test]
    fn test_rating_mean_skips_missing() {
        assert_eq!(rating_summary(&table()).unwrap().mean, 7.0);
    }

    #[test]
    fn test_runtime_median_after_fill() {
        // Missing runtime filled with median(100, 120, 90) = 100.
        assert_eq!(runtime_summary(&table()).unwrap().median, 100.0);
    }

    #[test]
    fn test_top_genres_counts_and_ties() {
        let genres = top_genres(&table(), 10).unwrap();
        assert_eq!(
            genres,
            vec![
                ("Drama".to_string(), 2),
                ("Action".to_string(), 2),
                ("Comedy".to_string(), 1),
                ("nan".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_movies_by_revenue() {
        let top = top_movies_by_revenue(&table(), 2).unwrap();
        assert_eq!(top, vec![("A".to_string(), 300.0), ("C".to_string(), 25.0)]);
    }

    #[test]
    fn test_language_summary_mode_tie() {
        let summary = language_summary(&table(), 10).unwrap();
        assert_eq!(summary.distinct, 2);
        assert_eq!(summary.mode.as_deref(), Some("en"));
        assert_eq!(summary.top[0], ("fr".to_string(), 2));
    }

    #[test]
    fn test_roi_by_genre_means() {
        // roi: A = 2.0, B = 20.0, C = -0.5, D = 5.0
        let means = roi_by_genre(&table(), 10).unwrap();
        assert_eq!(means[0], ("Action".to_string(), 11.0));
        assert_eq!(means[1], ("nan".to_string(), 5.0));
        assert_eq!(means[2], ("Drama".to_string(), 0.75));
        assert_eq!(means[3], ("Comedy".to_string(), -0.5));
    }

    #[test]
    fn test_revenue_by_year_drops_undated() {
        assert_eq!(
            revenue_by_year(&table()).unwrap(),
            vec![(1999, 25.0), (2001, 320.0)]
        );
    }

    #[test]
    fn test_feature_correlations_shape() {
        let m = feature_correlations(&table()).unwrap();
        assert_eq!(m.labels.len(), 6);
        assert!((m.get("budget", "budget").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.get("roi", "runtime"), m.get("runtime", "roi"));
    }

    #[test]
    fn test_missing_column_fails_loudly() {
        let df = table().drop("original_language").unwrap();
        assert!(language_summary(&df, 10).is_err());
    }
}
