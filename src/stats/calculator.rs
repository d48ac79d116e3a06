//! Statistics Calculator Module
//! Descriptive statistics, binning, density estimates, frequency counts and
//! correlations over plain value slices.

use indexmap::IndexMap;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Descriptive statistics for one series.
#[derive(Debug, Clone)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Equal-width bins. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }
}

/// Symmetric matrix of pairwise correlations.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }
}

/// Pure numeric helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    fn finite(values: &[f64]) -> Vec<f64> {
        values.iter().copied().filter(|v| !v.is_nan()).collect()
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = Self::finite(values);
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        sorted
    }

    /// Compute descriptive statistics, skipping NaNs.
    pub fn describe(values: &[f64]) -> Summary {
        let sorted = Self::sorted(values);
        let n = sorted.len();
        if n == 0 {
            return Summary::default();
        }

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        Summary {
            count: n,
            mean,
            median: Self::percentile(&sorted, 50.0),
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
        }
    }

    /// Mean of the present values, NaN when there are none.
    pub fn mean(values: &[f64]) -> f64 {
        Self::describe(values).mean
    }

    pub fn median(values: &[f64]) -> f64 {
        Self::percentile(&Self::sorted(values), 50.0)
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Bin values into `bins` equal-width buckets spanning min..=max.
    ///
    /// The last bucket is closed on the right, so the maximum is counted.
    pub fn histogram(values: &[f64], bins: usize) -> Histogram {
        let finite = Self::finite(values);
        let bins = bins.max(1);
        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if finite.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    /// Gaussian kernel density estimate on `points` evenly spaced positions.
    ///
    /// Bandwidth follows Scott's rule. Fewer than two distinct values give an
    /// empty curve.
    pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
        let finite = Self::finite(values);
        let n = finite.len();
        if n < 2 || points < 2 {
            return Vec::new();
        }

        let std = finite.iter().std_dev();
        if std.is_nan() || std <= 0.0 {
            return Vec::new();
        }
        let bandwidth = std * (n as f64).powf(-0.2);
        let kernel = match Normal::new(0.0, bandwidth) {
            Ok(k) => k,
            Err(_) => return Vec::new(),
        };

        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = (hi - lo) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                let density = finite.iter().map(|v| kernel.pdf(x - v)).sum::<f64>() / n as f64;
                (x, density)
            })
            .collect()
    }

    /// Frequency counts, most frequent first.
    ///
    /// Equal counts keep the order in which the values first appeared.
    pub fn value_counts<I, S>(values: I) -> Vec<(String, usize)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for v in values {
            *counts.entry(v.as_ref().to_string()).or_insert(0) += 1;
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Most frequent value; ties go to the smallest value in sorted order.
    pub fn mode<I, S>(values: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for v in values {
            *counts.entry(v.as_ref().to_string()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(value, _)| value)
    }

    pub fn n_unique<I, S>(values: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Pearson correlation over the rows where both sides are present.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y.iter())
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .map(|(a, b)| (*a, *b))
            .unzip();
        if xs.len() < 2 {
            return f64::NAN;
        }

        let sx = xs.iter().std_dev();
        let sy = ys.iter().std_dev();
        if sx == 0.0 || sy == 0.0 {
            return f64::NAN;
        }
        xs.iter().covariance(ys.iter()) / (sx * sy)
    }

    /// Correlation matrix over named columns of equal length.
    pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> CorrelationMatrix {
        let labels: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
        let k = columns.len();
        let mut values = vec![vec![f64::NAN; k]; k];

        for i in 0..k {
            for j in i..k {
                let r = Self::pearson(&columns[i].1, &columns[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix { labels, values }
    }
}
