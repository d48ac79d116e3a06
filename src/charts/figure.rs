//! Chart descriptions handed to a renderer.
//!
//! A `Chart` carries everything needed to draw one figure, so analyses never
//! touch a drawing backend directly.

use crate::stats::{CorrelationMatrix, Histogram};

/// One scatter point: position plus the values mapped to color and size.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub hue: f64,
    pub size: f64,
}

#[derive(Debug, Clone)]
pub enum ChartKind {
    Histogram {
        histogram: Histogram,
        /// Density curve, scaled to counts when drawn.
        kde: Vec<(f64, f64)>,
        color_index: usize,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Bar {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Heatmap {
        matrix: CorrelationMatrix,
    },
    Line {
        points: Vec<(f64, f64)>,
        color_index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Rotation of category labels in degrees.
    pub x_label_rotation: u32,
    pub kind: ChartKind,
}

impl Chart {
    pub fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            x_label_rotation: 0,
            kind,
        }
    }

    pub fn with_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn with_rotation(mut self, degrees: u32) -> Self {
        self.x_label_rotation = degrees;
        self
    }

    /// File-name friendly slug of the title.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        for c in self.title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') && !slug.is_empty() {
                slug.push('_');
            }
        }
        slug.trim_end_matches('_').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        let chart = Chart::new(
            "Budget vs Revenue (Colored by Rating)",
            ChartKind::Bar {
                labels: vec![],
                values: vec![],
            },
        );
        assert_eq!(chart.slug(), "budget_vs_revenue_colored_by_rating");
    }
}
