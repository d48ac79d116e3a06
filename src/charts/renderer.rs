//! Static Chart Renderer
//! Draws `Chart` descriptions with plotters onto an in-memory RGB bitmap.
//!
//! Layout per figure:
//! 1. Title centered on top
//! 2. Plot area with axis descriptions and tick labels
//! 3. Category charts put their labels under the bars, rotated when asked
//!
//! The bitmap is kept in memory. When an output directory is configured the
//! image is also written there as PNG, and can be opened in the system viewer.

use crate::charts::figure::{Chart, ChartKind, ScatterPoint};
use crate::charts::style::ChartStyle;
use crate::stats::{CorrelationMatrix, Histogram};
use image::RgbImage;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

// Diverging colormap anchors (blue, neutral, red)
const COOL: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);
const MISSING: RGBColor = RGBColor(200, 200, 200);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Drawing '{title}' failed: {message}")]
    Drawing { title: String, message: String },
    #[error("Palette entry {0} is not a #RRGGBB color")]
    InvalidColor(usize),
    #[error("Chart '{0}' has no data to draw")]
    Empty(String),
    #[error("Failed to save chart image: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing<E: Display>(title: &str) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::Drawing {
        title: title.to_string(),
        message: e.to_string(),
    }
}

/// Consumes chart descriptions one at a time.
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart) -> Result<(), ChartError>;
}

/// Keeps chart descriptions without drawing them.
#[derive(Default)]
pub struct RecordingRenderer {
    pub charts: Vec<Chart>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.charts.iter().map(|c| c.title.as_str()).collect()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, chart: &Chart) -> Result<(), ChartError> {
        debug!(title = %chart.title, "recorded chart");
        self.charts.push(chart.clone());
        Ok(())
    }
}

/// A drawn figure.
pub struct RenderedChart {
    pub title: String,
    pub image: RgbImage,
    pub path: Option<PathBuf>,
}

/// Renders charts with plotters.
pub struct PlottersRenderer {
    style: ChartStyle,
    output_dir: Option<PathBuf>,
    open_charts: bool,
    rendered: Vec<RenderedChart>,
}

impl PlottersRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            style,
            output_dir: None,
            open_charts: false,
            rendered: Vec::new(),
        }
    }

    /// Also write each chart as PNG into `dir`.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Open every saved chart with the system image viewer.
    pub fn with_open_charts(mut self, open_charts: bool) -> Self {
        self.open_charts = open_charts;
        self
    }

    pub fn rendered(&self) -> &[RenderedChart] {
        &self.rendered
    }

    fn color(&self, index: usize) -> Result<RGBColor, ChartError> {
        let n = self.style.palette.len().max(1);
        self.style
            .rgb(index)
            .map(|(r, g, b)| RGBColor(r, g, b))
            .ok_or(ChartError::InvalidColor(index % n))
    }

    fn font_px(&self, size: u32) -> f64 {
        self.style.font_px(size)
    }

    fn size_for(&self, chart: &Chart) -> (u32, u32) {
        match chart.kind {
            ChartKind::Heatmap { .. } => (self.style.heatmap_width, self.style.heatmap_height),
            _ => (self.style.width, self.style.height),
        }
    }

    /// Draw a chart into a fresh RGB image.
    pub fn draw(&self, chart: &Chart) -> Result<RgbImage, ChartError> {
        let (width, height) = self.size_for(chart);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing(&chart.title))?;

            match &chart.kind {
                ChartKind::Histogram {
                    histogram,
                    kde,
                    color_index,
                } => self.draw_histogram(&root, chart, histogram, kde, *color_index)?,
                ChartKind::Scatter { points } => self.draw_scatter(&root, chart, points)?,
                ChartKind::Bar { labels, values } => self.draw_bars(&root, chart, labels, values)?,
                ChartKind::Heatmap { matrix } => self.draw_heatmap(&root, chart, matrix)?,
                ChartKind::Line {
                    points,
                    color_index,
                } => self.draw_line(&root, chart, points, *color_index)?,
            }

            root.present().map_err(drawing(&chart.title))?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or_else(|| ChartError::Drawing {
            title: chart.title.clone(),
            message: "bitmap buffer size mismatch".to_string(),
        })
    }

    fn draw_histogram<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        histogram: &Histogram,
        kde: &[(f64, f64)],
        color_index: usize,
    ) -> Result<(), ChartError> {
        let (Some(&lo), Some(&hi)) = (histogram.edges.first(), histogram.edges.last()) else {
            return Err(ChartError::Empty(chart.title.clone()));
        };
        let color = self.color(color_index)?;
        let total: usize = histogram.counts.iter().sum();
        let scale = total as f64 * histogram.bin_width();
        let kde_peak = kde.iter().map(|(_, d)| d * scale).fold(0.0, f64::max);
        let y_max = (histogram.max_count() as f64).max(kde_peak).max(1.0) * 1.1;

        let mut ctx = self
            .builder(root, chart)
            .build_cartesian_2d(lo..hi, 0f64..y_max)
            .map_err(drawing(&chart.title))?;
        self.configure_axes(&mut ctx, chart)?;

        ctx.draw_series(histogram.counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new(
                [(histogram.edges[i], 0.0), (histogram.edges[i + 1], count as f64)],
                color.mix(0.6).filled(),
            )
        }))
        .map_err(drawing(&chart.title))?;

        if !kde.is_empty() {
            ctx.draw_series(LineSeries::new(
                kde.iter().map(|&(x, d)| (x, d * scale)),
                color.stroke_width(2),
            ))
            .map_err(drawing(&chart.title))?;
        }
        Ok(())
    }

    fn draw_scatter<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        points: &[ScatterPoint],
    ) -> Result<(), ChartError> {
        if points.is_empty() {
            return Err(ChartError::Empty(chart.title.clone()));
        }
        let x_range = padded_range(points.iter().map(|p| p.x));
        let y_range = padded_range(points.iter().map(|p| p.y));
        let (hue_lo, hue_hi) = bounds(points.iter().map(|p| p.hue));
        let (size_lo, size_hi) = bounds(points.iter().map(|p| p.size));

        let low = self.color(3)?;
        let high = self.color(0)?;

        let mut ctx = self
            .builder(root, chart)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing(&chart.title))?;
        self.configure_axes(&mut ctx, chart)?;

        ctx.draw_series(points.iter().map(|p| {
            let t = normalize(p.hue, hue_lo, hue_hi);
            let radius = 3.0 + 7.0 * normalize(p.size, size_lo, size_hi);
            Circle::new(
                (p.x, p.y),
                radius.round() as u32,
                lerp(low, high, t).mix(0.7).filled(),
            )
        }))
        .map_err(drawing(&chart.title))?;
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        labels: &[String],
        values: &[f64],
    ) -> Result<(), ChartError> {
        if values.is_empty() {
            return Err(ChartError::Empty(chart.title.clone()));
        }
        let mut colors = Vec::with_capacity(self.style.palette.len());
        for i in 0..self.style.palette.len().max(1) {
            colors.push(self.color(i)?);
        }

        let (lo, hi) = bounds(values.iter().copied());
        let y_range = lo.min(0.0)..(hi.max(0.0) * 1.1).max(lo.min(0.0) + 1.0);
        let n = values.len() as u32;

        let mut ctx = self
            .builder(root, chart)
            .build_cartesian_2d((0u32..n).into_segmented(), y_range)
            .map_err(drawing(&chart.title))?;

        let label_at = |v: &SegmentValue<u32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };
        let y_format = |v: &f64| compact_number(*v);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(values.len())
            .x_label_formatter(&label_at)
            .y_label_formatter(&y_format)
            .x_label_style(self.x_tick_style(chart))
            .y_label_style((self.style.font_family.as_str(), self.font_px(self.style.tick_font_size)))
            .axis_desc_style((self.style.font_family.as_str(), self.font_px(self.style.label_font_size)))
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()
            .map_err(drawing(&chart.title))?;

        ctx.draw_series(
            plotters::series::Histogram::vertical(&ctx)
                .margin(8)
                .style_func(|x: &SegmentValue<u32>, _| {
                    let i = match x {
                        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i as usize,
                        SegmentValue::Last => 0,
                    };
                    colors[i % colors.len()].filled()
                })
                .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )
        .map_err(drawing(&chart.title))?;
        Ok(())
    }

    fn draw_heatmap<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        matrix: &CorrelationMatrix,
    ) -> Result<(), ChartError> {
        let k = matrix.labels.len() as u32;
        if k == 0 {
            return Err(ChartError::Empty(chart.title.clone()));
        }

        let mut ctx = self
            .builder(root, chart)
            .build_cartesian_2d((0u32..k).into_segmented(), (0u32..k).into_segmented())
            .map_err(drawing(&chart.title))?;

        // Row 0 is drawn at the top.
        let x_label = |v: &SegmentValue<u32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                matrix.labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };
        let y_label = |v: &SegmentValue<u32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) if *i < k => matrix
                .labels
                .get((k - 1 - *i) as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        };
        let tick = (self.style.font_family.as_str(), self.font_px(self.style.tick_font_size));
        ctx.configure_mesh()
            .disable_mesh()
            .x_labels(k as usize)
            .y_labels(k as usize)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .label_style(tick)
            .draw()
            .map_err(drawing(&chart.title))?;

        let mut cells = Vec::with_capacity((k * k) as usize);
        let mut annotations = Vec::with_capacity((k * k) as usize);
        let text_style = TextStyle::from(tick.into_font())
            .pos(Pos::new(HPos::Center, VPos::Center))
            .color(&BLACK);
        for (i, row) in matrix.values.iter().enumerate() {
            let y = k - 1 - i as u32;
            for (j, &r) in row.iter().enumerate() {
                let x = j as u32;
                cells.push(Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    diverging(r).filled(),
                ));
                let label = if r.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{:.2}", r)
                };
                annotations.push(Text::new(
                    label,
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    text_style.clone(),
                ));
            }
        }
        ctx.draw_series(cells).map_err(drawing(&chart.title))?;
        ctx.draw_series(annotations).map_err(drawing(&chart.title))?;
        Ok(())
    }

    fn draw_line<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        points: &[(f64, f64)],
        color_index: usize,
    ) -> Result<(), ChartError> {
        if points.is_empty() {
            return Err(ChartError::Empty(chart.title.clone()));
        }
        let color = self.color(color_index)?;
        let x_range = padded_range(points.iter().map(|p| p.0));
        let y_range = padded_range(points.iter().map(|p| p.1));

        let mut ctx = self
            .builder(root, chart)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing(&chart.title))?;
        self.configure_axes(&mut ctx, chart)?;

        ctx.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(drawing(&chart.title))?;
        Ok(())
    }

    fn builder<'a, 'b, DB: DrawingBackend>(
        &'b self,
        root: &'a DrawingArea<DB, Shift>,
        chart: &'b Chart,
    ) -> ChartBuilder<'a, 'b, DB> {
        let mut builder = ChartBuilder::on(root);
        let x_area = if chart.x_label_rotation > 0 { 140 } else { 60 };
        builder
            .caption(
                chart.title.as_str(),
                (self.style.font_family.as_str(), self.font_px(self.style.title_font_size)),
            )
            .margin(20)
            .x_label_area_size(x_area)
            .y_label_area_size(90);
        builder
    }

    fn x_tick_style(&self, chart: &Chart) -> TextStyle<'_> {
        let font = (self.style.font_family.as_str(), self.font_px(self.style.tick_font_size)).into_font();
        // Bitmap text only rotates in quarter turns.
        if chart.x_label_rotation > 0 {
            TextStyle::from(font.transform(FontTransform::Rotate90))
        } else {
            TextStyle::from(font)
        }
    }

    fn configure_axes<DB: DrawingBackend>(
        &self,
        ctx: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        chart: &Chart,
    ) -> Result<(), ChartError> {
        let number = |v: &f64| compact_number(*v);
        ctx.configure_mesh()
            .x_label_formatter(&number)
            .y_label_formatter(&number)
            .label_style((self.style.font_family.as_str(), self.font_px(self.style.tick_font_size)))
            .axis_desc_style((self.style.font_family.as_str(), self.font_px(self.style.label_font_size)))
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()
            .map_err(drawing(&chart.title))?;
        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&mut self, chart: &Chart) -> Result<(), ChartError> {
        let image = self.draw(chart)?;

        let path = match &self.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(format!("{:02}_{}.png", self.rendered.len() + 1, chart.slug()));
                image.save(&path)?;
                info!(path = %path.display(), "saved chart");
                if self.open_charts {
                    open::that(&path)?;
                }
                Some(path)
            }
            None => None,
        };

        debug!(title = %chart.title, "rendered chart");
        self.rendered.push(RenderedChart {
            title: chart.title.clone(),
            image,
            path,
        });
        Ok(())
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = bounds(values);
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad)..(hi + pad)
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo && v.is_finite() {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Color for a correlation in [-1, 1].
fn diverging(r: f64) -> RGBColor {
    if r.is_nan() {
        MISSING
    } else if r < 0.0 {
        lerp(NEUTRAL, COOL, (-r).min(1.0))
    } else {
        lerp(NEUTRAL, WARM, r.min(1.0))
    }
}

/// Short axis labels for large magnitudes (1.2K, 3.4M, 2.9B).
fn compact_number(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", v / 1e3)
    } else if abs >= 100.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_number() {
        assert_eq!(compact_number(2_923_706_026.0), "2.9B");
        assert_eq!(compact_number(1_500_000.0), "1.5M");
        assert_eq!(compact_number(25_000.0), "25.0K");
        assert_eq!(compact_number(2019.0), "2019");
        assert_eq!(compact_number(0.25), "0.25");
    }

    #[test]
    fn test_diverging_endpoints() {
        assert_eq!(diverging(1.0), WARM);
        assert_eq!(diverging(-1.0), COOL);
        assert_eq!(diverging(0.0), NEUTRAL);
        assert_eq!(diverging(f64::NAN), MISSING);
    }

    #[test]
    fn test_padded_range_handles_constant() {
        let r = padded_range([5.0, 5.0].into_iter());
        assert_eq!(r, 4.5..5.5);
    }

    #[test]
    fn test_recording_renderer_keeps_order() {
        let mut renderer = RecordingRenderer::new();
        for title in ["A", "B"] {
            let chart = Chart::new(
                title,
                ChartKind::Line {
                    points: vec![(0.0, 1.0)],
                    color_index: 0,
                },
            );
            renderer.render(&chart).unwrap();
        }
        assert_eq!(renderer.titles(), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_bar_chart_is_rejected() {
        let renderer = PlottersRenderer::new(ChartStyle::default());
        let chart = Chart::new(
            "Nothing",
            ChartKind::Bar {
                labels: vec![],
                values: vec![],
            },
        );
        assert!(matches!(renderer.draw(&chart), Err(ChartError::Empty(t)) if t == "Nothing"));
    }

    fn draw_size(chart: &Chart) -> (u32, u32) {
        let renderer = PlottersRenderer::new(ChartStyle::default());
        renderer.draw(chart).unwrap().dimensions()
    }

    #[test]
    fn test_draw_histogram_with_kde() {
        let histogram = Histogram {
            edges: vec![0.0, 1.0, 2.0, 3.0],
            counts: vec![2, 5, 1],
        };
        let kde = vec![(0.0, 0.1), (1.5, 0.6), (3.0, 0.05)];
        let chart = Chart::new(
            "Ratings",
            ChartKind::Histogram {
                histogram,
                kde,
                color_index: 0,
            },
        )
        .with_labels("Rating", "Count");
        assert_eq!(draw_size(&chart), (1200, 600));
    }

    #[test]
    fn test_draw_scatter_with_missing_hue() {
        let points = vec![
            ScatterPoint {
                x: 1.0e6,
                y: 5.0e6,
                hue: 7.5,
                size: 120.0,
            },
            ScatterPoint {
                x: 2.0e6,
                y: 1.0e6,
                hue: f64::NAN,
                size: 40.0,
            },
        ];
        let chart = Chart::new("Budget vs Revenue", ChartKind::Scatter { points })
            .with_labels("Budget", "Revenue");
        assert_eq!(draw_size(&chart), (1200, 600));
    }

    #[test]
    fn test_draw_bars_with_negative_value() {
        let chart = Chart::new(
            "ROI by Genre",
            ChartKind::Bar {
                labels: vec!["Action".to_string(), "Drama".to_string()],
                values: vec![3.5, -0.5],
            },
        )
        .with_rotation(45);
        assert_eq!(draw_size(&chart), (1200, 600));
    }

    #[test]
    fn test_draw_heatmap_with_missing_cell() {
        let matrix = CorrelationMatrix {
            labels: vec!["budget".to_string(), "revenue".to_string()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]],
        };
        let chart = Chart::new("Correlations", ChartKind::Heatmap { matrix });
        assert_eq!(draw_size(&chart), (1000, 600));
    }

    #[test]
    fn test_draw_line() {
        let chart = Chart::new(
            "Revenue Over Years",
            ChartKind::Line {
                points: vec![(2001.0, 300.0), (2019.0, 50.0)],
                color_index: 1,
            },
        )
        .with_labels("Year", "Revenue");
        assert_eq!(draw_size(&chart), (1200, 600));
    }

    #[test]
    fn test_invalid_palette_is_reported() {
        let style = ChartStyle {
            palette: vec!["not-a-color".to_string()],
            ..ChartStyle::default()
        };
        let renderer = PlottersRenderer::new(style);
        assert!(matches!(renderer.color(0), Err(ChartError::InvalidColor(0))));
    }
}
