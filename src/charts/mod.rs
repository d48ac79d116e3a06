//! Charts module - Chart descriptions and rendering

mod figure;
mod renderer;
mod style;

pub use figure::{Chart, ChartKind, ScatterPoint};
pub use renderer::{ChartError, ChartRenderer, PlottersRenderer, RecordingRenderer, RenderedChart};
pub use style::{parse_hex, ChartStyle, BRAND_PALETTE};
