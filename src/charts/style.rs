//! Chart styling shared by every rendered figure.

use serde::{Deserialize, Serialize};

/// Brand palette: red, near-black, dark red, off-white, grey.
pub const BRAND_PALETTE: [&str; 5] = ["#E50914", "#221F1F", "#B20710", "#F5F5F1", "#737373"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartStyle {
    /// Hex colors, `#RRGGBB`.
    pub palette: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub heatmap_width: u32,
    pub heatmap_height: u32,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub tick_font_size: u32,
    pub font_family: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            palette: BRAND_PALETTE.iter().map(|c| c.to_string()).collect(),
            width: 1200,
            height: 600,
            heatmap_width: 1000,
            heatmap_height: 600,
            title_font_size: 16,
            label_font_size: 14,
            tick_font_size: 12,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl ChartStyle {
    /// Palette entry `index` (wrapping) as RGB.
    pub fn rgb(&self, index: usize) -> Option<(u8, u8, u8)> {
        if self.palette.is_empty() {
            return None;
        }
        parse_hex(&self.palette[index % self.palette.len()])
    }

    /// Pixel size for a font given in points at 100 dpi.
    pub fn font_px(&self, size: u32) -> f64 {
        f64::from(size) * 100.0 / 72.0
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
