//! PNG chart rendering for the weekday, hourly and heatmap analyses.
//!
//! Charts are drawn with the [`plotters`] bitmap backend so they render in
//! headless environments; nothing is ever shown interactively.

mod bar;
mod heatmap;
mod line;

pub use bar::weekday_ticket_bar_chart;
pub use heatmap::location_hour_heatmap_chart;
pub use line::{trend_line_chart, weekday_hourly_line_chart};

use plotters::style::RGBColor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory charts are written to unless the caller picks another.
pub const DEFAULT_OUTPUT_DIR: &str = "analysis_output";

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to prepare output directory: {0}")]
    OutputDir(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, PlotError>;

/// Creates `dir` if needed and returns the path of `file_name` inside it.
pub fn chart_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.join(file_name))
}

/// Formats a tick value as an index into `labels`, blank between ticks.
pub(crate) fn index_label(value: f64, labels: &[String]) -> String {
    let nearest = value.round();
    if (value - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

const YL_OR_RD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

/// Yellow-orange-red colour for `t` in `[0, 1]`.
pub(crate) fn yl_or_rd(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YL_OR_RD.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(YL_OR_RD.len() - 1);
    let frac = scaled - lo as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (YL_OR_RD[lo], YL_OR_RD[hi]);
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
