//! Chart rendering.
//!
//! Every render call is one-shot: it draws into a staging file inside the
//! output directory and only moves it to its final name after drawing
//! succeeded. All per-chart state lives in [`RenderContext`].

mod bar;
pub mod density;
pub mod fonts;
mod violin;

use std::fmt;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::config::ImageConfig;
use crate::model::Metric;
use crate::palette::Palette;

pub use bar::render_bar;
pub use violin::render_violin;

pub(crate) const TITLE_FONT_SIZE: u32 = 28;
pub(crate) const AXIS_LABEL_FONT_SIZE: u32 = 18;
pub(crate) const TICK_LABEL_FONT_SIZE: u32 = 14;
pub(crate) const LEGEND_FONT_SIZE: u32 = 14;
pub(crate) const DATA_LABEL_FONT_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Violin,
}

/// What one output image shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub metric: Metric,
    pub kind: ChartKind,
    pub limit: Option<usize>,
    /// Set for the per-benchmark breakdown of a single pass.
    pub pass: Option<String>,
    /// Non-zero when another chart already claimed the same file name.
    pub collision: usize,
}

impl ChartSpec {
    pub fn averages(metric: Metric) -> Self {
        Self {
            metric,
            kind: ChartKind::Bar,
            limit: None,
            pass: None,
            collision: 0,
        }
    }

    pub fn averages_top(metric: Metric, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::averages(metric)
        }
    }

    pub fn by_benchmark(metric: Metric, pass: &str) -> Self {
        Self {
            pass: Some(pass.to_string()),
            ..Self::averages(metric)
        }
    }

    pub fn violin(metric: Metric) -> Self {
        Self {
            kind: ChartKind::Violin,
            ..Self::averages(metric)
        }
    }

    pub fn violin_top(metric: Metric, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::violin(metric)
        }
    }

    pub fn file_name(&self) -> String {
        let prefix = match (self.kind, &self.pass) {
            (ChartKind::Bar, Some(pass)) => format!("averages_by_bmark_{}", sanitize_component(pass)),
            (ChartKind::Bar, None) => "averages".to_string(),
            (ChartKind::Violin, _) => "violin".to_string(),
        };
        let stem = match self.limit {
            Some(n) => format!("{}_{}_top_{}", prefix, self.metric, n),
            None => format!("{}_{}", prefix, self.metric),
        };
        match self.collision {
            0 => format!("{}.png", stem),
            c => format!("{}_{}.png", stem, c + 1),
        }
    }

    pub fn title(&self) -> String {
        let base = match (self.kind, &self.pass) {
            (ChartKind::Bar, Some(pass)) => {
                format!("{} by Benchmark and Executor ({})", self.metric.label(), pass)
            }
            (ChartKind::Bar, None) => format!("{} by Pass and Executor", self.metric.label()),
            (ChartKind::Violin, _) => format!("{} Distribution by Pass and Executor", self.metric.label()),
        };
        match self.limit {
            Some(n) => format!("{} (top {})", base, n),
            None => base,
        }
    }

    pub fn x_desc(&self) -> &'static str {
        if self.pass.is_some() { "Benchmark" } else { "Pass" }
    }
}

/// Replace anything outside `[A-Za-z0-9_-]` so pass names are safe file
/// name components.
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}

/// Explicit drawing state for one report.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    /// Font family for text, `None` to draw charts without text.
    pub font: Option<&'static str>,
}

impl RenderContext {
    /// Build a context and register a font for it.
    pub fn new(image: &ImageConfig, palette: Palette) -> Self {
        let font = fonts::ensure_font(image.font.as_deref());
        Self::with_font(image, palette, font)
    }

    pub fn with_font(image: &ImageConfig, palette: Palette, font: Option<&'static str>) -> Self {
        Self {
            width: image.width,
            height: image.height,
            palette,
            font,
        }
    }
}

#[derive(Debug)]
pub enum RenderError {
    /// Nothing to draw for this chart.
    Empty(String),
    Draw(String),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Empty(chart) => write!(f, "no data to draw for {}", chart),
            RenderError::Draw(message) => write!(f, "drawing failed: {}", message),
            RenderError::Io { path, source } => write!(f, "failed to write {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

/// Draw a PNG at `out_dir/file_name`.
///
/// The image is drawn into a hidden staging file in `out_dir`; the staging
/// file is removed on every error path and renamed over the target on success.
pub(crate) fn write_png<F>(ctx: &RenderContext, out_dir: &Path, file_name: &str, draw: F) -> Result<PathBuf, RenderError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
{
    let target = out_dir.join(file_name);
    let io_err = |source| RenderError::Io {
        path: target.clone(),
        source,
    };

    let staging = tempfile::Builder::new()
        .prefix(".passplot-")
        .suffix(".png")
        .tempfile_in(out_dir)
        .map_err(io_err)?
        .into_temp_path();

    {
        let root = BitMapBackend::new(&staging, (ctx.width, ctx.height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    staging.persist(&target).map_err(|err| io_err(err.error))?;
    Ok(target)
}

/// Axis upper bound with headroom for data labels.
pub(crate) fn y_upper(max: f64) -> f64 {
    if max > 0.0 { max * 1.15 } else { 1.0 }
}

/// Tick label for category axes laid out at integer positions.
pub(crate) fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() >= 0.3 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Horizontal placement of executor slot `slot` of `slots` around category
/// centre `center`: returns `(left, right)`.
pub(crate) fn slot_bounds(center: f64, slot: usize, slots: usize, group_width: f64) -> (f64, f64) {
    let width = group_width / slots.max(1) as f64;
    let offset = (slot as f64 - (slots as f64 - 1.0) / 2.0) * width;
    let mid = center + offset;
    (mid - width / 2.0, mid + width / 2.0)
}
