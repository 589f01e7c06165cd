//! Canvas-style chart rendering.
//!
//! Each chart computes a pure layout first and then paints it onto a
//! [`Surface`]. Renderers return `None` and draw nothing when there is no
//! data or no room to draw in.

pub mod bar;
pub mod donut;
pub mod line;
pub mod surface;
pub mod svg;
pub mod theme;

pub use bar::{render_bar_chart, BarChartLayout};
pub use donut::{render_donut_chart, DonutLayout};
pub use line::{render_line_chart, LineChartLayout};
pub use surface::{Color, CommandList, DrawCommand, Surface};
pub use svg::SvgSurface;
pub use theme::Theme;

use surface::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64, color: Color) -> Self {
        Self {
            label: label.into(),
            value,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub series: Vec<SeriesPoint>,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Plot rectangle inside a `width` x `height` surface, if any room is left.
    pub fn plot_area(&self, width: f64, height: f64) -> Option<Rect> {
        let plot = Rect {
            x: self.left,
            y: self.top,
            width: width - self.left - self.right,
            height: height - self.top - self.bottom,
        };
        (plot.width > 0.0 && plot.height > 0.0).then_some(plot)
    }
}

/// Horizontal grid line with its y-axis label.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub label: String,
}

/// Whole numbers print without decimals, everything else with one.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn has_room(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}
