use std::f64::consts::{FRAC_PI_2, TAU};

use tracing::debug;

use super::surface::{
    Arc, Color, Paint, PathSegment, Point, Rect, Surface, TextAlign, TextBaseline, TextStyle,
};
use super::{has_room, ChartSpec, SeriesPoint};

/// Outer and inner radius at the reference 280px surface.
const REFERENCE_SIZE: f64 = 280.0;
const REFERENCE_OUTER_RADIUS: f64 = 100.0;
const REFERENCE_INNER_RADIUS: f64 = 70.0;
pub const START_ANGLE: f64 = -FRAC_PI_2;

/// Space reserved right of the ring for the legend column.
pub const LEGEND_COLUMN_WIDTH: f64 = 140.0;
const LEGEND_ROW_HEIGHT: f64 = 22.0;
const LEGEND_SWATCH_SIZE: f64 = 12.0;
const LEGEND_INSET: f64 = 10.0;
const LEGEND_LABEL_GAP: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSegment {
    pub label: String,
    pub value: f64,
    pub color: Color,
    pub start_angle: f64,
    pub sweep: f64,
}

impl DonutSegment {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Annular wedge: outer arc forward, inner arc back.
    pub fn path(&self, center: Point, outer_radius: f64, inner_radius: f64) -> Vec<PathSegment> {
        vec![
            PathSegment::Arc(Arc {
                center,
                radius: outer_radius,
                start: self.start_angle,
                end: self.end_angle(),
                counter_clockwise: false,
            }),
            PathSegment::Arc(Arc {
                center,
                radius: inner_radius,
                start: self.end_angle(),
                end: self.start_angle,
                counter_clockwise: true,
            }),
            PathSegment::Close,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    /// Where the color swatch is drawn; `None` when the surface has no legend column.
    pub swatch: Option<Rect>,
}

impl LegendEntry {
    pub fn label_anchor(&self) -> Option<Point> {
        self.swatch.map(|swatch| {
            Point::new(
                swatch.right() + LEGEND_LABEL_GAP,
                swatch.y + swatch.height / 2.0,
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutLayout {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub segments: Vec<DonutSegment>,
    pub legend: Vec<LegendEntry>,
    /// Mean of the plotted values, shown in the ring's center.
    pub average: f64,
}

impl DonutLayout {
    pub fn compute(series: &[SeriesPoint], width: f64, height: f64) -> Option<Self> {
        if series.is_empty() || !has_room(width, height) {
            return None;
        }

        let values: Vec<f64> = series
            .iter()
            .map(|p| if p.value.is_finite() { p.value.max(0.0) } else { 0.0 })
            .collect();
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let legend_fits = width - height >= LEGEND_COLUMN_WIDTH
            && series.len() as f64 * LEGEND_ROW_HEIGHT <= height;
        let ring_width = if legend_fits {
            width - LEGEND_COLUMN_WIDTH
        } else {
            width
        };

        let scale = ring_width.min(height) / REFERENCE_SIZE;
        let mut angle = START_ANGLE;
        let segments = series
            .iter()
            .zip(&values)
            .map(|(point, &value)| {
                let sweep = value / total * TAU;
                let segment = DonutSegment {
                    label: point.label.clone(),
                    value,
                    color: point.color,
                    start_angle: angle,
                    sweep,
                };
                angle += sweep;
                segment
            })
            .collect();

        let legend_top = (height - series.len() as f64 * LEGEND_ROW_HEIGHT) / 2.0;
        let legend = series
            .iter()
            .enumerate()
            .map(|(row, p)| LegendEntry {
                label: p.label.clone(),
                color: p.color,
                swatch: legend_fits.then(|| Rect {
                    x: ring_width + LEGEND_INSET,
                    y: legend_top
                        + row as f64 * LEGEND_ROW_HEIGHT
                        + (LEGEND_ROW_HEIGHT - LEGEND_SWATCH_SIZE) / 2.0,
                    width: LEGEND_SWATCH_SIZE,
                    height: LEGEND_SWATCH_SIZE,
                }),
            })
            .collect();

        Some(Self {
            center: Point::new(ring_width / 2.0, height / 2.0),
            outer_radius: REFERENCE_OUTER_RADIUS * scale,
            inner_radius: REFERENCE_INNER_RADIUS * scale,
            segments,
            legend,
            average: total / values.len() as f64,
        })
    }
}

pub fn render_donut_chart<S: Surface>(surface: &mut S, spec: &ChartSpec) -> Option<DonutLayout> {
    let Some(layout) = DonutLayout::compute(&spec.series, surface.width(), surface.height()) else {
        debug!(points = spec.series.len(), "donut chart skipped: nothing to draw");
        return None;
    };

    let profile = spec.theme.profile();
    let scale = layout.outer_radius / REFERENCE_OUTER_RADIUS;

    surface.clear();
    for segment in &layout.segments {
        let path = segment.path(layout.center, layout.outer_radius, layout.inner_radius);
        surface.fill_path(&path, Paint::Solid(segment.color));
    }

    let average_style = TextStyle {
        size: 28.0 * scale,
        bold: true,
        align: TextAlign::Center,
        baseline: TextBaseline::Middle,
        color: profile.text,
    };
    surface.fill_text(
        &format!("{:.1}", layout.average),
        Point::new(layout.center.x, layout.center.y - 8.0 * scale),
        average_style,
    );
    surface.fill_text(
        "Average",
        Point::new(layout.center.x, layout.center.y + 16.0 * scale),
        TextStyle {
            size: 12.0 * scale,
            bold: false,
            ..average_style
        },
    );

    let legend_style = TextStyle {
        size: 12.0,
        bold: false,
        align: TextAlign::Left,
        baseline: TextBaseline::Middle,
        color: profile.text,
    };
    for entry in &layout.legend {
        let (Some(swatch), Some(anchor)) = (entry.swatch, entry.label_anchor()) else {
            continue;
        };
        surface.fill_path(&swatch.to_path(), Paint::Solid(entry.color));
        surface.fill_text(&entry.label, anchor, legend_style);
    }

    Some(layout)
}
