use tracing::debug;

use super::surface::{
    Arc, Paint, PathSegment, Point, Rect, Stroke, Surface, TextAlign, TextBaseline, TextStyle,
};
use super::theme::BRAND_BLUE;
use super::{has_room, ChartSpec, GridLine, Padding, SeriesPoint};

pub const LINE_PADDING: Padding = Padding::new(30.0, 30.0, 50.0, 50.0);
pub const LINE_MIN_VALUE: f64 = 60.0;
pub const LINE_MAX_VALUE: f64 = 100.0;
pub const LINE_WIDTH: f64 = 3.0;
pub const MARKER_RADIUS: f64 = 5.0;
const GRID_STEP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartLayout {
    pub plot: Rect,
    pub grid: Vec<GridLine>,
    pub points: Vec<Point>,
    pub labels: Vec<String>,
}

impl LineChartLayout {
    /// Points over a 60..=100 range; values outside it sit on the edge.
    pub fn compute(series: &[SeriesPoint], width: f64, height: f64) -> Option<Self> {
        if series.is_empty() || !has_room(width, height) {
            return None;
        }
        let plot = LINE_PADDING.plot_area(width, height)?;

        let steps = ((LINE_MAX_VALUE - LINE_MIN_VALUE) / GRID_STEP) as u32;
        let grid = (0..=steps)
            .map(|step| GridLine {
                y: plot.y + plot.height * f64::from(step) / f64::from(steps),
                label: format!("{}", LINE_MAX_VALUE - GRID_STEP * f64::from(step)),
            })
            .collect();

        let x_step = if series.len() > 1 {
            plot.width / (series.len() - 1) as f64
        } else {
            0.0
        };
        let range = LINE_MAX_VALUE - LINE_MIN_VALUE;
        let points = series
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let value = if point.value.is_finite() {
                    point.value.clamp(LINE_MIN_VALUE, LINE_MAX_VALUE)
                } else {
                    LINE_MIN_VALUE
                };
                Point::new(
                    plot.x + x_step * index as f64,
                    plot.bottom() - (value - LINE_MIN_VALUE) / range * plot.height,
                )
            })
            .collect();

        Some(Self {
            plot,
            grid,
            points,
            labels: series.iter().map(|p| p.label.clone()).collect(),
        })
    }

    /// Closed outline from the chart floor, along the line, back to the floor.
    pub fn area_path(&self) -> Vec<PathSegment> {
        let floor = self.plot.bottom();
        let mut path = Vec::with_capacity(self.points.len() + 3);
        path.push(PathSegment::MoveTo(Point::new(self.plot.x, floor)));
        path.extend(self.points.iter().copied().map(PathSegment::LineTo));
        path.push(PathSegment::LineTo(Point::new(self.plot.right(), floor)));
        path.push(PathSegment::Close);
        path
    }
}

pub fn render_line_chart<S: Surface>(surface: &mut S, spec: &ChartSpec) -> Option<LineChartLayout> {
    let Some(layout) = LineChartLayout::compute(&spec.series, surface.width(), surface.height())
    else {
        debug!(points = spec.series.len(), "line chart skipped: nothing to draw");
        return None;
    };

    let profile = spec.theme.profile();
    let plot = layout.plot;
    let line_color = spec.series.first().map_or(BRAND_BLUE, |p| p.color);
    surface.clear();

    let grid_stroke = Stroke {
        color: profile.grid,
        width: 1.0,
    };
    let axis_style = TextStyle {
        size: 12.0,
        bold: false,
        align: TextAlign::Right,
        baseline: TextBaseline::Middle,
        color: profile.text,
    };
    for line in &layout.grid {
        surface.draw_line(
            Point::new(plot.x, line.y),
            Point::new(plot.right(), line.y),
            grid_stroke,
        );
        surface.fill_text(&line.label, Point::new(plot.x - 10.0, line.y), axis_style);
    }

    surface.fill_path(&layout.area_path(), Paint::Solid(profile.area_fill));

    let line_stroke = Stroke {
        color: line_color,
        width: LINE_WIDTH,
    };
    for pair in layout.points.windows(2) {
        surface.draw_line(pair[0], pair[1], line_stroke);
    }

    let outline = Stroke {
        color: profile.marker_outline,
        width: 2.0,
    };
    for &point in &layout.points {
        surface.draw_arc(
            Arc::full_circle(point, MARKER_RADIUS),
            Some(Paint::Solid(line_color)),
            Some(outline),
        );
    }

    let label_style = TextStyle {
        align: TextAlign::Center,
        baseline: TextBaseline::Top,
        ..axis_style
    };
    for (label, point) in layout.labels.iter().zip(&layout.points) {
        surface.fill_text(label, Point::new(point.x, plot.bottom() + 15.0), label_style);
    }

    Some(layout)
}
