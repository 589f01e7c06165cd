use std::f64::consts::{PI, TAU};

use tracing::debug;

use super::surface::{
    Arc, Color, Paint, Point, Rect, Stroke, Surface, TextAlign, TextBaseline, TextStyle,
};
use super::theme::shade_of;
use super::{format_value, has_room, ChartSpec, GridLine, Padding, SeriesPoint};

pub const BAR_PADDING: Padding = Padding::new(40.0, 40.0, 60.0, 60.0);
pub const BAR_MAX_VALUE: f64 = 100.0;
/// Bars this short or shorter are drawn without a rounded cap.
pub const CAP_MIN_HEIGHT: f64 = 10.0;
const CAP_INSET: f64 = 5.0;
const GRID_STEPS: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub label: String,
    pub value: f64,
    pub rect: Rect,
    pub cap: Option<Arc>,
    pub top_color: Color,
    pub bottom_color: Color,
}

impl BarGeometry {
    pub fn center_x(&self) -> f64 {
        self.rect.x + self.rect.width / 2.0
    }

    fn paint(&self) -> Paint {
        Paint::VerticalGradient {
            y0: self.rect.y,
            y1: self.rect.bottom(),
            top: self.top_color,
            bottom: self.bottom_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartLayout {
    pub plot: Rect,
    pub slot_width: f64,
    pub bar_width: f64,
    pub grid: Vec<GridLine>,
    pub bars: Vec<BarGeometry>,
}

impl BarChartLayout {
    /// Bars on a fixed 0..=100 scale, each half as wide as its slot.
    pub fn compute(series: &[SeriesPoint], width: f64, height: f64) -> Option<Self> {
        if series.is_empty() || !has_room(width, height) {
            return None;
        }
        let plot = BAR_PADDING.plot_area(width, height)?;

        let count = series.len() as f64;
        let slot_width = plot.width / count;
        let bar_width = plot.width / (2.0 * count);

        let grid = (0..=GRID_STEPS)
            .map(|step| GridLine {
                y: plot.y + plot.height * f64::from(step) / f64::from(GRID_STEPS),
                label: format!("{}%", 100 - 25 * step),
            })
            .collect();

        let bars = series
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let value = if point.value.is_finite() {
                    point.value.clamp(0.0, BAR_MAX_VALUE)
                } else {
                    0.0
                };
                let bar_height = value / BAR_MAX_VALUE * plot.height;
                let x = plot.x + slot_width * index as f64 + (slot_width - bar_width) / 2.0;
                let y = plot.bottom() - bar_height;

                let cap = (bar_height > CAP_MIN_HEIGHT).then(|| Arc {
                    center: Point::new(x + bar_width / 2.0, y + CAP_INSET),
                    radius: bar_width / 2.0,
                    start: PI,
                    end: TAU,
                    counter_clockwise: false,
                });

                BarGeometry {
                    label: point.label.clone(),
                    value,
                    rect: Rect {
                        x,
                        y,
                        width: bar_width,
                        height: bar_height,
                    },
                    cap,
                    top_color: point.color,
                    bottom_color: shade_of(point.color),
                }
            })
            .collect();

        Some(Self {
            plot,
            slot_width,
            bar_width,
            grid,
            bars,
        })
    }
}

pub fn render_bar_chart<S: Surface>(surface: &mut S, spec: &ChartSpec) -> Option<BarChartLayout> {
    let Some(layout) = BarChartLayout::compute(&spec.series, surface.width(), surface.height())
    else {
        debug!(points = spec.series.len(), "bar chart skipped: nothing to draw");
        return None;
    };

    let profile = spec.theme.profile();
    let plot = layout.plot;
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

    let label_style = TextStyle {
        align: TextAlign::Center,
        baseline: TextBaseline::Top,
        ..axis_style
    };
    let value_style = TextStyle {
        size: 14.0,
        bold: true,
        align: TextAlign::Center,
        baseline: TextBaseline::Bottom,
        color: profile.text,
    };

    for bar in &layout.bars {
        let paint = bar.paint();
        surface.fill_path(&bar.rect.to_path(), paint);
        if let Some(cap) = bar.cap {
            surface.draw_arc(cap, Some(paint), None);
        }

        let label = fit_label(surface, &bar.label, layout.slot_width, label_style);
        surface.fill_text(
            &label,
            Point::new(bar.center_x(), plot.bottom() + 10.0),
            label_style,
        );
        surface.fill_text(
            &format_value(bar.value),
            Point::new(bar.center_x(), bar.rect.y - 5.0),
            value_style,
        );
    }

    Some(layout)
}

/// Drops trailing characters until the label fits its slot.
fn fit_label<S: Surface>(surface: &S, label: &str, max_width: f64, style: TextStyle) -> String {
    let mut chars: Vec<char> = label.chars().collect();
    while chars.len() > 1 {
        let candidate: String = chars.iter().collect();
        if surface.measure_text(&candidate, style) <= max_width {
            return candidate;
        }
        chars.pop();
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::{CommandList, DrawCommand};
    use crate::chart::theme::{Theme, BRAND_BLUE};

    fn spec(values: &[(&str, f64)]) -> ChartSpec {
        ChartSpec {
            series: values
                .iter()
                .map(|(label, value)| SeriesPoint::new(*label, *value, BRAND_BLUE))
                .collect(),
            theme: Theme::Dark,
        }
    }

    #[test]
    fn bars_are_centered_in_their_slots() {
        let spec = spec(&[("Mat", 88.0), ("Sci", 75.0), ("Eng", 92.0), ("His", 84.0), ("Com", 96.0)]);
        let layout = BarChartLayout::compute(&spec.series, 800.0, 350.0).unwrap();

        assert_eq!(layout.slot_width, 140.0);
        assert_eq!(layout.bar_width, 70.0);

        let first = &layout.bars[0];
        assert_eq!(first.rect.x, 95.0);
        assert!((first.rect.height - 220.0).abs() < 1e-9);
        assert!((first.rect.y - 70.0).abs() < 1e-9);
        assert_eq!(first.bottom_color.to_css(), "#1d4ed8");

        let cap = first.cap.unwrap();
        assert_eq!(cap.radius, 35.0);
        assert_eq!(cap.center.x, 130.0);
    }

    #[test]
    fn grid_has_five_levels() {
        let spec = spec(&[("Mat", 50.0)]);
        let layout = BarChartLayout::compute(&spec.series, 800.0, 350.0).unwrap();
        let labels: Vec<&str> = layout.grid.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["100%", "75%", "50%", "25%", "0%"]);
        assert_eq!(layout.grid[0].y, 40.0);
        assert_eq!(layout.grid[4].y, 290.0);
    }

    #[test]
    fn zero_score_draws_flat_bar_without_cap() {
        let spec = spec(&[("Mat", 0.0)]);
        let mut surface = CommandList::new(800.0, 350.0);
        let layout = render_bar_chart(&mut surface, &spec).unwrap();

        assert_eq!(layout.bars[0].rect.height, 0.0);
        assert_eq!(layout.bars[0].cap, None);
        assert!(!surface
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::Arc { .. })));
        assert!(surface
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::FillPath { .. })));
    }

    #[test]
    fn short_bars_skip_the_cap() {
        let spec = spec(&[("Mat", 3.0), ("Sci", 5.0)]);
        let layout = BarChartLayout::compute(&spec.series, 800.0, 350.0).unwrap();
        assert!(layout.bars[0].cap.is_none());
        assert!(layout.bars[1].cap.is_some());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let spec = spec(&[("Mat", 140.0), ("Sci", -3.0)]);
        let layout = BarChartLayout::compute(&spec.series, 800.0, 350.0).unwrap();
        assert_eq!(layout.bars[0].rect.height, layout.plot.height);
        assert_eq!(layout.bars[1].rect.height, 0.0);
    }

    #[test]
    fn empty_series_or_surface_is_a_no_op() {
        let mut surface = CommandList::new(800.0, 350.0);
        assert!(render_bar_chart(&mut surface, &spec(&[])).is_none());
        assert!(surface.is_empty());

        let mut zero = CommandList::new(0.0, 0.0);
        assert!(render_bar_chart(&mut zero, &spec(&[("Mat", 88.0)])).is_none());
        assert!(zero.is_empty());
    }

    #[test]
    fn draws_axis_labels_and_scores() {
        let spec = spec(&[("Mat", 88.0), ("Sci", 75.0)]);
        let mut surface = CommandList::new(800.0, 350.0);
        render_bar_chart(&mut surface, &spec).unwrap();
        let texts = surface.texts();
        assert!(texts.contains(&"Mat"));
        assert!(texts.contains(&"88"));
        assert!(texts.contains(&"100%"));
    }

    #[test]
    fn long_labels_are_trimmed_to_the_slot() {
        let spec = spec(&[("Mathematics", 88.0); 10]);
        let mut surface = CommandList::new(300.0, 350.0);
        let layout = render_bar_chart(&mut surface, &spec).unwrap();
        let style = TextStyle {
            size: 12.0,
            bold: false,
            align: TextAlign::Center,
            baseline: TextBaseline::Top,
            color: BRAND_BLUE,
        };
        let label = fit_label(&surface, "Mathematics", layout.slot_width, style);
        assert!(label.len() < "Mathematics".len());
        assert!(surface.measure_text(&label, style) <= layout.slot_width || label.len() == 1);
    }
}
