use crate::chart::donut::LEGEND_COLUMN_WIDTH;
use crate::chart::theme::{palette_color, BRAND_BLUE};
use crate::chart::{
    render_bar_chart, render_donut_chart, render_line_chart, ChartSpec, SeriesPoint, Surface,
    Theme,
};
use crate::metrics::{weekly_trend, DerivedMetrics};
use crate::models::{subject_display_name, subject_short_label, StudentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Subject performance bars on the main dashboard.
    Bar,
    /// Weekly trend line on the analytics page.
    Trend,
    /// Subject distribution ring on the analytics page.
    Donut,
}

impl ChartKind {
    /// Canvas size each dashboard page uses for this chart. The donut gets
    /// its 280px ring plus the legend column.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            ChartKind::Bar => (800.0, 350.0),
            ChartKind::Trend => (800.0, 300.0),
            ChartKind::Donut => (280.0 + LEGEND_COLUMN_WIDTH, 280.0),
        }
    }
}

pub fn subject_bar_spec(record: &StudentRecord, theme: Theme) -> ChartSpec {
    ChartSpec {
        series: record
            .subject_scores
            .iter()
            .map(|s| SeriesPoint::new(subject_short_label(&s.label), f64::from(s.score), BRAND_BLUE))
            .collect(),
        theme,
    }
}

pub fn weekly_trend_spec(metrics: &DerivedMetrics, theme: Theme) -> ChartSpec {
    ChartSpec {
        series: weekly_trend(metrics.average_subject_score)
            .iter()
            .enumerate()
            .map(|(week, &value)| SeriesPoint::new(format!("Week {}", week + 1), value, BRAND_BLUE))
            .collect(),
        theme,
    }
}

pub fn subject_donut_spec(record: &StudentRecord, theme: Theme) -> ChartSpec {
    ChartSpec {
        series: record
            .subject_scores
            .iter()
            .enumerate()
            .map(|(index, s)| {
                SeriesPoint::new(
                    subject_display_name(&s.label),
                    f64::from(s.score),
                    palette_color(index),
                )
            })
            .collect(),
        theme,
    }
}

/// Draws one dashboard chart; returns false when nothing was drawn.
pub fn render<S: Surface>(
    kind: ChartKind,
    record: &StudentRecord,
    metrics: &DerivedMetrics,
    theme: Theme,
    surface: &mut S,
) -> bool {
    match kind {
        ChartKind::Bar => render_bar_chart(surface, &subject_bar_spec(record, theme)).is_some(),
        ChartKind::Trend => {
            render_line_chart(surface, &weekly_trend_spec(metrics, theme)).is_some()
        }
        ChartKind::Donut => {
            render_donut_chart(surface, &subject_donut_spec(record, theme)).is_some()
        }
    }
}
