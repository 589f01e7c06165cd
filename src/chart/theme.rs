use super::surface::Color;

pub const BRAND_BLUE: Color = Color::rgb(37, 99, 235);
pub const BRAND_BLUE_SHADE: Color = Color::rgb(29, 78, 216);
pub const EMERALD: Color = Color::rgb(16, 185, 129);
pub const AMBER: Color = Color::rgb(245, 158, 11);
pub const VIOLET: Color = Color::rgb(139, 92, 246);
pub const ROSE: Color = Color::rgb(244, 63, 94);
pub const CYAN: Color = Color::rgb(6, 182, 212);

/// Segment colors, in the order subjects are assigned them.
pub const SUBJECT_PALETTE: [Color; 6] = [BRAND_BLUE, EMERALD, AMBER, VIOLET, ROSE, CYAN];

pub fn palette_color(index: usize) -> Color {
    SUBJECT_PALETTE[index % SUBJECT_PALETTE.len()]
}

/// Bottom stop of a bar gradient for the given top color.
pub fn shade_of(color: Color) -> Color {
    if color == BRAND_BLUE {
        BRAND_BLUE_SHADE
    } else {
        color.darken(0.8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorProfile {
    pub grid: Color,
    pub text: Color,
    pub area_fill: Color,
    pub marker_outline: Color,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn profile(self) -> ColorProfile {
        match self {
            Theme::Dark => ColorProfile {
                grid: Color::rgb(51, 65, 85),
                text: Color::rgb(203, 213, 225),
                area_fill: BRAND_BLUE.with_alpha(0.2),
                marker_outline: Color::rgb(30, 41, 59),
            },
            Theme::Light => ColorProfile {
                grid: Color::rgb(229, 231, 235),
                text: Color::rgb(107, 114, 128),
                area_fill: BRAND_BLUE.with_alpha(0.1),
                marker_outline: Color::rgb(255, 255, 255),
            },
        }
    }
}
