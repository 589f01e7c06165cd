use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Scales each channel towards black.
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u8| (f64::from(c) * factor.clamp(0.0, 1.0)).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn on_circle(center: Point, radius: f64, angle: f64) -> Self {
        Self::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn to_path(&self) -> Vec<PathSegment> {
        vec![
            PathSegment::MoveTo(Point::new(self.x, self.y)),
            PathSegment::LineTo(Point::new(self.right(), self.y)),
            PathSegment::LineTo(Point::new(self.right(), self.bottom())),
            PathSegment::LineTo(Point::new(self.x, self.bottom())),
            PathSegment::Close,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Vertical gradient from `top` at `y0` to `bottom` at `y1`.
    VerticalGradient {
        y0: f64,
        y1: f64,
        top: Color,
        bottom: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Canvas-style arc: angles in radians, y axis pointing down, so increasing
/// angles run clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
    pub counter_clockwise: bool,
}

impl Arc {
    pub fn full_circle(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            start: 0.0,
            end: TAU,
            counter_clockwise: false,
        }
    }

    pub fn start_point(&self) -> Point {
        Point::on_circle(self.center, self.radius, self.start)
    }

    /// Swept angle in the drawing direction, within `[0, 2π]`.
    pub fn sweep(&self) -> f64 {
        let delta = if self.counter_clockwise {
            self.start - self.end
        } else {
            self.end - self.start
        };
        if delta >= TAU {
            TAU
        } else {
            delta.rem_euclid(TAU)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    Arc(Arc),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
}

/// Drawing capabilities the chart renderers need.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self);
    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn fill_path(&mut self, path: &[PathSegment], paint: Paint);
    fn draw_arc(&mut self, arc: Arc, fill: Option<Paint>, stroke: Option<Stroke>);
    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle);
    fn measure_text(&self, text: &str, style: TextStyle) -> f64;
}

/// Rough advance width used by the headless surfaces.
pub fn approximate_text_width(text: &str, style: TextStyle) -> f64 {
    let per_char = if style.bold { 0.62 } else { 0.55 };
    text.chars().count() as f64 * style.size * per_char
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    FillPath {
        path: Vec<PathSegment>,
        paint: Paint,
    },
    Arc {
        arc: Arc,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
}

/// In-memory surface that records every command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandList {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for CommandList {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_path(&mut self, path: &[PathSegment], paint: Paint) {
        self.commands.push(DrawCommand::FillPath {
            path: path.to_vec(),
            paint,
        });
    }

    fn draw_arc(&mut self, arc: Arc, fill: Option<Paint>, stroke: Option<Stroke>) {
        self.commands.push(DrawCommand::Arc { arc, fill, stroke });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style,
        });
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f64 {
        approximate_text_width(text, style)
    }
}
