use std::f64::consts::PI;
use std::fmt::Write;

use super::surface::{
    approximate_text_width, Arc, Paint, PathSegment, Point, Stroke, Surface, TextAlign,
    TextBaseline, TextStyle,
};

const FONT_FAMILY: &str = "-apple-system, BlinkMacSystemFont, sans-serif";

/// Surface that serializes drawing commands into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            next_gradient: 0,
        }
    }

    pub fn finish(self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        if !self.defs.is_empty() {
            let _ = writeln!(output, "  <defs>\n{}  </defs>", self.defs);
        }
        output.push_str(&self.body);
        output.push_str("</svg>\n");
        output
    }

    fn paint_ref(&mut self, paint: Paint) -> String {
        match paint {
            Paint::Solid(color) => color.to_css(),
            Paint::VerticalGradient {
                y0,
                y1,
                top,
                bottom,
            } => {
                let id = format!("grad{}", self.next_gradient);
                self.next_gradient += 1;
                let _ = writeln!(
                    self.defs,
                    r#"    <linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="0" y1="{}" x2="0" y2="{}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient>"#,
                    fmt_num(y0),
                    fmt_num(y1),
                    top.to_css(),
                    bottom.to_css()
                );
                format!("url(#{id})")
            }
        }
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.defs.clear();
        self.body.clear();
        self.next_gradient = 0;
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let _ = writeln!(
            self.body,
            r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(from.x),
            fmt_num(from.y),
            fmt_num(to.x),
            fmt_num(to.y),
            stroke.color.to_css(),
            fmt_num(stroke.width)
        );
    }

    fn fill_path(&mut self, path: &[PathSegment], paint: Paint) {
        let fill = self.paint_ref(paint);
        let _ = writeln!(
            self.body,
            r#"  <path d="{}" fill="{}"/>"#,
            path_data(path),
            fill
        );
    }

    fn draw_arc(&mut self, arc: Arc, fill: Option<Paint>, stroke: Option<Stroke>) {
        let fill = match fill {
            Some(paint) => self.paint_ref(paint),
            None => "none".to_string(),
        };
        let stroke_attrs = stroke
            .map(|s| {
                format!(
                    r#" stroke="{}" stroke-width="{}""#,
                    s.color.to_css(),
                    fmt_num(s.width)
                )
            })
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"  <path d="{}" fill="{}"{}/>"#,
            path_data(&[PathSegment::Arc(arc), PathSegment::Close]),
            fill,
            stroke_attrs
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle) {
        let anchor = match style.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let baseline = match style.baseline {
            TextBaseline::Top => "hanging",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "text-after-edge",
        };
        let weight = if style.bold { "bold" } else { "normal" };
        let _ = writeln!(
            self.body,
            r#"  <text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" font-weight="{weight}" text-anchor="{anchor}" dominant-baseline="{baseline}" fill="{}">{}</text>"#,
            fmt_num(at.x),
            fmt_num(at.y),
            fmt_num(style.size),
            style.color.to_css(),
            escape(text)
        );
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f64 {
        approximate_text_width(text, style)
    }
}

/// SVG path data; arcs connect to the current point the way canvas arcs do.
fn path_data(path: &[PathSegment]) -> String {
    let mut d = String::new();
    let mut has_current = false;

    for segment in path {
        match segment {
            PathSegment::MoveTo(p) => {
                let _ = write!(d, "M{} {} ", fmt_num(p.x), fmt_num(p.y));
                has_current = true;
            }
            PathSegment::LineTo(p) => {
                let cmd = if has_current { 'L' } else { 'M' };
                let _ = write!(d, "{cmd}{} {} ", fmt_num(p.x), fmt_num(p.y));
                has_current = true;
            }
            PathSegment::Arc(arc) => {
                let start = arc.start_point();
                let cmd = if has_current { 'L' } else { 'M' };
                let _ = write!(d, "{cmd}{} {} ", fmt_num(start.x), fmt_num(start.y));
                push_arc(&mut d, arc);
                has_current = true;
            }
            PathSegment::Close => {
                d.push('Z');
                d.push(' ');
            }
        }
    }

    d.trim_end().to_string()
}

fn push_arc(d: &mut String, arc: &Arc) {
    let sweep = arc.sweep();
    let direction = if arc.counter_clockwise { -1.0 } else { 1.0 };
    let sweep_flag = u8::from(!arc.counter_clockwise);
    let r = fmt_num(arc.radius);

    // A single SVG arc cannot describe a full turn, so split it in half.
    let pieces: &[f64] = if sweep > PI { &[0.5, 1.0] } else { &[1.0] };
    for &fraction in pieces {
        let angle = arc.start + direction * sweep * fraction;
        let end = Point::on_circle(arc.center, arc.radius, angle);
        let _ = write!(
            d,
            "A{r} {r} 0 0 {sweep_flag} {} {} ",
            fmt_num(end.x),
            fmt_num(end.y)
        );
    }
}

fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
