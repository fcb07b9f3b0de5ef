use super::config::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Minimal 2D canvas the chart renderer paints on.
///
/// Coordinates are pixels from the top-left corner. For `text`, `at.x` is
/// the anchor selected by `align` and `at.y` is the vertical centre of the
/// line.
pub trait DrawingSurface {
    fn size(&self) -> (u32, u32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
    fn line(&mut self, from: Point, to: Point, width: f32, color: Color);
    fn text(&mut self, text: &str, at: Point, size: f32, align: TextAlign, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    },
    Text {
        text: String,
        at: Point,
        size: f32,
        align: TextAlign,
        color: Color,
    },
}

/// Surface that keeps every call instead of drawing; used to inspect chart
/// layout without decoding pixels.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn lines_with(&self, color: Color) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { color: c, .. } if *c == color))
            .count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn text(&mut self, text: &str, at: Point, size: f32, align: TextAlign, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            size,
            align,
            color,
        });
    }
}
