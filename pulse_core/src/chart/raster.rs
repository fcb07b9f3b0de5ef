use std::io::Cursor;

use ab_glyph::{FontArc, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size},
    rect::Rect,
};

use super::{
    config::Color,
    surface::{DrawingSurface, Point, TextAlign},
};
use crate::error::MarketResult;

/// In-memory RGB canvas backed by `image`, encoded to PNG when done.
///
/// Text is skipped when no font is loaded; the rest of the chart is still
/// painted.
pub struct RasterSurface {
    image: RgbImage,
    font: Option<FontArc>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, font: Option<FontArc>) -> Self {
        Self {
            image: RgbImage::new(width.max(1), height.max(1)),
            font,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_png(self) -> MarketResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb([color.0, color.1, color.2])
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let (left, right) = if width < 0.0 { (x + width, x) } else { (x, x + width) };
        let (top, bottom) = if height < 0.0 { (y + height, y) } else { (y, y + height) };

        let w = (right - left).round() as i64;
        let h = (bottom - top).round() as i64;
        if w < 1 || h < 1 || !left.is_finite() || !top.is_finite() {
            return;
        }

        let rect = Rect::at(left.round() as i32, top.round() as i32).of_size(w as u32, h as u32);
        draw_filled_rect_mut(&mut self.image, rect, rgb(color));
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return;
        }

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if length > f32::EPSILON {
            (-dy / length, dx / length)
        } else {
            (0.0, 1.0)
        };

        // One pixel-wide stroke per unit of width, spread along the normal.
        let strokes = width.round().max(1.0) as i32;
        for stroke in 0..strokes {
            let offset = stroke as f32 - (strokes - 1) as f32 / 2.0;
            draw_line_segment_mut(
                &mut self.image,
                (from.x + nx * offset, from.y + ny * offset),
                (to.x + nx * offset, to.y + ny * offset),
                rgb(color),
            );
        }
    }

    fn text(&mut self, text: &str, at: Point, size: f32, align: TextAlign, color: Color) {
        let Some(font) = self.font.as_ref() else {
            return;
        };

        let scale = PxScale::from(size);
        let (text_width, text_height) = text_size(scale, font, text);
        let x = match align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - text_width as f32 / 2.0,
            TextAlign::Right => at.x - text_width as f32,
        };
        let y = at.y - text_height as f32 / 2.0;

        draw_text_mut(
            &mut self.image,
            rgb(color),
            x.round() as i32,
            y.round() as i32,
            scale,
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_paints_pixels() {
        let mut surface = RasterSurface::new(10, 10, None);
        surface.fill_rect(2.0, 2.0, 4.0, 4.0, Color::WHITE);

        assert_eq!(surface.image().get_pixel(3, 3), &Rgb([255, 255, 255]));
        assert_eq!(surface.image().get_pixel(8, 8), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_degenerate_shapes_are_ignored() {
        let mut surface = RasterSurface::new(10, 10, None);
        surface.fill_rect(2.0, 2.0, 0.0, 4.0, Color::WHITE);
        surface.line(
            Point::new(f32::NAN, 0.0),
            Point::new(5.0, 5.0),
            1.0,
            Color::WHITE,
        );
        surface.text("skipped", Point::new(1.0, 1.0), 12.0, TextAlign::Left, Color::WHITE);

        assert!(surface.image().pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_png_encoding() {
        let mut surface = RasterSurface::new(20, 10, None);
        surface.line(Point::new(0.0, 5.0), Point::new(19.0, 5.0), 2.0, Color::WHITE);
        let png = surface.into_png().unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }
}
