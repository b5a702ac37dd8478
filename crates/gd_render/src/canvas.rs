//! Small CPU raster target for overlay textures.
//!
//! Pixels are straight (non-premultiplied) RGBA8. Fills composite with
//! source-over; `clear_rect` writes transparent black. Text uses the 8x8
//! legacy bitmap font scaled by an integer factor.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

pub const GLYPH_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Linear blend toward `other`; `weight` 0 is `self`, 1 is `other`.
    pub fn blend(&self, other: &Color, weight: f32) -> Color {
        let w = weight.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * w,
            g: self.g + (other.g - self.g) * w,
            b: self.b + (other.b - self.b) * w,
            a: self.a + (other.a - self.a) * w,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    fn from_rgba8(px: [u8; 4]) -> Color {
        Color::rgba(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        )
    }

    fn over(&self, dst: &Color) -> Color {
        let out_a = self.a + dst.a * (1.0 - self.a);
        if out_a <= f32::EPSILON {
            return Color::TRANSPARENT;
        }
        let mix = |s: f32, d: f32| (s * self.a + d * dst.a * (1.0 - self.a)) / out_a;
        Color::rgba(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), out_a)
    }
}

/// A colour stop along a horizontal gradient, `offset` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn clear_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) {
            for py in y0..y1 {
                for px in x0..x1 {
                    self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) {
            for py in y0..y1 {
                for px in x0..x1 {
                    self.blend_pixel(px, py, &color);
                }
            }
        }
    }

    /// One-pixel outline drawn inside the rectangle.
    pub fn stroke_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        if width == 0 || height == 0 {
            return;
        }
        let right = x + width as i32 - 1;
        let bottom = y + height as i32 - 1;
        self.fill_rect(x, y, width, 1, color);
        if height > 1 {
            self.fill_rect(x, bottom, width, 1, color);
        }
        if height > 2 {
            self.fill_rect(x, y + 1, 1, height - 2, color);
            if width > 1 {
                self.fill_rect(right, y + 1, 1, height - 2, color);
            }
        }
    }

    /// Fill a rectangle with a gradient running left to right across it.
    /// Stops must be sorted by offset.
    pub fn fill_horizontal_gradient(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        stops: &[GradientStop],
    ) {
        if stops.is_empty() || width == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for px in x0..x1 {
            let t = ((px as i32 - x) as f32 + 0.5) / width as f32;
            let color = gradient_color(stops, t);
            for py in y0..y1 {
                self.blend_pixel(px, py, &color);
            }
        }
    }

    pub fn text_width(text: &str, scale: u32) -> u32 {
        text.chars().count() as u32 * GLYPH_SIZE * scale
    }

    pub fn text_height(scale: u32) -> u32 {
        GLYPH_SIZE * scale
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: u32, color: Color) {
        let scale = scale.max(1);
        let mut pen_x = x;
        for ch in text.chars() {
            let glyph = glyph_for_char(ch);
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    self.fill_rect(
                        pen_x + (col * scale) as i32,
                        y + (row as u32 * scale) as i32,
                        scale,
                        scale,
                        color,
                    );
                }
            }
            pen_x += (GLYPH_SIZE * scale) as i32;
        }
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: &Color) {
        let dst = Color::from_rgba8(self.image.get_pixel(x, y).0);
        self.image.put_pixel(x, y, Rgba(color.over(&dst).to_rgba8()));
    }

    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.width() as i64);
        let y1 = (y as i64 + height as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
        }
    }
}

fn gradient_color(stops: &[GradientStop], t: f32) -> Color {
    let first = stops[0];
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return a.color.blend(&b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_over_transparent_keeps_source() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(0, 0, 2, 2, Color::rgba(1.0, 0.0, 0.0, 0.75));
        assert_eq!(canvas.pixel(1, 1), Some([255, 0, 0, 191]));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn opaque_fill_replaces_destination() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(0, 0, 2, 2, Color::rgba(0.0, 0.0, 1.0, 0.5));
        canvas.fill_rect(0, 0, 2, 2, Color::WHITE);
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn fills_are_clipped_to_canvas() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(-10, -10, 12, 12, Color::WHITE);
        assert_eq!(canvas.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
        canvas.fill_rect(100, 100, 5, 5, Color::WHITE);
    }

    #[test]
    fn clear_rect_restores_transparency() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(0, 0, 4, 4, Color::WHITE);
        canvas.clear_rect(1, 1, 2, 2);
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut canvas = Canvas::new(6, 6);
        canvas.stroke_rect(0, 0, 6, 6, Color::WHITE);
        assert_eq!(canvas.pixel(0, 3), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn gradient_runs_from_first_to_last_stop() {
        let mut canvas = Canvas::new(100, 1);
        let stops = [
            GradientStop {
                offset: 0.0,
                color: Color::rgba(1.0, 0.0, 0.0, 1.0),
            },
            GradientStop {
                offset: 0.5,
                color: Color::rgba(1.0, 0.0, 0.0, 1.0),
            },
            GradientStop {
                offset: 1.0,
                color: Color::WHITE,
            },
        ];
        canvas.fill_horizontal_gradient(0, 0, 100, 1, &stops);
        assert_eq!(canvas.pixel(10, 0), Some([255, 0, 0, 255]));
        let right = canvas.pixel(99, 0).unwrap_or_default();
        assert!(right[1] > 240);
        let middle = canvas.pixel(75, 0).unwrap_or_default();
        assert!(middle[1] > 100 && middle[1] < 160);
    }

    #[test]
    fn text_metrics_scale_with_glyph_size() {
        assert_eq!(Canvas::text_width("Score: 0", 3), 8 * 8 * 3);
        assert_eq!(Canvas::text_height(12), 96);
    }

    #[test]
    fn text_draws_glyph_pixels() {
        let mut canvas = Canvas::new(8, 8);
        canvas.draw_text("H", 0, 0, 1, Color::WHITE);
        let lit = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y).map(|p| p[3]) == Some(255))
            .count();
        assert!(lit > 10);
        // 'H' has both vertical strokes lit on its middle row.
        assert_eq!(canvas.pixel(0, 3).map(|p| p[3]), Some(255));
    }

    #[test]
    fn colour_blend_interpolates() {
        let low = Color::rgba(1.0, 0.0, 0.0, 0.75);
        let high = Color::rgba(0.0, 1.0, 0.0, 0.75);
        let mid = low.blend(&high, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.g - 0.5).abs() < 1e-6);
        assert_eq!(low.blend(&high, 2.0), high);
    }
}
