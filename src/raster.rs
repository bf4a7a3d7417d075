use crate::config::Rgb;
use crate::geometry::Point;
use crate::symmetry::Surface;
use image::{Rgb as Pixel, RgbImage};

/// File-backed drawing surface
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let (r, g, b) = background;
        Self {
            image: RgbImage::from_pixel(width, height, Pixel([r, g, b])),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Fill a `width`×`width` square centred on (x, y), clipped to the image
    fn stamp(&mut self, x: i32, y: i32, width: u32, color: Pixel<u8>) {
        let w = width as i32;
        let lo = -(w / 2);
        let (iw, ih) = (self.image.width() as i32, self.image.height() as i32);
        for dy in lo..lo + w {
            for dx in lo..lo + w {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && px < iw && py >= 0 && py < ih {
                    self.image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn paint_segment(&mut self, start: Point, end: Point, color: Rgb, thickness: f64) {
        let width = stroke_width(thickness);
        let pixel = Pixel([color.0, color.1, color.2]);
        let (w, h) = (self.image.width(), self.image.height());
        let Some((x0, y0)) = to_pixel(start, w, h) else { return };
        let Some((x1, y1)) = to_pixel(end, w, h) else { return };
        bresenham(x0, y0, x1, y1, |x, y| self.stamp(x, y, width, pixel));
    }
}

/// Stroke width in pixels for a node thickness: whole units doubled, at least 1
pub fn stroke_width(thickness: f64) -> u32 {
    ((thickness.trunc() as i64) * 2).clamp(1, u32::MAX as i64) as u32
}

/// Round to the pixel grid. Off-canvas geometry is clamped to a margin
/// around the image; non-finite points are dropped.
pub(crate) fn to_pixel(p: Point, width: u32, height: u32) -> Option<(i32, i32)> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    let mx = width as f64;
    let my = height as f64;
    let x = p.x.round().clamp(-mx, 2.0 * mx) as i32;
    let y = p.y.round().clamp(-my, 2.0 * my) as i32;
    Some((x, y))
}

/// Visit every grid point on the line from (x0, y0) to (x1, y1).
pub(crate) fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}
