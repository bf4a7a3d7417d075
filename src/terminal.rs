use crate::config::Rgb;
use crate::geometry::Point;
use crate::raster::{bresenham, to_pixel};
use crate::symmetry::Surface;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{self, Write};

pub const BRAILLE_BASE: u32 = 0x2800;
/// Dots per character horizontally
pub const BRAILLE_WIDTH: usize = 2;
/// Dots per character vertically
pub const BRAILLE_HEIGHT: usize = 4;

/// A single character cell of the preview
#[derive(Clone, Copy, Default)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Rgb>,
}

/// Text-mode drawing surface: segments are plotted into a braille dot grid,
/// each character cell keeping the color of the last segment through it.
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    dots: Vec<Vec<bool>>,
    colors: Vec<Vec<Option<Rgb>>>,
    /// Source units per dot
    scale: f64,
}

impl BrailleCanvas {
    /// A `cols`×`rows` character grid showing a square source image of
    /// `source_size` pixels, letterboxed to keep it square.
    pub fn new(cols: usize, rows: usize, source_size: f64) -> Self {
        let dot_w = cols * BRAILLE_WIDTH;
        let dot_h = rows * BRAILLE_HEIGHT;
        let scale = source_size / dot_w.min(dot_h).max(1) as f64;
        Self {
            cols,
            rows,
            dots: vec![vec![false; dot_w]; dot_h],
            colors: vec![vec![None; cols]; rows],
            scale,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn dot_size(&self) -> (usize, usize) {
        (self.cols * BRAILLE_WIDTH, self.rows * BRAILLE_HEIGHT)
    }

    fn encode(&self, cx: usize, cy: usize) -> u8 {
        // Rows 0-2 are sequential bits, row 3 jumps to bits 6,7
        const BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

        let mut pattern = 0;
        for (row, bits) in BITS.iter().enumerate() {
            let line = &self.dots[cy * BRAILLE_HEIGHT + row];
            if line[cx * BRAILLE_WIDTH] {
                pattern |= bits[0];
            }
            if line[cx * BRAILLE_WIDTH + 1] {
                pattern |= bits[1];
            }
        }
        pattern
    }

    pub fn cell(&self, cx: usize, cy: usize) -> Cell {
        let dots = self.encode(cx, cy);
        if dots == 0 {
            return Cell { ch: ' ', fg: None };
        }
        Cell {
            ch: char::from_u32(BRAILLE_BASE + dots as u32).unwrap_or(' '),
            fg: self.colors[cy][cx],
        }
    }

    /// Plain text rendering, one string per row
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows)
            .map(|cy| (0..self.cols).map(|cx| self.cell(cx, cy).ch).collect())
            .collect()
    }

    /// Write the grid with 24-bit foreground colors.
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let cell = self.cell(cx, cy);
                match cell.fg {
                    Some((r, g, b)) => {
                        queue!(out, SetForegroundColor(Color::Rgb { r, g, b }), Print(cell.ch), ResetColor)?
                    }
                    None => queue!(out, Print(cell.ch))?,
                }
            }
            queue!(out, Print("\n"))?;
        }
        out.flush()
    }
}

impl Surface for BrailleCanvas {
    fn paint_segment(&mut self, start: Point, end: Point, color: Rgb, _thickness: f64) {
        let (dot_w, dot_h) = self.dot_size();
        let to_dots = |p: Point| Point::new(p.x / self.scale, p.y / self.scale);
        let Some((x0, y0)) = to_pixel(to_dots(start), dot_w as u32, dot_h as u32) else { return };
        let Some((x1, y1)) = to_pixel(to_dots(end), dot_w as u32, dot_h as u32) else { return };

        let dots = &mut self.dots;
        let colors = &mut self.colors;
        bresenham(x0, y0, x1, y1, |x, y| {
            if x >= 0 && (x as usize) < dot_w && y >= 0 && (y as usize) < dot_h {
                dots[y as usize][x as usize] = true;
                colors[y as usize / BRAILLE_HEIGHT][x as usize / BRAILLE_WIDTH] = Some(color);
            }
        });
    }
}
