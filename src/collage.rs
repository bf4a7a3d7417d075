//! Grids of flakes packed into one image, and the inverse lookup.
//!
//! Cells are filled row-major and flake indices are 1-based: index 1 is
//! the top-left cell, index `columns` the top-right one.

use crate::config::{FlakeConfig, ImageConfig};
use crate::error::{FlakeError, Result};
use crate::seed::{flake_from_digest, hash_seed, Digest};
use crate::steg;
use image::{imageops, RgbImage};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Seed used for digests that pad out an incomplete collage
const FILLER_SEED: &str = "random";

/// Collage dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub rows: u32,
    pub columns: u32,
}

impl Grid {
    pub fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Smallest square grid holding `count` flakes
    pub fn square_for(count: usize) -> Self {
        let side = (count as f64).sqrt().ceil().max(1.0) as u32;
        Self::new(side, side)
    }

    pub fn cells(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Zero-based (row, column) of a 1-based flake index
    pub fn cell_of(&self, index: usize) -> Result<(u32, u32)> {
        if index == 0 || index > self.cells() {
            return Err(FlakeError::IndexOutOfRange { index, cells: self.cells() });
        }
        let i = index - 1;
        let columns = self.columns as usize;
        Ok(((i / columns) as u32, (i % columns) as u32))
    }
}

/// Top-left pixel `(row, col)` of the cell holding flake `index`.
pub fn position_of(index: usize, grid: Grid, cell_size: u32) -> Result<(u32, u32)> {
    let (row, col) = grid.cell_of(index)?;
    Ok((row * cell_size, col * cell_size))
}

/// Paste same-sized images row-major into a grid.
///
/// Cells without an image stay black.
pub fn pack(images: &[RgbImage], grid: Grid) -> Result<RgbImage> {
    let first = images.first().ok_or(FlakeError::EmptyCollage)?;
    if grid.cells() == 0 {
        return Err(FlakeError::EmptyCollage);
    }
    if images.len() > grid.cells() {
        return Err(FlakeError::IndexOutOfRange { index: images.len(), cells: grid.cells() });
    }

    let (w, h) = first.dimensions();
    let mut collage = RgbImage::new(w * grid.columns, h * grid.rows);
    for (i, img) in images.iter().enumerate() {
        if img.dimensions() != (w, h) {
            return Err(FlakeError::CellSizeMismatch { expected: (w, h), found: img.dimensions() });
        }
        let (row, col) = grid.cell_of(i + 1)?;
        imageops::replace(&mut collage, img, (col * w) as i64, (row * h) as i64);
    }
    Ok(collage)
}

/// Render one flake per digest into a grid. Cells left over are filled
/// with flakes from random digests; digests beyond the grid are dropped.
pub fn collage_from_digests(
    digests: &[Digest],
    grid: Option<Grid>,
    dt: f64,
    config: &FlakeConfig,
    image: &ImageConfig,
) -> Result<RgbImage> {
    let grid = grid.unwrap_or_else(|| Grid::square_for(digests.len()));
    let cells = grid.cells();

    if digests.len() > cells {
        warn!(dropped = digests.len() - cells, "more digests than collage cells");
    }
    let padded = cells.saturating_sub(digests.len());
    if padded > 0 {
        warn!(padded, "collage not filled by the given digests, padding with random flakes");
    }

    let all: Vec<Digest> = digests
        .iter()
        .copied()
        .take(cells)
        .chain((0..padded).map(|_| hash_seed(FILLER_SEED, true)))
        .collect();

    let flakes = all
        .par_iter()
        .map(|d| flake_from_digest(d, dt, config, image))
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = grid.rows, columns = grid.columns, "packing collage");
    pack(&flakes, grid)
}

/// A collage of `count` flakes whose digests are salted hashes of `seed`.
pub fn flake_collage(
    count: usize,
    seed: &str,
    grid: Option<Grid>,
    dt: f64,
    config: &FlakeConfig,
    image: &ImageConfig,
) -> Result<(RgbImage, Vec<Digest>)> {
    let digests: Vec<Digest> = (0..count).map(|_| hash_seed(seed, true)).collect();
    let collage = collage_from_digests(&digests, grid, dt, config, image)?;
    Ok((collage, digests))
}

/// Extract the digests of the given 1-based flake indices.
///
/// The cell size is the collage height divided by its row count.
pub fn read_collage(image: &RgbImage, grid: Grid, indices: &[usize]) -> Result<Vec<Digest>> {
    if grid.rows == 0 || grid.columns == 0 {
        return Err(FlakeError::EmptyCollage);
    }
    let cell = image.height() / grid.rows;
    indices
        .iter()
        .map(|&index| steg::extract(image, position_of(index, grid, cell)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn tile(shade: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([shade, shade, shade]))
    }

    #[test]
    fn position_is_row_major() {
        let grid = Grid::new(2, 3);
        assert_eq!(position_of(1, grid, 10).unwrap(), (0, 0));
        assert_eq!(position_of(2, grid, 10).unwrap(), (0, 10));
        assert_eq!(position_of(3, grid, 10).unwrap(), (0, 20));
        assert_eq!(position_of(4, grid, 10).unwrap(), (10, 0));
        assert_eq!(position_of(6, grid, 10).unwrap(), (10, 20));
    }

    #[test]
    fn position_rejects_out_of_range() {
        let grid = Grid::new(2, 2);
        assert!(matches!(position_of(0, grid, 8), Err(FlakeError::IndexOutOfRange { index: 0, cells: 4 })));
        assert!(matches!(position_of(5, grid, 8), Err(FlakeError::IndexOutOfRange { index: 5, cells: 4 })));
    }

    #[test]
    fn square_grid_rounds_up() {
        assert_eq!(Grid::square_for(0), Grid::new(1, 1));
        assert_eq!(Grid::square_for(1), Grid::new(1, 1));
        assert_eq!(Grid::square_for(4), Grid::new(2, 2));
        assert_eq!(Grid::square_for(5), Grid::new(3, 3));
    }

    #[test]
    fn pack_places_tiles_row_major() {
        let images: Vec<_> = (1..=5).map(|i| tile(i * 10)).collect();
        let grid = Grid::new(2, 3);
        let collage = pack(&images, grid).unwrap();
        assert_eq!(collage.dimensions(), (12, 8));
        for index in 1..=5 {
            let (row, col) = position_of(index, grid, 4).unwrap();
            assert_eq!(collage.get_pixel(col + 1, row + 1)[0], index as u8 * 10);
        }
        // Sixth cell was never supplied
        assert_eq!(collage.get_pixel(9, 5).0, [0, 0, 0]);
    }

    #[test]
    fn pack_validates_inputs() {
        assert!(matches!(pack(&[], Grid::new(1, 1)), Err(FlakeError::EmptyCollage)));
        assert!(matches!(pack(&[tile(1)], Grid::new(0, 3)), Err(FlakeError::EmptyCollage)));
        let three = vec![tile(1), tile(2), tile(3)];
        assert!(matches!(pack(&three, Grid::new(1, 2)), Err(FlakeError::IndexOutOfRange { .. })));
        let mixed = vec![tile(1), RgbImage::new(5, 4)];
        assert!(matches!(pack(&mixed, Grid::new(1, 2)), Err(FlakeError::CellSizeMismatch { .. })));
    }

    #[test]
    fn collage_pads_missing_cells() {
        let digests = vec![hash_seed("a", false), hash_seed("b", false), hash_seed("c", false)];
        let image = ImageConfig { size: 130, ..ImageConfig::default() };
        let collage =
            collage_from_digests(&digests, None, 1.0, &FlakeConfig::default(), &image).unwrap();
        assert_eq!(collage.dimensions(), (260, 260));

        let read = read_collage(&collage, Grid::new(2, 2), &[1, 2, 3, 4]).unwrap();
        assert_eq!(&read[..3], &digests[..]);
        assert!(!digests.contains(&read[3]));
    }

    #[test]
    fn read_collage_rejects_bad_index() {
        let img = RgbImage::new(256, 128);
        assert!(matches!(
            read_collage(&img, Grid::new(1, 2), &[3]),
            Err(FlakeError::IndexOutOfRange { .. })
        ));
    }
}
