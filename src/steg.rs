//! Hides a 256-bit digest in the least significant bits of an image.
//!
//! Two bits per pixel along a single row: the red LSB carries the higher
//! bit of each pair, the green LSB the lower one. Blue is left alone.

use crate::error::{FlakeError, Result};
use crate::seed::Digest;
use image::RgbImage;

/// Pixels needed to hold one digest
pub const PAYLOAD_PIXELS: u32 = 128;

fn check_window(image: &RgbImage, row: u32, col: u32) -> Result<()> {
    let available = if row < image.height() {
        image.width().saturating_sub(col)
    } else {
        0
    };
    if available < PAYLOAD_PIXELS {
        return Err(FlakeError::InsufficientCapacity {
            needed: PAYLOAD_PIXELS,
            available,
        });
    }
    Ok(())
}

/// Write `digest` into the first 128 pixels of row 0.
pub fn embed(image: &mut RgbImage, digest: &Digest) -> Result<()> {
    check_window(image, 0, 0)?;

    for i in 0..PAYLOAD_PIXELS {
        let hi = digest.bit(2 * i as usize) as u8;
        let lo = digest.bit(2 * i as usize + 1) as u8;
        let px = image.get_pixel_mut(i, 0);
        px[0] = (px[0] & 0xfe) | hi;
        px[1] = (px[1] & 0xfe) | lo;
    }
    Ok(())
}

/// Read a digest from the 128 pixels starting at `(row, col)`, scanning right.
pub fn extract(image: &RgbImage, (row, col): (u32, u32)) -> Result<Digest> {
    check_window(image, row, col)?;

    let mut bytes = [0u8; 32];
    for i in 0..PAYLOAD_PIXELS as usize {
        let px = image.get_pixel(col + i as u32, row);
        let pair = ((px[0] & 1) << 1) | (px[1] & 1);
        // Four pairs per byte, first pair in the top bits
        bytes[i / 4] |= pair << (6 - 2 * (i % 4));
    }
    Ok(Digest::from_bytes(bytes))
}
