//! Seed → SHA-256 digest → humidity/temperature schedule → crystal.
//!
//! A digest fully determines a flake: its first 32 hex digits drive
//! humidity, the last 32 drive temperature, one tick per digit pair.

use crate::config::{FlakeConfig, ImageConfig};
use crate::error::{FlakeError, Result};
use crate::flake::Snowflake;
use crate::geometry::{interp, Point};
use crate::raster::Canvas;
use crate::steg;
use crate::symmetry;
use image::RgbImage;
use rand::RngCore;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (-20.0, -5.0);
/// Length of a digest in hex digits
pub const DIGEST_HEX_LEN: usize = 64;
const SALT_LEN: usize = 16;
/// Decimal places kept by `map_to_range`
const PRECISION: i32 = 3;

/// A 256-bit digest, written as 64 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Bit `i` counted from the most significant end
    pub fn bit(&self, i: usize) -> bool {
        (self.0[i / 8] >> (7 - i % 8)) & 1 == 1
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for Digest {
    type Err = FlakeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != DIGEST_HEX_LEN {
            return Err(FlakeError::MalformedDigest(format!(
                "expected {} hex digits, got {}",
                DIGEST_HEX_LEN,
                s.len()
            )));
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FlakeError::MalformedDigest(format!("invalid character {:?}", bad)));
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|e| FlakeError::MalformedDigest(e.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

/// SHA-256 of the seed's bytes, optionally followed by 16 random salt
/// bytes so that equal seeds give different digests.
pub fn hash_seed(seed: impl AsRef<[u8]>, salted: bool) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_ref());
    if salted {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        hasher.update(salt);
    }
    Digest(hasher.finalize().into())
}

/// Map each hex digit (0-15) linearly onto `[min, max]`, rounded to three
/// decimals.
pub fn map_to_range(hex: &str, min: f64, max: f64) -> Result<Vec<f64>> {
    hex.chars()
        .map(|c| {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| FlakeError::MalformedDigest(format!("invalid character {:?}", c)))?;
            Ok(scale_nibble(nibble as u8, min, max))
        })
        .collect()
}

fn scale_nibble(nibble: u8, min: f64, max: f64) -> f64 {
    let factor = 10f64.powi(PRECISION);
    (interp(nibble as f64, 0.0, 15.0, min, max) * factor).round() / factor
}

/// Hex digits of `bytes`, most significant first
fn nibbles(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bytes.iter().flat_map(|b| [b >> 4, b & 0x0f])
}

/// The (humidity, temperature) pair for every tick of a replay.
pub fn schedule(digest: &Digest) -> Vec<(f64, f64)> {
    let (first, second) = digest.as_bytes().split_at(16);
    let humidity = nibbles(first).map(|n| scale_nibble(n, HUMIDITY_RANGE.0, HUMIDITY_RANGE.1));
    let temperature = nibbles(second).map(|n| scale_nibble(n, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1));
    humidity.zip(temperature).collect()
}

/// Grow a crystal from a digest: one tick per scheduled pair, all with `dt`.
pub fn replay(digest: &Digest, dt: f64, config: FlakeConfig, center: Point) -> Snowflake {
    let mut flake = Snowflake::new(config, center);
    for (humidity, temperature) in schedule(digest) {
        flake.tick(humidity, temperature, dt);
    }
    debug!(
        digest = %digest,
        branches = flake.branch_count(),
        nodes = flake.node_count(),
        active = flake.active().len(),
        "replayed digest"
    );
    flake
}

/// Replay a digest given as a hex string.
pub fn replay_hex(digest: &str, dt: f64, config: FlakeConfig, center: Point) -> Result<Snowflake> {
    Ok(replay(&digest.parse()?, dt, config, center))
}

/// Replay a digest on a crystal centred in a square image, render it and
/// embed the digest in the top row.
pub fn flake_from_digest(digest: &Digest, dt: f64, config: &FlakeConfig, image: &ImageConfig) -> Result<RgbImage> {
    let half = image.size as f64 / 2.0;
    let flake = replay(digest, dt, config.clone(), Point::new(half, half));
    render_with_digest(&flake, digest, image)
}

/// Draw an already grown crystal on a fresh background and embed `digest`.
pub fn render_with_digest(flake: &Snowflake, digest: &Digest, image: &ImageConfig) -> Result<RgbImage> {
    let mut canvas = Canvas::new(image.size, image.size, image.background);
    symmetry::draw(flake, &mut canvas);

    let mut rendered = canvas.into_image();
    steg::embed(&mut rendered, digest)?;
    Ok(rendered)
}
