//! Turns one grown sector into the full six-fold crystal.
//!
//! Each node is mirrored through every ancestor it still has (a branch
//! splits symmetrically left and right of its parent's axis), and the
//! whole mirror set is then rotated to the six 60° offsets.

use crate::config::Rgb;
use crate::flake::{NodeId, Snowflake};
use crate::geometry::{rotate_segment, Point};
use std::f64::consts::PI;

/// Number of rotational copies of the sector
pub const FOLDS: usize = 6;

/// A drawable segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub color: Rgb,
    pub thickness: f64,
}

/// Anything that can paint a straight segment
pub trait Surface {
    fn paint_segment(&mut self, start: Point, end: Point, color: Rgb, thickness: f64);
}

/// The node's own segment followed by every mirror image produced by
/// walking its ancestor chain, unrotated.
///
/// For an unbroken chain of length `d` this yields `2^d` segments.
pub fn mirror_set(flake: &Snowflake, id: NodeId) -> Vec<(Point, Point)> {
    let node = flake.node(id);
    let mut cousins = vec![(node.start(), node.end())];

    let mut line = node;
    while let Some(dad_id) = line.parent() {
        let dad = flake.node(dad_id);
        let rotation = (dad.angle() - line.angle()) * 2.0;
        let pivot = line.start();
        let reflected: Vec<_> = cousins
            .iter()
            .map(|&cousin| rotate_segment(cousin, pivot, rotation))
            .collect();
        cousins.extend(reflected);
        line = dad;
    }

    cousins
}

/// Every segment of the full crystal, node by node, fold by fold.
///
/// Purged nodes are included: they stop growing but stay part of the crystal.
pub fn segments(flake: &Snowflake) -> Vec<Segment> {
    let center = flake.center();
    let mut out = Vec::new();

    for (id, _) in flake.nodes() {
        let color = flake.color(id);
        let thickness = flake.node(id).thickness();
        let mirrors = mirror_set(flake, id);

        for fold in 0..FOLDS {
            let offset = fold as f64 * PI / 3.0;
            out.extend(mirrors.iter().map(|&seg| {
                let (start, end) = rotate_segment(seg, center, offset);
                Segment { start, end, color, thickness }
            }));
        }
    }

    out
}

/// Paint the whole crystal onto `surface`.
pub fn draw<S: Surface + ?Sized>(flake: &Snowflake, surface: &mut S) {
    for seg in segments(flake) {
        surface.paint_segment(seg.start, seg.end, seg.color, seg.thickness);
    }
}
