//! End-to-end checks of seed → crystal → image → digest.

use flakemaker::collage::{self, Grid};
use flakemaker::{
    embed, extract, flake_from_digest, hash_seed, pack, position_of, replay, segments, Digest,
    FlakeConfig, FlakeError, ImageConfig, Point, Snowflake,
};
use image::{Rgb, RgbImage};
use rand::prelude::*;

const CENTER: Point = Point::new(350.0, 350.0);

/// Everything that makes up a grown tree, for exact comparison
fn fingerprint(flake: &Snowflake) -> Vec<(Option<usize>, u32, u64, u64, u64, u64)> {
    flake
        .nodes()
        .map(|(_, n)| {
            (
                n.parent().map(|p| p.index()),
                n.depth(),
                n.angle().to_bits(),
                n.length().to_bits(),
                n.thickness().to_bits(),
                n.growth().to_bits(),
            )
        })
        .collect()
}

#[test]
fn replay_is_bit_identical() {
    for seed in ["test-seed", "", "snow", "0123456789"] {
        let d = hash_seed(seed, false);
        let a = replay(&d, 1.0, FlakeConfig::default(), CENTER);
        let b = replay(&d, 1.0, FlakeConfig::default(), CENTER);
        assert_eq!(fingerprint(&a), fingerprint(&b), "seed {:?}", seed);
        assert_eq!(a.active(), b.active());
        assert_eq!(a.branch_count(), b.branch_count());
    }
}

#[test]
fn replay_is_independent_of_other_crystals() {
    let d = hash_seed("test-seed", false);
    let alone = replay(&d, 1.0, FlakeConfig::default(), CENTER);

    // Interleave another crystal's ticks with a fresh replay
    let mut other = Snowflake::new(FlakeConfig::default(), CENTER);
    for _ in 0..50 {
        other.tick(5.0, -19.0, 1.0);
    }
    let again = replay(&d, 1.0, FlakeConfig::default(), CENTER);
    assert_eq!(fingerprint(&alone), fingerprint(&again));
}

#[test]
fn conformance_fixture_is_stable() {
    let d = hash_seed("test-seed", false);
    let flake = replay(&d, 1.0, FlakeConfig::default(), CENTER);
    assert!((flake.elapsed() - 32.0).abs() < 1e-9);
    assert_eq!(flake.branch_count(), 2);
    assert_eq!(flake.node_count(), 3);
    let active: Vec<usize> = flake.active().iter().map(|id| id.index()).collect();
    assert_eq!(active, vec![1, 2]);

    let lengths: Vec<f64> = flake.nodes().map(|(_, n)| n.length()).collect();
    assert_eq!(lengths, vec![198.66661999999997, 190.66662000000002, 112.80000000000001]);

    let stats = flake.stats();
    let again = replay(&d, 1.0, FlakeConfig::default(), CENTER).stats();
    assert_eq!(stats, again);
    assert_eq!(
        serde_json::to_string(&stats).unwrap(),
        serde_json::to_string(&again).unwrap()
    );
}

#[test]
fn different_seeds_grow_different_crystals() {
    let a = replay(&hash_seed("alpha", false), 1.0, FlakeConfig::default(), CENTER);
    let b = replay(&hash_seed("beta", false), 1.0, FlakeConfig::default(), CENTER);
    assert_ne!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn tree_invariants_hold_after_replay() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let flake = replay(&Digest::from_bytes(bytes), 1.0, FlakeConfig::default(), CENTER);

        let root = flake.node(flake.root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.parent(), None);
        for (id, node) in flake.nodes() {
            if let Some(p) = node.parent() {
                assert_eq!(node.depth(), flake.node(p).depth() + 1);
                assert!(flake.node(p).children().contains(&id));
            }
        }
        // Exhausted leaves never disappear
        for (id, node) in flake.nodes() {
            if node.children().is_empty() {
                assert!(flake.is_active(id));
            }
        }
        assert!(!segments(&flake).is_empty());
    }
}

#[test]
fn steg_round_trip_for_random_digests() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..64 {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let d = Digest::from_bytes(bytes);

        let mut img = RgbImage::new(128, 1);
        for px in img.pixels_mut() {
            *px = Rgb([rng.gen(), rng.gen(), rng.gen()]);
        }
        embed(&mut img, &d).unwrap();
        let out = extract(&img, (0, 0)).unwrap();
        assert_eq!(out, d);
        assert_eq!(out.to_hex(), d.to_hex());
    }
}

#[test]
fn steg_round_trip_through_hex_strings() {
    let hex = "00000000000000000000000000000000000000000000000000000000000000ff";
    let d: Digest = hex.parse().unwrap();
    let mut img = RgbImage::new(128, 1);
    embed(&mut img, &d).unwrap();
    // Leading zeros survive formatting
    assert_eq!(extract(&img, (0, 0)).unwrap().to_string(), hex);
}

#[test]
fn png_encoding_preserves_payload() {
    let d = hash_seed("png", false);
    let image = ImageConfig { size: 140, ..ImageConfig::default() };
    let img = flake_from_digest(&d, 1.0, &FlakeConfig::default(), &image).unwrap();

    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(extract(&decoded, (0, 0)).unwrap(), d);
}

#[test]
fn collage_round_trip_for_every_index() {
    let grid = Grid::new(2, 3);
    let size = 128;
    let digests: Vec<Digest> = (0..grid.cells()).map(|i| hash_seed(format!("cell-{}", i), false)).collect();

    let tiles: Vec<RgbImage> = digests
        .iter()
        .map(|d| {
            let mut tile = RgbImage::from_pixel(size, size, Rgb([40, 41, 35]));
            embed(&mut tile, d).unwrap();
            tile
        })
        .collect();
    let packed = pack(&tiles, grid).unwrap();

    for index in 1..=grid.cells() {
        let pos = position_of(index, grid, size).unwrap();
        assert_eq!(extract(&packed, pos).unwrap(), digests[index - 1], "index {}", index);
    }

    let all: Vec<usize> = (1..=grid.cells()).collect();
    assert_eq!(collage::read_collage(&packed, grid, &all).unwrap(), digests);
    assert!(matches!(
        position_of(grid.cells() + 1, grid, size),
        Err(FlakeError::IndexOutOfRange { .. })
    ));
}

#[test]
fn rendered_collage_round_trip() {
    let digests: Vec<Digest> = ["north", "south", "east", "west"]
        .iter()
        .map(|s| hash_seed(s, false))
        .collect();
    let image = ImageConfig { size: 128, ..ImageConfig::default() };
    let grid = Grid::new(1, 4);
    let collage = collage::collage_from_digests(&digests, Some(grid), 1.0, &FlakeConfig::default(), &image).unwrap();
    assert_eq!(collage.dimensions(), (512, 128));
    assert_eq!(collage::read_collage(&collage, grid, &[4, 1]).unwrap(), vec![digests[3], digests[0]]);
}

#[test]
fn salted_collage_reports_its_digests() {
    let image = ImageConfig { size: 128, ..ImageConfig::default() };
    let (collage, digests) =
        collage::flake_collage(3, "flurry", None, 1.0, &FlakeConfig::default(), &image).unwrap();
    assert_eq!(digests.len(), 3);
    assert_ne!(digests[0], digests[1]);
    let read = collage::read_collage(&collage, Grid::new(2, 2), &[1, 2, 3]).unwrap();
    assert_eq!(read, digests);
}
