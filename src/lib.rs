//! Procedural ice crystals.
//!
//! One 60° sector of a snowflake is grown as a tree of line segments under
//! humidity and temperature ([`flake`]), unfolded into six mirrored copies
//! ([`symmetry`]) and rasterized ([`raster`]). A SHA-256 digest can stand in
//! for the interactive inputs ([`seed`]), which makes every flake
//! reproducible; the digest is then hidden in the rendered image ([`steg`])
//! and can be read back, also from a grid of flakes ([`collage`]).
//!
//! ```no_run
//! use flakemaker::{hash_seed, flake_from_digest, extract, FlakeConfig, ImageConfig};
//!
//! let digest = hash_seed("test-seed", false);
//! let image = flake_from_digest(&digest, 1.0, &FlakeConfig::default(), &ImageConfig::default())?;
//! assert_eq!(extract(&image, (0, 0))?, digest);
//! # Ok::<(), flakemaker::FlakeError>(())
//! ```

pub mod collage;
pub mod config;
pub mod error;
pub mod flake;
pub mod geometry;
pub mod raster;
pub mod seed;
pub mod settings;
pub mod steg;
pub mod symmetry;
pub mod terminal;

pub use collage::{collage_from_digests, flake_collage, pack, position_of, read_collage, Grid};
pub use config::{parse_color, FlakeConfig, ImageConfig, Rgb};
pub use error::{FlakeError, Result};
pub use flake::{LineNode, NodeId, Snowflake};
pub use geometry::{interp, rotate_point, Point};
pub use raster::Canvas;
pub use seed::{flake_from_digest, hash_seed, map_to_range, render_with_digest, replay, replay_hex, Digest};
pub use settings::Settings;
pub use steg::{embed, extract};
pub use symmetry::{draw, segments, Segment, Surface};
pub use terminal::BrailleCanvas;
