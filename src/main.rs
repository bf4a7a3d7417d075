use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flakemaker::collage::{self, Grid};
use flakemaker::geometry::Point;
use flakemaker::{hash_seed, seed, steg, symmetry, BrailleCanvas, Digest, Settings};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "flakemaker")]
#[command(author = "Flake Maker")]
#[command(version)]
#[command(about = "Procedural ice crystals grown from seeds, with the seed hidden in the image", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where a flake's digest comes from
#[derive(clap::Args)]
struct Source {
    /// Text seed, hashed with SHA-256
    #[arg(short, long, conflicts_with = "digest")]
    seed: Option<String>,

    /// 64-digit hex digest to replay directly
    #[arg(short, long)]
    digest: Option<String>,
}

impl Source {
    /// No seed and no digest means a fresh random flake.
    fn resolve(&self) -> Result<Digest> {
        match (&self.seed, &self.digest) {
            (_, Some(d)) => Ok(d.parse()?),
            (Some(s), None) => Ok(hash_seed(s, false)),
            (None, None) => Ok(hash_seed("random", true)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of a seed
    Hash {
        seed: String,

        /// Append random salt before hashing
        #[arg(long)]
        salt: bool,
    },

    /// Grow a flake and save it as a PNG with its digest embedded
    Grow {
        #[command(flatten)]
        source: Source,

        /// Time step per tick
        #[arg(long)]
        dt: Option<f64>,

        /// Image edge in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Output file (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print crystal statistics as JSON
        #[arg(long)]
        stats: bool,
    },

    /// Print the digest embedded in a flake image
    Extract {
        image: PathBuf,

        /// Pixel row of the payload
        #[arg(long, default_value = "0")]
        row: u32,

        /// Pixel column where the payload starts
        #[arg(long, default_value = "0")]
        col: u32,
    },

    /// Build a grid of flakes from digests or from a salted seed
    Collage {
        /// Digest for the next cell (repeatable)
        #[arg(short, long = "digest")]
        digests: Vec<String>,

        /// Number of salted flakes to derive from --seed
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Seed for salted flakes
        #[arg(short, long, default_value = "random")]
        seed: String,

        #[arg(long)]
        rows: Option<u32>,

        #[arg(long)]
        columns: Option<u32>,

        /// Edge of each cell in pixels
        #[arg(long)]
        size: Option<u32>,

        #[arg(long)]
        dt: Option<f64>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the digests of flakes in a collage (1-based, row-major)
    ReadCollage {
        image: PathBuf,

        #[arg(long)]
        rows: u32,

        #[arg(long)]
        columns: u32,

        #[arg(required = true)]
        indices: Vec<usize>,
    },

    /// Draw a flake in the terminal
    Preview {
        #[command(flatten)]
        source: Source,

        #[arg(long)]
        dt: Option<f64>,

        /// Width in characters (defaults to the terminal width)
        #[arg(short, long)]
        width: Option<u16>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn grid_from(rows: Option<u32>, columns: Option<u32>) -> Option<Grid> {
    match (rows, columns) {
        (None, None) => None,
        (Some(r), c) => Some(Grid::new(r, c.unwrap_or(r))),
        (None, Some(c)) => Some(Grid::new(c, c)),
    }
}

fn default_output() -> PathBuf {
    PathBuf::from(chrono::Local::now().format("Snowflake_%d-%m-%y_%H-%M-%S.png").to_string())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load();
    let config = settings.flake_config().context("invalid [snowflake] settings")?;
    let mut image_config = settings.image_config().context("invalid [image] settings")?;

    match cli.command {
        Commands::Hash { seed, salt } => {
            println!("{}", hash_seed(&seed, salt));
        }

        Commands::Grow { source, dt, size, output, stats } => {
            let digest = source.resolve()?;
            let dt = dt.unwrap_or_else(|| settings.dt());
            if let Some(size) = size {
                image_config.size = size;
            }

            let half = image_config.size as f64 / 2.0;
            let flake = seed::replay(&digest, dt, config, Point::new(half, half));
            let image = seed::render_with_digest(&flake, &digest, &image_config)?;
            let path = output.unwrap_or_else(default_output);
            image.save(&path).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), digest = %digest, "saved flake");

            if stats {
                println!("{}", serde_json::to_string_pretty(&flake.stats())?);
            } else {
                println!("{}", digest);
            }
        }

        Commands::Extract { image, row, col } => {
            let img = image::open(&image)
                .with_context(|| format!("reading {}", image.display()))?
                .to_rgb8();
            println!("{}", steg::extract(&img, (row, col))?);
        }

        Commands::Collage { digests, count, seed, rows, columns, size, dt, output } => {
            let dt = dt.unwrap_or_else(|| settings.dt());
            if let Some(size) = size {
                image_config.size = size;
            }
            let grid = grid_from(rows, columns);

            let (image, used) = match count {
                Some(n) if digests.is_empty() => {
                    collage::flake_collage(n, &seed, grid, dt, &config, &image_config)?
                }
                Some(_) => bail!("use either --digest or --count, not both"),
                None => {
                    let parsed = digests
                        .iter()
                        .map(|d| d.parse::<Digest>())
                        .collect::<flakemaker::Result<Vec<_>>>()?;
                    let image = collage::collage_from_digests(&parsed, grid, dt, &config, &image_config)?;
                    (image, parsed)
                }
            };

            image.save(&output).with_context(|| format!("writing {}", output.display()))?;
            for (i, d) in used.iter().enumerate() {
                println!("{:>3} {}", i + 1, d);
            }
        }

        Commands::ReadCollage { image, rows, columns, indices } => {
            let img = image::open(&image)
                .with_context(|| format!("reading {}", image.display()))?
                .to_rgb8();
            let found = collage::read_collage(&img, Grid::new(rows, columns), &indices)?;
            for (index, d) in indices.iter().zip(found) {
                println!("{:>3} {}", index, d);
            }
        }

        Commands::Preview { source, dt, width } => {
            let digest = source.resolve()?;
            let dt = dt.unwrap_or_else(|| settings.dt());
            let (term_w, term_h) = crossterm::terminal::size().unwrap_or((80, 40));
            let cols = width.unwrap_or(term_w).max(1) as usize;
            // Braille cells are 2x4 dots, so a square needs half as many rows
            let rows = (cols / 2).min(term_h.saturating_sub(2).max(1) as usize).max(1);

            let half = image_config.size as f64 / 2.0;
            let flake = seed::replay(&digest, dt, config, Point::new(half, half));
            let mut canvas = BrailleCanvas::new(cols, rows, image_config.size as f64);
            symmetry::draw(&flake, &mut canvas);
            canvas.print(&mut io::stdout())?;
            println!("{}", digest);
        }
    }

    Ok(())
}
