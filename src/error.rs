use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlakeError>;

#[derive(Debug, Error)]
pub enum FlakeError {
    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    #[error("image too small: need {needed} pixels in the row, {available} available")]
    InsufficientCapacity { needed: u32, available: u32 },

    #[error("flake index {index} out of range 1..={cells}")]
    IndexOutOfRange { index: usize, cells: usize },

    #[error("collage cell is {expected:?}, image is {found:?}")]
    CellSizeMismatch { expected: (u32, u32), found: (u32, u32) },

    #[error("collage needs at least one row, one column and one image")]
    EmptyCollage,

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
