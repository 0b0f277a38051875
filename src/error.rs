use thiserror::Error;

/// Errors produced while extracting a palette.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("pixel buffer of {len} bytes does not match a {width}x{height} RGBA image")]
    InvalidBuffer { len: usize, width: u32, height: u32 },

    /// A box holding at least two pixels produced no usable cut point.
    #[error("median cut found no split point for a populated box")]
    UncuttableBox,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
