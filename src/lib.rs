//! Vibrant and muted color palettes extracted from images.
//!
//! An image is sampled into a 5-bit-per-channel histogram, reduced to
//! representative swatches by modified median cut, and the swatches are
//! scored against six lightness/saturation profiles.
//!
//! ```no_run
//! let palette = rvibrant::Vibrant::from_path("photo.png")?
//!     .max_color_count(32)
//!     .palette()?;
//! if let Some(swatch) = palette.vibrant() {
//!     println!("{}", swatch.hex());
//! }
//! # Ok::<(), rvibrant::Error>(())
//! ```

pub mod color;
mod error;
pub mod filter;
pub mod generator;
pub mod median_cut;
pub mod options;
pub mod palette;
pub mod quantizer;
pub mod swatch;
mod vibrant;

pub use error::{Error, Result};
pub use filter::{Filter, FilterId};
pub use generator::{DefaultGenerator, FallbackMode, Generator, GeneratorOptions};
pub use options::Options;
pub use palette::{Palette, Role};
pub use quantizer::{MedianCut, Quantizer};
pub use swatch::Swatch;
pub use vibrant::Vibrant;
