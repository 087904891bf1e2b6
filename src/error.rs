//! The error type shared by all fallible operations in the crate.

use thiserror::Error;

/// The error type returned by `palettize` operations.
///
/// Every error is recoverable: the caller can correct the offending input
/// and retry. No operation in this crate panics on invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PalettizeError {
    /// A palette (or requested palette size) was empty or exceeded
    /// [`MAX_COLORS`](crate::MAX_COLORS) entries.
    #[error("palette size must be between 1 and 256, got {0}")]
    InvalidPaletteSize(usize),

    /// A hex color string was not of the form `#rrggbb`.
    #[error("invalid hex color {0:?}, expected \"#rrggbb\"")]
    InvalidColorFormat(String),

    /// A pixel buffer's length did not match its declared dimensions.
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The actual length of the pixel buffer.
        len: usize,
        /// The declared width in pixels.
        width: u32,
        /// The declared height in pixels.
        height: u32,
    },
}
