//! Error types for color operations.

use pxl_core::PixelFormat;
use thiserror::Error;

/// Color operation error.
#[derive(Debug, Error)]
pub enum ColorError {
    /// No conversion between these pixel formats.
    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion {
        /// Source format.
        from: PixelFormat,
        /// Destination format.
        to: PixelFormat,
    },

    /// A matrix or curve that must be inverted is singular or flat.
    #[error("non-invertible {0}")]
    NonInvertible(&'static str),

    /// Buffer shorter than the requested pixel count.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes provided.
        got: usize,
    },

    /// Error from pxl-core.
    #[error(transparent)]
    Core(#[from] pxl_core::Error),
}

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;
