//! Error types for pxl operations.
//!
//! The raster pipeline itself has no recoverable errors: a stage handed the
//! wrong context is a caller bug and panics. The [`Error`] enum covers the
//! places where a caller can reasonably recover, such as building a color
//! space from bad parameters or handing a too-small buffer to a converter.
//!
//! # Usage
//!
//! ```rust
//! use pxl_core::{Error, Result};
//!
//! fn check_len(needed: usize, got: usize) -> Result<()> {
//!     if got < needed {
//!         return Err(Error::buffer_too_small(needed, got));
//!     }
//!     Ok(())
//! }
//! assert!(check_len(4, 2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing pixel work.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A numeric parameter is out of its valid domain.
    ///
    /// Returned e.g. for a gamma exponent of zero or a table with fewer
    /// than two entries.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A pixel buffer holds fewer bytes than the operation needs.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        got: usize,
    },

    /// The pixel format is not handled by this operation.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates an [`Error::BufferTooSmall`] error.
    #[inline]
    pub fn buffer_too_small(needed: usize, got: usize) -> Self {
        Self::BufferTooSmall { needed, got }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl std::fmt::Display) -> Self {
        Self::UnsupportedFormat(format.to_string())
    }

    /// Returns `true` if this is a buffer size error.
    #[inline]
    pub fn is_buffer_error(&self) -> bool {
        matches!(self, Self::BufferTooSmall { .. })
    }
}
