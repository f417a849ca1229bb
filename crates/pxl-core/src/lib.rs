//! # pxl-core
//!
//! Core types shared by every pxl crate.
//!
//! - [`Error`], [`Result`] - error type used by fallible constructors
//! - [`AlphaType`] - how alpha relates to the color channels of a pixel
//! - [`PixelFormat`] - packed memory layouts understood by loads and stores
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The rest of the workspace
//! builds on it:
//!
//! ```text
//! pxl-core (this crate)
//!    ^
//!    |
//!    +-- pxl-math (matrices, adaptation, SIMD helpers)
//!    +-- pxl-transfer (transfer functions)
//!    +-- pxl-primaries (RGB primaries)
//!    +-- pxl-raster (stages, engines, pipelines)
//!    +-- pxl-color (color spaces, step planner, direct transform)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alpha;
pub mod error;
pub mod format;

pub use alpha::AlphaType;
pub use error::{Error, Result};
pub use format::PixelFormat;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::alpha::AlphaType;
    pub use crate::error::{Error, Result};
    pub use crate::format::PixelFormat;
}
