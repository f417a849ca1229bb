//! # pxl-transfer
//!
//! Transfer functions relating stored (encoded) values to linear light.
//!
//! # Terminology
//!
//! - **EOTF**: encoded -> linear ("linearize")
//! - **OETF**: linear -> encoded ("encode")
//!
//! # Representations
//!
//! | Form | Type | Notes |
//! |------|------|-------|
//! | Piecewise parametric | [`TransferFn`] | seven coefficients, exactly invertible |
//! | Single exponent | [`gamma`] | `v^g` |
//! | Lookup table | [`table`] | sampled curve, interpolated |
//!
//! Named curves ([`srgb`], [`rec709`], pure [`gamma`]) all have a
//! [`TransferFn`] equivalent, which is what the raster pipeline consumes.
//!
//! ```rust
//! use pxl_transfer::{srgb, TransferFn};
//!
//! let linear = TransferFn::SRGB.eval(0.5);
//! assert!((linear - srgb::eotf(0.5)).abs() < 1e-5);
//!
//! let encode = TransferFn::SRGB.invert().unwrap();
//! assert!((encode.eval(linear) - 0.5).abs() < 1e-5);
//! ```
//!
//! # Used By
//!
//! - `pxl-raster` - `parametric`, `gamma` and `from_srgb`/`to_srgb` stages
//! - `pxl-color` - color space curves, step planner, direct converter

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod gamma;
mod parametric;
pub mod rec709;
pub mod srgb;
pub mod table;

pub use parametric::TransferFn;
