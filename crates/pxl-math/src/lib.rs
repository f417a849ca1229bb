//! # pxl-math
//!
//! Small linear-algebra toolkit for color management.
//!
//! - [`Mat3`] - 3x3 gamut matrices (row-major, column vectors)
//! - [`Vec3`] - XYZ/RGB triplets
//! - [`adapt_matrix`] - Bradford chromatic adaptation between white points
//! - [`simd`] - `wide`-backed batch helpers used by buffer converters
//!
//! # Design
//!
//! Storage is row-major so that a matrix can be handed to a pipeline stage
//! as a flat `[f32; 9]` without reshuffling. Heavy lifting (products,
//! inversion) goes through [`glam`].
//!
//! ```rust
//! use pxl_math::{Mat3, Vec3};
//!
//! let rgb_to_xyz = Mat3::from_rows([
//!     [0.4124564, 0.3575761, 0.1804375],
//!     [0.2126729, 0.7151522, 0.0721750],
//!     [0.0193339, 0.1191920, 0.9503041],
//! ]);
//! let xyz = rgb_to_xyz * Vec3::new(1.0, 1.0, 1.0);
//! assert!((xyz.y - 1.0).abs() < 1e-4);
//! ```
//!
//! # Used By
//!
//! - `pxl-primaries` - RGB/XYZ matrix generation
//! - `pxl-color` - gamut transforms and the direct converter

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod adapt;
mod mat3;
pub mod simd;
mod vec3;

pub use adapt::*;
pub use mat3::*;
pub use vec3::*;
