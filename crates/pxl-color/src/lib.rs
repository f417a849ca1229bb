//! # pxl-color
//!
//! Color spaces and color conversion for pxl raster pipelines.
//!
//! - [`ColorSpace`] - per-channel transfer curves plus a to/from XYZ D50
//!   gamut, with built-ins for sRGB, Display P3, Rec.2020 and Adobe RGB
//! - [`ColorStepPlan`] - the minimal unpremul / linearize / gamut / encode /
//!   premul steps between two space+alpha pairs, applied to one color or
//!   appended to a [`pxl_raster::Pipeline`]
//! - [`ColorSpaceXform`] - direct RGBA buffer conversion with fast paths for
//!   sRGB and 2.2 curves
//!
//! ```rust
//! use pxl_color::{ColorSpace, ColorStepPlan};
//! use pxl_core::AlphaType;
//!
//! let srgb = ColorSpace::srgb();
//! let p3 = ColorSpace::display_p3();
//!
//! let same = ColorStepPlan::new(Some(&srgb), AlphaType::Premul, Some(&srgb), AlphaType::Premul);
//! assert!(same.is_identity());
//!
//! let plan = ColorStepPlan::new(Some(&p3), AlphaType::Premul, Some(&srgb), AlphaType::Premul);
//! assert!(plan.flags.unpremul && plan.flags.gamut_transform && plan.flags.premul);
//! ```
//!
//! # Features
//!
//! - `parallel` - [`ColorSpaceXform::apply_parallel`] on the rayon pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod space;
mod steps;
mod xform;

pub use error::{ColorError, ColorResult};
pub use space::{ColorSpace, GammaCurve, GammaNamed};
pub use steps::{ColorStepPlan, StepFlags};
pub use xform::{ColorSpaceXform, FastCurve, XformPath};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::space::ColorSpace;
    pub use crate::steps::ColorStepPlan;
    pub use crate::xform::ColorSpaceXform;
}
