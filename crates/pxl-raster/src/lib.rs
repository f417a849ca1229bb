//! # pxl-raster
//!
//! CPU raster pipeline: small per-pixel stages strung together and run over
//! horizontal spans of pixels.
//!
//! - [`StageId`] - the closed catalog of stages (loads, stores, blends,
//!   transfer curves, matrices, tiling)
//! - [`Context`] - per-stage arguments (buffers, colors, matrices, curves)
//! - [`Pipeline`] - builder; [`Pipeline::run`] executes once,
//!   [`Pipeline::compile`] flattens into a reusable [`CompiledPipeline`]
//! - [`Engine`] - a full stage table for one lane width;
//!   [`engine()`] returns the process-wide choice
//!
//! # Execution model
//!
//! A span of `n` pixels runs as full chunks of the engine's lane width and
//! one final partial chunk (the tail). Stages only touch memory for the
//! lanes that hold real pixels, so a tail never reaches past the span.
//!
//! ```rust
//! use pxl_raster::{Context, MemoryCtx, Pipeline, StageId};
//!
//! let mut px = [0u8; 4 * 10];
//! {
//!     let dst = MemoryCtx::new_mut(&mut px[..], 10);
//!     let mut p = Pipeline::new();
//!     p.append(StageId::ConstantColor, Context::Color([1.0, 0.5, 0.0, 1.0]));
//!     p.append(StageId::Store8888, Context::Memory(&dst));
//!     p.run(0, 0, 10);
//! }
//! assert_eq!(&px[..4], &[255, 128, 0, 255]);
//! ```
//!
//! # Features
//!
//! - `portable` - always select the portable engine (also implied under Miri)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod constants;
mod context;
pub mod engine;
mod kernels;
mod lanes;
mod pipeline;
mod stage;

pub use constants::{CONSTANTS, Constants};
pub use context::{ByteTables, CallbackCtx, Context, GatherCtx, MemoryCtx, TileCtx, TwoStopGradient};
pub use engine::{Engine, EngineKind, available, engine};
pub use lanes::{Lanes, MAX_LANES};
pub use pipeline::{CompiledPipeline, Pipeline, StageRecord};
pub use stage::StageId;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::{Context, MemoryCtx};
    pub use crate::engine::{Engine, EngineKind};
    pub use crate::pipeline::{CompiledPipeline, Pipeline};
    pub use crate::stage::StageId;
}
