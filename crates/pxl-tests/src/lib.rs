//! Integration tests for pxl crates.
//!
//! End-to-end checks that run `pxl-raster` pipelines and `pxl-color`
//! conversions together: span and tail handling for every stage, engine
//! equivalence, and agreement between planned color steps, their pipeline
//! form and the direct buffer transform.

pub mod harness;

#[cfg(test)]
mod color;
#[cfg(test)]
mod raster;
