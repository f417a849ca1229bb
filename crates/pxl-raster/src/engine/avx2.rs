//! AVX2 + FMA entry point for the 8-lane engine.

use wide::f32x8;

use super::{Slot, start_pipeline};
use crate::constants::Constants;

#[target_feature(enable = "avx2,fma")]
unsafe fn start_body(program: &[Slot<'_, f32x8>], k: &Constants, x: usize, y: usize, n: usize) {
    start_pipeline(program, k, x, y, n)
}

/// Start trampoline compiled for AVX2 and FMA.
pub(super) fn start(program: &[Slot<'_, f32x8>], k: &Constants, x: usize, y: usize, n: usize) {
    // SAFETY: only installed in the AVX2 table, which is built after
    // detecting both features.
    unsafe { start_body(program, k, x, y, n) }
}
