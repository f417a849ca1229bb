//! Read-only constants handed to every pipeline run.

use crate::lanes::MAX_LANES;

/// Lane-index sequences used by coordinate-generating stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    /// `[0.0, 1.0, 2.0, ...]`.
    pub iota_f: [f32; MAX_LANES],
    /// `[0, 1, 2, ...]`.
    pub iota_i: [u32; MAX_LANES],
}

/// The process-wide constants block.
pub static CONSTANTS: Constants = Constants {
    iota_f: [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
    iota_i: [0, 1, 2, 3, 4, 5, 6, 7],
};
