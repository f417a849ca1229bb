//! Rec.709 (BT.709) camera curve.
//!
//! Decoding uses the inverse OETF, which is what an ICC-style color space
//! tagged as Rec.709 or Rec.2020 carries.

use crate::TransferFn;

/// Inverse OETF in parametric form.
pub const TRANSFER_FN: TransferFn = TransferFn {
    g: 1.0 / 0.45,
    a: 1.0 / 1.099,
    b: 0.099 / 1.099,
    c: 1.0 / 4.5,
    d: 0.081,
    e: 0.0,
    f: 0.0,
};
