//! Chromatic adaptation.
//!
//! Color spaces are compared in a common D50-adapted XYZ frame, so every
//! D65 space goes through [`adapt_matrix`] with [`BRADFORD`] once at
//! construction time.

use crate::{Mat3, Vec3};

/// CIE D65 white (XYZ, Y = 1).
pub const D65: Vec3 = Vec3::new(0.95047, 1.0, 1.08883);

/// CIE D50 white (XYZ, Y = 1), the profile connection space white.
pub const D50: Vec3 = Vec3::new(0.96422, 1.0, 0.82521);

/// Bradford cone response matrix.
pub const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// XYZ scaling (identity cone space).
pub const XYZ_SCALING: Mat3 = Mat3::IDENTITY;

/// Converts a CIE xy chromaticity to XYZ with Y = 1.
#[inline]
pub fn xy_to_xyz(x: f32, y: f32) -> Vec3 {
    if y.abs() < 1e-10 {
        return Vec3::ZERO;
    }
    Vec3::new(x / y, 1.0, (1.0 - x - y) / y)
}

/// Builds a von Kries style adaptation `M^-1 * diag(dst / src) * M`.
///
/// Falls back to identity when `method` is singular.
pub fn adapt_matrix(method: Mat3, src_white: Vec3, dst_white: Vec3) -> Mat3 {
    let Some(inv) = method.inverse() else {
        return Mat3::IDENTITY;
    };
    let src_cone = method * src_white;
    let dst_cone = method * dst_white;
    let gain = dst_cone / src_cone;
    inv * Mat3::diagonal(gain.x, gain.y, gain.z) * method
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_maps_to_white() {
        let m = adapt_matrix(BRADFORD, D65, D50);
        let out = m * D65;
        assert!(out.max_abs_diff(D50) < 1e-4);
    }

    #[test]
    fn test_same_white_is_identity() {
        let m = adapt_matrix(BRADFORD, D50, D50);
        assert!(m.approx_eq(&Mat3::IDENTITY, 1e-5));
    }

    #[test]
    fn test_xy_to_xyz() {
        let w = xy_to_xyz(0.3127, 0.3290);
        assert!(w.max_abs_diff(D65) < 1e-3);
    }
}
