//! SIMD helpers for buffer-to-buffer color conversion.
//!
//! Pixels are processed planar, four at a time: the caller gathers the red,
//! green and blue channels of four pixels into separate `[f32; 4]` lanes,
//! runs them through these helpers and scatters the result back.
//!
//! ```rust
//! use pxl_math::simd::{transform_rgb_x4, unorm8_x4};
//!
//! let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
//! let (r, _, _) = transform_rgb_x4(&identity, [0.5; 4], [0.0; 4], [1.0; 4]);
//! assert_eq!(unorm8_x4(r), [128; 4]);
//! ```

use wide::f32x4;

/// Multiplies four RGB triplets (planar) by a row-major 3x3 matrix.
#[inline]
pub fn transform_rgb_x4(
    m: &[f32; 9],
    r: [f32; 4],
    g: [f32; 4],
    b: [f32; 4],
) -> ([f32; 4], [f32; 4], [f32; 4]) {
    let (r, g, b) = (f32x4::from(r), f32x4::from(g), f32x4::from(b));
    let row = |i: usize| {
        f32x4::splat(m[i]) * r + f32x4::splat(m[i + 1]) * g + f32x4::splat(m[i + 2]) * b
    };
    (row(0).to_array(), row(3).to_array(), row(6).to_array())
}

/// Scales normalized floats to bytes, rounding half up.
///
/// Values at or above 254.5/255 saturate to 255, values below 0.5/255
/// become 0.
#[inline]
pub fn unorm8_x4(values: [f32; 4]) -> [u8; 4] {
    let v = (f32x4::from(values) * f32x4::splat(255.0))
        .max(f32x4::splat(0.0))
        .min(f32x4::splat(255.0))
        + f32x4::splat(0.5);
    v.to_array().map(|x| x as u8)
}

/// Scalar counterpart of [`unorm8_x4`].
#[inline]
pub fn unorm8(v: f32) -> u8 {
    let v = v * 255.0;
    if v >= 254.5 {
        255
    } else if v >= 0.5 {
        (v + 0.5) as u8
    } else {
        0
    }
}
