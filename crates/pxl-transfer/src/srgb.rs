//! sRGB transfer function (IEC 61966-2-1).
//!
//! Linear toe below `0.04045` encoded / `0.0031308` linear, 2.4 power
//! curve above. The parametric form is [`TransferFn::SRGB`](crate::TransferFn::SRGB).

/// Encoded sRGB -> linear.
///
/// ```rust
/// use pxl_transfer::srgb::eotf;
///
/// assert!((eotf(0.5) - 0.214).abs() < 0.01);
/// ```
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear -> encoded sRGB.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear values for every 8-bit sRGB code.
pub fn eotf_table() -> [f32; 256] {
    crate::table::byte_table(eotf)
}
