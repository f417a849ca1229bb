//! Single-exponent transfer functions.
//!
//! A pure gamma curve is `v^g`; the encode direction is `l^(1/g)`. Both
//! clamp negative input to zero. [`crate::TransferFn::gamma`] is the
//! mirrored parametric form.

/// `v^gamma` for `v > 0`, else 0.
///
/// ```rust
/// use pxl_transfer::gamma::gamma_eotf;
///
/// assert!((gamma_eotf(0.5, 2.2) - 0.2176).abs() < 1e-3);
/// ```
#[inline]
pub fn gamma_eotf(v: f32, gamma: f32) -> f32 {
    if v <= 0.0 { 0.0 } else { v.powf(gamma) }
}

/// `l^(1/gamma)` for `l > 0`, else 0.
#[inline]
pub fn gamma_oetf(l: f32, gamma: f32) -> f32 {
    if l <= 0.0 { 0.0 } else { l.powf(1.0 / gamma) }
}

/// Gamma 2.2 decode.
#[inline]
pub fn eotf_22(v: f32) -> f32 {
    gamma_eotf(v, 2.2)
}

/// Gamma 2.2 encode.
#[inline]
pub fn oetf_22(l: f32) -> f32 {
    gamma_oetf(l, 2.2)
}
