//! Color spaces as the planner and the direct converter see them.
//!
//! A [`ColorSpace`] is three per-channel decoding curves plus a linear
//! RGB -> XYZ(D50) matrix. Planning works on parametric curves, so a space
//! also keeps one [`TransferFn`] per channel and its inverse, computed and
//! validated once at construction.

use std::sync::Arc;

use pxl_math::Mat3;
use pxl_primaries::{self as primaries, Primaries};
use pxl_transfer::{TransferFn, gamma, rec709, table};

use crate::error::{ColorError, ColorResult};

/// Exponent of the Adobe RGB (1998) curve.
const ADOBE_RGB_GAMMA: f32 = 563.0 / 256.0;

/// Decoding curve of one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum GammaCurve {
    /// `x^g`.
    Value(f32),
    /// Samples at evenly spaced encoded positions over [0, 1].
    Table(Arc<[f32]>),
    /// Piecewise-parametric curve.
    Parametric(TransferFn),
}

impl GammaCurve {
    /// Parametric form. Tables are approximated by a fitted exponent.
    pub fn transfer_fn(&self) -> Option<TransferFn> {
        match self {
            GammaCurve::Value(g) => Some(TransferFn::gamma(*g)),
            GammaCurve::Table(t) => table::fit_exponent(t).map(TransferFn::gamma),
            GammaCurve::Parametric(tf) => Some(*tf),
        }
    }

    /// Encoded -> linear.
    #[inline]
    pub fn eval(&self, x: f32) -> f32 {
        match self {
            GammaCurve::Value(g) => gamma::gamma_eotf(x, *g),
            GammaCurve::Table(t) => table::interp_lut(x, t),
            GammaCurve::Parametric(tf) => tf.eval(x),
        }
    }

    /// Linear -> encoded.
    ///
    /// Parametric curves use [`TransferFn::eval_inverse_approx`], which is
    /// exact only for continuous increasing curves.
    #[inline]
    pub fn eval_inverse(&self, y: f32) -> f32 {
        match self {
            GammaCurve::Value(g) => gamma::gamma_oetf(y, *g),
            GammaCurve::Table(t) => table::interp_lut_inv(y, t),
            GammaCurve::Parametric(tf) => tf.eval_inverse_approx(y),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            GammaCurve::Value(g) => g.is_finite() && *g > 0.0,
            GammaCurve::Table(t) => table::is_valid_table(t),
            GammaCurve::Parametric(tf) => tf.is_valid(),
        }
    }
}

impl From<TransferFn> for GammaCurve {
    fn from(tf: TransferFn) -> Self {
        GammaCurve::Parametric(tf)
    }
}

/// Recognized curve families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GammaNamed {
    /// Identity.
    Linear,
    /// sRGB.
    Srgb,
    /// Pure 2.2 exponent.
    TwoDotTwo,
    /// Anything else, including every table curve.
    NonStandard,
}

fn classify(gammas: &[GammaCurve; 3], tf: &TransferFn) -> GammaNamed {
    let shared = gammas[1..].iter().all(|g| *g == gammas[0]);
    if !shared || matches!(gammas[0], GammaCurve::Table(_)) {
        return GammaNamed::NonStandard;
    }
    if tf.is_linear() {
        GammaNamed::Linear
    } else if tf.is_close_to_srgb() {
        GammaNamed::Srgb
    } else if tf.approx_eq(&TransferFn::GAMMA_2_2, 1e-3) {
        GammaNamed::TwoDotTwo
    } else {
        GammaNamed::NonStandard
    }
}

/// An RGB color space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    gammas: [GammaCurve; 3],
    named: GammaNamed,
    transfer_fns: [TransferFn; 3],
    inv_transfer_fns: [TransferFn; 3],
    to_xyz_d50: Mat3,
    from_xyz_d50: Mat3,
}

impl ColorSpace {
    fn builtin(p: &Primaries, tf: TransferFn) -> Self {
        // Built-in primaries and curves always invert.
        let to_xyz_d50 = primaries::to_xyz_d50(p).unwrap_or(Mat3::IDENTITY);
        let from_xyz_d50 = to_xyz_d50.inverse().unwrap_or(Mat3::IDENTITY);
        let gammas = [tf.into(), tf.into(), tf.into()];
        Self {
            named: classify(&gammas, &tf),
            gammas,
            transfer_fns: [tf; 3],
            inv_transfer_fns: [tf.invert().unwrap_or(TransferFn::LINEAR); 3],
            to_xyz_d50,
            from_xyz_d50,
        }
    }

    /// sRGB (IEC 61966-2-1).
    pub fn srgb() -> Self {
        Self::builtin(&primaries::SRGB, TransferFn::SRGB)
    }

    /// sRGB primaries, linear curve.
    pub fn srgb_linear() -> Self {
        Self::builtin(&primaries::SRGB, TransferFn::LINEAR)
    }

    /// Display P3: P3 primaries, D65 white, sRGB curve.
    pub fn display_p3() -> Self {
        Self::builtin(&primaries::DISPLAY_P3, TransferFn::SRGB)
    }

    /// Rec.2020 primaries with the Rec.709 camera curve.
    pub fn rec2020() -> Self {
        Self::builtin(&primaries::REC2020, rec709::TRANSFER_FN)
    }

    /// Adobe RGB (1998).
    pub fn adobe_rgb() -> Self {
        Self::builtin(&primaries::ADOBE_RGB, TransferFn::gamma(ADOBE_RGB_GAMMA))
    }

    /// Space from primaries and a shared curve.
    pub fn from_primaries(p: &Primaries, tf: TransferFn) -> ColorResult<Self> {
        let to_xyz_d50 = primaries::to_xyz_d50(p).ok_or(ColorError::NonInvertible("primaries"))?;
        Self::from_gammas([tf.into(), tf.into(), tf.into()], to_xyz_d50)
    }

    /// Space from per-channel curves and an RGB -> XYZ(D50) matrix.
    ///
    /// Table curves are planned with a fitted exponent.
    pub fn from_gammas(gammas: [GammaCurve; 3], to_xyz_d50: Mat3) -> ColorResult<Self> {
        if !gammas.iter().all(GammaCurve::is_valid) {
            return Err(pxl_core::Error::invalid_parameter("malformed gamma curve").into());
        }
        let from_xyz_d50 = to_xyz_d50
            .inverse()
            .ok_or(ColorError::NonInvertible("gamut matrix"))?;
        let mut transfer_fns = [TransferFn::LINEAR; 3];
        let mut inv_transfer_fns = [TransferFn::LINEAR; 3];
        for (i, curve) in gammas.iter().enumerate() {
            let tf = curve
                .transfer_fn()
                .ok_or(ColorError::NonInvertible("table curve"))?;
            inv_transfer_fns[i] = tf
                .invert()
                .ok_or(ColorError::NonInvertible("transfer function"))?;
            transfer_fns[i] = tf;
        }
        Ok(Self {
            named: classify(&gammas, &transfer_fns[0]),
            gammas,
            transfer_fns,
            inv_transfer_fns,
            to_xyz_d50,
            from_xyz_d50,
        })
    }

    /// Same gamut, different curve.
    pub fn with_transfer_fn(&self, tf: TransferFn) -> ColorResult<Self> {
        Self::from_gammas([tf.into(), tf.into(), tf.into()], self.to_xyz_d50)
    }

    /// Same gamut, linear curve.
    pub fn linear(&self) -> Self {
        let tf = TransferFn::LINEAR;
        Self {
            gammas: [tf.into(), tf.into(), tf.into()],
            named: GammaNamed::Linear,
            transfer_fns: [tf; 3],
            inv_transfer_fns: [tf; 3],
            to_xyz_d50: self.to_xyz_d50,
            from_xyz_d50: self.from_xyz_d50,
        }
    }

    /// Per-channel curves.
    pub fn gammas(&self) -> &[GammaCurve; 3] {
        &self.gammas
    }

    /// Curve family.
    pub fn gamma_named(&self) -> GammaNamed {
        self.named
    }

    /// Per-channel decoding curves used for planning.
    pub fn transfer_fns(&self) -> &[TransferFn; 3] {
        &self.transfer_fns
    }

    /// Per-channel encoding curves used for planning.
    pub fn inv_transfer_fns(&self) -> &[TransferFn; 3] {
        &self.inv_transfer_fns
    }

    /// All three channels decode with the same curve.
    pub fn has_shared_curve(&self) -> bool {
        let [r, g, b] = &self.transfer_fns;
        r.bit_eq(g) && g.bit_eq(b)
    }

    /// Linear RGB -> XYZ(D50).
    pub fn to_xyz_d50(&self) -> &Mat3 {
        &self.to_xyz_d50
    }

    /// XYZ(D50) -> linear RGB.
    pub fn from_xyz_d50(&self) -> &Mat3 {
        &self.from_xyz_d50
    }

    /// Decoding is the identity.
    pub fn gamma_is_linear(&self) -> bool {
        self.named == GammaNamed::Linear
    }

    /// The curve is (close to) sRGB.
    pub fn gamma_close_to_srgb(&self) -> bool {
        self.named == GammaNamed::Srgb
    }

    /// Same RGB -> XYZ(D50) matrix.
    pub fn gamut_eq(&self, other: &ColorSpace) -> bool {
        self.to_xyz_d50 == other.to_xyz_d50
    }

    /// Exactly the built-in sRGB space.
    pub fn is_srgb(&self) -> bool {
        *self == Self::srgb()
    }
}

impl Default for ColorSpace {
    fn default() -> Self {
        Self::srgb()
    }
}
