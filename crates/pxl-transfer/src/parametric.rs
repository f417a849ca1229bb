//! Seven-coefficient piecewise transfer function.
//!
//! ```text
//! f(x) = c*x + f            for 0 <= x < d
//! f(x) = (a*x + b)^g + e    for d <= x
//! f(-x) = -f(x)
//! ```

/// Piecewise-parametric transfer function.
///
/// Covers pure gamma (`a = 1`, everything else zero), sRGB-like curves with
/// a linear toe, and their inverses. Negative inputs are mirrored around
/// zero so out-of-gamut values survive a decode/encode round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferFn {
    /// Exponent of the power segment.
    pub g: f32,
    /// Power segment input scale.
    pub a: f32,
    /// Power segment input offset.
    pub b: f32,
    /// Linear segment slope.
    pub c: f32,
    /// Breakpoint between the segments.
    pub d: f32,
    /// Power segment output offset.
    pub e: f32,
    /// Linear segment output offset.
    pub f: f32,
}

impl TransferFn {
    /// Identity.
    pub const LINEAR: Self = Self::gamma(1.0);

    /// sRGB decoding curve (IEC 61966-2-1).
    pub const SRGB: Self = Self {
        g: 2.4,
        a: 1.0 / 1.055,
        b: 0.055 / 1.055,
        c: 1.0 / 12.92,
        d: 0.04045,
        e: 0.0,
        f: 0.0,
    };

    /// Pure 2.2 exponent.
    pub const GAMMA_2_2: Self = Self::gamma(2.2);

    /// Pure exponent curve `x^g`.
    #[inline]
    pub const fn gamma(g: f32) -> Self {
        Self {
            g,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Coefficients as `[g, a, b, c, d, e, f]`.
    #[inline]
    pub const fn to_array(&self) -> [f32; 7] {
        [self.g, self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Inverse of [`TransferFn::to_array`].
    #[inline]
    pub const fn from_array(v: [f32; 7]) -> Self {
        Self {
            g: v[0],
            a: v[1],
            b: v[2],
            c: v[3],
            d: v[4],
            e: v[5],
            f: v[6],
        }
    }

    /// Evaluates the curve.
    #[inline]
    pub fn eval(&self, x: f32) -> f32 {
        let (sign, x) = if x < 0.0 { (-1.0, -x) } else { (1.0, x) };
        let y = if x < self.d {
            self.c * x + self.f
        } else {
            (self.a * x + self.b).powf(self.g) + self.e
        };
        sign * y
    }

    /// Algebraic inverse.
    ///
    /// Returns `None` when a segment the curve actually uses is constant
    /// (zero slope or zero exponent) and therefore has no inverse.
    pub fn invert(&self) -> Option<Self> {
        if !self.is_valid() {
            return None;
        }
        let mut inv = Self::from_array([0.0; 7]);

        if self.d > 0.0 {
            if self.c == 0.0 {
                return None;
            }
            inv.c = 1.0 / self.c;
            inv.f = -self.f / self.c;
        }

        // A breakpoint at or beyond 1 leaves only the linear segment in use.
        let power_used = self.d < 1.0;
        if self.a != 0.0 && self.g != 0.0 {
            inv.g = 1.0 / self.g;
            inv.a = (1.0 / self.a).powf(self.g);
            inv.b = -inv.a * self.e;
            inv.e = -self.b / self.a;
        } else if power_used {
            return None;
        }

        inv.d = self.c * self.d + self.f;
        Some(inv)
    }

    /// Pointwise inverse evaluated segment by segment.
    ///
    /// Splits at `c*d + f` and inverts each segment in isolation without
    /// mirroring negatives. Constant segments map to 0. Only meaningful for
    /// continuous, increasing curves; [`TransferFn::invert`] is exact.
    pub fn eval_inverse_approx(&self, y: f32) -> f32 {
        let interval = self.c * self.d + self.f;
        if y < interval {
            if self.c == 0.0 {
                0.0
            } else {
                (y - self.f) / self.c
            }
        } else if self.a == 0.0 || self.g == 0.0 {
            0.0
        } else {
            ((y - self.e).powf(1.0 / self.g) - self.b) / self.a
        }
    }

    /// All coefficients finite and the exponent positive.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite()) && self.g >= 0.0 && self.d >= 0.0
    }

    /// `x^g` with no toe or offsets.
    #[inline]
    pub fn is_pure_gamma(&self) -> bool {
        self.a == 1.0
            && self.b == 0.0
            && self.c == 0.0
            && self.d == 0.0
            && self.e == 0.0
            && self.f == 0.0
    }

    /// The curve is the identity on [0, 1].
    pub fn is_linear(&self) -> bool {
        const TOL: f32 = 1e-5;
        let linear_segment = (self.c - 1.0).abs() < TOL && self.f.abs() < TOL;
        let power_segment = (self.g - 1.0).abs() < TOL
            && (self.a - 1.0).abs() < TOL
            && (self.b + self.e).abs() < TOL;
        if self.d <= 0.0 {
            power_segment
        } else if self.d >= 1.0 {
            linear_segment
        } else {
            linear_segment && power_segment
        }
    }

    /// Every coefficient within `tol` of `other`.
    pub fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Close enough to [`TransferFn::SRGB`] to use dedicated sRGB code.
    #[inline]
    pub fn is_close_to_srgb(&self) -> bool {
        self.approx_eq(&Self::SRGB, 1e-3)
    }

    /// Bitwise equality of all coefficients (`0.0` and `-0.0` differ).
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Default for TransferFn {
    fn default() -> Self {
        Self::LINEAR
    }
}
