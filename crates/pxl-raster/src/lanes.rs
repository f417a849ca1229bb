//! Lane types the engines are instantiated with.
//!
//! Every stage kernel is written once, generic over [`Lanes`], and
//! monomorphized per engine: `f32` for the portable engine, `wide::f32x4`
//! and `wide::f32x8` for the vector engines. Arithmetic goes through the
//! vector operators; anything without a portable vector equivalent
//! (comparisons, `powf`, `floor`) runs lane by lane through
//! [`Lanes::map`] and friends, which keeps results bit-identical across
//! engines.

use std::ops::{Add, Div, Mul, Sub};
use wide::{f32x4, f32x8};

/// Widest lane count of any engine.
pub const MAX_LANES: usize = 8;

/// A register of `WIDTH` pixels' worth of one color channel.
pub trait Lanes:
    Copy
    + Default
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Pixels processed per chunk.
    const WIDTH: usize;

    /// Same value in every lane.
    fn splat(v: f32) -> Self;

    /// Reads the first `WIDTH` values of `v`.
    fn from_slice(v: &[f32]) -> Self;

    /// Writes `WIDTH` values into the front of `out`.
    fn write_to(self, out: &mut [f32]);

    /// Lanewise minimum.
    fn min(self, other: Self) -> Self;

    /// Lanewise maximum.
    fn max(self, other: Self) -> Self;

    /// Lanewise square root.
    fn sqrt(self) -> Self;

    /// Spills to an array; lanes past `WIDTH` are zero.
    #[inline(always)]
    fn to_array(self) -> [f32; MAX_LANES] {
        let mut out = [0.0; MAX_LANES];
        self.write_to(&mut out);
        out
    }

    /// Applies `f` to every lane.
    #[inline(always)]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        let mut v = self.to_array();
        v[..Self::WIDTH].iter_mut().for_each(|x| *x = f(*x));
        Self::from_slice(&v)
    }

    /// Applies `f` lane by lane to two registers.
    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut v = self.to_array();
        let o = other.to_array();
        v[..Self::WIDTH]
            .iter_mut()
            .zip(o.iter())
            .for_each(|(x, y)| *x = f(*x, *y));
        Self::from_slice(&v)
    }

    /// Lanewise `if test(a, b) { then } else { otherwise }`.
    #[inline(always)]
    fn select(test: impl Fn(f32, f32) -> bool, a: Self, b: Self, then: Self, otherwise: Self) -> Self {
        let (a, b) = (a.to_array(), b.to_array());
        let (t, mut out) = (then.to_array(), otherwise.to_array());
        for i in 0..Self::WIDTH {
            if test(a[i], b[i]) {
                out[i] = t[i];
            }
        }
        Self::from_slice(&out)
    }

    /// Clamps every lane to [0, 1].
    #[inline(always)]
    fn clamp01(self) -> Self {
        self.max(Self::splat(0.0)).min(Self::splat(1.0))
    }

    /// Lanewise floor.
    #[inline(always)]
    fn floor(self) -> Self {
        self.map(f32::floor)
    }

    /// Lanewise absolute value.
    #[inline(always)]
    fn abs(self) -> Self {
        self.map(f32::abs)
    }
}

impl Lanes for f32 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline(always)]
    fn from_slice(v: &[f32]) -> Self {
        v[0]
    }

    #[inline(always)]
    fn write_to(self, out: &mut [f32]) {
        out[0] = self;
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline(always)]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        f(self)
    }
}

macro_rules! wide_lanes {
    ($ty:ty, $n:literal) => {
        impl Lanes for $ty {
            const WIDTH: usize = $n;

            #[inline(always)]
            fn splat(v: f32) -> Self {
                <$ty>::splat(v)
            }

            #[inline(always)]
            fn from_slice(v: &[f32]) -> Self {
                let mut a = [0.0f32; $n];
                a.copy_from_slice(&v[..$n]);
                <$ty>::from(a)
            }

            #[inline(always)]
            fn write_to(self, out: &mut [f32]) {
                out[..$n].copy_from_slice(&self.to_array());
            }

            #[inline(always)]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }

            #[inline(always)]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }
        }
    };
}

wide_lanes!(f32x4, 4);
wide_lanes!(f32x8, 8);
