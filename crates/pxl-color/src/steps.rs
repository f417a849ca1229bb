//! Color-step planning.
//!
//! Converting a pixel between two color spaces and alpha conventions takes
//! at most five steps, always in this order:
//!
//! ```text
//! unpremul -> linearize -> gamut transform -> encode -> premul
//! ```
//!
//! The gamut transform must see linear light, and premultiplying comes last
//! because premultiplied destinations store alpha-scaled *encoded* values.
//! [`ColorStepPlan::new`] decides which steps are needed; the plan is then
//! applied to single pixels with [`ColorStepPlan::apply`] or appended to a
//! raster pipeline with [`ColorStepPlan::append_to`].

use pxl_core::AlphaType;
use pxl_raster::{Context, Pipeline, StageId};
use pxl_transfer::TransferFn;

use crate::space::ColorSpace;

/// Which steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StepFlags {
    /// Divide color by alpha.
    pub unpremul: bool,
    /// Decode with the source curve.
    pub linearize: bool,
    /// Multiply by the gamut matrix.
    pub gamut_transform: bool,
    /// Encode with the inverse destination curve.
    pub encode: bool,
    /// Multiply color by alpha.
    pub premul: bool,
}

impl StepFlags {
    /// Flags packed into the low five bits, in step order.
    pub fn mask(&self) -> u8 {
        (self.unpremul as u8)
            | (self.linearize as u8) << 1
            | (self.gamut_transform as u8) << 2
            | (self.encode as u8) << 3
            | (self.premul as u8) << 4
    }

    /// No step runs.
    pub fn is_identity(&self) -> bool {
        self.mask() == 0
    }
}

/// Steps and parameters converting `(src space, src alpha)` to
/// `(dst space, dst alpha)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStepPlan {
    /// Steps to run.
    pub flags: StepFlags,
    /// Source decoding curve per channel.
    pub src_tf: [TransferFn; 3],
    /// Destination encoding curve per channel.
    pub dst_tf_inv: [TransferFn; 3],
    /// Row-major linear source RGB -> linear destination RGB.
    pub src_to_dst_matrix: [f32; 9],
    src_is_srgb: bool,
    dst_is_srgb: bool,
}

impl ColorStepPlan {
    /// Plans the conversion.
    ///
    /// A missing source space means sRGB; a missing destination space means
    /// "same as source". An opaque destination accepts whatever alpha
    /// convention the source uses.
    pub fn new(
        src: Option<&ColorSpace>,
        src_alpha: AlphaType,
        dst: Option<&ColorSpace>,
        dst_alpha: AlphaType,
    ) -> Self {
        let dst_alpha = if dst_alpha.is_opaque() { src_alpha } else { dst_alpha };
        let srgb;
        let src = match src {
            Some(s) => s,
            None => {
                srgb = ColorSpace::srgb();
                &srgb
            }
        };
        let dst = dst.unwrap_or(src);

        let mut plan = Self::identity();
        if src == dst && src_alpha == dst_alpha {
            tracing::trace!(flags = plan.flags.mask(), "identity color plan");
            return plan;
        }

        let flags = &mut plan.flags;
        flags.unpremul = src_alpha.is_premul();
        flags.linearize = !src.gamma_is_linear();
        flags.gamut_transform = !src.gamut_eq(dst);
        flags.encode = !dst.gamma_is_linear();
        flags.premul = !src_alpha.is_opaque() && dst_alpha.is_premul();

        // A decode immediately undone by the same encode, on every channel.
        if flags.linearize
            && flags.encode
            && !flags.gamut_transform
            && curves_bit_eq(src.transfer_fns(), dst.transfer_fns())
        {
            flags.linearize = false;
            flags.encode = false;
        }
        // Nothing nonlinear between unpremul and premul.
        if flags.unpremul && flags.premul && !flags.linearize && !flags.encode {
            flags.unpremul = false;
            flags.premul = false;
        }

        if flags.gamut_transform {
            plan.src_to_dst_matrix = dst.from_xyz_d50().mul_mat(src.to_xyz_d50()).to_row_major();
        }
        if flags.linearize {
            plan.src_tf = *src.transfer_fns();
            plan.src_is_srgb = src.gamma_close_to_srgb();
        }
        if flags.encode {
            plan.dst_tf_inv = *dst.inv_transfer_fns();
            plan.dst_is_srgb = dst.gamma_close_to_srgb();
        }

        tracing::trace!(
            unpremul = plan.flags.unpremul,
            linearize = plan.flags.linearize,
            gamut_transform = plan.flags.gamut_transform,
            encode = plan.flags.encode,
            premul = plan.flags.premul,
            "planned color steps"
        );
        plan
    }

    /// The do-nothing plan.
    pub fn identity() -> Self {
        Self {
            flags: StepFlags::default(),
            src_tf: [TransferFn::LINEAR; 3],
            dst_tf_inv: [TransferFn::LINEAR; 3],
            src_to_dst_matrix: pxl_math::Mat3::IDENTITY.to_row_major(),
            src_is_srgb: false,
            dst_is_srgb: false,
        }
    }

    /// No step runs.
    pub fn is_identity(&self) -> bool {
        self.flags.is_identity()
    }

    /// Converts one pixel in place.
    pub fn apply(&self, rgba: &mut [f32; 4]) {
        let [r, g, b, a] = rgba;
        if self.flags.unpremul {
            let inv = 1.0 / *a;
            let inv = if inv.is_finite() { inv } else { 0.0 };
            *r *= inv;
            *g *= inv;
            *b *= inv;
        }
        if self.flags.linearize {
            *r = self.src_tf[0].eval(*r);
            *g = self.src_tf[1].eval(*g);
            *b = self.src_tf[2].eval(*b);
        }
        if self.flags.gamut_transform {
            let m = &self.src_to_dst_matrix;
            let (x, y, z) = (*r, *g, *b);
            *r = x * m[0] + y * m[1] + z * m[2];
            *g = x * m[3] + y * m[4] + z * m[5];
            *b = x * m[6] + y * m[7] + z * m[8];
        }
        if self.flags.encode {
            *r = self.dst_tf_inv[0].eval(*r);
            *g = self.dst_tf_inv[1].eval(*g);
            *b = self.dst_tf_inv[2].eval(*b);
        }
        if self.flags.premul {
            *r *= *a;
            *g *= *a;
            *b *= *a;
        }
    }

    /// Appends the planned steps as pipeline stages, using dedicated sRGB
    /// and pure-gamma stages when the curves allow. Channels with different
    /// curves get one parametric stage each.
    pub fn append_to<'a>(&'a self, p: &mut Pipeline<'a>) {
        if self.flags.unpremul {
            p.append(StageId::Unpremul, Context::None);
        }
        if self.flags.linearize {
            append_curve(p, &self.src_tf, self.src_is_srgb, StageId::FromSrgb);
        }
        if self.flags.gamut_transform {
            p.append(StageId::Matrix3x3, Context::Matrix(&self.src_to_dst_matrix));
        }
        if self.flags.encode {
            append_curve(p, &self.dst_tf_inv, self.dst_is_srgb, StageId::ToSrgb);
        }
        if self.flags.premul {
            p.append(StageId::Premul, Context::None);
        }
    }
}

fn curves_bit_eq(a: &[TransferFn; 3], b: &[TransferFn; 3]) -> bool {
    a.iter().zip(b).all(|(a, b)| a.bit_eq(b))
}

fn append_curve<'a>(
    p: &mut Pipeline<'a>,
    tfs: &'a [TransferFn; 3],
    is_srgb: bool,
    srgb_stage: StageId,
) {
    let [r, g, b] = tfs;
    if is_srgb {
        p.append(srgb_stage, Context::None);
        return;
    }
    if !(r.bit_eq(g) && g.bit_eq(b)) {
        p.append(StageId::ParametricR, Context::Parametric(r));
        p.append(StageId::ParametricG, Context::Parametric(g));
        p.append(StageId::ParametricB, Context::Parametric(b));
        return;
    }
    if g.is_pure_gamma() {
        p.append(StageId::Gamma, Context::Float(g.g));
    } else {
        p.append(StageId::Parametric, Context::Parametric(g));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::GammaCurve;
    use approx::assert_abs_diff_eq;

    const ALPHAS: [AlphaType; 3] = [AlphaType::Opaque, AlphaType::Premul, AlphaType::Unpremul];

    fn flags(plan: &ColorStepPlan) -> [bool; 5] {
        let f = plan.flags;
        [f.unpremul, f.linearize, f.gamut_transform, f.encode, f.premul]
    }

    #[test]
    fn test_identity_plans() {
        for space in [ColorSpace::srgb(), ColorSpace::display_p3(), ColorSpace::adobe_rgb()] {
            for alpha in ALPHAS {
                let plan = ColorStepPlan::new(Some(&space), alpha, Some(&space), alpha);
                assert!(plan.is_identity());
                let mut px = [0.3, 0.6, 0.9, 0.5];
                plan.apply(&mut px);
                assert_eq!(px, [0.3, 0.6, 0.9, 0.5]);
            }
        }
    }

    #[test]
    fn test_missing_spaces() {
        let plan = ColorStepPlan::new(None, AlphaType::Premul, None, AlphaType::Premul);
        assert!(plan.is_identity());
        let srgb = ColorSpace::srgb();
        let plan = ColorStepPlan::new(None, AlphaType::Premul, Some(&srgb), AlphaType::Opaque);
        assert!(plan.is_identity());
    }

    #[test]
    fn test_gamut_change_keeps_curves() {
        let plan = ColorStepPlan::new(
            Some(&ColorSpace::srgb()),
            AlphaType::Premul,
            Some(&ColorSpace::display_p3()),
            AlphaType::Premul,
        );
        assert_eq!(flags(&plan), [true, true, true, true, true]);
    }

    #[test]
    fn test_alpha_only_change() {
        let s = ColorSpace::srgb();
        let plan = ColorStepPlan::new(Some(&s), AlphaType::Premul, Some(&s), AlphaType::Unpremul);
        assert_eq!(flags(&plan), [true, false, false, false, false]);

        let plan = ColorStepPlan::new(Some(&s), AlphaType::Unpremul, Some(&s), AlphaType::Premul);
        assert_eq!(flags(&plan), [false, false, false, false, true]);

        let plan = ColorStepPlan::new(Some(&s), AlphaType::Opaque, Some(&s), AlphaType::Premul);
        assert!(plan.is_identity());
    }

    #[test]
    fn test_linear_destination() {
        let plan = ColorStepPlan::new(
            Some(&ColorSpace::srgb()),
            AlphaType::Premul,
            Some(&ColorSpace::srgb_linear()),
            AlphaType::Premul,
        );
        assert_eq!(flags(&plan), [true, true, false, false, true]);
        let mut px = [0.25, 0.25, 0.25, 0.5];
        plan.apply(&mut px);
        let l = pxl_transfer::srgb::eotf(0.5);
        assert_abs_diff_eq!(px[0], l * 0.5, epsilon = 1e-5);
        assert_eq!(px[3], 0.5);
    }

    #[test]
    fn test_unpremul_zero_alpha() {
        let s = ColorSpace::srgb();
        let plan = ColorStepPlan::new(Some(&s), AlphaType::Premul, Some(&s), AlphaType::Unpremul);
        let mut px = [0.5, 0.5, 0.5, 0.0];
        plan.apply(&mut px);
        assert_eq!(px, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_stage_selection() {
        let p3 = ColorSpace::display_p3();
        let adobe = ColorSpace::adobe_rgb();
        let rec2020 = ColorSpace::rec2020();

        let plan = ColorStepPlan::new(Some(&p3), AlphaType::Opaque, Some(&adobe), AlphaType::Opaque);
        let mut p = Pipeline::new();
        plan.append_to(&mut p);
        assert_eq!(p.dump(), ["from_srgb", "matrix_3x3", "gamma"]);

        let plan = ColorStepPlan::new(Some(&rec2020), AlphaType::Unpremul, Some(&p3), AlphaType::Premul);
        let mut p = Pipeline::new();
        plan.append_to(&mut p);
        assert_eq!(p.dump(), ["parametric", "matrix_3x3", "to_srgb", "premul"]);
    }

    #[test]
    fn test_mixed_curves_never_cancel() {
        let srgb = ColorSpace::srgb();
        let mixed = ColorSpace::from_gammas(
            [
                GammaCurve::Value(1.0),
                GammaCurve::Parametric(TransferFn::SRGB),
                GammaCurve::Value(1.8),
            ],
            *srgb.to_xyz_d50(),
        )
        .unwrap();
        let plan = ColorStepPlan::new(Some(&mixed), AlphaType::Unpremul, Some(&srgb), AlphaType::Unpremul);
        assert_eq!(flags(&plan), [false, true, false, true, false]);

        let mut px = [0.5, 0.5, 0.5, 1.0];
        plan.apply(&mut px);
        assert_abs_diff_eq!(px[0], pxl_transfer::srgb::oetf(0.5), epsilon = 1e-4);
        assert_abs_diff_eq!(px[1], 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(px[2], pxl_transfer::srgb::oetf(0.5f32.powf(1.8)), epsilon = 1e-4);

        let mut p = Pipeline::new();
        plan.append_to(&mut p);
        assert_eq!(p.dump(), ["parametric_r", "parametric_g", "parametric_b", "to_srgb"]);
    }

    #[test]
    fn test_matrix_is_dst_inverse_times_src() {
        let (s, d) = (ColorSpace::srgb(), ColorSpace::display_p3());
        let plan = ColorStepPlan::new(Some(&s), AlphaType::Opaque, Some(&d), AlphaType::Opaque);
        let expected = d.from_xyz_d50().mul_mat(s.to_xyz_d50()).to_row_major();
        assert_eq!(plan.src_to_dst_matrix, expected);
        // sRGB white stays white in P3.
        let mut white = [1.0, 1.0, 1.0, 1.0];
        plan.apply(&mut white);
        for c in &white[..3] {
            assert_abs_diff_eq!(*c, 1.0, epsilon = 1e-3);
        }
    }
}
