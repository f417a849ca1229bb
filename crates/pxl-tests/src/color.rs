//! Color properties: planned steps, their pipeline form and the direct
//! buffer transform.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use pxl_color::{ColorSpace, ColorSpaceXform, ColorStepPlan, GammaCurve};
use pxl_core::{AlphaType, PixelFormat};
use pxl_math::simd::unorm8;
use pxl_raster::{Context, MemoryCtx, Pipeline, StageId, available};

use crate::harness::{Span, premul_pixels, run_f32, sample_pixels};

const ALPHAS: [AlphaType; 3] = [AlphaType::Opaque, AlphaType::Premul, AlphaType::Unpremul];

fn spaces() -> Vec<(&'static str, ColorSpace)> {
    vec![
        ("srgb", ColorSpace::srgb()),
        ("srgb-linear", ColorSpace::srgb_linear()),
        ("display-p3", ColorSpace::display_p3()),
        ("rec2020", ColorSpace::rec2020()),
        ("adobe-rgb", ColorSpace::adobe_rgb()),
    ]
}

/// Inputs valid for `alpha`: premultiplied color never exceeds alpha and
/// opaque pixels have alpha 1.
fn inputs(alpha: AlphaType, n: usize) -> Vec<[f32; 4]> {
    match alpha {
        AlphaType::Premul => premul_pixels(n),
        AlphaType::Unpremul => sample_pixels(n),
        AlphaType::Opaque => sample_pixels(n).into_iter().map(|[r, g, b, _]| [r, g, b, 1.0]).collect(),
    }
}

#[test]
fn test_identity_plan() {
    for (name, space) in spaces() {
        for alpha in ALPHAS {
            let plan = ColorStepPlan::new(Some(&space), alpha, Some(&space), alpha);
            assert!(plan.is_identity(), "{name} {alpha:?}");
            for px in inputs(alpha, 16) {
                let mut out = px;
                plan.apply(&mut out);
                assert_eq!(out, px);
            }
            let mut p = Pipeline::new();
            plan.append_to(&mut p);
            assert!(p.empty());
        }
    }
}

#[test]
fn test_direct_matches_pipeline() {
    for (src_name, src) in spaces() {
        for (dst_name, dst) in spaces() {
            for src_alpha in ALPHAS {
                for dst_alpha in ALPHAS {
                    let plan = ColorStepPlan::new(Some(&src), src_alpha, Some(&dst), dst_alpha);
                    let mut middle = Pipeline::new();
                    plan.append_to(&mut middle);

                    for n in [1, 13] {
                        let px = inputs(src_alpha, n);
                        let want: Vec<_> = px
                            .iter()
                            .map(|p| {
                                let mut p = *p;
                                plan.apply(&mut p);
                                p
                            })
                            .collect();
                        for engine in available() {
                            let got = run_f32(&engine, &middle, &px, &px, Span::Whole);
                            for (w, g) in want.iter().zip(&got) {
                                for c in 0..4 {
                                    assert!(
                                        (w[c] - g[c]).abs() < 1e-3,
                                        "{src_name} {src_alpha:?} -> {dst_name} {dst_alpha:?} \
                                         on {}: {w:?} vs {g:?}",
                                        engine.name()
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_direct_matches_pipeline_8888() {
    let n = 13;
    let bytes: Vec<u8> = premul_pixels(n)
        .iter()
        .flat_map(|px| px.map(unorm8))
        .collect();
    for (_, src) in spaces() {
        for (_, dst) in spaces() {
            let plan = ColorStepPlan::new(Some(&src), AlphaType::Premul, Some(&dst), AlphaType::Premul);
            for engine in available() {
                let mut out = vec![0u8; n * 4];
                {
                    let src_ctx = MemoryCtx::new(&bytes[..], n);
                    let out_ctx = MemoryCtx::new_mut(&mut out[..], n);
                    let mut p = Pipeline::new();
                    p.append(StageId::Load8888, Context::Memory(&src_ctx));
                    plan.append_to(&mut p);
                    p.append(StageId::Store8888, Context::Memory(&out_ctx));
                    p.run_on(&engine, 0, 0, n);
                }
                for (px, got) in bytes.chunks_exact(4).zip(out.chunks_exact(4)) {
                    let mut f: [f32; 4] = std::array::from_fn(|c| px[c] as f32 / 255.0);
                    plan.apply(&mut f);
                    for c in 0..4 {
                        assert!(unorm8(f[c]).abs_diff(got[c]) <= 1, "{f:?} vs {got:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_cancellation() {
    let srgb = ColorSpace::srgb();
    let p3 = ColorSpace::display_p3();

    // Same curve, different gamut: the decode and encode both stay.
    let plan = ColorStepPlan::new(Some(&srgb), AlphaType::Unpremul, Some(&p3), AlphaType::Unpremul);
    assert!(plan.flags.linearize && plan.flags.gamut_transform && plan.flags.encode);

    // Same space, opaque vs premul: no alpha work.
    for (a, b) in [(AlphaType::Opaque, AlphaType::Premul), (AlphaType::Premul, AlphaType::Opaque)] {
        let plan = ColorStepPlan::new(Some(&srgb), a, Some(&srgb), b);
        assert!(!plan.flags.unpremul && !plan.flags.premul, "{a:?} -> {b:?}");
    }

    // Same space, premul -> unpremul only divides.
    let plan = ColorStepPlan::new(Some(&p3), AlphaType::Premul, Some(&p3), AlphaType::Unpremul);
    assert!(plan.flags.unpremul);
    assert!(!plan.flags.linearize && !plan.flags.gamut_transform && !plan.flags.encode);
    assert!(!plan.flags.premul);
}

#[test]
fn test_mixed_curves_convert_every_channel() {
    let srgb = ColorSpace::srgb();
    let mixed = ColorSpace::from_gammas(
        [
            GammaCurve::Value(1.0),
            GammaCurve::Parametric(pxl_transfer::TransferFn::SRGB),
            GammaCurve::Value(1.8),
        ],
        *srgb.to_xyz_d50(),
    )
    .unwrap();
    let plan = ColorStepPlan::new(Some(&mixed), AlphaType::Unpremul, Some(&srgb), AlphaType::Unpremul);
    assert!(!plan.is_identity());

    let src = [128u8, 128, 128, 255];
    let mut direct = [0u8; 4];
    let xform = ColorSpaceXform::new(&mixed, &srgb).unwrap();
    assert!(xform.apply(PixelFormat::Rgba8888, &mut direct, PixelFormat::Rgba8888, &src, 1, AlphaType::Unpremul));
    assert!(direct[0] > 180 && direct[2] > 140, "{direct:?}");

    let mut planned: [f32; 4] = src.map(|c| c as f32 / 255.0);
    plan.apply(&mut planned);
    for c in 0..4 {
        assert!(unorm8(planned[c]).abs_diff(direct[c]) <= 1, "{planned:?} vs {direct:?}");
    }

    let mut middle = Pipeline::new();
    plan.append_to(&mut middle);
    let px = [src.map(|c| c as f32 / 255.0)];
    for engine in available() {
        let got = run_f32(&engine, &middle, &px, &px, Span::Whole);
        for c in 0..4 {
            assert_abs_diff_eq!(got[0][c], planned[c], epsilon = 1e-3);
        }
    }
}

fn round_trip(a: &ColorSpace, b: &ColorSpace, tol: f32) {
    let there = ColorStepPlan::new(Some(a), AlphaType::Unpremul, Some(b), AlphaType::Unpremul);
    let back = ColorStepPlan::new(Some(b), AlphaType::Unpremul, Some(a), AlphaType::Unpremul);
    // Pure gamma curves are steep at 0, so stay a little above it.
    for px in sample_pixels(64) {
        let px = px.map(|c| 0.02 + 0.98 * c);
        let mut v = px;
        there.apply(&mut v);
        back.apply(&mut v);
        for c in 0..4 {
            assert_abs_diff_eq!(v[c], px[c], epsilon = tol);
        }
    }
}

#[test]
fn test_round_trip_parametric() {
    let all = spaces();
    for (_, a) in &all {
        for (_, b) in &all {
            round_trip(a, b, 1e-3);
        }
    }
}

#[test]
fn test_round_trip_table_curve() {
    let table: Arc<[f32]> = (0..64).map(|i| (i as f32 / 63.0).powf(1.9)).collect();
    let srgb = ColorSpace::srgb();
    let tabled = ColorSpace::from_gammas(
        [
            GammaCurve::Table(table.clone()),
            GammaCurve::Table(table.clone()),
            GammaCurve::Table(table),
        ],
        *srgb.to_xyz_d50(),
    )
    .unwrap();
    round_trip(&tabled, &ColorSpace::display_p3(), 1e-2);
    round_trip(&ColorSpace::rec2020(), &tabled, 1e-2);
}

fn xform_round_trip(a: &ColorSpace, b: &ColorSpace, src: &[u8]) {
    let there = ColorSpaceXform::new(a, b).unwrap();
    let back = ColorSpaceXform::new(b, a).unwrap();
    let n = src.len() / 4;
    let mut mid = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];
    assert!(there.apply(PixelFormat::Rgba8888, &mut mid, PixelFormat::Rgba8888, src, n, AlphaType::Unpremul));
    assert!(back.apply(PixelFormat::Rgba8888, &mut out, PixelFormat::Rgba8888, &mid, n, AlphaType::Unpremul));
    for (a, b) in src.iter().zip(&out) {
        assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
    }
}

#[test]
fn test_xform_round_trip_bytes() {
    let srgb = ColorSpace::srgb();
    let g22 = srgb.with_transfer_fn(pxl_transfer::TransferFn::GAMMA_2_2).unwrap();
    let colors: Vec<u8> = (0..4096usize).map(|i| ((i * 97) >> 2) as u8).collect();
    xform_round_trip(&srgb, &g22, &colors);

    // A wider gamut quantizes saturated colors coarsely; grays map to grays.
    let grays: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v, 255 - v]).collect();
    xform_round_trip(&srgb, &ColorSpace::display_p3(), &grays);
}

#[test]
fn test_xform_matches_plan() {
    let n = 61;
    let src: Vec<u8> = (0..n * 4).map(|i| ((i * 53 + 17) % 256) as u8).collect();
    for (src_name, a) in spaces() {
        for (dst_name, b) in spaces() {
            let xform = ColorSpaceXform::new(&a, &b).unwrap();
            for alpha in [AlphaType::Unpremul, AlphaType::Premul] {
                let plan = ColorStepPlan::new(Some(&a), AlphaType::Unpremul, Some(&b), alpha);
                let mut out = vec![0u8; n * 4];
                xform
                    .try_apply(PixelFormat::Rgba8888, &mut out, PixelFormat::Rgba8888, &src, n, alpha)
                    .unwrap();
                for (px, got) in src.chunks_exact(4).zip(out.chunks_exact(4)) {
                    let mut f: [f32; 4] = std::array::from_fn(|c| px[c] as f32 / 255.0);
                    plan.apply(&mut f);
                    for c in 0..3 {
                        assert!(
                            unorm8(f[c]).abs_diff(got[c]) <= 1,
                            "{src_name} -> {dst_name} {alpha:?}: {px:?} gave {got:?}, plan {f:?}"
                        );
                    }
                    assert_eq!(got[3], px[3]);
                }
            }
        }
    }
}

#[test]
fn test_xform_float_outputs_agree() {
    let src: Vec<u8> = (0..64u8).flat_map(|v| [v * 4, 255 - v * 4, v, 200]).collect();
    let xform = ColorSpaceXform::new(&ColorSpace::rec2020(), &ColorSpace::srgb()).unwrap();
    let mut f32_out = vec![0.0f32; 64 * 4];
    let mut f16_out = vec![0u16; 64 * 4];
    xform
        .try_apply(
            PixelFormat::RgbaF32,
            bytemuck::cast_slice_mut(&mut f32_out),
            PixelFormat::Rgba8888,
            &src,
            64,
            AlphaType::Unpremul,
        )
        .unwrap();
    xform
        .try_apply(
            PixelFormat::RgbaF16,
            bytemuck::cast_slice_mut(&mut f16_out),
            PixelFormat::Rgba8888,
            &src,
            64,
            AlphaType::Unpremul,
        )
        .unwrap();

    // Decode the halves through a pipeline.
    let mut decoded = vec![[0.0f32; 4]; 64];
    {
        let h = MemoryCtx::new(&f16_out[..], 64);
        let d = MemoryCtx::new_mut(&mut decoded[..], 64);
        let mut p = Pipeline::new();
        p.append(StageId::LoadF16, Context::Memory(&h));
        p.append(StageId::StoreF32, Context::Memory(&d));
        p.run(0, 0, 64);
    }
    for (h, f) in decoded.iter().zip(f32_out.chunks_exact(4)) {
        for c in 0..4 {
            assert_abs_diff_eq!(h[c], f[c], epsilon = 2e-3);
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_serial() {
    let n = 10_000;
    let src: Vec<u8> = (0..n * 4).map(|i| (i % 251) as u8).collect();
    let xform = ColorSpaceXform::new(&ColorSpace::adobe_rgb(), &ColorSpace::rec2020()).unwrap();
    let mut serial = vec![0u8; n * 4];
    let mut parallel = vec![0u8; n * 4];
    xform
        .try_apply(PixelFormat::Rgba8888, &mut serial, PixelFormat::Rgba8888, &src, n, AlphaType::Premul)
        .unwrap();
    xform
        .apply_parallel(PixelFormat::Rgba8888, &mut parallel, PixelFormat::Rgba8888, &src, n, AlphaType::Premul)
        .unwrap();
    assert_eq!(serial, parallel);
}
