//! Executor properties: spans, tails and engines.

use pxl_core::PixelFormat;
use pxl_raster::{Context, Engine, GatherCtx, MemoryCtx, Pipeline, StageId, available};

use crate::harness::{
    Fixtures, Span, close, premul_pixels, run_f32, same_bits, sample_pixels, touches_memory,
};

/// Not a multiple of any engine width.
const W: usize = 13;

fn engines() -> Vec<Engine> {
    available()
}

/// Smoke test: half-intensity premultiplied blue over opaque red.
#[test]
fn test_blue_over_red_every_engine() {
    for engine in engines() {
        let src = [0u8, 0, 128, 128];
        let mut dst = [255u8, 0, 0, 255];
        {
            let src_ctx = MemoryCtx::new(&src[..], 1);
            let dst_ctx = MemoryCtx::new_mut(&mut dst[..], 1);
            let mut p = Pipeline::new();
            p.append(StageId::Load8888, Context::Memory(&src_ctx));
            p.append(StageId::Load8888Dst, Context::Memory(&dst_ctx));
            p.append(StageId::SrcOver, Context::None);
            p.append(StageId::Store8888, Context::Memory(&dst_ctx));
            p.compile_on(&engine).run(0, 0, 1);
        }
        assert_eq!(dst, [127, 0, 128, 255], "engine {}", engine.name());
    }
}

#[test]
fn test_empty_pipeline_is_noop() {
    let p = Pipeline::new();
    for engine in engines() {
        for n in [0, 1, W, 1 << 16] {
            p.run_on(&engine, 0, 0, n);
            p.compile_on(&engine).run(7, 3, n);
        }
    }
    assert!(p.compile().is_empty());
}

#[test]
fn test_tail_matches_per_pixel_every_stage() {
    let fx = Fixtures::default();
    let src = sample_pixels(W);
    let dst: Vec<_> = premul_pixels(W).into_iter().rev().collect();
    for engine in engines() {
        for &id in StageId::ALL {
            let Some(middle) = fx.single(id) else {
                continue;
            };
            let whole = run_f32(&engine, &middle, &src, &dst, Span::Whole);
            let single = run_f32(&engine, &middle, &src, &dst, Span::PerPixel);
            for (i, (a, b)) in whole.iter().zip(&single).enumerate() {
                assert!(
                    a.iter().zip(b).all(|(x, y)| same_bits(*x, *y)),
                    "stage {id} on {} pixel {i}: {a:?} vs {b:?}",
                    engine.name()
                );
            }
        }
    }
}

#[test]
fn test_engines_agree_every_stage() {
    let fx = Fixtures::default();
    let n = 37;
    let src = premul_pixels(n);
    let dst = sample_pixels(n + 5)[5..].to_vec();
    let portable = Engine::portable();
    for engine in engines() {
        for &id in StageId::ALL {
            let Some(middle) = fx.single(id) else {
                continue;
            };
            let want = run_f32(&portable, &middle, &src, &dst, Span::Whole);
            let got = run_f32(&engine, &middle, &src, &dst, Span::Whole);
            for (i, (a, b)) in want.iter().zip(&got).enumerate() {
                assert!(
                    a.iter().zip(b).all(|(x, y)| close(*x, *y, 1e-6)),
                    "stage {id} on {} pixel {i}: {a:?} vs {b:?}",
                    engine.name()
                );
            }
        }
    }
}

#[test]
fn test_fixtures_cover_catalog() {
    let fx = Fixtures::default();
    let memory = StageId::ALL.iter().filter(|id| touches_memory(**id)).count();
    let other = StageId::ALL.iter().filter(|id| fx.single(**id).is_some()).count();
    assert_eq!(memory + other, StageId::COUNT);
}

/// Source bytes for `format`: floats come from real pixels, integer formats
/// from a byte pattern.
fn encoded(format: PixelFormat, n: usize) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    if !format.is_float() {
        return (0..n * bpp).map(|i| (i * 29 + 7) as u8).collect();
    }
    let px = sample_pixels(n);
    let mut out = vec![0u8; n * bpp];
    {
        let src = MemoryCtx::new(&px[..], n);
        let dst = MemoryCtx::new_mut(&mut out[..], n);
        let mut p = Pipeline::new();
        p.append(StageId::LoadF32, Context::Memory(&src));
        p.append_store(format, Context::Memory(&dst)).unwrap();
        p.run_on(&Engine::portable(), 0, 0, n);
    }
    out
}

#[test]
fn test_memory_stages_stay_in_span() {
    const GUARD: u8 = 0xA5;
    const EXTRA: usize = 3;
    for engine in engines() {
        for format in PixelFormat::ALL {
            let store = if format == PixelFormat::G8 { PixelFormat::Rgba8888 } else { format };
            let bpp = store.bytes_per_pixel();
            let src = encoded(format, W);

            let run = |span: Span| {
                let mut out = vec![GUARD; (W + EXTRA) * bpp];
                {
                    let src_ctx = MemoryCtx::new(&src[..], W);
                    let out_ctx = MemoryCtx::new_mut(&mut out[..], W + EXTRA);
                    let mut p = Pipeline::new();
                    p.append_load(format, Context::Memory(&src_ctx));
                    p.append_store(store, Context::Memory(&out_ctx)).unwrap();
                    match span {
                        Span::Whole => p.run_on(&engine, 0, 0, W),
                        Span::PerPixel => (0..W).for_each(|x| p.run_on(&engine, x, 0, 1)),
                    }
                }
                out
            };

            let whole = run(Span::Whole);
            assert_eq!(whole, run(Span::PerPixel), "{format} on {}", engine.name());
            assert!(
                whole[W * bpp..].iter().all(|&b| b == GUARD),
                "{format} on {} wrote past the span",
                engine.name()
            );
        }
    }
}

#[test]
fn test_offset_span_in_second_row() {
    const STRIDE: usize = 24;
    let src = encoded(PixelFormat::Rgba8888, 2 * STRIDE);
    for engine in engines() {
        let mut out = vec![0u8; 2 * STRIDE * 4];
        {
            let src_ctx = MemoryCtx::new(&src[..], STRIDE);
            let out_ctx = MemoryCtx::new_mut(&mut out[..], STRIDE);
            let mut p = Pipeline::new();
            p.append(StageId::Load8888, Context::Memory(&src_ctx));
            p.append(StageId::Store8888, Context::Memory(&out_ctx));
            p.run_on(&engine, 3, 1, W);
        }
        let lo = (STRIDE + 3) * 4;
        let hi = lo + W * 4;
        assert_eq!(&out[lo..hi], &src[lo..hi], "engine {}", engine.name());
        assert!(out[..lo].iter().chain(&out[hi..]).all(|&b| b == 0));
    }
}

#[test]
fn test_coverage_stages_match_per_pixel() {
    let coverage: Vec<u8> = (0..W).map(|i| (i * 19) as u8).collect();
    let cov_ctx = MemoryCtx::new(&coverage[..], W);
    let src = premul_pixels(W);
    let dst = sample_pixels(W);
    for engine in engines() {
        for id in [StageId::ScaleU8, StageId::LerpU8] {
            let mut middle = Pipeline::new();
            middle.append(id, Context::Memory(&cov_ctx));
            let whole = run_f32(&engine, &middle, &src, &dst, Span::Whole);
            assert_eq!(whole, run_f32(&engine, &middle, &src, &dst, Span::PerPixel));
            // Zero coverage scales to nothing and lerps to the destination.
            let want = if id == StageId::ScaleU8 { [0.0; 4] } else { dst[0] };
            assert_eq!(whole[0], want);
        }
    }
}

#[test]
fn test_gather_matches_per_pixel() {
    let (width, height) = (16, 2);
    let image: Vec<u8> = (0..width * height * 4).map(|i| (i * 7) as u8).collect();
    let gather = GatherCtx { pixels: &image, stride: width, width, height };
    let mut middle = Pipeline::new();
    middle.append(StageId::SeedShader, Context::None);
    middle.append(StageId::Gather8888, Context::Gather(&gather));
    let src = sample_pixels(W);
    for engine in engines() {
        let whole = run_f32(&engine, &middle, &src, &src, Span::Whole);
        assert_eq!(whole, run_f32(&engine, &middle, &src, &src, Span::PerPixel));
        // Row 0, pixel 5.
        let want: [f32; 4] = std::array::from_fn(|c| image[5 * 4 + c] as f32 / 255.0);
        assert_eq!(whole[5], want);
    }
}

#[test]
fn test_fused_srcover_matches_unfused() {
    let src = premul_pixels(W);
    let base = encoded(PixelFormat::Rgba8888, W);
    for engine in engines() {
        let mut fused = base.clone();
        let mut unfused = base.clone();
        {
            let src_ctx = MemoryCtx::new(&src[..], W);
            let fused_ctx = MemoryCtx::new_mut(&mut fused[..], W);
            let unfused_ctx = MemoryCtx::new_mut(&mut unfused[..], W);

            let mut a = Pipeline::new();
            a.append(StageId::LoadF32, Context::Memory(&src_ctx));
            a.append(StageId::SrcOverRgba8888, Context::Memory(&fused_ctx));
            a.run_on(&engine, 0, 0, W);

            let mut b = Pipeline::new();
            b.append(StageId::LoadF32, Context::Memory(&src_ctx));
            b.append(StageId::Load8888Dst, Context::Memory(&unfused_ctx));
            b.append(StageId::SrcOver, Context::None);
            b.append(StageId::Store8888, Context::Memory(&unfused_ctx));
            b.run_on(&engine, 0, 0, W);
        }
        assert_eq!(fused, unfused, "engine {}", engine.name());
    }
}
