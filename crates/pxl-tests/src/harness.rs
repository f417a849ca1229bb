//! Shared fixtures for the integration tests.
//!
//! Every stage is exercised through the same frame: `load_f32` into the
//! source registers, `load_f32_dst` into the destination registers, the
//! stages under test, then `store_f32`. Results come back as plain RGBA
//! floats so spans, engines and the direct path can be compared pixel by
//! pixel.

use pxl_raster::{
    ByteTables, CallbackCtx, Context, Engine, MemoryCtx, Pipeline, StageId, TileCtx,
    TwoStopGradient,
};
use pxl_transfer::TransferFn;

/// How a span is handed to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// One `run` over all pixels.
    Whole,
    /// One `run` per pixel.
    PerPixel,
}

/// Deterministic RGBA samples in [0, 1] with alpha in [0.2, 1].
pub fn sample_pixels(n: usize) -> Vec<[f32; 4]> {
    (0..n)
        .map(|i| {
            let c = |k: usize| ((i * 37 + k * 53 + 11) % 101) as f32 / 100.0;
            [c(0), c(1), c(2), 0.2 + 0.8 * c(3)]
        })
        .collect()
}

/// [`sample_pixels`] with color multiplied by alpha.
pub fn premul_pixels(n: usize) -> Vec<[f32; 4]> {
    sample_pixels(n)
        .into_iter()
        .map(|[r, g, b, a]| [r * a, g * a, b * a, a])
        .collect()
}

/// Runs `middle` between float loads of `src`/`dst` and a float store.
pub fn run_f32(
    engine: &Engine,
    middle: &Pipeline<'_>,
    src: &[[f32; 4]],
    dst: &[[f32; 4]],
    span: Span,
) -> Vec<[f32; 4]> {
    let n = src.len();
    assert_eq!(dst.len(), n, "source and destination spans differ");
    let mut out = vec![[0.0f32; 4]; n];
    {
        let src_ctx = MemoryCtx::new(src, n);
        let dst_ctx = MemoryCtx::new(dst, n);
        let out_ctx = MemoryCtx::new_mut(&mut out[..], n);
        let mut p = Pipeline::new();
        p.append(StageId::LoadF32, Context::Memory(&src_ctx));
        p.append(StageId::LoadF32Dst, Context::Memory(&dst_ctx));
        p.extend(middle);
        p.append(StageId::StoreF32, Context::Memory(&out_ctx));
        match span {
            Span::Whole => p.run_on(engine, 0, 0, n),
            Span::PerPixel => (0..n).for_each(|x| p.run_on(engine, x, 0, 1)),
        }
    }
    out
}

/// Stages that read or write caller memory through their context.
pub fn touches_memory(id: StageId) -> bool {
    let name = id.name();
    name.starts_with("load_")
        || name.starts_with("store_")
        || matches!(
            id,
            StageId::ScaleU8 | StageId::LerpU8 | StageId::Gather8888 | StageId::SrcOverRgba8888
        )
}

fn invert_rgb(px: &mut [[f32; 4]]) {
    for p in px {
        for c in &mut p[..3] {
            *c = 1.0 - *c;
        }
    }
}

/// Owned contexts for every stage that does not touch memory.
pub struct Fixtures {
    matrix: [f32; 20],
    tf: TransferFn,
    table: Vec<f32>,
    bytes: ByteTables,
    tile: TileCtx,
    gradient: TwoStopGradient,
    callback: CallbackCtx<'static>,
}

impl Default for Fixtures {
    fn default() -> Self {
        let mut bytes = ByteTables::identity();
        bytes.g = std::array::from_fn(|i| 255 - i as u8);
        Self {
            matrix: [
                0.9, 0.1, 0.05, 0.2, 0.8, 0.1, 0.1, 0.05, 1.0, 0.02, 0.3, 0.1, 0.7, 0.0, 0.05,
                0.1, 0.0, 0.2, 0.9, 0.01,
            ],
            tf: pxl_transfer::rec709::TRANSFER_FN,
            table: (0..16).map(|i| (i as f32 / 15.0).powf(1.8)).collect(),
            bytes,
            tile: TileCtx::new(0.4),
            gradient: TwoStopGradient::new([0.1, 0.2, 0.9, 1.0], [0.8, 0.6, 0.0, 0.5]),
            callback: CallbackCtx::new(&invert_rgb),
        }
    }
}

impl Fixtures {
    /// Context for `id`, or `None` for memory stages.
    pub fn context(&self, id: StageId) -> Option<Context<'_>> {
        use StageId as S;
        if touches_memory(id) {
            return None;
        }
        Some(match id {
            S::Callback => Context::Callback(&self.callback),
            S::SetRgb | S::ConstantColor => Context::Color([0.25, 0.5, 0.75, 0.6]),
            S::Dither => Context::Float(1.0 / 255.0),
            S::Scale1Float | S::Lerp1Float => Context::Float(0.4),
            S::Gamma => Context::Float(2.2),
            S::Matrix2x3 => Context::Matrix(&self.matrix[..6]),
            S::Matrix3x3 | S::MatrixPerspective => Context::Matrix(&self.matrix[..9]),
            S::Matrix3x4 => Context::Matrix(&self.matrix[..12]),
            S::Matrix4x5 => Context::Matrix(&self.matrix[..20]),
            S::Parametric | S::ParametricR | S::ParametricG | S::ParametricB | S::ParametricA => {
                Context::Parametric(&self.tf)
            }
            S::TableR | S::TableG | S::TableB | S::TableA => Context::Table(&self.table),
            S::ByteTables => Context::ByteTables(&self.bytes),
            S::ClampX | S::MirrorX | S::RepeatX | S::ClampY | S::MirrorY | S::RepeatY => {
                Context::Tile(&self.tile)
            }
            S::EvenlySpaced2StopGradient => Context::Gradient(&self.gradient),
            _ => Context::None,
        })
    }

    /// One-stage pipeline for `id`, or `None` for memory stages.
    pub fn single(&self, id: StageId) -> Option<Pipeline<'_>> {
        let ctx = self.context(id)?;
        let mut p = Pipeline::new();
        p.append(id, ctx);
        Some(p)
    }
}

/// Equal bit patterns, or both NaN.
pub fn same_bits(a: f32, b: f32) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

/// Equal within `tol`, or both NaN, or the same infinity.
pub fn close(a: f32, b: f32, tol: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= tol
}
