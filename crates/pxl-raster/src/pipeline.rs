//! Pipeline builder and executor.
//!
//! Stages are recorded in an arena as a backward-linked list (the head is the
//! most recent append). Running flattens the list into a program laid out
//! `[fn0, ctx0, fn1, ctx1, ..., just_return]` by writing from the end of the
//! buffer toward the front, so the first appended stage runs first.

use std::fmt;

use pxl_core::{AlphaType, Error, PixelFormat, Result};
use smallvec::{SmallVec, smallvec};
use wide::{f32x4, f32x8};

use crate::constants::CONSTANTS;
use crate::context::Context;
use crate::engine::{Engine, EngineKind, Slot, StageTable, StartFn, engine};
use crate::lanes::Lanes;
use crate::stage::StageId;

/// Program slots kept on the stack by [`Pipeline::run`].
const INLINE_SLOTS: usize = 64;

/// One appended stage.
#[derive(Debug, Clone, Copy)]
pub struct StageRecord<'a> {
    /// Operation.
    pub stage: StageId,
    /// Its context.
    pub ctx: Context<'a>,
    prev: Option<usize>,
}

/// An appendable sequence of stages.
///
/// ```rust
/// use pxl_raster::{Context, MemoryCtx, Pipeline, StageId};
///
/// let src = [0u8, 0, 128, 128];
/// let mut dst = [255u8, 0, 0, 255];
/// {
///     let src_ctx = MemoryCtx::new(&src[..], 1);
///     let dst_ctx = MemoryCtx::new_mut(&mut dst[..], 1);
///     let mut p = Pipeline::new();
///     p.append(StageId::Load8888, Context::Memory(&src_ctx));
///     p.append(StageId::Load8888Dst, Context::Memory(&dst_ctx));
///     p.append(StageId::SrcOver, Context::None);
///     p.append(StageId::Store8888, Context::Memory(&dst_ctx));
///     p.run(0, 0, 1);
/// }
/// assert_eq!(dst, [127, 0, 128, 255]);
/// ```
#[derive(Clone)]
pub struct Pipeline<'a> {
    stages: Vec<StageRecord<'a>>,
    head: Option<usize>,
    num_stages: usize,
    slots_needed: usize,
}

impl<'a> Pipeline<'a> {
    /// Empty pipeline.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            head: None,
            num_stages: 0,
            // The terminator.
            slots_needed: 1,
        }
    }

    /// Removes every stage.
    pub fn reset(&mut self) {
        self.stages.clear();
        self.head = None;
        self.num_stages = 0;
        self.slots_needed = 1;
    }

    /// Appends `stage` with its context. The context variant is not checked
    /// until the stage runs.
    pub fn append(&mut self, stage: StageId, ctx: Context<'a>) {
        let prev = self.head;
        self.stages.push(StageRecord { stage, ctx, prev });
        self.head = Some(self.stages.len() - 1);
        self.num_stages += 1;
        self.slots_needed += 2;
    }

    /// Appends every stage of `other`, in order.
    pub fn extend(&mut self, other: &Pipeline<'a>) {
        for rec in other.records() {
            self.append(rec.stage, rec.ctx);
        }
    }

    /// True when no stage was appended.
    pub fn empty(&self) -> bool {
        self.num_stages == 0
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.num_stages
    }

    /// Program size in slots: two per stage plus the terminator.
    pub fn slots_needed(&self) -> usize {
        self.slots_needed
    }

    /// Stages in execution order.
    pub fn records(&self) -> Vec<StageRecord<'a>> {
        let mut out = Vec::with_capacity(self.num_stages);
        let mut node = self.head;
        while let Some(i) = node {
            out.push(self.stages[i]);
            node = self.stages[i].prev;
        }
        out.reverse();
        out
    }

    /// Stage names in execution order.
    pub fn dump(&self) -> Vec<&'static str> {
        self.records().iter().map(|r| r.stage.name()).collect()
    }

    /// `from_srgb`, plus `clamp_a` when alpha may be below 1 (decoding can
    /// push premultiplied color past alpha).
    pub fn append_from_srgb(&mut self, alpha: AlphaType) {
        self.append(StageId::FromSrgb, Context::None);
        if !alpha.is_opaque() {
            self.append(StageId::ClampA, Context::None);
        }
    }

    /// [`Pipeline::append_from_srgb`] on the destination registers.
    pub fn append_from_srgb_dst(&mut self, alpha: AlphaType) {
        self.append(StageId::FromSrgbDst, Context::None);
        if !alpha.is_opaque() {
            self.append(StageId::ClampADst, Context::None);
        }
    }

    /// Constant color, using the dedicated black and white stages when they
    /// match.
    pub fn append_constant_color(&mut self, rgba: [f32; 4]) {
        if rgba == [0.0, 0.0, 0.0, 1.0] {
            self.append(StageId::BlackColor, Context::None);
        } else if rgba == [1.0, 1.0, 1.0, 1.0] {
            self.append(StageId::WhiteColor, Context::None);
        } else {
            self.append(StageId::ConstantColor, Context::Color(rgba));
        }
    }

    /// Load stage for `format` into the source registers.
    pub fn append_load(&mut self, format: PixelFormat, ctx: Context<'a>) {
        let stage = match format {
            PixelFormat::A8 => StageId::LoadA8,
            PixelFormat::G8 => StageId::LoadG8,
            PixelFormat::Rgb565 => StageId::Load565,
            PixelFormat::Argb4444 => StageId::Load4444,
            PixelFormat::Rgba8888 => StageId::Load8888,
            PixelFormat::Bgra8888 => StageId::LoadBgra,
            PixelFormat::RgbaF16 => StageId::LoadF16,
            PixelFormat::RgbaF32 => StageId::LoadF32,
        };
        self.append(stage, ctx);
    }

    /// Load stage for `format` into the destination registers.
    pub fn append_load_dst(&mut self, format: PixelFormat, ctx: Context<'a>) {
        let stage = match format {
            PixelFormat::A8 => StageId::LoadA8Dst,
            PixelFormat::G8 => StageId::LoadG8Dst,
            PixelFormat::Rgb565 => StageId::Load565Dst,
            PixelFormat::Argb4444 => StageId::Load4444Dst,
            PixelFormat::Rgba8888 => StageId::Load8888Dst,
            PixelFormat::Bgra8888 => StageId::LoadBgraDst,
            PixelFormat::RgbaF16 => StageId::LoadF16Dst,
            PixelFormat::RgbaF32 => StageId::LoadF32Dst,
        };
        self.append(stage, ctx);
    }

    /// Store stage for `format`. Gray has no store stage.
    pub fn append_store(&mut self, format: PixelFormat, ctx: Context<'a>) -> Result<()> {
        let stage = match format {
            PixelFormat::A8 => StageId::StoreA8,
            PixelFormat::G8 => return Err(Error::unsupported_format(format)),
            PixelFormat::Rgb565 => StageId::Store565,
            PixelFormat::Argb4444 => StageId::Store4444,
            PixelFormat::Rgba8888 => StageId::Store8888,
            PixelFormat::Bgra8888 => StageId::StoreBgra,
            PixelFormat::RgbaF16 => StageId::StoreF16,
            PixelFormat::RgbaF32 => StageId::StoreF32,
        };
        self.append(stage, ctx);
        Ok(())
    }

    /// Writes the program into `program`, which holds exactly
    /// `slots_needed()` slots.
    fn flatten<V: Lanes>(&self, table: &StageTable<V>, program: &mut [Slot<'a, V>]) {
        let mut at = program.len() - 1;
        program[at] = Slot::Stage(table.just_return());
        let mut node = self.head;
        while let Some(i) = node {
            let rec = &self.stages[i];
            at -= 2;
            program[at] = Slot::Stage(table.stage(rec.stage));
            program[at + 1] = Slot::Ctx(rec.ctx);
            node = rec.prev;
        }
        debug_assert_eq!(at, 0);
    }

    fn run_with<V: Lanes>(&self, table: &StageTable<V>, x: usize, y: usize, n: usize) {
        let mut program: SmallVec<[Slot<'a, V>; INLINE_SLOTS]> =
            smallvec![Slot::Ctx(Context::None); self.slots_needed];
        self.flatten(table, &mut program);
        (table.start())(&program[..], &CONSTANTS, x, y, n);
    }

    /// Runs pixels `[x, x + n)` of row `y` on the process-wide engine.
    pub fn run(&self, x: usize, y: usize, n: usize) {
        self.run_on(engine(), x, y, n);
    }

    /// [`Pipeline::run`] on an explicit engine.
    pub fn run_on(&self, engine: &Engine, x: usize, y: usize, n: usize) {
        if self.empty() || n == 0 {
            return;
        }
        match engine {
            Engine::Portable(t) => self.run_with(t, x, y, n),
            Engine::Sse2(t) | Engine::Neon(t) => self.run_with(t, x, y, n),
            Engine::Avx2(t) => self.run_with(t, x, y, n),
        }
    }

    fn boxed<V: Lanes>(&self, table: &StageTable<V>) -> Box<[Slot<'a, V>]> {
        let mut program = vec![Slot::Ctx(Context::None); self.slots_needed].into_boxed_slice();
        self.flatten(table, &mut program);
        program
    }

    /// Flattens once into a reusable program for the process-wide engine.
    ///
    /// The result is a snapshot; later appends do not affect it.
    pub fn compile(&self) -> CompiledPipeline<'a> {
        self.compile_on(engine())
    }

    /// [`Pipeline::compile`] for an explicit engine.
    pub fn compile_on(&self, engine: &Engine) -> CompiledPipeline<'a> {
        let program = match engine {
            Engine::Portable(t) => Program::X1(self.boxed(t), t.start()),
            Engine::Sse2(t) | Engine::Neon(t) => Program::X4(self.boxed(t), t.start()),
            Engine::Avx2(t) => Program::X8(self.boxed(t), t.start()),
        };
        tracing::trace!(
            stages = self.num_stages,
            slots = self.slots_needed,
            engine = engine.name(),
            "compiled raster pipeline"
        );
        CompiledPipeline {
            program,
            kind: engine.kind(),
            stages: self.num_stages,
        }
    }
}

impl Default for Pipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.dump())
            .field("slots_needed", &self.slots_needed)
            .finish()
    }
}

impl fmt::Display for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump().join(" -> "))
    }
}

enum Program<'a> {
    X1(Box<[Slot<'a, f32>]>, StartFn<f32>),
    X4(Box<[Slot<'a, f32x4>]>, StartFn<f32x4>),
    X8(Box<[Slot<'a, f32x8>]>, StartFn<f32x8>),
}

/// A flattened pipeline bound to one engine.
///
/// Runs on disjoint spans may happen from several threads at once.
pub struct CompiledPipeline<'a> {
    program: Program<'a>,
    kind: EngineKind,
    stages: usize,
}

impl CompiledPipeline<'_> {
    /// Runs pixels `[x, x + n)` of row `y`.
    pub fn run(&self, x: usize, y: usize, n: usize) {
        if self.stages == 0 || n == 0 {
            return;
        }
        match &self.program {
            Program::X1(p, start) => start(&p[..], &CONSTANTS, x, y, n),
            Program::X4(p, start) => start(&p[..], &CONSTANTS, x, y, n),
            Program::X8(p, start) => start(&p[..], &CONSTANTS, x, y, n),
        }
    }

    /// Engine the program was flattened for.
    pub fn engine(&self) -> EngineKind {
        self.kind
    }

    /// Number of stages captured.
    pub fn len(&self) -> usize {
        self.stages
    }

    /// True when no stage was captured.
    pub fn is_empty(&self) -> bool {
        self.stages == 0
    }
}

impl fmt::Debug for CompiledPipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPipeline")
            .field("engine", &self.kind)
            .field("stages", &self.stages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MemoryCtx;

    fn srcover_8888(src: &[u8], dst: &mut [u8], n: usize, engine: &Engine) {
        let src_ctx = MemoryCtx::new(src, n);
        let dst_ctx = MemoryCtx::new_mut(dst, n);
        let mut p = Pipeline::new();
        p.append(StageId::Load8888, Context::Memory(&src_ctx));
        p.append(StageId::Load8888Dst, Context::Memory(&dst_ctx));
        p.append(StageId::SrcOver, Context::None);
        p.append(StageId::Store8888, Context::Memory(&dst_ctx));
        p.run_on(engine, 0, 0, n);
    }

    #[test]
    fn test_half_blue_over_red() {
        for engine in Engine::available() {
            let mut dst = [255u8, 0, 0, 255];
            srcover_8888(&[0, 0, 128, 128], &mut dst, 1, &engine);
            assert_eq!(dst, [127, 0, 128, 255], "engine {}", engine.name());
        }
    }

    #[test]
    fn test_slots_and_order() {
        let mut p = Pipeline::new();
        assert!(p.empty());
        assert_eq!(p.slots_needed(), 1);
        p.append(StageId::BlackColor, Context::None);
        p.append(StageId::Premul, Context::None);
        p.append(StageId::ClampA, Context::None);
        assert_eq!(p.len(), 3);
        assert_eq!(p.slots_needed(), 7);
        assert_eq!(p.dump(), ["black_color", "premul", "clamp_a"]);
        assert_eq!(p.to_string(), "black_color -> premul -> clamp_a");

        let mut q = Pipeline::new();
        q.append(StageId::SwapRb, Context::None);
        q.extend(&p);
        assert_eq!(q.dump(), ["swap_rb", "black_color", "premul", "clamp_a"]);
        assert_eq!(q.slots_needed(), 9);

        q.reset();
        assert!(q.empty());
        assert_eq!(q.slots_needed(), 1);
    }

    #[test]
    fn test_flatten_layout() {
        let mut p = Pipeline::new();
        p.append(StageId::Gamma, Context::Float(2.0));
        p.append(StageId::Premul, Context::None);
        let table = StageTable::<f32>::new();
        let mut program = vec![Slot::Ctx(Context::None); p.slots_needed()];
        p.flatten(&table, &mut program);
        assert!(matches!(program[0], Slot::Stage(_)));
        assert!(matches!(program[1], Slot::Ctx(Context::Float(g)) if g == 2.0));
        assert!(matches!(program[2], Slot::Stage(_)));
        assert!(matches!(program[3], Slot::Ctx(Context::None)));
        assert!(matches!(program[4], Slot::Stage(_)));
    }

    #[test]
    fn test_empty_pipeline_is_noop() {
        let p = Pipeline::new();
        p.run(0, 0, 100);
        let c = p.compile();
        assert!(c.is_empty());
        c.run(0, 0, 100);
    }

    #[test]
    fn test_tail_stays_in_span() {
        for engine in Engine::available() {
            let src = [200u8; 4 * 11];
            let mut dst = [7u8; 4 * 16];
            {
                let src_ctx = MemoryCtx::new(&src[..], 11);
                let dst_ctx = MemoryCtx::new_mut(&mut dst[..], 16);
                let mut p = Pipeline::new();
                p.append(StageId::Load8888, Context::Memory(&src_ctx));
                p.append(StageId::Store8888, Context::Memory(&dst_ctx));
                p.run_on(&engine, 2, 0, 9);
            }
            assert!(dst[..8].iter().all(|&b| b == 7), "engine {}", engine.name());
            assert!(dst[8..44].iter().all(|&b| b == 200), "engine {}", engine.name());
            assert!(dst[44..].iter().all(|&b| b == 7), "engine {}", engine.name());
        }
    }

    #[test]
    fn test_compiled_is_reusable_and_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledPipeline<'static>>();

        let mut dst = [0u8; 4 * 32];
        {
            let dst_ctx = MemoryCtx::new_mut(&mut dst[..], 8);
            let mut p = Pipeline::new();
            p.append_constant_color([1.0, 1.0, 1.0, 1.0]);
            p.append(StageId::Store8888, Context::Memory(&dst_ctx));
            let c = p.compile();
            std::thread::scope(|s| {
                for y in 0..4 {
                    let c = &c;
                    s.spawn(move || c.run(0, y, 8));
                }
            });
        }
        assert!(dst.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_store_formats() {
        let mut p = Pipeline::new();
        assert!(p.append_store(PixelFormat::G8, Context::None).is_err());
        assert!(p.append_store(PixelFormat::RgbaF16, Context::None).is_ok());
        assert_eq!(p.dump(), ["store_f16"]);

        // Every format has a load.
        let mut p = Pipeline::new();
        p.append_load(PixelFormat::G8, Context::None);
        p.append_load_dst(PixelFormat::Bgra8888, Context::None);
        assert_eq!(p.dump(), ["load_g8", "load_bgra_dst"]);
    }

    #[test]
    #[should_panic(expected = "stage `gamma` expects a Float context")]
    fn test_wrong_context_panics() {
        let mut p = Pipeline::new();
        p.append(StageId::Gamma, Context::None);
        p.run_on(&Engine::portable(), 0, 0, 1);
    }
}
