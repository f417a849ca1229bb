//! Engines: one complete stage table per lane width.
//!
//! A program is a flat slot array `[fn0, ctx0, fn1, ctx1, ..., just_return]`.
//! The start trampoline runs the program once per full chunk of
//! `V::WIDTH` pixels and once more with `tail` set to the leftover count.
//! Every stage finishes by calling [`Registers::next_stage`], which jumps two
//! slots ahead; the terminator simply returns.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2;
mod select;

pub use select::{available, engine};

use wide::{f32x4, f32x8};

use crate::constants::Constants;
use crate::context::Context;
use crate::kernels;
use crate::lanes::Lanes;
use crate::stage::StageId;

/// Implementation of one stage for lane type `V`.
pub type StageFn<V> = for<'p, 'a> fn(&mut Registers<'p, 'a, V>);

/// Start trampoline: `(program, constants, x, y, n)`.
pub type StartFn<V> = for<'p, 'a> fn(&'p [Slot<'a, V>], &'p Constants, usize, usize, usize);

/// One program slot.
#[derive(Clone, Copy)]
pub enum Slot<'a, V> {
    /// Stage entry point.
    Stage(StageFn<V>),
    /// The context of the preceding stage.
    Ctx(Context<'a>),
}

/// Per-chunk execution state handed from stage to stage.
pub struct Registers<'p, 'a, V> {
    program: &'p [Slot<'a, V>],
    ip: usize,
    /// First pixel of the chunk.
    pub dx: usize,
    /// Row.
    pub dy: usize,
    /// 0 for a full chunk, else the number of valid lanes.
    pub tail: usize,
    /// Source red.
    pub r: V,
    /// Source green.
    pub g: V,
    /// Source blue.
    pub b: V,
    /// Source alpha.
    pub a: V,
    /// Destination red.
    pub dr: V,
    /// Destination green.
    pub dg: V,
    /// Destination blue.
    pub db: V,
    /// Destination alpha.
    pub da: V,
    /// Shared constants block.
    pub k: &'p Constants,
}

impl<'p, 'a, V: Lanes> Registers<'p, 'a, V> {
    /// Context of the running stage.
    #[inline(always)]
    pub fn ctx(&self) -> Context<'a> {
        match self.program.get(self.ip + 1) {
            Some(Slot::Ctx(c)) => *c,
            _ => Context::None,
        }
    }

    /// Number of lanes holding real pixels.
    #[inline(always)]
    pub fn active(&self) -> usize {
        if self.tail == 0 { V::WIDTH } else { self.tail }
    }

    /// Chains to the following stage.
    #[inline(always)]
    pub fn next_stage(&mut self) {
        self.ip += 2;
        if let Some(&Slot::Stage(f)) = self.program.get(self.ip) {
            f(self)
        }
    }
}

#[inline(always)]
fn launch<V: Lanes>(program: &[Slot<'_, V>], k: &Constants, dx: usize, dy: usize, tail: usize) {
    let Some(Slot::Stage(first)) = program.first() else {
        return;
    };
    let zero = V::splat(0.0);
    let mut regs = Registers {
        program,
        ip: 0,
        dx,
        dy,
        tail,
        r: zero,
        g: zero,
        b: zero,
        a: zero,
        dr: zero,
        dg: zero,
        db: zero,
        da: zero,
        k,
    };
    first(&mut regs);
}

#[inline(always)]
fn start_pipeline<V: Lanes>(program: &[Slot<'_, V>], k: &Constants, x: usize, y: usize, n: usize) {
    let end = x + n;
    let mut dx = x;
    while dx + V::WIDTH <= end {
        launch(program, k, dx, y, 0);
        dx += V::WIDTH;
    }
    if dx < end {
        launch(program, k, dx, y, end - dx);
    }
}

fn just_return<V: Lanes>(_: &mut Registers<'_, '_, V>) {}

/// Every stage implementation for lane type `V`, plus the start trampoline
/// and the terminator.
pub struct StageTable<V> {
    stages: [StageFn<V>; StageId::COUNT],
    start: StartFn<V>,
    just_return: StageFn<V>,
}

impl<V: Lanes> StageTable<V> {
    pub(crate) fn new() -> Self {
        Self::with(kernels::stage_fn::<V>, start_pipeline::<V>)
    }

    fn with(stage: impl Fn(StageId) -> StageFn<V>, start: StartFn<V>) -> Self {
        Self {
            stages: std::array::from_fn(|i| stage(StageId::ALL[i])),
            start,
            just_return: just_return::<V>,
        }
    }

    /// Implementation of `id`.
    #[inline]
    pub fn stage(&self, id: StageId) -> StageFn<V> {
        self.stages[id as usize]
    }

    /// Start trampoline.
    #[inline]
    pub fn start(&self) -> StartFn<V> {
        self.start
    }

    /// Terminator.
    #[inline]
    pub fn just_return(&self) -> StageFn<V> {
        self.just_return
    }
}

/// Instruction-set tier an engine targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// One pixel at a time, available everywhere.
    Portable,
    /// 4 lanes, x86 SSE2.
    Sse2,
    /// 8 lanes, x86 AVX2 + FMA. Kernels and the trampoline are compiled
    /// with both features enabled.
    Avx2,
    /// 4 lanes, aarch64 NEON.
    Neon,
}

impl EngineKind {
    /// Every tier, narrowest first.
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Portable,
        EngineKind::Sse2,
        EngineKind::Avx2,
        EngineKind::Neon,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Portable => "portable",
            EngineKind::Sse2 => "sse2",
            EngineKind::Avx2 => "avx2",
            EngineKind::Neon => "neon",
        }
    }

    /// Pixels per chunk.
    pub fn lanes(self) -> usize {
        match self {
            EngineKind::Portable => 1,
            EngineKind::Sse2 | EngineKind::Neon => 4,
            EngineKind::Avx2 => 8,
        }
    }

    /// Probes the running CPU.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    pub fn is_supported(self) -> bool {
        match self {
            EngineKind::Portable => true,
            EngineKind::Sse2 => is_x86_feature_detected!("sse2"),
            EngineKind::Avx2 => {
                is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
            }
            EngineKind::Neon => false,
        }
    }

    /// Probes the running CPU.
    #[cfg(target_arch = "aarch64")]
    pub fn is_supported(self) -> bool {
        matches!(self, EngineKind::Portable | EngineKind::Neon)
    }

    /// Probes the running CPU.
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn is_supported(self) -> bool {
        self == EngineKind::Portable
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete stage table bound to its lane type.
///
/// The vector engines run on `wide` lanes. The SSE2 and NEON tables use the
/// instructions the build targets; the AVX2 table wraps every kernel in a
/// function compiled for AVX2 and FMA and is only built after detecting both.
pub enum Engine {
    /// Scalar lanes.
    Portable(StageTable<f32>),
    /// 4 x f32.
    Sse2(StageTable<f32x4>),
    /// 8 x f32.
    Avx2(StageTable<f32x8>),
    /// 4 x f32.
    Neon(StageTable<f32x4>),
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn avx2_table() -> StageTable<f32x8> {
    StageTable::with(kernels::avx2_stage_fn, avx2::start)
}

// Never selected off x86.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn avx2_table() -> StageTable<f32x8> {
    StageTable::new()
}

impl Engine {
    /// Builds the engine for `kind` when the running CPU supports it.
    pub fn new(kind: EngineKind) -> Option<Self> {
        kind.is_supported().then(|| Self::build(kind))
    }

    /// The scalar engine.
    pub fn portable() -> Self {
        Self::build(EngineKind::Portable)
    }

    fn build(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Portable => Engine::Portable(StageTable::new()),
            EngineKind::Sse2 => Engine::Sse2(StageTable::new()),
            EngineKind::Avx2 => Engine::Avx2(avx2_table()),
            EngineKind::Neon => Engine::Neon(StageTable::new()),
        }
    }

    /// Tier of this engine.
    pub fn kind(&self) -> EngineKind {
        match self {
            Engine::Portable(_) => EngineKind::Portable,
            Engine::Sse2(_) => EngineKind::Sse2,
            Engine::Avx2(_) => EngineKind::Avx2,
            Engine::Neon(_) => EngineKind::Neon,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Pixels per chunk.
    pub fn lanes(&self) -> usize {
        self.kind().lanes()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("kind", &self.kind())
            .field("lanes", &self.lanes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_always_supported() {
        assert!(EngineKind::Portable.is_supported());
        let e = Engine::portable();
        assert_eq!(e.kind(), EngineKind::Portable);
        assert_eq!(e.lanes(), 1);
    }

    #[test]
    fn test_new_matches_probe() {
        for kind in EngineKind::ALL {
            assert_eq!(Engine::new(kind).is_some(), kind.is_supported());
        }
    }

    #[test]
    fn test_avx2_matches_portable() {
        let Some(avx2) = Engine::new(EngineKind::Avx2) else {
            return;
        };
        let Engine::Avx2(table) = &avx2 else {
            unreachable!()
        };
        let k = &crate::constants::CONSTANTS;
        let mut out = [[0.0f32; 4]; 11];
        {
            let dst = crate::context::MemoryCtx::new_mut(&mut out[..], 11);
            let program = [
                Slot::Stage(table.stage(StageId::SeedShader)),
                Slot::Ctx(Context::None),
                Slot::Stage(table.stage(StageId::Scale1Float)),
                Slot::Ctx(Context::Float(0.1)),
                Slot::Stage(table.stage(StageId::StoreF32)),
                Slot::Ctx(Context::Memory(&dst)),
                Slot::Stage(table.just_return()),
            ];
            (table.start())(&program, k, 0, 0, 11);
        }
        for (x, px) in out.iter().enumerate() {
            assert_eq!(px[0], (x as f32 + 0.5) * 0.1);
            assert_eq!(px[1], 0.5 * 0.1);
        }
    }

    #[test]
    fn test_table_covers_catalog() {
        let table = StageTable::<f32x4>::new();
        assert_eq!(table.stages.len(), StageId::COUNT);
        let _ = table.stage(StageId::SrcOver);
    }
}
