//! Process-wide engine selection.

use std::sync::OnceLock;

use super::{Engine, EngineKind};

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Best tier the running CPU supports.
fn best_kind() -> EngineKind {
    if cfg!(any(miri, feature = "portable")) {
        return EngineKind::Portable;
    }
    [EngineKind::Avx2, EngineKind::Sse2, EngineKind::Neon]
        .into_iter()
        .find(|k| k.is_supported())
        .unwrap_or(EngineKind::Portable)
}

/// The engine every pipeline runs on by default.
///
/// Probed once on first use; later calls return the same engine. Under Miri
/// or with the `portable` feature the portable engine is forced.
pub fn engine() -> &'static Engine {
    ENGINE.get_or_init(|| {
        let kind = best_kind();
        tracing::debug!(engine = kind.name(), width = kind.lanes(), "selected raster engine");
        Engine::build(kind)
    })
}

/// Every engine runnable on this CPU, narrowest first.
pub fn available() -> Vec<Engine> {
    EngineKind::ALL.into_iter().filter_map(Engine::new).collect()
}

impl Engine {
    /// See [`available`].
    pub fn available() -> Vec<Engine> {
        available()
    }
}
