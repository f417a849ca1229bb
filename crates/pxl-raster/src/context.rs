//! Per-stage contexts.
//!
//! Each appended stage carries one [`Context`]. Which variant a stage expects
//! is part of its catalog entry; handing a stage the wrong variant is a
//! caller bug and panics when the stage runs.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use bytemuck::Pod;
use pxl_transfer::TransferFn;

/// Borrowed context of one pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub enum Context<'a> {
    /// No context.
    #[default]
    None,
    /// Pixel rows to load from or store into.
    Memory(&'a MemoryCtx<'a>),
    /// Image sampled at computed coordinates.
    Gather(&'a GatherCtx<'a>),
    /// Four color components.
    Color([f32; 4]),
    /// One scalar (rate, exponent, coverage).
    Float(f32),
    /// Row-major matrix coefficients.
    Matrix(&'a [f32]),
    /// Piecewise-parametric curve.
    Parametric(&'a TransferFn),
    /// Sampled curve over [0, 1].
    Table(&'a [f32]),
    /// Per-channel byte lookup.
    ByteTables(&'a ByteTables),
    /// Tiling extent.
    Tile(&'a TileCtx),
    /// Two-stop gradient coefficients.
    Gradient(&'a TwoStopGradient),
    /// Client closure.
    Callback(&'a CallbackCtx<'a>),
}

impl Context<'_> {
    /// Variant name, used in contract-violation panics.
    pub fn kind(&self) -> &'static str {
        match self {
            Context::None => "None",
            Context::Memory(_) => "Memory",
            Context::Gather(_) => "Gather",
            Context::Color(_) => "Color",
            Context::Float(_) => "Float",
            Context::Matrix(_) => "Matrix",
            Context::Parametric(_) => "Parametric",
            Context::Table(_) => "Table",
            Context::ByteTables(_) => "ByteTables",
            Context::Tile(_) => "Tile",
            Context::Gradient(_) => "Gradient",
            Context::Callback(_) => "Callback",
        }
    }
}

enum Pixels<'a> {
    Read(&'a [u8]),
    Write(&'a [AtomicU8]),
}

/// A caller-owned pixel buffer addressed as rows of `stride` pixels.
///
/// Pixel `(x, y)` of a format with `N` bytes per pixel starts at byte
/// `(y * stride + x) * N`. Writable buffers are viewed through atomics with
/// relaxed ordering, so a compiled pipeline holding one stays `Sync` and can
/// be run from several threads on disjoint spans.
pub struct MemoryCtx<'a> {
    pixels: Pixels<'a>,
    stride: usize,
}

impl<'a> MemoryCtx<'a> {
    /// Read-only view, for load stages.
    pub fn new<T: Pod>(pixels: &'a [T], stride: usize) -> Self {
        Self {
            pixels: Pixels::Read(bytemuck::cast_slice(pixels)),
            stride,
        }
    }

    /// Writable view, for store stages (and loads from the same buffer).
    pub fn new_mut<T: Pod>(pixels: &'a mut [T], stride: usize) -> Self {
        let bytes: &'a mut [u8] = bytemuck::cast_slice_mut(pixels);
        // SAFETY: AtomicU8 has the size, alignment and bit validity of u8,
        // and the exclusive borrow keeps non-atomic access out for 'a.
        let atomics = unsafe { &*(bytes as *mut [u8] as *mut [AtomicU8]) };
        Self {
            pixels: Pixels::Write(atomics),
            stride,
        }
    }

    /// Row stride in pixels.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Buffer size in bytes.
    pub fn len_bytes(&self) -> usize {
        match self.pixels {
            Pixels::Read(p) => p.len(),
            Pixels::Write(p) => p.len(),
        }
    }

    /// Whether store stages may target this buffer.
    pub fn is_writable(&self) -> bool {
        matches!(self.pixels, Pixels::Write(_))
    }

    #[inline]
    fn range<const N: usize>(&self, x: usize, y: usize) -> Option<std::ops::Range<usize>> {
        let start = y.checked_mul(self.stride)?.checked_add(x)?.checked_mul(N)?;
        let end = start.checked_add(N)?;
        (end <= self.len_bytes()).then_some(start..end)
    }

    /// Bytes of pixel `(x, y)`, or `None` when outside the buffer.
    #[inline]
    pub fn load<const N: usize>(&self, x: usize, y: usize) -> Option<[u8; N]> {
        let range = self.range::<N>(x, y)?;
        let mut out = [0u8; N];
        match self.pixels {
            Pixels::Read(p) => out.copy_from_slice(&p[range]),
            Pixels::Write(p) => {
                for (o, b) in out.iter_mut().zip(&p[range]) {
                    *o = b.load(Ordering::Relaxed);
                }
            }
        }
        Some(out)
    }

    /// Writes pixel `(x, y)`. Returns false when the buffer is read-only or
    /// the pixel lies outside it.
    #[inline]
    pub fn store<const N: usize>(&self, x: usize, y: usize, px: [u8; N]) -> bool {
        let Pixels::Write(p) = self.pixels else {
            return false;
        };
        let Some(range) = self.range::<N>(x, y) else {
            return false;
        };
        for (b, v) in p[range].iter().zip(px) {
            b.store(v, Ordering::Relaxed);
        }
        true
    }
}

impl fmt::Debug for MemoryCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCtx")
            .field("bytes", &self.len_bytes())
            .field("stride", &self.stride)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// An RGBA8888 image sampled by `gather_8888`.
#[derive(Debug, Clone, Copy)]
pub struct GatherCtx<'a> {
    /// Tightly packed RGBA bytes.
    pub pixels: &'a [u8],
    /// Row stride in pixels.
    pub stride: usize,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
}

/// Per-channel 256-entry byte lookup tables.
#[derive(Debug, Clone)]
pub struct ByteTables {
    /// Red table.
    pub r: [u8; 256],
    /// Green table.
    pub g: [u8; 256],
    /// Blue table.
    pub b: [u8; 256],
    /// Alpha table.
    pub a: [u8; 256],
}

impl ByteTables {
    /// Identity tables.
    pub fn identity() -> Self {
        let t: [u8; 256] = std::array::from_fn(|i| i as u8);
        Self { r: t, g: t, b: t, a: t }
    }
}

/// Extent for the tiling stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCtx {
    /// Tile size.
    pub scale: f32,
    /// `1 / scale`.
    pub inv_scale: f32,
}

impl TileCtx {
    /// Tile of `scale` units.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            inv_scale: 1.0 / scale,
        }
    }
}

/// `color(t) = t * f + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoStopGradient {
    /// Slope per channel.
    pub f: [f32; 4],
    /// Offset per channel.
    pub b: [f32; 4],
}

impl TwoStopGradient {
    /// Gradient from `c0` at t = 0 to `c1` at t = 1.
    pub fn new(c0: [f32; 4], c1: [f32; 4]) -> Self {
        Self {
            f: std::array::from_fn(|i| c1[i] - c0[i]),
            b: c0,
        }
    }
}

/// Client hook invoked with the active pixels of each chunk as RGBA.
pub struct CallbackCtx<'a> {
    f: &'a (dyn Fn(&mut [[f32; 4]]) + Sync),
}

impl<'a> CallbackCtx<'a> {
    /// Wraps `f`.
    pub fn new(f: &'a (dyn Fn(&mut [[f32; 4]]) + Sync)) -> Self {
        Self { f }
    }

    pub(crate) fn call(&self, px: &mut [[f32; 4]]) {
        (self.f)(px)
    }
}

impl fmt::Debug for CallbackCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackCtx")
    }
}
