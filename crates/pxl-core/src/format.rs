//! Packed pixel formats.
//!
//! Every format is little-endian in memory. A pixel at `(x, y)` of a buffer
//! with a row stride of `stride` pixels starts at byte
//! `(y * stride + x) * bytes_per_pixel()`.
//!
//! | Format | Bytes | Layout |
//! |--------|-------|--------|
//! | `A8` | 1 | alpha |
//! | `G8` | 1 | gray, opaque |
//! | `Rgb565` | 2 | `u16`: r in bits 11-15, g in 5-10, b in 0-4 |
//! | `Argb4444` | 2 | `u16`: r in 12-15, g in 8-11, b in 4-7, a in 0-3 |
//! | `Rgba8888` | 4 | bytes r, g, b, a |
//! | `Bgra8888` | 4 | bytes b, g, r, a |
//! | `RgbaF16` | 8 | four IEEE half floats |
//! | `RgbaF32` | 16 | four IEEE single floats |

/// Memory layout of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit alpha only.
    A8,
    /// 8-bit gray.
    G8,
    /// 5-6-5 packed RGB.
    Rgb565,
    /// 4-4-4-4 packed RGBA.
    Argb4444,
    /// 8 bits per channel, R first.
    Rgba8888,
    /// 8 bits per channel, B first.
    Bgra8888,
    /// Half-float RGBA.
    RgbaF16,
    /// Single-float RGBA.
    RgbaF32,
}

impl PixelFormat {
    /// All formats.
    pub const ALL: [PixelFormat; 8] = [
        Self::A8,
        Self::G8,
        Self::Rgb565,
        Self::Argb4444,
        Self::Rgba8888,
        Self::Bgra8888,
        Self::RgbaF16,
        Self::RgbaF32,
    ];

    /// Bytes occupied by a single pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::A8 | Self::G8 => 1,
            Self::Rgb565 | Self::Argb4444 => 2,
            Self::Rgba8888 | Self::Bgra8888 => 4,
            Self::RgbaF16 => 8,
            Self::RgbaF32 => 16,
        }
    }

    /// Returns `true` for the float formats, which are stored unclamped.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::RgbaF16 | Self::RgbaF32)
    }

    /// Returns `true` if the format stores an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, Self::G8 | Self::Rgb565)
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A8 => "a8",
            Self::G8 => "g8",
            Self::Rgb565 => "rgb565",
            Self::Argb4444 => "argb4444",
            Self::Rgba8888 => "rgba8888",
            Self::Bgra8888 => "bgra8888",
            Self::RgbaF16 => "rgba_f16",
            Self::RgbaF32 => "rgba_f32",
        }
    }

    /// Bytes needed for `len` tightly packed pixels, or `None` when that
    /// overflows `usize`.
    #[inline]
    pub const fn buffer_len(self, len: usize) -> Option<usize> {
        len.checked_mul(self.bytes_per_pixel())
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
