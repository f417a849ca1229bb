//! Direct buffer-to-buffer color conversion.
//!
//! [`ColorSpaceXform`] converts whole RGBA buffers between two color spaces
//! without going through a raster pipeline. Sources are linearized through
//! per-channel byte tables, transformed by the gamut matrix, then encoded for
//! the destination:
//!
//! - source and destination both sRGB or 2.2: four pixels at a time with a
//!   `wide` matrix multiply and a fixed encoder
//! - anything else: one pixel at a time, evaluating each destination
//!   channel's inverse curve (value, table or parametric)
//!
//! Alpha is copied through unchanged.

use half::f16;
use pxl_core::{AlphaType, PixelFormat};
use pxl_math::simd::{transform_rgb_x4, unorm8, unorm8_x4};
use pxl_transfer::{gamma, srgb, table};

use crate::error::{ColorError, ColorResult};
use crate::space::{ColorSpace, GammaCurve, GammaNamed};

/// Curves with a dedicated fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FastCurve {
    /// sRGB.
    Srgb,
    /// Pure 2.2 exponent.
    TwoDotTwo,
}

impl FastCurve {
    fn from_named(named: GammaNamed) -> Option<Self> {
        match named {
            GammaNamed::Srgb => Some(FastCurve::Srgb),
            GammaNamed::TwoDotTwo => Some(FastCurve::TwoDotTwo),
            GammaNamed::Linear | GammaNamed::NonStandard => None,
        }
    }

    fn decode_table(self) -> [f32; 256] {
        match self {
            FastCurve::Srgb => srgb::eotf_table(),
            FastCurve::TwoDotTwo => table::byte_table(gamma::eotf_22),
        }
    }

    #[inline]
    fn encode(self, l: f32) -> f32 {
        match self {
            FastCurve::Srgb => srgb::oetf(l),
            FastCurve::TwoDotTwo => gamma::oetf_22(l),
        }
    }
}

/// Conversion loop chosen for a source/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XformPath {
    /// Specialized loop for two recognized curves.
    Fast {
        /// Source curve.
        src: FastCurve,
        /// Destination curve.
        dst: FastCurve,
    },
    /// Generic per-channel loop.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DstLayout {
    Rgba8,
    Bgra8,
    F16,
    F32,
}

impl DstLayout {
    fn from_format(format: PixelFormat) -> Option<Self> {
        match format {
            PixelFormat::Rgba8888 => Some(DstLayout::Rgba8),
            PixelFormat::Bgra8888 => Some(DstLayout::Bgra8),
            PixelFormat::RgbaF16 => Some(DstLayout::F16),
            PixelFormat::RgbaF32 => Some(DstLayout::F32),
            _ => None,
        }
    }

    fn bytes(self) -> usize {
        match self {
            DstLayout::Rgba8 | DstLayout::Bgra8 => 4,
            DstLayout::F16 => 8,
            DstLayout::F32 => 16,
        }
    }

    /// Writes one encoded pixel; 8-bit layouts clamp and round.
    #[inline]
    fn store(self, out: &mut [u8], [r, g, b]: [f32; 3], a: u8) {
        match self {
            DstLayout::Rgba8 => out[..4].copy_from_slice(&[unorm8(r), unorm8(g), unorm8(b), a]),
            DstLayout::Bgra8 => out[..4].copy_from_slice(&[unorm8(b), unorm8(g), unorm8(r), a]),
            DstLayout::F16 => {
                let af = a as f32 / 255.0;
                for (chunk, v) in out[..8].chunks_exact_mut(2).zip([r, g, b, af]) {
                    chunk.copy_from_slice(&f16::from_f32(v).to_bits().to_le_bytes());
                }
            }
            DstLayout::F32 => {
                let af = a as f32 / 255.0;
                for (chunk, v) in out[..16].chunks_exact_mut(4).zip([r, g, b, af]) {
                    chunk.copy_from_slice(&v.to_le_bytes());
                }
            }
        }
    }
}

/// Converter between two color spaces, built once and reused.
#[derive(Debug, Clone)]
pub struct ColorSpaceXform {
    path: XformPath,
    src_tables: Box<[[f32; 256]; 3]>,
    dst_gammas: [GammaCurve; 3],
    matrix: [f32; 9],
}

impl ColorSpaceXform {
    /// Builds the converter, or `None` when the gamut matrix is unusable.
    pub fn new(src: &ColorSpace, dst: &ColorSpace) -> Option<Self> {
        let matrix = dst.from_xyz_d50().mul_mat(src.to_xyz_d50());
        if !matrix.is_finite() {
            tracing::debug!("color space xform: non-finite gamut matrix");
            return None;
        }
        let path = match (
            FastCurve::from_named(src.gamma_named()),
            FastCurve::from_named(dst.gamma_named()),
        ) {
            (Some(s), Some(d)) => XformPath::Fast { src: s, dst: d },
            _ => XformPath::Default,
        };
        let src_tables = match path {
            XformPath::Fast { src: s, .. } => {
                let t = s.decode_table();
                Box::new([t, t, t])
            }
            XformPath::Default => {
                let g = src.gammas();
                Box::new(std::array::from_fn(|i| table::byte_table(|x| g[i].eval(x))))
            }
        };
        tracing::debug!(path = ?path, "color space xform");
        Some(Self {
            path,
            src_tables,
            dst_gammas: dst.gammas().clone(),
            matrix: matrix.to_row_major(),
        })
    }

    /// Loop this converter runs.
    pub fn path(&self) -> XformPath {
        self.path
    }

    fn validate(
        dst_format: PixelFormat,
        dst_len: usize,
        src_format: PixelFormat,
        src_len: usize,
        len: usize,
    ) -> ColorResult<(bool, DstLayout)> {
        let unsupported = ColorError::UnsupportedConversion {
            from: src_format,
            to: dst_format,
        };
        let swap_rb = match src_format {
            PixelFormat::Rgba8888 => false,
            PixelFormat::Bgra8888 => true,
            _ => return Err(unsupported),
        };
        let Some(layout) = DstLayout::from_format(dst_format) else {
            return Err(unsupported);
        };
        // A byte count past usize::MAX can never fit.
        let needed = src_format.buffer_len(len).unwrap_or(usize::MAX);
        if src_len < needed {
            return Err(ColorError::BufferTooSmall { needed, got: src_len });
        }
        let needed = dst_format.buffer_len(len).unwrap_or(usize::MAX);
        if dst_len < needed {
            return Err(ColorError::BufferTooSmall { needed, got: dst_len });
        }
        Ok((swap_rb, layout))
    }

    /// Converts `len` pixels from `src` into `dst`.
    ///
    /// Sources are RGBA or BGRA bytes. Destinations are RGBA or BGRA bytes
    /// (clamped), or half/single floats (unclamped). With `alpha` premul the
    /// encoded color is multiplied by alpha.
    pub fn try_apply(
        &self,
        dst_format: PixelFormat,
        dst: &mut [u8],
        src_format: PixelFormat,
        src: &[u8],
        len: usize,
        alpha: AlphaType,
    ) -> ColorResult<()> {
        let (swap_rb, layout) = Self::validate(dst_format, dst.len(), src_format, src.len(), len)?;
        self.convert(layout, &mut dst[..len * layout.bytes()], swap_rb, &src[..len * 4], alpha.is_premul());
        Ok(())
    }

    /// [`ColorSpaceXform::try_apply`] reporting only success. `false` means
    /// the formats or buffers are not supported and the caller must fall
    /// back to a general conversion.
    pub fn apply(
        &self,
        dst_format: PixelFormat,
        dst: &mut [u8],
        src_format: PixelFormat,
        src: &[u8],
        len: usize,
        alpha: AlphaType,
    ) -> bool {
        match self.try_apply(dst_format, dst, src_format, src, len, alpha) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "direct color transform declined");
                false
            }
        }
    }

    /// [`ColorSpaceXform::try_apply`] split into chunks converted on the
    /// rayon pool.
    #[cfg(feature = "parallel")]
    pub fn apply_parallel(
        &self,
        dst_format: PixelFormat,
        dst: &mut [u8],
        src_format: PixelFormat,
        src: &[u8],
        len: usize,
        alpha: AlphaType,
    ) -> ColorResult<()> {
        use rayon::prelude::*;

        const CHUNK: usize = 4096;
        let (swap_rb, layout) = Self::validate(dst_format, dst.len(), src_format, src.len(), len)?;
        let bpp = layout.bytes();
        let premul = alpha.is_premul();
        src[..len * 4]
            .par_chunks(CHUNK * 4)
            .zip(dst[..len * bpp].par_chunks_mut(CHUNK * bpp))
            .for_each(|(s, d)| self.convert(layout, d, swap_rb, s, premul));
        Ok(())
    }

    fn convert(&self, layout: DstLayout, dst: &mut [u8], swap_rb: bool, src: &[u8], premul: bool) {
        match self.path {
            XformPath::Fast { dst: curve, .. } => self.convert_fast(curve, layout, dst, swap_rb, src, premul),
            XformPath::Default => self.convert_default(layout, dst, swap_rb, src, premul),
        }
    }

    #[inline]
    fn linearize(&self, px: &[u8], swap_rb: bool) -> [f32; 3] {
        let (r, b) = if swap_rb { (px[2], px[0]) } else { (px[0], px[2]) };
        [
            self.src_tables[0][r as usize],
            self.src_tables[1][px[1] as usize],
            self.src_tables[2][b as usize],
        ]
    }

    fn convert_fast(
        &self,
        curve: FastCurve,
        layout: DstLayout,
        dst: &mut [u8],
        swap_rb: bool,
        src: &[u8],
        premul: bool,
    ) {
        let bpp = layout.bytes();
        for (s, d) in src.chunks(16).zip(dst.chunks_mut(4 * bpp)) {
            let n = s.len() / 4;
            let (mut r, mut g, mut b, mut a) = ([0.0f32; 4], [0.0f32; 4], [0.0f32; 4], [0u8; 4]);
            for i in 0..n {
                let px = &s[4 * i..4 * i + 4];
                [r[i], g[i], b[i]] = self.linearize(px, swap_rb);
                a[i] = px[3];
            }
            let (r, g, b) = transform_rgb_x4(&self.matrix, r, g, b);
            let mut enc = [r, g, b].map(|c| c.map(|v| curve.encode(v)));
            if premul {
                for c in enc.iter_mut() {
                    for (v, a) in c.iter_mut().zip(a) {
                        *v *= a as f32 / 255.0;
                    }
                }
            }
            match layout {
                DstLayout::Rgba8 | DstLayout::Bgra8 => {
                    let [r, g, b] = enc.map(unorm8_x4);
                    for i in 0..n {
                        let px = if layout == DstLayout::Rgba8 {
                            [r[i], g[i], b[i], a[i]]
                        } else {
                            [b[i], g[i], r[i], a[i]]
                        };
                        d[4 * i..4 * i + 4].copy_from_slice(&px);
                    }
                }
                DstLayout::F16 | DstLayout::F32 => {
                    for i in 0..n {
                        layout.store(&mut d[bpp * i..], [enc[0][i], enc[1][i], enc[2][i]], a[i]);
                    }
                }
            }
        }
    }

    fn convert_default(&self, layout: DstLayout, dst: &mut [u8], swap_rb: bool, src: &[u8], premul: bool) {
        let bpp = layout.bytes();
        let m = &self.matrix;
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(bpp)) {
            let [r, g, b] = self.linearize(s, swap_rb);
            let lin = [
                r * m[0] + g * m[1] + b * m[2],
                r * m[3] + g * m[4] + b * m[5],
                r * m[6] + g * m[7] + b * m[8],
            ];
            let mut enc: [f32; 3] = std::array::from_fn(|i| self.dst_gammas[i].eval_inverse(lin[i]));
            if premul {
                let af = s[3] as f32 / 255.0;
                enc.iter_mut().for_each(|v| *v *= af);
            }
            layout.store(d, enc, s[3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pxl_transfer::TransferFn;

    fn xform(src: &ColorSpace, dst: &ColorSpace) -> ColorSpaceXform {
        ColorSpaceXform::new(src, dst).unwrap()
    }

    #[test]
    fn test_path_selection() {
        let srgb = ColorSpace::srgb();
        let g22 = srgb.with_transfer_fn(TransferFn::GAMMA_2_2).unwrap();
        assert_eq!(
            xform(&srgb, &g22).path(),
            XformPath::Fast { src: FastCurve::Srgb, dst: FastCurve::TwoDotTwo }
        );
        assert_eq!(
            xform(&g22, &ColorSpace::display_p3()).path(),
            XformPath::Fast { src: FastCurve::TwoDotTwo, dst: FastCurve::Srgb }
        );
        assert_eq!(xform(&ColorSpace::rec2020(), &srgb).path(), XformPath::Default);
        assert_eq!(xform(&srgb, &srgb.linear()).path(), XformPath::Default);
    }

    #[test]
    fn test_same_space_preserves_bytes() {
        let s = ColorSpace::srgb();
        let src: Vec<u8> = (0..=255u8).flat_map(|v| [v, 255 - v, v / 2, v]).collect();
        let mut dst = vec![0u8; src.len()];
        assert!(xform(&s, &s).apply(
            PixelFormat::Rgba8888,
            &mut dst,
            PixelFormat::Rgba8888,
            &src,
            256,
            AlphaType::Unpremul
        ));
        assert_eq!(dst, src);
    }

    #[test]
    fn test_default_path_preserves_bytes() {
        let s = ColorSpace::rec2020();
        let src: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, 255 - v, 255]).collect();
        let mut dst = vec![0u8; src.len()];
        xform(&s, &s)
            .try_apply(PixelFormat::Rgba8888, &mut dst, PixelFormat::Rgba8888, &src, 256, AlphaType::Opaque)
            .unwrap();
        for (a, b) in dst.iter().zip(&src) {
            assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_bgra_swaps() {
        let s = ColorSpace::srgb();
        let src = [10u8, 20, 30, 40];
        let mut dst = [0u8; 4];
        xform(&s, &s)
            .try_apply(PixelFormat::Rgba8888, &mut dst, PixelFormat::Bgra8888, &src, 1, AlphaType::Unpremul)
            .unwrap();
        assert_eq!(dst, [30, 20, 10, 40]);
    }

    #[test]
    fn test_premul_scales_encoded_color() {
        let s = ColorSpace::srgb();
        let src = [200u8, 100, 0, 128];
        let mut dst = [0u8; 4];
        xform(&s, &s)
            .try_apply(PixelFormat::Rgba8888, &mut dst, PixelFormat::Rgba8888, &src, 1, AlphaType::Premul)
            .unwrap();
        let af = 128.0 / 255.0;
        assert_eq!(dst, [unorm8(200.0 / 255.0 * af), unorm8(100.0 / 255.0 * af), 0, 128]);
    }

    #[test]
    fn test_float_output_is_unclamped() {
        let red = [255u8, 0, 0, 255];
        let mut out = [0.0f32; 4];
        xform(&ColorSpace::display_p3(), &ColorSpace::srgb())
            .try_apply(
                PixelFormat::RgbaF32,
                bytemuck::cast_slice_mut(&mut out),
                PixelFormat::Rgba8888,
                &red,
                1,
                AlphaType::Unpremul,
            )
            .unwrap();
        assert!(out[0] > 1.0);
        assert!(out[1] < 0.0);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_unsupported_requests() {
        let s = ColorSpace::srgb();
        let x = xform(&s, &s);
        let src = [0u8; 8];
        let mut dst = [0u8; 8];
        assert!(!x.apply(PixelFormat::Rgb565, &mut dst, PixelFormat::Rgba8888, &src, 1, AlphaType::Opaque));
        assert!(!x.apply(PixelFormat::Rgba8888, &mut dst, PixelFormat::RgbaF16, &src, 1, AlphaType::Opaque));
        assert!(matches!(
            x.try_apply(PixelFormat::A8, &mut dst, PixelFormat::Rgba8888, &src, 1, AlphaType::Opaque),
            Err(ColorError::UnsupportedConversion { from: PixelFormat::Rgba8888, to: PixelFormat::A8 })
        ));
        assert!(matches!(
            x.try_apply(PixelFormat::Rgba8888, &mut dst, PixelFormat::Rgba8888, &src, 3, AlphaType::Opaque),
            Err(ColorError::BufferTooSmall { needed: 12, got: 8 })
        ));
    }

    #[test]
    fn test_huge_len_is_rejected() {
        let s = ColorSpace::srgb();
        let x = xform(&s, &s);
        let src = [0u8; 8];
        let mut dst = [0u8; 32];
        let huge = usize::MAX / 2;
        assert!(!x.apply(PixelFormat::RgbaF32, &mut dst, PixelFormat::Rgba8888, &src, huge, AlphaType::Opaque));
        assert!(matches!(
            x.try_apply(PixelFormat::RgbaF32, &mut dst, PixelFormat::Rgba8888, &src, huge, AlphaType::Opaque),
            Err(ColorError::BufferTooSmall { needed: usize::MAX, got: 8 })
        ));
    }
}
