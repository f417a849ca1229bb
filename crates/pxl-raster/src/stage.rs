//! The stage catalog.
//!
//! A [`StageId`] names one per-pixel operation. The catalog is closed: every
//! engine supplies an implementation for every entry, indexed by
//! `StageId as usize`.
//!
//! Unless a stage says otherwise, color registers hold floats in
//! [0, 1]-normalized units that are not clamped; integer stores clamp and
//! round.

macro_rules! stages {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// Identifier of one operation in the stage catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum StageId {
            $($(#[$doc])* $variant,)*
        }

        impl StageId {
            /// Every stage, in catalog order.
            pub const ALL: &'static [StageId] = &[$(StageId::$variant,)*];

            /// Number of stages in the catalog.
            pub const COUNT: usize = Self::ALL.len();

            /// Catalog name, e.g. `"load_8888"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(StageId::$variant => $name,)*
                }
            }

            /// Looks a stage up by catalog name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(StageId::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

stages! {
    /// Calls a client closure with the active pixels. Context: `Callback`.
    Callback => "callback",
    /// Copies r,g,b,a into dr,dg,db,da.
    MoveSrcDst => "move_src_dst",
    /// Copies dr,dg,db,da into r,g,b,a.
    MoveDstSrc => "move_dst_src",
    /// Swaps r and b.
    SwapRb => "swap_rb",

    /// Raises negative channels to 0.
    Clamp0 => "clamp_0",
    /// Lowers channels above 1 to 1.
    Clamp1 => "clamp_1",
    /// Clamps alpha to 1 and color to alpha.
    ClampA => "clamp_a",
    /// [`StageId::ClampA`] on the destination registers.
    ClampADst => "clamp_a_dst",

    /// Divides color by alpha; zero alpha gives zero color.
    Unpremul => "unpremul",
    /// Multiplies color by alpha.
    Premul => "premul",
    /// Multiplies destination color by destination alpha.
    PremulDst => "premul_dst",

    /// Sets r,g,b from the first three context values. Context: `Color`.
    SetRgb => "set_rgb",
    /// Opaque black.
    BlackColor => "black_color",
    /// Opaque white.
    WhiteColor => "white_color",
    /// Sets r,g,b,a from the context. Context: `Color`.
    ConstantColor => "constant_color",
    /// Pixel-center coordinates into r (x) and g (y), b = 1.
    SeedShader => "seed_shader",
    /// Ordered 8x8 dither scaled by the context rate. Context: `Float`.
    Dither => "dither",

    /// Alpha-only bytes into a; r,g,b = 0. Context: `Memory`.
    LoadA8 => "load_a8",
    /// Alpha-only bytes into da.
    LoadA8Dst => "load_a8_dst",
    /// a into alpha-only bytes.
    StoreA8 => "store_a8",
    /// Gray bytes into r,g,b; a = 1.
    LoadG8 => "load_g8",
    /// Gray bytes into dr,dg,db; da = 1.
    LoadG8Dst => "load_g8_dst",
    /// 5-6-5 into r,g,b; a = 1.
    Load565 => "load_565",
    /// 5-6-5 into dr,dg,db; da = 1.
    Load565Dst => "load_565_dst",
    /// r,g,b into 5-6-5.
    Store565 => "store_565",
    /// 4-4-4-4 into r,g,b,a.
    Load4444 => "load_4444",
    /// 4-4-4-4 into dr,dg,db,da.
    Load4444Dst => "load_4444_dst",
    /// r,g,b,a into 4-4-4-4.
    Store4444 => "store_4444",
    /// RGBA bytes into r,g,b,a.
    Load8888 => "load_8888",
    /// RGBA bytes into dr,dg,db,da.
    Load8888Dst => "load_8888_dst",
    /// r,g,b,a into RGBA bytes.
    Store8888 => "store_8888",
    /// Samples RGBA bytes at (r, g). Context: `Gather`.
    Gather8888 => "gather_8888",
    /// BGRA bytes into r,g,b,a.
    LoadBgra => "load_bgra",
    /// BGRA bytes into dr,dg,db,da.
    LoadBgraDst => "load_bgra_dst",
    /// r,g,b,a into BGRA bytes.
    StoreBgra => "store_bgra",
    /// Half floats into r,g,b,a.
    LoadF16 => "load_f16",
    /// Half floats into dr,dg,db,da.
    LoadF16Dst => "load_f16_dst",
    /// r,g,b,a into half floats.
    StoreF16 => "store_f16",
    /// Floats into r,g,b,a.
    LoadF32 => "load_f32",
    /// Floats into dr,dg,db,da.
    LoadF32Dst => "load_f32_dst",
    /// r,g,b,a into floats.
    StoreF32 => "store_f32",

    /// Scales src by coverage bytes. Context: `Memory`.
    ScaleU8 => "scale_u8",
    /// Scales src by a constant. Context: `Float`.
    Scale1Float => "scale_1_float",
    /// Lerps dst toward src by coverage bytes. Context: `Memory`.
    LerpU8 => "lerp_u8",
    /// Lerps dst toward src by a constant. Context: `Float`.
    Lerp1Float => "lerp_1_float",

    /// Porter-Duff clear.
    Clear => "clear",
    /// Porter-Duff src-atop.
    SrcAtop => "srcatop",
    /// Porter-Duff dst-atop.
    DstAtop => "dstatop",
    /// Porter-Duff src-in.
    SrcIn => "srcin",
    /// Porter-Duff dst-in.
    DstIn => "dstin",
    /// Porter-Duff src-out.
    SrcOut => "srcout",
    /// Porter-Duff dst-out.
    DstOut => "dstout",
    /// Porter-Duff src-over.
    SrcOver => "srcover",
    /// Porter-Duff dst-over.
    DstOver => "dstover",
    /// `s * d`.
    Modulate => "modulate",
    /// Multiply blend.
    Multiply => "multiply",
    /// `min(s + d, 1)`.
    Plus => "plus",
    /// Screen blend.
    Screen => "screen",
    /// Porter-Duff xor.
    Xor => "xor",
    /// Color burn.
    ColorBurn => "colorburn",
    /// Color dodge.
    ColorDodge => "colordodge",
    /// Darken.
    Darken => "darken",
    /// Difference.
    Difference => "difference",
    /// Exclusion.
    Exclusion => "exclusion",
    /// Hard light.
    HardLight => "hardlight",
    /// Lighten.
    Lighten => "lighten",
    /// Overlay.
    Overlay => "overlay",
    /// Soft light.
    SoftLight => "softlight",
    /// Non-separable hue.
    Hue => "hue",
    /// Non-separable saturation.
    Saturation => "saturation",
    /// Non-separable color.
    Color => "color",
    /// Non-separable luminosity.
    Luminosity => "luminosity",
    /// Load RGBA bytes as dst, src-over, store. Context: `Memory`.
    SrcOverRgba8888 => "srcover_rgba_8888",

    /// Rec.709 luma into a; r,g,b = 0.
    LuminanceToAlpha => "luminance_to_alpha",
    /// Affine transform of (r, g). Context: `Matrix` of 6, row-major.
    Matrix2x3 => "matrix_2x3",
    /// Linear transform of (r, g, b). Context: `Matrix` of 9, row-major.
    Matrix3x3 => "matrix_3x3",
    /// Affine transform of (r, g, b). Context: `Matrix` of 12, row-major.
    Matrix3x4 => "matrix_3x4",
    /// Affine transform of (r, g, b, a). Context: `Matrix` of 20, row-major.
    Matrix4x5 => "matrix_4x5",
    /// Projective transform of (r, g). Context: `Matrix` of 9, row-major.
    MatrixPerspective => "matrix_perspective",

    /// sRGB decode of r,g,b.
    FromSrgb => "from_srgb",
    /// sRGB decode of dr,dg,db.
    FromSrgbDst => "from_srgb_dst",
    /// sRGB encode of r,g,b.
    ToSrgb => "to_srgb",
    /// `x^g` on r,g,b. Context: `Float`.
    Gamma => "gamma",
    /// Parametric curve on r,g,b. Context: `Parametric`.
    Parametric => "parametric",
    /// Parametric curve on r. Context: `Parametric`.
    ParametricR => "parametric_r",
    /// Parametric curve on g.
    ParametricG => "parametric_g",
    /// Parametric curve on b.
    ParametricB => "parametric_b",
    /// Parametric curve on a.
    ParametricA => "parametric_a",
    /// Table curve on r. Context: `Table`.
    TableR => "table_r",
    /// Table curve on g.
    TableG => "table_g",
    /// Table curve on b.
    TableB => "table_b",
    /// Table curve on a.
    TableA => "table_a",
    /// 256-entry byte tables on r,g,b,a. Context: `ByteTables`.
    ByteTables => "byte_tables",

    /// Clamps x (r) into [0, scale). Context: `Tile`.
    ClampX => "clamp_x",
    /// Mirrors x (r) into [0, scale).
    MirrorX => "mirror_x",
    /// Wraps x (r) into [0, scale).
    RepeatX => "repeat_x",
    /// Clamps y (g) into [0, scale).
    ClampY => "clamp_y",
    /// Mirrors y (g) into [0, scale).
    MirrorY => "mirror_y",
    /// Wraps y (g) into [0, scale).
    RepeatY => "repeat_y",
    /// Clamps x into [0, 1].
    ClampX1 => "clamp_x_1",
    /// Mirrors x into [0, 1].
    MirrorX1 => "mirror_x_1",
    /// Wraps x into [0, 1).
    RepeatX1 => "repeat_x_1",
    /// Two-stop gradient at t = r. Context: `Gradient`.
    EvenlySpaced2StopGradient => "evenly_spaced_2_stop_gradient",
    /// `r = sqrt(r^2 + g^2)`.
    XyToRadius => "xy_to_radius",
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_dense() {
        for (i, id) in StageId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, i);
        }
        assert_eq!(StageId::COUNT, StageId::ALL.len());
    }

    #[test]
    fn test_names_roundtrip() {
        for &id in StageId::ALL {
            assert_eq!(StageId::from_name(id.name()), Some(id));
        }
        assert_eq!(StageId::from_name("no_such_stage"), None);
        assert_eq!(StageId::SrcOver.to_string(), "srcover");
    }
}
