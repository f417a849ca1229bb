//! Stage kernels, written once over [`Lanes`] and instantiated per engine.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use wide::f32x8;

use crate::context::Context;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::engine::Registers;
use crate::engine::StageFn;
use crate::lanes::Lanes;
use crate::stage::StageId;

/// Defines a stage kernel that chains to the next stage when `$body` is done.
macro_rules! stage {
    ($(#[$doc:meta])* $name:ident, |$p:ident| $body:block) => {
        $(#[$doc])*
        #[inline(always)]
        pub(super) fn $name<V: Lanes>($p: &mut Registers<'_, '_, V>) {
            $body
            $p.next_stage();
        }
    };
}

/// Pulls the expected context variant out of the running stage or panics.
macro_rules! ctx {
    ($p:ident, $stage:ident, $variant:ident) => {
        match $p.ctx() {
            Context::$variant(c) => c,
            other => $crate::kernels::bad_context(StageId::$stage, stringify!($variant), other),
        }
    };
}

mod blend;
mod color;
mod memory;
mod shader;

#[cold]
#[inline(never)]
pub(crate) fn bad_context(stage: StageId, want: &str, got: Context<'_>) -> ! {
    panic!(
        "stage `{}` expects a {} context, got {}",
        stage.name(),
        want,
        got.kind()
    )
}

#[cold]
#[inline(never)]
pub(crate) fn out_of_bounds(stage: StageId, x: usize, y: usize) -> ! {
    panic!("stage `{}` touched pixel ({x}, {y}) outside its buffer", stage.name())
}

/// `a * b + c`, unfused so every engine rounds identically.
#[inline(always)]
pub(crate) fn mad<V: Lanes>(a: V, b: V, c: V) -> V {
    a * b + c
}

/// `1 - v`.
#[inline(always)]
pub(crate) fn inv<V: Lanes>(v: V) -> V {
    V::splat(1.0) - v
}

/// Builds the stage lookups from one `StageId => module::kernel` list.
macro_rules! catalog {
    ($($id:ident => $module:ident::$kernel:ident,)*) => {
        /// Implementation of `id` for lane type `V`.
        pub(crate) fn stage_fn<V: Lanes>(id: StageId) -> StageFn<V> {
            match id {
                $(StageId::$id => $module::$kernel::<V>,)*
            }
        }

        /// Implementation of `id` on 8 lanes, compiled with AVX2 and FMA
        /// enabled.
        ///
        /// Only call the returned functions after detecting both features.
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        pub(crate) fn avx2_stage_fn(id: StageId) -> StageFn<f32x8> {
            match id {
                $(StageId::$id => avx2_stage!($module::$kernel),)*
            }
        }
    };
}

/// Wraps one kernel in an AVX2 + FMA compiled body.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
macro_rules! avx2_stage {
    ($module:ident::$kernel:ident) => {{
        #[target_feature(enable = "avx2,fma")]
        unsafe fn body(p: &mut Registers<'_, '_, f32x8>) {
            $module::$kernel::<f32x8>(p)
        }
        fn entry(p: &mut Registers<'_, '_, f32x8>) {
            // SAFETY: the AVX2 table is only built once both features are detected.
            unsafe { body(p) }
        }
        entry as StageFn<f32x8>
    }};
}

catalog! {
    Callback => shader::callback,
    MoveSrcDst => color::move_src_dst,
    MoveDstSrc => color::move_dst_src,
    SwapRb => color::swap_rb,

    Clamp0 => color::clamp_0,
    Clamp1 => color::clamp_1,
    ClampA => color::clamp_a,
    ClampADst => color::clamp_a_dst,

    Unpremul => color::unpremul,
    Premul => color::premul,
    PremulDst => color::premul_dst,

    SetRgb => color::set_rgb,
    BlackColor => color::black_color,
    WhiteColor => color::white_color,
    ConstantColor => color::constant_color,
    SeedShader => shader::seed_shader,
    Dither => shader::dither,

    LoadA8 => memory::load_a8,
    LoadA8Dst => memory::load_a8_dst,
    StoreA8 => memory::store_a8,
    LoadG8 => memory::load_g8,
    LoadG8Dst => memory::load_g8_dst,
    Load565 => memory::load_565,
    Load565Dst => memory::load_565_dst,
    Store565 => memory::store_565,
    Load4444 => memory::load_4444,
    Load4444Dst => memory::load_4444_dst,
    Store4444 => memory::store_4444,
    Load8888 => memory::load_8888,
    Load8888Dst => memory::load_8888_dst,
    Store8888 => memory::store_8888,
    Gather8888 => memory::gather_8888,
    LoadBgra => memory::load_bgra,
    LoadBgraDst => memory::load_bgra_dst,
    StoreBgra => memory::store_bgra,
    LoadF16 => memory::load_f16,
    LoadF16Dst => memory::load_f16_dst,
    StoreF16 => memory::store_f16,
    LoadF32 => memory::load_f32,
    LoadF32Dst => memory::load_f32_dst,
    StoreF32 => memory::store_f32,

    ScaleU8 => memory::scale_u8,
    Scale1Float => color::scale_1_float,
    LerpU8 => memory::lerp_u8,
    Lerp1Float => color::lerp_1_float,

    Clear => blend::clear,
    SrcAtop => blend::srcatop,
    DstAtop => blend::dstatop,
    SrcIn => blend::srcin,
    DstIn => blend::dstin,
    SrcOut => blend::srcout,
    DstOut => blend::dstout,
    SrcOver => blend::srcover,
    DstOver => blend::dstover,
    Modulate => blend::modulate,
    Multiply => blend::multiply,
    Plus => blend::plus,
    Screen => blend::screen,
    Xor => blend::xor,
    ColorBurn => blend::colorburn,
    ColorDodge => blend::colordodge,
    Darken => blend::darken,
    Difference => blend::difference,
    Exclusion => blend::exclusion,
    HardLight => blend::hardlight,
    Lighten => blend::lighten,
    Overlay => blend::overlay,
    SoftLight => blend::softlight,
    Hue => blend::hue,
    Saturation => blend::saturation,
    Color => blend::color,
    Luminosity => blend::luminosity,
    SrcOverRgba8888 => memory::srcover_rgba_8888,

    LuminanceToAlpha => color::luminance_to_alpha,
    Matrix2x3 => color::matrix_2x3,
    Matrix3x3 => color::matrix_3x3,
    Matrix3x4 => color::matrix_3x4,
    Matrix4x5 => color::matrix_4x5,
    MatrixPerspective => color::matrix_perspective,

    FromSrgb => color::from_srgb,
    FromSrgbDst => color::from_srgb_dst,
    ToSrgb => color::to_srgb,
    Gamma => color::gamma,
    Parametric => color::parametric,
    ParametricR => color::parametric_r,
    ParametricG => color::parametric_g,
    ParametricB => color::parametric_b,
    ParametricA => color::parametric_a,
    TableR => color::table_r,
    TableG => color::table_g,
    TableB => color::table_b,
    TableA => color::table_a,
    ByteTables => color::byte_tables,

    ClampX => shader::clamp_x,
    MirrorX => shader::mirror_x,
    RepeatX => shader::repeat_x,
    ClampY => shader::clamp_y,
    MirrorY => shader::mirror_y,
    RepeatY => shader::repeat_y,
    ClampX1 => shader::clamp_x_1,
    MirrorX1 => shader::mirror_x_1,
    RepeatX1 => shader::repeat_x_1,
    EvenlySpaced2StopGradient => shader::evenly_spaced_2_stop_gradient,
    XyToRadius => shader::xy_to_radius,
}
