//! Coordinate seeding, dithering, tiling, gradients and client callbacks.

use crate::context::Context;
use crate::engine::Registers;
use crate::lanes::{Lanes, MAX_LANES};
use crate::stage::StageId;

stage!(seed_shader, |p| {
    let mut xs = [0.0f32; MAX_LANES];
    for (x, iota) in xs.iter_mut().zip(p.k.iota_f) {
        *x = p.dx as f32 + iota + 0.5;
    }
    let zero = V::splat(0.0);
    p.r = V::from_slice(&xs);
    p.g = V::splat(p.dy as f32 + 0.5);
    p.b = V::splat(1.0);
    p.a = zero;
    (p.dr, p.dg, p.db, p.da) = (zero, zero, zero, zero);
});

/// 8x8 ordered dither offset in (-0.5, 0.5) for pixel `(x, y)`.
///
/// The low three bits of `x` and `x ^ y` interleave into a 6-bit Bayer index.
#[inline]
pub(crate) fn bayer(x: u32, y: u32) -> f32 {
    let y = y ^ x;
    let m = (y & 1) << 5 | (x & 1) << 4 | (y & 2) << 2 | (x & 2) << 1 | (y & 4) >> 1 | (x & 4) >> 2;
    // 63/128 keeps the offset strictly inside half a step.
    m as f32 * (2.0 / 128.0) - 63.0 / 128.0
}

stage!(dither, |p| {
    let rate = ctx!(p, Dither, Float);
    let mut d = [0.0f32; MAX_LANES];
    for (v, iota) in d.iter_mut().zip(p.k.iota_i) {
        *v = rate * bayer((p.dx as u32).wrapping_add(iota), p.dy as u32);
    }
    let d = V::from_slice(&d);
    let zero = V::splat(0.0);
    p.r = (p.r + d).min(p.a).max(zero);
    p.g = (p.g + d).min(p.a).max(zero);
    p.b = (p.b + d).min(p.a).max(zero);
});

/// Largest float below `v`, or 0 for an empty (or NaN) tile.
#[inline(always)]
fn below(v: f32) -> f32 {
    if v > 0.0 { f32::from_bits(v.to_bits() - 1) } else { 0.0 }
}

#[inline(always)]
fn tile_clamp<V: Lanes>(v: V, scale: f32) -> V {
    v.max(V::splat(0.0)).min(V::splat(below(scale)))
}

#[inline(always)]
fn tile_repeat<V: Lanes>(v: V, scale: f32, inv_scale: f32) -> V {
    v - (v * V::splat(inv_scale)).floor() * V::splat(scale)
}

#[inline(always)]
fn tile_mirror<V: Lanes>(v: V, scale: f32, inv_scale: f32) -> V {
    let s = V::splat(scale);
    let shifted = v - s;
    (shifted - V::splat(2.0 * scale) * (shifted * V::splat(0.5 * inv_scale)).floor() - s).abs()
}

macro_rules! tile_stage {
    ($name:ident, $id:ident, $reg:ident, |$v:ident, $t:ident| $f:expr) => {
        stage!($name, |p| {
            let $t = ctx!(p, $id, Tile);
            let $v = p.$reg;
            p.$reg = $f;
        });
    };
}

tile_stage!(clamp_x, ClampX, r, |v, t| tile_clamp(v, t.scale));
tile_stage!(clamp_y, ClampY, g, |v, t| tile_clamp(v, t.scale));
tile_stage!(repeat_x, RepeatX, r, |v, t| tile_repeat(v, t.scale, t.inv_scale));
tile_stage!(repeat_y, RepeatY, g, |v, t| tile_repeat(v, t.scale, t.inv_scale));
tile_stage!(mirror_x, MirrorX, r, |v, t| tile_mirror(v, t.scale, t.inv_scale));
tile_stage!(mirror_y, MirrorY, g, |v, t| tile_mirror(v, t.scale, t.inv_scale));

stage!(clamp_x_1, |p| {
    p.r = p.r.clamp01();
});

stage!(repeat_x_1, |p| {
    p.r = p.r - p.r.floor();
});

stage!(mirror_x_1, |p| {
    p.r = tile_mirror(p.r, 1.0, 1.0);
});

stage!(evenly_spaced_2_stop_gradient, |p| {
    let c = ctx!(p, EvenlySpaced2StopGradient, Gradient);
    let t = p.r;
    p.r = t * V::splat(c.f[0]) + V::splat(c.b[0]);
    p.g = t * V::splat(c.f[1]) + V::splat(c.b[1]);
    p.b = t * V::splat(c.f[2]) + V::splat(c.b[2]);
    p.a = t * V::splat(c.f[3]) + V::splat(c.b[3]);
});

stage!(xy_to_radius, |p| {
    p.r = (p.r * p.r + p.g * p.g).sqrt();
});

stage!(callback, |p| {
    let cb = ctx!(p, Callback, Callback);
    let n = p.active();
    let mut ch = [p.r, p.g, p.b, p.a].map(|v| v.to_array());
    let mut px = [[0.0f32; 4]; MAX_LANES];
    for (i, out) in px[..n].iter_mut().enumerate() {
        *out = [ch[0][i], ch[1][i], ch[2][i], ch[3][i]];
    }
    cb.call(&mut px[..n]);
    for (i, c) in px[..n].iter().enumerate() {
        for (lane, v) in ch.iter_mut().zip(c) {
            lane[i] = *v;
        }
    }
    [p.r, p.g, p.b, p.a] = ch.map(|lane| V::from_slice(&lane));
});
