//! Compositing stages. Source is `r,g,b,a`, destination `dr,dg,db,da`,
//! both premultiplied; the result lands in the source registers.

use super::{inv, mad};
use crate::engine::Registers;
use crate::lanes::Lanes;

#[inline(always)]
fn two<V: Lanes>(v: V) -> V {
    v + v
}

/// Same formula on all four channels.
macro_rules! blend_fn {
    ($name:ident, |$s:ident, $d:ident, $sa:ident, $da:ident| $f:expr) => {
        stage!($name, |p| {
            #[inline(always)]
            #[allow(unused_variables)]
            fn f<V: Lanes>($s: V, $d: V, $sa: V, $da: V) -> V {
                $f
            }
            let (sa, da) = (p.a, p.da);
            p.r = f(p.r, p.dr, sa, da);
            p.g = f(p.g, p.dg, sa, da);
            p.b = f(p.b, p.db, sa, da);
            p.a = f(p.a, p.da, sa, da);
        });
    };
}

/// Formula on color, src-over on alpha.
macro_rules! blend_fn2 {
    ($name:ident, |$s:ident, $d:ident, $sa:ident, $da:ident| $f:expr) => {
        stage!($name, |p| {
            #[inline(always)]
            #[allow(unused_variables)]
            fn f<V: Lanes>($s: V, $d: V, $sa: V, $da: V) -> V {
                $f
            }
            let (sa, da) = (p.a, p.da);
            p.r = f(p.r, p.dr, sa, da);
            p.g = f(p.g, p.dg, sa, da);
            p.b = f(p.b, p.db, sa, da);
            p.a = mad(da, inv(sa), sa);
        });
    };
}

blend_fn!(clear, |s, d, sa, da| V::splat(0.0));
blend_fn!(srcatop, |s, d, sa, da| s * da + d * inv(sa));
blend_fn!(dstatop, |s, d, sa, da| d * sa + s * inv(da));
blend_fn!(srcin, |s, d, sa, da| s * da);
blend_fn!(dstin, |s, d, sa, da| d * sa);
blend_fn!(srcout, |s, d, sa, da| s * inv(da));
blend_fn!(dstout, |s, d, sa, da| d * inv(sa));
blend_fn!(srcover, |s, d, sa, da| mad(d, inv(sa), s));
blend_fn!(dstover, |s, d, sa, da| mad(s, inv(da), d));
blend_fn!(modulate, |s, d, sa, da| s * d);
blend_fn!(multiply, |s, d, sa, da| s * inv(da) + d * inv(sa) + s * d);
blend_fn!(plus, |s, d, sa, da| (s + d).min(V::splat(1.0)));
blend_fn!(screen, |s, d, sa, da| s + d - s * d);
blend_fn!(xor, |s, d, sa, da| s * inv(da) + d * inv(sa));

blend_fn2!(darken, |s, d, sa, da| s + d - (s * da).max(d * sa));
blend_fn2!(lighten, |s, d, sa, da| s + d - (s * da).min(d * sa));
blend_fn2!(difference, |s, d, sa, da| s + d - two((s * da).min(d * sa)));
blend_fn2!(exclusion, |s, d, sa, da| s + d - two(s * d));

blend_fn2!(colorburn, |s, d, sa, da| {
    let partial = sa * (da - da.min((da - d) * sa / s)) + s * inv(da) + d * inv(sa);
    let s_zero = V::select(|s, _| s == 0.0, s, s, d * inv(sa), partial);
    V::select(|d, da| d == da, d, da, d + s * inv(da), s_zero)
});

blend_fn2!(colordodge, |s, d, sa, da| {
    let partial = sa * da.min((d * sa) / (sa - s)) + s * inv(da) + d * inv(sa);
    let s_full = V::select(|s, sa| s == sa, s, sa, s + d * inv(sa), partial);
    V::select(|d, _| d == 0.0, d, d, s * inv(da), s_full)
});

blend_fn2!(hardlight, |s, d, sa, da| {
    let dark = two(s * d);
    let lite = sa * da - two((da - d) * (sa - s));
    s * inv(da) + d * inv(sa) + V::select(|s2, sa| s2 <= sa, two(s), sa, dark, lite)
});

blend_fn2!(overlay, |s, d, sa, da| {
    let dark = two(s * d);
    let lite = sa * da - two((da - d) * (sa - s));
    s * inv(da) + d * inv(sa) + V::select(|d2, da| d2 <= da, two(d), da, dark, lite)
});

blend_fn2!(softlight, |s, d, sa, da| {
    let one = V::splat(1.0);
    // Normalized destination; 0 where the destination is transparent.
    let m = V::select(|da, _| da > 0.0, da, da, d / da, V::splat(0.0));
    let s2 = two(s);
    let m4 = two(two(m));

    let dark_src = d * (sa + (s2 - sa) * (one - m));
    let dark_dst = (m4 * m4 + m4) * (m - one) + V::splat(7.0) * m;
    let lite_dst = m.sqrt() - m;
    let lite_src = d * sa
        + da * (s2 - sa) * V::select(|d4, da| d4 <= da, two(two(d)), da, dark_dst, lite_dst);

    s * inv(da) + d * inv(sa) + V::select(|s2, sa| s2 <= sa, s2, sa, dark_src, lite_src)
});

#[inline(always)]
fn max3<V: Lanes>(r: V, g: V, b: V) -> V {
    r.max(g).max(b)
}

#[inline(always)]
fn min3<V: Lanes>(r: V, g: V, b: V) -> V {
    r.min(g).min(b)
}

#[inline(always)]
fn sat<V: Lanes>(r: V, g: V, b: V) -> V {
    max3(r, g, b) - min3(r, g, b)
}

#[inline(always)]
fn lum<V: Lanes>(r: V, g: V, b: V) -> V {
    r * V::splat(0.30) + g * V::splat(0.59) + b * V::splat(0.11)
}

fn set_sat<V: Lanes>(r: &mut V, g: &mut V, b: &mut V, s: V) {
    let mn = min3(*r, *g, *b);
    let mx = max3(*r, *g, *b);
    let range = mx - mn;
    let scale = |c: V| {
        V::select(|range, _| range != 0.0, range, range, (c - mn) * s / range, V::splat(0.0))
    };
    *r = scale(*r);
    *g = scale(*g);
    *b = scale(*b);
}

fn set_lum<V: Lanes>(r: &mut V, g: &mut V, b: &mut V, l: V) {
    let diff = l - lum(*r, *g, *b);
    *r = *r + diff;
    *g = *g + diff;
    *b = *b + diff;
}

fn clip_color<V: Lanes>(r: &mut V, g: &mut V, b: &mut V, a: V) {
    let mn = min3(*r, *g, *b);
    let mx = max3(*r, *g, *b);
    let l = lum(*r, *g, *b);
    let clip = |c: V| {
        let c = V::select(|mn, _| mn >= 0.0, mn, mn, c, l + (c - l) * l / (l - mn));
        let c = V::select(|mx, a| mx > a, mx, a, l + (c - l) * (a - l) / (mx - l), c);
        // Rounding can leave the result a hair below zero.
        c.max(V::splat(0.0))
    };
    *r = clip(*r);
    *g = clip(*g);
    *b = clip(*b);
}

/// Writes the non-separable blend of `(rr, gg, bb)` into the source registers.
#[inline(always)]
fn finish_non_separable<V: Lanes>(p: &mut Registers<'_, '_, V>, [rr, gg, bb]: [V; 3]) {
    let (isa, ida) = (inv(p.a), inv(p.da));
    p.r = p.r * ida + p.dr * isa + rr;
    p.g = p.g * ida + p.dg * isa + gg;
    p.b = p.b * ida + p.db * isa + bb;
    p.a = p.a + p.da - p.a * p.da;
}

stage!(hue, |p| {
    let (mut r, mut g, mut b) = (p.r * p.a, p.g * p.a, p.b * p.a);
    set_sat(&mut r, &mut g, &mut b, sat(p.dr, p.dg, p.db) * p.a);
    set_lum(&mut r, &mut g, &mut b, lum(p.dr, p.dg, p.db) * p.a);
    clip_color(&mut r, &mut g, &mut b, p.a * p.da);
    finish_non_separable(p, [r, g, b]);
});

stage!(saturation, |p| {
    let (mut r, mut g, mut b) = (p.dr * p.a, p.dg * p.a, p.db * p.a);
    set_sat(&mut r, &mut g, &mut b, sat(p.r, p.g, p.b) * p.da);
    set_lum(&mut r, &mut g, &mut b, lum(p.dr, p.dg, p.db) * p.a);
    clip_color(&mut r, &mut g, &mut b, p.a * p.da);
    finish_non_separable(p, [r, g, b]);
});

stage!(color, |p| {
    let (mut r, mut g, mut b) = (p.r * p.da, p.g * p.da, p.b * p.da);
    set_lum(&mut r, &mut g, &mut b, lum(p.dr, p.dg, p.db) * p.a);
    clip_color(&mut r, &mut g, &mut b, p.a * p.da);
    finish_non_separable(p, [r, g, b]);
});

stage!(luminosity, |p| {
    let (mut r, mut g, mut b) = (p.dr * p.a, p.dg * p.a, p.db * p.a);
    set_lum(&mut r, &mut g, &mut b, lum(p.r, p.g, p.b) * p.da);
    clip_color(&mut r, &mut g, &mut b, p.a * p.da);
    finish_non_separable(p, [r, g, b]);
});
