//! Register shuffles, clamps, alpha, constant colors, matrices and
//! transfer curves.

use pxl_transfer::{srgb, table};

use super::mad;
use crate::context::Context;
use crate::engine::Registers;
use crate::lanes::Lanes;
use crate::stage::StageId;

/// `f` applied to `|x|` with the sign put back.
#[inline(always)]
fn mirrored(x: f32, f: impl Fn(f32) -> f32) -> f32 {
    if x < 0.0 { -f(-x) } else { f(x) }
}

fn matrix<'a, V: Lanes>(p: &Registers<'_, 'a, V>, stage: StageId, n: usize) -> &'a [f32] {
    let m = match p.ctx() {
        Context::Matrix(m) => m,
        other => super::bad_context(stage, "Matrix", other),
    };
    if m.len() < n {
        panic!("stage `{}` needs {} matrix coefficients, got {}", stage.name(), n, m.len());
    }
    m
}

stage!(move_src_dst, |p| {
    (p.dr, p.dg, p.db, p.da) = (p.r, p.g, p.b, p.a);
});

stage!(move_dst_src, |p| {
    (p.r, p.g, p.b, p.a) = (p.dr, p.dg, p.db, p.da);
});

stage!(swap_rb, |p| {
    std::mem::swap(&mut p.r, &mut p.b);
});

stage!(clamp_0, |p| {
    let zero = V::splat(0.0);
    p.r = p.r.max(zero);
    p.g = p.g.max(zero);
    p.b = p.b.max(zero);
    p.a = p.a.max(zero);
});

stage!(clamp_1, |p| {
    let one = V::splat(1.0);
    p.r = p.r.min(one);
    p.g = p.g.min(one);
    p.b = p.b.min(one);
    p.a = p.a.min(one);
});

stage!(clamp_a, |p| {
    p.a = p.a.min(V::splat(1.0));
    p.r = p.r.min(p.a);
    p.g = p.g.min(p.a);
    p.b = p.b.min(p.a);
});

stage!(clamp_a_dst, |p| {
    p.da = p.da.min(V::splat(1.0));
    p.dr = p.dr.min(p.da);
    p.dg = p.dg.min(p.da);
    p.db = p.db.min(p.da);
});

stage!(unpremul, |p| {
    // Zero (or denormal) alpha has no finite reciprocal; such pixels go to 0.
    let scale = p.a.map(|a| {
        let r = 1.0 / a;
        if r.is_finite() { r } else { 0.0 }
    });
    p.r = p.r * scale;
    p.g = p.g * scale;
    p.b = p.b * scale;
});

stage!(premul, |p| {
    p.r = p.r * p.a;
    p.g = p.g * p.a;
    p.b = p.b * p.a;
});

stage!(premul_dst, |p| {
    p.dr = p.dr * p.da;
    p.dg = p.dg * p.da;
    p.db = p.db * p.da;
});

stage!(set_rgb, |p| {
    let c = ctx!(p, SetRgb, Color);
    p.r = V::splat(c[0]);
    p.g = V::splat(c[1]);
    p.b = V::splat(c[2]);
});

stage!(black_color, |p| {
    p.r = V::splat(0.0);
    p.g = V::splat(0.0);
    p.b = V::splat(0.0);
    p.a = V::splat(1.0);
});

stage!(white_color, |p| {
    let one = V::splat(1.0);
    (p.r, p.g, p.b, p.a) = (one, one, one, one);
});

stage!(constant_color, |p| {
    let c = ctx!(p, ConstantColor, Color);
    [p.r, p.g, p.b, p.a] = c.map(V::splat);
});

stage!(scale_1_float, |p| {
    let c = V::splat(ctx!(p, Scale1Float, Float));
    p.r = p.r * c;
    p.g = p.g * c;
    p.b = p.b * c;
    p.a = p.a * c;
});

stage!(lerp_1_float, |p| {
    let c = V::splat(ctx!(p, Lerp1Float, Float));
    p.r = mad(p.r - p.dr, c, p.dr);
    p.g = mad(p.g - p.dg, c, p.dg);
    p.b = mad(p.b - p.db, c, p.db);
    p.a = mad(p.a - p.da, c, p.da);
});

stage!(luminance_to_alpha, |p| {
    p.a = p.r * V::splat(0.2126) + p.g * V::splat(0.7152) + p.b * V::splat(0.0722);
    p.r = V::splat(0.0);
    p.g = V::splat(0.0);
    p.b = V::splat(0.0);
});

stage!(matrix_2x3, |p| {
    let m = matrix(p, StageId::Matrix2x3, 6);
    let m: [V; 6] = std::array::from_fn(|i| V::splat(m[i]));
    let (r, g) = (p.r, p.g);
    p.r = mad(r, m[0], mad(g, m[1], m[2]));
    p.g = mad(r, m[3], mad(g, m[4], m[5]));
});

stage!(matrix_3x3, |p| {
    let m = matrix(p, StageId::Matrix3x3, 9);
    let m: [V; 9] = std::array::from_fn(|i| V::splat(m[i]));
    let (r, g, b) = (p.r, p.g, p.b);
    p.r = r * m[0] + g * m[1] + b * m[2];
    p.g = r * m[3] + g * m[4] + b * m[5];
    p.b = r * m[6] + g * m[7] + b * m[8];
});

stage!(matrix_3x4, |p| {
    let m = matrix(p, StageId::Matrix3x4, 12);
    let m: [V; 12] = std::array::from_fn(|i| V::splat(m[i]));
    let (r, g, b) = (p.r, p.g, p.b);
    p.r = r * m[0] + g * m[1] + b * m[2] + m[3];
    p.g = r * m[4] + g * m[5] + b * m[6] + m[7];
    p.b = r * m[8] + g * m[9] + b * m[10] + m[11];
});

stage!(matrix_4x5, |p| {
    let m = matrix(p, StageId::Matrix4x5, 20);
    let m: [V; 20] = std::array::from_fn(|i| V::splat(m[i]));
    let (r, g, b, a) = (p.r, p.g, p.b, p.a);
    p.r = r * m[0] + g * m[1] + b * m[2] + a * m[3] + m[4];
    p.g = r * m[5] + g * m[6] + b * m[7] + a * m[8] + m[9];
    p.b = r * m[10] + g * m[11] + b * m[12] + a * m[13] + m[14];
    p.a = r * m[15] + g * m[16] + b * m[17] + a * m[18] + m[19];
});

stage!(matrix_perspective, |p| {
    let m = matrix(p, StageId::MatrixPerspective, 9);
    let m: [V; 9] = std::array::from_fn(|i| V::splat(m[i]));
    let (r, g) = (p.r, p.g);
    let w = r * m[6] + g * m[7] + m[8];
    p.r = (r * m[0] + g * m[1] + m[2]) / w;
    p.g = (r * m[3] + g * m[4] + m[5]) / w;
});

stage!(from_srgb, |p| {
    let f = |x| mirrored(x, srgb::eotf);
    p.r = p.r.map(f);
    p.g = p.g.map(f);
    p.b = p.b.map(f);
});

stage!(from_srgb_dst, |p| {
    let f = |x| mirrored(x, srgb::eotf);
    p.dr = p.dr.map(f);
    p.dg = p.dg.map(f);
    p.db = p.db.map(f);
});

stage!(to_srgb, |p| {
    let f = |x| mirrored(x, srgb::oetf);
    p.r = p.r.map(f);
    p.g = p.g.map(f);
    p.b = p.b.map(f);
});

stage!(gamma, |p| {
    let g = ctx!(p, Gamma, Float);
    let f = |x| mirrored(x, |x| x.powf(g));
    p.r = p.r.map(f);
    p.g = p.g.map(f);
    p.b = p.b.map(f);
});

stage!(parametric, |p| {
    let tf = ctx!(p, Parametric, Parametric);
    let f = |x| tf.eval(x);
    p.r = p.r.map(f);
    p.g = p.g.map(f);
    p.b = p.b.map(f);
});

macro_rules! parametric_stage {
    ($name:ident, $id:ident, $reg:ident) => {
        stage!($name, |p| {
            let tf = ctx!(p, $id, Parametric);
            p.$reg = p.$reg.map(|x| tf.eval(x));
        });
    };
}

parametric_stage!(parametric_r, ParametricR, r);
parametric_stage!(parametric_g, ParametricG, g);
parametric_stage!(parametric_b, ParametricB, b);
parametric_stage!(parametric_a, ParametricA, a);

macro_rules! table_stage {
    ($name:ident, $id:ident, $reg:ident) => {
        stage!($name, |p| {
            let t = ctx!(p, $id, Table);
            p.$reg = p.$reg.map(|x| table::interp_lut(x, t));
        });
    };
}

table_stage!(table_r, TableR, r);
table_stage!(table_g, TableG, g);
table_stage!(table_b, TableB, b);
table_stage!(table_a, TableA, a);

stage!(byte_tables, |p| {
    let t = ctx!(p, ByteTables, ByteTables);
    let lookup = |v: V, table: &[u8; 256]| {
        v.map(|x| {
            // NaN saturates to index 0.
            let i = (x.clamp(0.0, 1.0) * 255.0 + 0.5) as usize;
            table[i] as f32 / 255.0
        })
    };
    p.r = lookup(p.r, &t.r);
    p.g = lookup(p.g, &t.g);
    p.b = lookup(p.b, &t.b);
    p.a = lookup(p.a, &t.a);
});
