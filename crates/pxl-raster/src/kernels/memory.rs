//! Load, store, gather and coverage stages.
//!
//! Memory is touched one lane at a time and only for the `active()` lanes,
//! so a tail chunk never reads or writes past the requested span.

use half::f16;

use super::{inv, mad, out_of_bounds};
use crate::context::{Context, MemoryCtx};
use crate::engine::Registers;
use crate::lanes::{Lanes, MAX_LANES};
use crate::stage::StageId;

/// Normalized float to an `max`-level integer, rounding to nearest.
/// NaN saturates to 0 through the float-to-int cast.
#[inline(always)]
fn unorm(v: f32, max: f32) -> u32 {
    (v.clamp(0.0, 1.0) * max + 0.5) as u32
}

#[inline(always)]
fn from_byte(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline(always)]
fn load_lanes<V: Lanes, const N: usize>(
    p: &Registers<'_, '_, V>,
    stage: StageId,
    mem: &MemoryCtx<'_>,
    decode: impl Fn([u8; N]) -> [f32; 4],
) -> [V; 4] {
    let mut ch = [[0.0f32; MAX_LANES]; 4];
    for i in 0..p.active() {
        let x = p.dx + i;
        let px = mem
            .load::<N>(x, p.dy)
            .unwrap_or_else(|| out_of_bounds(stage, x, p.dy));
        let c = decode(px);
        for (lane, v) in ch.iter_mut().zip(c) {
            lane[i] = v;
        }
    }
    ch.map(|lane| V::from_slice(&lane))
}

#[inline(always)]
fn store_lanes<V: Lanes, const N: usize>(
    p: &Registers<'_, '_, V>,
    stage: StageId,
    mem: &MemoryCtx<'_>,
    rgba: [V; 4],
    encode: impl Fn([f32; 4]) -> [u8; N],
) {
    let ch = rgba.map(|v| v.to_array());
    for i in 0..p.active() {
        let x = p.dx + i;
        let px = encode([ch[0][i], ch[1][i], ch[2][i], ch[3][i]]);
        if !mem.store::<N>(x, p.dy, px) {
            if mem.is_writable() {
                out_of_bounds(stage, x, p.dy);
            }
            panic!("stage `{}` stores into a read-only buffer", stage.name());
        }
    }
}

fn decode_a8([a]: [u8; 1]) -> [f32; 4] {
    [0.0, 0.0, 0.0, from_byte(a)]
}

fn decode_g8([v]: [u8; 1]) -> [f32; 4] {
    let v = from_byte(v);
    [v, v, v, 1.0]
}

fn decode_565(px: [u8; 2]) -> [f32; 4] {
    let v = u16::from_le_bytes(px);
    [
        ((v >> 11) & 0x1f) as f32 / 31.0,
        ((v >> 5) & 0x3f) as f32 / 63.0,
        (v & 0x1f) as f32 / 31.0,
        1.0,
    ]
}

fn encode_565(c: [f32; 4]) -> [u8; 2] {
    let v = unorm(c[0], 31.0) << 11 | unorm(c[1], 63.0) << 5 | unorm(c[2], 31.0);
    (v as u16).to_le_bytes()
}

fn decode_4444(px: [u8; 2]) -> [f32; 4] {
    let v = u16::from_le_bytes(px);
    [12, 8, 4, 0].map(|shift| ((v >> shift) & 0xf) as f32 / 15.0)
}

fn encode_4444(c: [f32; 4]) -> [u8; 2] {
    let v = unorm(c[0], 15.0) << 12 | unorm(c[1], 15.0) << 8 | unorm(c[2], 15.0) << 4 | unorm(c[3], 15.0);
    (v as u16).to_le_bytes()
}

fn decode_8888(px: [u8; 4]) -> [f32; 4] {
    px.map(from_byte)
}

fn encode_8888(c: [f32; 4]) -> [u8; 4] {
    c.map(|v| unorm(v, 255.0) as u8)
}

fn decode_bgra([b, g, r, a]: [u8; 4]) -> [f32; 4] {
    [r, g, b, a].map(from_byte)
}

fn encode_bgra([r, g, b, a]: [f32; 4]) -> [u8; 4] {
    [b, g, r, a].map(|v| unorm(v, 255.0) as u8)
}

fn decode_f16(px: [u8; 8]) -> [f32; 4] {
    std::array::from_fn(|i| f16::from_bits(u16::from_le_bytes([px[2 * i], px[2 * i + 1]])).to_f32())
}

fn encode_f16(c: [f32; 4]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (chunk, v) in out.chunks_exact_mut(2).zip(c) {
        chunk.copy_from_slice(&f16::from_f32(v).to_bits().to_le_bytes());
    }
    out
}

fn decode_f32(px: [u8; 16]) -> [f32; 4] {
    std::array::from_fn(|i| f32::from_le_bytes([px[4 * i], px[4 * i + 1], px[4 * i + 2], px[4 * i + 3]]))
}

fn encode_f32(c: [f32; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (chunk, v) in out.chunks_exact_mut(4).zip(c) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
    out
}

macro_rules! load_store {
    ($load:ident, $load_dst:ident, $store:ident,
     $id_load:ident, $id_load_dst:ident, $id_store:ident,
     $n:literal, $decode:ident, $encode:ident) => {
        stage!($load, |p| {
            let mem = ctx!(p, $id_load, Memory);
            [p.r, p.g, p.b, p.a] = load_lanes::<V, $n>(p, StageId::$id_load, mem, $decode);
        });
        stage!($load_dst, |p| {
            let mem = ctx!(p, $id_load_dst, Memory);
            [p.dr, p.dg, p.db, p.da] = load_lanes::<V, $n>(p, StageId::$id_load_dst, mem, $decode);
        });
        stage!($store, |p| {
            let mem = ctx!(p, $id_store, Memory);
            store_lanes::<V, $n>(p, StageId::$id_store, mem, [p.r, p.g, p.b, p.a], $encode);
        });
    };
}

load_store!(load_565, load_565_dst, store_565, Load565, Load565Dst, Store565, 2, decode_565, encode_565);
load_store!(load_4444, load_4444_dst, store_4444, Load4444, Load4444Dst, Store4444, 2, decode_4444, encode_4444);
load_store!(load_8888, load_8888_dst, store_8888, Load8888, Load8888Dst, Store8888, 4, decode_8888, encode_8888);
load_store!(load_bgra, load_bgra_dst, store_bgra, LoadBgra, LoadBgraDst, StoreBgra, 4, decode_bgra, encode_bgra);
load_store!(load_f16, load_f16_dst, store_f16, LoadF16, LoadF16Dst, StoreF16, 8, decode_f16, encode_f16);
load_store!(load_f32, load_f32_dst, store_f32, LoadF32, LoadF32Dst, StoreF32, 16, decode_f32, encode_f32);

stage!(load_a8, |p| {
    let mem = ctx!(p, LoadA8, Memory);
    [p.r, p.g, p.b, p.a] = load_lanes::<V, 1>(p, StageId::LoadA8, mem, decode_a8);
});

stage!(load_a8_dst, |p| {
    let mem = ctx!(p, LoadA8Dst, Memory);
    [p.dr, p.dg, p.db, p.da] = load_lanes::<V, 1>(p, StageId::LoadA8Dst, mem, decode_a8);
});

stage!(store_a8, |p| {
    let mem = ctx!(p, StoreA8, Memory);
    store_lanes::<V, 1>(p, StageId::StoreA8, mem, [p.r, p.g, p.b, p.a], |c| [unorm(c[3], 255.0) as u8]);
});

stage!(load_g8, |p| {
    let mem = ctx!(p, LoadG8, Memory);
    [p.r, p.g, p.b, p.a] = load_lanes::<V, 1>(p, StageId::LoadG8, mem, decode_g8);
});

stage!(load_g8_dst, |p| {
    let mem = ctx!(p, LoadG8Dst, Memory);
    [p.dr, p.dg, p.db, p.da] = load_lanes::<V, 1>(p, StageId::LoadG8Dst, mem, decode_g8);
});

stage!(gather_8888, |p| {
    let img = ctx!(p, Gather8888, Gather);
    let (xs, ys) = (p.r.to_array(), p.g.to_array());
    let max_x = img.width.saturating_sub(1) as f32;
    let max_y = img.height.saturating_sub(1) as f32;
    let mut ch = [[0.0f32; MAX_LANES]; 4];
    for i in 0..p.active() {
        // Truncation after the clamp; NaN lands on 0.
        let ix = xs[i].clamp(0.0, max_x) as usize;
        let iy = ys[i].clamp(0.0, max_y) as usize;
        let at = (iy * img.stride + ix) * 4;
        let px = img
            .pixels
            .get(at..at + 4)
            .unwrap_or_else(|| out_of_bounds(StageId::Gather8888, ix, iy));
        for (lane, v) in ch.iter_mut().zip(px) {
            lane[i] = from_byte(*v);
        }
    }
    [p.r, p.g, p.b, p.a] = ch.map(|lane| V::from_slice(&lane));
});

fn coverage<V: Lanes>(p: &Registers<'_, '_, V>, stage: StageId, mem: &MemoryCtx<'_>) -> V {
    let [_, _, _, c] = load_lanes::<V, 1>(p, stage, mem, decode_a8);
    c
}

stage!(scale_u8, |p| {
    let mem = ctx!(p, ScaleU8, Memory);
    let c = coverage(p, StageId::ScaleU8, mem);
    p.r = p.r * c;
    p.g = p.g * c;
    p.b = p.b * c;
    p.a = p.a * c;
});

stage!(lerp_u8, |p| {
    let mem = ctx!(p, LerpU8, Memory);
    let c = coverage(p, StageId::LerpU8, mem);
    p.r = mad(p.r - p.dr, c, p.dr);
    p.g = mad(p.g - p.dg, c, p.dg);
    p.b = mad(p.b - p.db, c, p.db);
    p.a = mad(p.a - p.da, c, p.da);
});

stage!(srcover_rgba_8888, |p| {
    let mem = ctx!(p, SrcOverRgba8888, Memory);
    [p.dr, p.dg, p.db, p.da] = load_lanes::<V, 4>(p, StageId::SrcOverRgba8888, mem, decode_8888);
    let isa = inv(p.a);
    p.r = mad(p.dr, isa, p.r);
    p.g = mad(p.dg, isa, p.g);
    p.b = mad(p.db, isa, p.b);
    p.a = mad(p.da, isa, p.a);
    store_lanes::<V, 4>(p, StageId::SrcOverRgba8888, mem, [p.r, p.g, p.b, p.a], encode_8888);
});
