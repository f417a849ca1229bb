//! Sampled transfer curves.
//!
//! A table holds `n >= 2` samples of a decoding curve at evenly spaced
//! encoded positions `i / (n - 1)`.

/// Evaluates `f` at every 8-bit code.
pub fn byte_table(f: impl Fn(f32) -> f32) -> [f32; 256] {
    std::array::from_fn(|i| f(i as f32 * (1.0 / 255.0)))
}

/// Interpolating lookup of `x` (clamped to [0, 1]).
///
/// ```rust
/// use pxl_transfer::table::interp_lut;
///
/// let t = [0.0, 0.25, 1.0];
/// assert_eq!(interp_lut(0.25, &t), 0.125);
/// ```
pub fn interp_lut(x: f32, table: &[f32]) -> f32 {
    match table.len() {
        0 => return x,
        1 => return table[0],
        _ => {}
    }
    let last = table.len() - 1;
    let index = x.clamp(0.0, 1.0) * last as f32;
    let lo = (index.floor() as usize).min(last);
    let hi = (index.ceil() as usize).min(last);
    let frac = index - lo as f32;
    table[lo] * (1.0 - frac) + table[hi] * frac
}

/// Inverse lookup: which encoded position produces `y`?
///
/// Linear search for the first sample at or above `y`, then linear
/// interpolation inside that interval. Assumes an increasing table;
/// values below the first sample return that sample, values at or above
/// the last return 1.
pub fn interp_lut_inv(y: f32, table: &[f32]) -> f32 {
    if table.len() < 2 {
        return y;
    }
    let last = table.len() - 1;
    if y <= table[0] {
        return table[0];
    }
    if y >= table[last] {
        return 1.0;
    }
    for i in 1..table.len() {
        if table[i] >= y {
            let diff = y - table[i - 1];
            let distance = table[i] - table[i - 1];
            let index = (i - 1) as f32 + diff / distance;
            return index / last as f32;
        }
    }
    // NaN input falls through every comparison.
    0.0
}

/// Best single exponent approximating a table, for planning purposes.
///
/// Averages `ln(y) / ln(x)` over the interior samples. Returns `None` when
/// no sample is usable.
pub fn fit_exponent(table: &[f32]) -> Option<f32> {
    if table.len() < 3 {
        return None;
    }
    let last = (table.len() - 1) as f32;
    let (sum, count) = table
        .iter()
        .enumerate()
        .skip(1)
        .take(table.len() - 2)
        .filter(|&(_, &y)| y > 0.0 && y < 1.0)
        .map(|(i, &y)| y.ln() / (i as f32 / last).ln())
        .filter(|g| g.is_finite() && *g > 0.0)
        .fold((0.0f32, 0usize), |(s, n), g| (s + g, n + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Checks that a table can drive a color space curve.
pub fn is_valid_table(table: &[f32]) -> bool {
    table.len() >= 2 && table.iter().all(|v| v.is_finite())
}
