//! Lookup-table generation for the transfer curves.
//!
//! Every table samples the normalized domain [0, 1] at `size` evenly spaced
//! points, `x_i = i / (size - 1)`. Tables are what a compositor uploads as a
//! 1D LUT / table-transfer effect.
//!
//! # Usage
//!
//! ```rust
//! use hdr_transfer::table::{pq_eotf_table, is_monotonic};
//!
//! let lut = pq_eotf_table(1024);
//! assert_eq!(lut.len(), 1024);
//! assert!(is_monotonic(&lut));
//! ```

use crate::{aces, hlg, pq};

/// Domain sample for index `i` of an `n`-entry table.
#[inline]
fn sample(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

fn build(size: usize, f: impl Fn(f32) -> f32) -> Vec<f32> {
    (0..size).map(|i| f(sample(i, size))).collect()
}

/// PQ code value -> normalized linear light (1.0 = 10000 nits).
pub fn pq_eotf_table(size: usize) -> Vec<f32> {
    build(size, pq::eotf)
}

/// Normalized linear light -> PQ code value.
pub fn linear_to_pq_table(size: usize) -> Vec<f32> {
    build(size, pq::oetf)
}

/// Normalized linear light (1.0 = 1000 nits) -> HLG signal.
pub fn linear_to_hlg_table(size: usize) -> Vec<f32> {
    build(size, hlg::oetf)
}

/// ACES filmic tone curve with the domain stretched by `input_scale`.
///
/// Entry `i` is `tonemap(i / (size - 1) * input_scale)`.
pub fn aces_tonemap_table(size: usize, input_scale: f32) -> Vec<f32> {
    build(size, |x| aces::tonemap(x * input_scale))
}

/// Returns `true` if the table never decreases.
pub fn is_monotonic(table: &[f32]) -> bool {
    table.windows(2).all(|w| w[1] >= w[0])
}

/// Evaluates a table at `x` in [0, 1] with linear interpolation.
pub fn lookup(table: &[f32], x: f32) -> f32 {
    match table.len() {
        0 => x,
        1 => table[0],
        n => {
            let pos = x.clamp(0.0, 1.0) * (n - 1) as f32;
            let i = (pos.floor() as usize).min(n - 2);
            let t = pos - i as f32;
            table[i] + (table[i + 1] - table[i]) * t
        }
    }
}
