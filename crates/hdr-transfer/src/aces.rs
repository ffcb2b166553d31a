//! ACES filmic tone curve (Narkowicz fit).
//!
//! A cheap rational approximation of the ACES RRT+ODT shoulder, used to
//! compress scene-linear HDR into a display range.
//!
//! # Formula
//!
//! ```text
//! f(x) = x(a*x + b) / (x(c*x + d) + e)
//! ```
//!
//! with `a=2.51, b=0.03, c=2.43, d=0.59, e=0.14`, clamped to [0, 1].
//!
//! # Reference
//!
//! Krzysztof Narkowicz, "ACES Filmic Tone Mapping Curve" (2016)

const A: f32 = 2.51;
const B: f32 = 0.03;
const C: f32 = 2.43;
const D: f32 = 0.59;
const E: f32 = 0.14;

/// Applies the tone curve to a linear value.
///
/// Negative inputs map to 0.
///
/// ```rust
/// use hdr_transfer::aces::tonemap;
///
/// assert_eq!(tonemap(0.0), 0.0);
/// assert!(tonemap(100.0) <= 1.0);
/// ```
#[inline]
pub fn tonemap(x: f32) -> f32 {
    let x = x.max(0.0);
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(0.0, 1.0)
}

/// Applies the tone curve per channel.
#[inline]
pub fn tonemap_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [tonemap(rgb[0]), tonemap(rgb[1]), tonemap(rgb[2])]
}
