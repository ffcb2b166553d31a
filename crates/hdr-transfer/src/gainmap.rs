//! Ultra HDR gain-map recovery.
//!
//! Reconstructs HDR linear light from an SDR base pixel and a gain-map
//! sample, following the ISO 21496-1 / Ultra HDR v1 formulation:
//!
//! ```text
//! log_boost = lerp(min, max, gain^(1/gamma))      // stops
//! hdr       = (sdr + offset_sdr) * 2^(log_boost * weight) - offset_hdr
//! ```
//!
//! `weight` scales the boost to the headroom of the display
//! (see [`display_weight`]).

use hdr_core::GainMapParams;

/// Display weight in [0, 1] for a display with `display_headroom` stops.
///
/// 0 at or below `hdr_capacity_min`, 1 at or above `hdr_capacity_max`,
/// linear in between.
///
/// ```rust
/// use hdr_core::GainMapParams;
/// use hdr_transfer::gainmap::display_weight;
///
/// let p = GainMapParams::from_headroom(4.0); // capacity 0..2 stops
/// assert_eq!(display_weight(&p, 0.0), 0.0);
/// assert_eq!(display_weight(&p, 1.0), 0.5);
/// assert_eq!(display_weight(&p, 3.0), 1.0);
/// ```
pub fn display_weight(params: &GainMapParams, display_headroom: f32) -> f32 {
    let span = params.hdr_capacity_max - params.hdr_capacity_min;
    if span <= 0.0 {
        return if display_headroom >= params.hdr_capacity_max { 1.0 } else { 0.0 };
    }
    ((display_headroom - params.hdr_capacity_min) / span).clamp(0.0, 1.0)
}

/// Boost in stops encoded by a gain-map sample in [0, 1].
#[inline]
pub fn log_boost(params: &GainMapParams, gain: f32) -> f32 {
    let g = gain.clamp(0.0, 1.0);
    let g = if params.gamma != 1.0 && params.gamma > 0.0 {
        g.powf(1.0 / params.gamma)
    } else {
        g
    };
    params.min + (params.max - params.min) * g
}

/// Linearizes an sRGB-encoded base image sample (IEC 61966-2-1).
#[inline]
pub fn base_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Applies the gain to one linear SDR channel.
#[inline]
pub fn apply_gain(params: &GainMapParams, sdr: f32, gain: f32, weight: f32) -> f32 {
    (sdr + params.offset_sdr) * (log_boost(params, gain) * weight).exp2() - params.offset_hdr
}

/// Applies the gain to a linear RGB pixel.
///
/// A single-channel gain map passes the same sample for all three channels.
#[inline]
pub fn apply_gain_rgb(params: &GainMapParams, sdr: [f32; 3], gain: [f32; 3], weight: f32) -> [f32; 3] {
    [
        apply_gain(params, sdr[0], gain[0], weight),
        apply_gain(params, sdr[1], gain[1], weight),
        apply_gain(params, sdr[2], gain[2], weight),
    ]
}
