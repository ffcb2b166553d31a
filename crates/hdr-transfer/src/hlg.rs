//! Hybrid Log-Gamma (HLG) transfer function.
//!
//! HLG is designed for HDR broadcast and stays compatible with SDR displays.
//! It uses a square-root segment for shadows and a logarithmic segment for
//! highlights.
//!
//! # Range
//!
//! - Encoded: [0, 1]
//! - Linear: [0, 1] relative, where 1.0 corresponds to 1000 cd/m2 nominal peak
//!
//! # Reference
//!
//! ITU-R BT.2100-2

// HLG constants
const A: f64 = 0.17883277;
const B: f64 = 0.28466892; // 1 - 4*A
const C: f64 = 0.55991073; // 0.5 - A*ln(4*A)

/// Nominal peak luminance represented by linear 1.0, in nits.
pub const NOMINAL_PEAK_NITS: f32 = 1000.0;

/// HLG OETF: encodes linear light to an HLG signal.
///
/// # Formula
///
/// ```text
/// if L <= 1/12:
///     V = sqrt(3 * L)
/// else:
///     V = A * ln(12*L - B) + C
/// ```
///
/// The result is clamped to [0, 1].
///
/// # Example
///
/// ```rust
/// use hdr_transfer::hlg::oetf;
///
/// assert!((oetf(1.0 / 12.0) - 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn oetf(l: f32) -> f32 {
    let l = l as f64;
    let v = if l <= 0.0 {
        0.0
    } else if l <= 1.0 / 12.0 {
        (3.0 * l).sqrt()
    } else {
        A * (12.0 * l - B).ln() + C
    };
    v.clamp(0.0, 1.0) as f32
}

/// HLG inverse OETF: decodes an HLG signal to linear light.
#[inline]
pub fn inverse_oetf(v: f32) -> f32 {
    let v = v as f64;
    let l = if v <= 0.0 {
        0.0
    } else if v <= 0.5 {
        v * v / 3.0
    } else {
        (((v - C) / A).exp() + B) / 12.0
    };
    l as f32
}

/// Applies the HLG OETF to RGB.
#[inline]
pub fn oetf_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [oetf(rgb[0]), oetf(rgb[1]), oetf(rgb[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let e = i as f32 / 100.0;
            let decoded = inverse_oetf(oetf(e));
            assert!((e - decoded).abs() < 1e-4, "e={}, decoded={}", e, decoded);
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(oetf(0.0), 0.0);
        assert!((oetf(1.0) - 1.0).abs() < 1e-6);
        assert_eq!(oetf(-0.5), 0.0);
        assert_eq!(oetf(4.0), 1.0);
    }

    #[test]
    fn test_transition_point() {
        let below = oetf(1.0 / 12.0 - 1e-6);
        let at = oetf(1.0 / 12.0);
        let above = oetf(1.0 / 12.0 + 1e-6);
        assert!(below <= at && at <= above);
        assert!((above - below).abs() < 1e-4);
    }
}
