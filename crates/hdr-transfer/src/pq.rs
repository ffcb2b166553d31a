//! SMPTE ST 2084 Perceptual Quantizer (PQ) transfer function.
//!
//! PQ encodes absolute luminance up to 10,000 cd/m2 in a perceptually
//! uniform way.
//!
//! # Range
//!
//! - Encoded: [0, 1]
//! - Linear: [0, 1] normalized, where 1.0 = 10000 cd/m2 (nits)
//!
//! The [`eotf`]/[`oetf`] pair works on normalized linear light; the
//! `_nits` variants take and return absolute luminance. Evaluation is done
//! in `f64` so that table round-trips stay well inside 1e-4.
//!
//! # Reference
//!
//! SMPTE ST 2084:2014
//!
//! # Usage
//!
//! ```rust
//! use hdr_transfer::pq;
//!
//! assert_eq!(pq::eotf(0.0), 0.0);
//! assert!((pq::eotf(1.0) - 1.0).abs() < 1e-6);
//!
//! // 100 nits reference white sits near 0.508
//! let signal = pq::oetf_nits(100.0);
//! assert!((signal - 0.508).abs() < 0.01);
//! ```

/// Maximum luminance in cd/m2 (nits).
pub const L_MAX: f32 = 10000.0;

// PQ constants from SMPTE ST 2084
const M1: f64 = 0.1593017578125;
const M2: f64 = 78.84375;
const C1: f64 = 0.8359375;
const C2: f64 = 18.8515625;
const C3: f64 = 18.6875;

/// PQ EOTF: decodes a PQ code value to normalized linear light.
///
/// # Formula
///
/// ```text
/// Vp  = V^(1/m2)
/// num = max(Vp - c1, 0)
/// den = max(c2 - c3*Vp, 1e-6)
/// L   = (num/den)^(1/m1)
/// ```
///
/// The result is clamped to [0, 1].
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= 0.0 {
        return 0.0;
    }
    let vp = (v as f64).powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = (C2 - C3 * vp).max(1e-6);
    (num / den).powf(1.0 / M1).clamp(0.0, 1.0) as f32
}

/// PQ inverse EOTF: encodes normalized linear light to a PQ code value.
///
/// # Formula
///
/// ```text
/// Lm1 = L^m1
/// N   = ((c1 + c2*Lm1) / (1 + c3*Lm1))^m2
/// ```
///
/// The result is clamped to [0, 1].
#[inline]
pub fn oetf(l: f32) -> f32 {
    let l = (l as f64).clamp(0.0, 1.0);
    let lm1 = l.powf(M1);
    let n = ((C1 + C2 * lm1) / (1.0 + C3 * lm1)).powf(M2);
    n.clamp(0.0, 1.0) as f32
}

/// Decodes a PQ code value to absolute luminance in nits.
#[inline]
pub fn eotf_nits(v: f32) -> f32 {
    eotf(v) * L_MAX
}

/// Encodes absolute luminance in nits to a PQ code value.
#[inline]
pub fn oetf_nits(nits: f32) -> f32 {
    oetf(nits / L_MAX)
}

/// Applies the PQ EOTF to RGB.
#[inline]
pub fn eotf_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [eotf(rgb[0]), eotf(rgb[1]), eotf(rgb[2])]
}

/// Applies the PQ inverse EOTF to RGB.
#[inline]
pub fn oetf_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [oetf(rgb[0]), oetf(rgb[1]), oetf(rgb[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let test_values = [0.0, 0.1, 1.0, 10.0, 100.0, 1000.0, 10000.0];
        for &l in &test_values {
            let decoded = eotf_nits(oetf_nits(l));
            assert!(
                (l - decoded).abs() < l * 0.001 + 0.001,
                "l={}, decoded={}",
                l,
                decoded
            );
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(eotf(0.0), 0.0);
        assert!((eotf(1.0) - 1.0).abs() < 1e-6);
        assert!((oetf(1.0) - 1.0).abs() < 1e-6);
        // c1^m2 is the code value of zero light
        assert!(oetf(0.0) < 1e-6);
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(eotf(-1.0), 0.0);
        assert!(eotf(2.0) <= 1.0);
        assert!(oetf(5.0) <= 1.0);
    }
}
