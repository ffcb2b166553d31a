//! Curve property tests.
//!
//! Dense sweeps over the normalized domain checking endpoints, monotonicity,
//! range and PQ round-trip accuracy.

use approx::assert_abs_diff_eq;
use hdr_transfer::{aces, hlg, pq, table};

const SWEEP: usize = 4096;

// ============================================================================
// PQ
// ============================================================================

#[test]
fn pq_endpoints() {
    assert_eq!(pq::eotf(0.0), 0.0);
    assert_abs_diff_eq!(pq::eotf(1.0), 1.0, epsilon = 1e-6);
}

#[test]
fn pq_roundtrip_linear_domain() {
    for i in 0..SWEEP {
        let l = i as f32 / (SWEEP - 1) as f32;
        let back = pq::eotf(pq::oetf(l));
        assert!((back - l).abs() < 1e-4, "L={} -> {}", l, back);
    }
}

#[test]
fn pq_roundtrip_code_domain() {
    for i in 0..SWEEP {
        let v = i as f32 / (SWEEP - 1) as f32;
        let back = pq::oetf(pq::eotf(v));
        assert!((back - v).abs() < 1e-4, "V={} -> {}", v, back);
    }
}

/// Published ST 2084 code values for common luminance levels.
const PQ_REFERENCE: &[(f32, f32)] = &[
    // (nits, code value)
    (0.0, 0.0),
    (100.0, 0.5081),
    (1000.0, 0.7518),
    (10000.0, 1.0),
];

#[test]
fn pq_reference_points() {
    for &(nits, code) in PQ_REFERENCE {
        assert_abs_diff_eq!(pq::oetf_nits(nits), code, epsilon = 1e-3);
    }
}

// ============================================================================
// HLG
// ============================================================================

#[test]
fn hlg_continuous_across_breakpoint() {
    let knee = 1.0 / 12.0;
    assert_abs_diff_eq!(hlg::oetf(knee), 0.5, epsilon = 1e-6);
    let step = 1e-5;
    let left = hlg::oetf(knee - step);
    let right = hlg::oetf(knee + step);
    assert!(left <= hlg::oetf(knee));
    assert!(hlg::oetf(knee) <= right);
    assert!(right - left < 1e-3);
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn all_tables_monotonic() {
    for &size in &[2usize, 17, 1024, SWEEP] {
        assert!(table::is_monotonic(&table::pq_eotf_table(size)), "pq eotf {}", size);
        assert!(table::is_monotonic(&table::linear_to_pq_table(size)), "pq oetf {}", size);
        assert!(table::is_monotonic(&table::linear_to_hlg_table(size)), "hlg {}", size);
        for &scale in &[1.0f32, 4.0, 12.5, 100.0] {
            assert!(
                table::is_monotonic(&table::aces_tonemap_table(size, scale)),
                "aces {} x{}",
                size,
                scale
            );
        }
    }
}

#[test]
fn aces_output_bounded() {
    for i in 0..SWEEP {
        let x = i as f32 * 0.25;
        let y = aces::tonemap(x);
        assert!((0.0..=1.0).contains(&y), "x={} -> {}", x, y);
    }
    for &v in &table::aces_tonemap_table(1024, 1000.0) {
        assert!((0.0..=1.0).contains(&v));
    }
}
