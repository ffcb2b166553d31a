//! # hdr-transfer
//!
//! Transfer curves and tone curves for HDR display and export.
//!
//! All functions are pure and work on normalized values; tables sample the
//! domain [0, 1] at a caller-chosen size.
//!
//! # Supported Curves
//!
//! | Module | Curve | Linear domain |
//! |--------|-------|---------------|
//! | [`pq`] | SMPTE ST 2084 EOTF and inverse | [0, 1] = 0..10000 nits |
//! | [`hlg`] | ARIB STD-B67 / BT.2100 HLG OETF | [0, 1] = 0..1000 nits |
//! | [`aces`] | ACES filmic (Narkowicz) tonemap | scene-linear, caller-scaled |
//! | [`gainmap`] | Ultra HDR gain-map recovery | SDR linear -> HDR linear |
//!
//! [`table`] turns the curves into monotonic lookup tables.
//!
//! # Usage
//!
//! ```rust
//! use hdr_transfer::{pq, table};
//!
//! let lin = pq::eotf(0.75);
//! assert!((pq::oetf(lin) - 0.75).abs() < 1e-4);
//!
//! let tonemap = table::aces_tonemap_table(1024, 8.0);
//! assert!(table::is_monotonic(&tonemap));
//! ```

#![warn(missing_docs)]

pub mod aces;
pub mod gainmap;
pub mod hlg;
pub mod pq;
pub mod table;

pub use table::{
    aces_tonemap_table, is_monotonic, linear_to_hlg_table, linear_to_pq_table, pq_eotf_table,
};
