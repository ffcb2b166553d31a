//! Error types for hdr-core operations.
//!
//! Buffer construction and format errors shared by the compositor and the
//! pipeline crates.
//!
//! # Usage
//!
//! ```rust
//! use hdr_core::{Error, Result};
//!
//! fn check(width: u32, height: u32) -> Result<()> {
//!     if width == 0 || height == 0 {
//!         return Err(Error::InvalidDimensions {
//!             width,
//!             height,
//!             reason: "zero-sized".into(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or converting HDR buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, or the buffer size would
    /// overflow.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("buffer length {got} does not match {width}x{height} RGBA (expected {expected})")]
    BufferSize {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Expected number of f32 samples
        expected: usize,
        /// Actual number of f32 samples
        got: usize,
    },

    /// Image dimensions don't match for the operation.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: u32,
        /// First image height
        a_height: u32,
        /// Second image width
        b_width: u32,
        /// Second image height
        b_height: u32,
    },
}
