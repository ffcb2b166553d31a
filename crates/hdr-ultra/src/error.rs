//! Error types for muxing and synthesis.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Container muxing / inspection error.
#[derive(Debug, Error)]
pub enum MuxError {
    /// Input is not a usable JPEG stream.
    #[error("invalid JPEG: {0}")]
    InvalidJpeg(String),

    /// A segment payload does not fit the 16-bit JPEG length field.
    #[error("{kind} segment too large: {len} bytes")]
    SegmentTooLarge {
        /// Segment kind.
        kind: &'static str,
        /// Payload length.
        len: usize,
    },

    /// The container would exceed the 32-bit MPF offset range.
    #[error("container too large for MPF: {0} bytes")]
    ContainerTooLarge(usize),

    /// Headroom is not a positive finite value.
    #[error("invalid headroom: {0}")]
    InvalidHeadroom(f32),

    /// Computed primary-image layout disagrees with the bytes written.
    #[error("offset mismatch: primary image is {actual} bytes, layout says {expected}")]
    OffsetMismatch {
        /// Size from the layout.
        expected: usize,
        /// Size actually written.
        actual: usize,
    },

    /// MPF directory missing or malformed.
    #[error("invalid MPF: {0}")]
    InvalidMpf(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for muxing.
pub type MuxResult<T> = Result<T, MuxError>;

/// Gain-map synthesis error. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// External tool could not be started.
    #[error("{tool} not found at {path:?}")]
    ToolMissing {
        /// Tool name.
        tool: &'static str,
        /// Configured path.
        path: PathBuf,
    },

    /// External tool exited unsuccessfully or produced no output.
    #[error("{tool} failed (exit code {code:?}): {message}")]
    ToolExecutionFailed {
        /// Tool name.
        tool: &'static str,
        /// Exit code, if the process exited.
        code: Option<i32>,
        /// Captured stderr or a description.
        message: String,
    },

    /// Extraction produced no auxiliary image recognisable as a gain map.
    #[error("no gain map found among {count} extracted images in {dir:?}")]
    NoGainMapFound {
        /// Workspace searched.
        dir: PathBuf,
        /// Number of auxiliary candidates seen.
        count: usize,
    },

    /// Input file does not exist.
    #[error("input not found: {0:?}")]
    InputNotFound(PathBuf),

    /// Fallback muxer failed.
    #[error("mux error: {0}")]
    Mux(#[from] MuxError),

    /// Configuration file does not exist.
    #[error("config not found: {0:?}")]
    ConfigNotFound(PathBuf),

    /// YAML config parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Workspace I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for synthesis.
pub type SynthesisResult<T> = Result<T, SynthesisError>;
