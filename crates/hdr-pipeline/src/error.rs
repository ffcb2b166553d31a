//! Error types for pipeline operations.
//!
//! Most of these never escape a render: profile lookups fall back to the
//! next tier and render failures fall back to showing the source. They are
//! still typed so callers can report them.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline operation error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A profile could not be found or loaded for one resolution tier.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// The render target surface could not be allocated.
    #[error("render target creation failed: {0}")]
    RenderTargetCreationFailed(String),

    /// The color-management transform failed.
    #[error("CMS error: {0}")]
    Cms(#[from] hdr_icc::IccError),

    /// Buffer error from the image model.
    #[error(transparent)]
    Image(#[from] hdr_core::Error),

    /// A stage referenced an input that was not supplied.
    #[error("missing stage input: {0}")]
    MissingInput(&'static str),

    /// Presentation surface operation failed.
    #[error("surface error: {0}")]
    Surface(String),

    /// Configuration file does not exist.
    #[error("config not found: {path:?}")]
    ConfigNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// YAML parse error (config or descriptor).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Metadata probe output is not valid JSON.
    #[error("probe parse error: {0}")]
    Probe(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
