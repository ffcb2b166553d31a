//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to build a standard profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create transform.
    #[error("failed to create transform: {0}")]
    TransformFailed(String),

    /// Embedded or on-disk bytes are not a usable ICC profile.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// The profile is not an RGB profile.
    #[error("unsupported profile color space: {0}")]
    NotRgb(String),
}
