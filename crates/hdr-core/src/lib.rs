//! # hdr-core
//!
//! Core types for HDR color management and tone reproduction.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace:
//!
//! - [`ColorDescriptor`] - Color metadata detected for a loaded image
//! - [`MasteringMetadata`], [`GainMapParams`] - HDR10 static metadata and gain-map scalars
//! - [`RenderFormat`] - Surface precision chosen once per pipeline build
//! - [`RgbaImage`] - Float RGBA buffer used by the CPU compositor
//!
//! ## Crate Structure
//!
//! ```text
//! hdr-core (this crate)
//!    ^
//!    |
//!    +-- hdr-pipeline (branch selection, profiles, execution)
//!    +-- hdr-ultra (Ultra HDR container, synthesis)
//!    +-- hdr-cli
//! ```
//!
//! ## Lifetime of a descriptor
//!
//! A [`ColorDescriptor`] is created once per loaded image from detection
//! results, is never mutated during a render pass, and is replaced wholesale
//! when a new image loads.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod descriptor;
pub mod error;
pub mod format;
pub mod image;

pub use descriptor::*;
pub use error::*;
pub use format::*;
pub use image::RgbaImage;

/// Prelude module for convenient imports.
///
/// ```
/// use hdr_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::descriptor::{
        ColorDescriptor, ColorPrimaries, ColorRange, GainMapParams, MasteringMetadata,
        MatrixCoefficients, TransferFunction,
    };
    pub use crate::error::{Error, Result};
    pub use crate::format::RenderFormat;
    pub use crate::image::RgbaImage;
}
