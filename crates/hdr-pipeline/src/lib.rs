//! # hdr-pipeline
//!
//! Per-image tone-reproduction pipeline for mixed SDR/HDR sources.
//!
//! Building a pipeline is a pure decision: a [`ColorDescriptor`] and the
//! target capability select a [`Branch`], a [`RenderFormat`] and an ordered
//! list of [`PipelineStage`]s. Executing it hands the stages to a
//! [`Compositor`] one after another, each producing a new image.
//!
//! | Branch | When | Stages |
//! |--------|------|--------|
//! | A | PQ / HLG / Linear on an HDR target | scRGB scale or synthesized boost matrix |
//! | B | gain map on an HDR target | optional gain-map blend |
//! | C | everything else | range expansion, ICC transform |
//!
//! # Example
//!
//! ```rust
//! use hdr_core::{ColorDescriptor, ColorRange, RgbaImage, TransferFunction};
//! use hdr_pipeline::{
//!     BuildRequest, BuiltinProfileStore, CpuCompositor, PipelineBuilder, PipelineConfig, render,
//! };
//!
//! let config = PipelineConfig::default();
//! let store = BuiltinProfileStore;
//! let desc = ColorDescriptor {
//!     transfer: TransferFunction::Srgb,
//!     range: ColorRange::Limited,
//!     ..Default::default()
//! };
//!
//! let plan = PipelineBuilder::new(&config, &store).build(&BuildRequest::new(&desc));
//! assert_eq!(plan.stages.len(), 2);
//!
//! let source = RgbaImage::filled(4, 4, [0.5, 0.5, 0.5, 1.0]);
//! let out = render(&CpuCompositor::new(), &plan, &source, None);
//! assert!(out.is_rendered());
//! ```
//!
//! [`ColorDescriptor`]: hdr_core::ColorDescriptor
//! [`RenderFormat`]: hdr_core::RenderFormat

#![warn(missing_docs)]

pub mod branch;
pub mod builder;
pub mod config;
pub mod detect;
pub mod error;
pub mod executor;
pub mod profile;
pub mod stage;
pub mod surface;

pub use branch::{Branch, TransferKind, render_format, select_branch};
pub use builder::{BuildRequest, PipelineBuilder, PipelinePlan};
pub use config::PipelineConfig;
pub use detect::{DetectedSource, from_ffprobe_json};
pub use error::{PipelineError, PipelineResult};
pub use executor::{Compositor, CpuCompositor, RenderOutput, execute, render};
pub use profile::{
    BuiltinProfileStore, ColorProfile, ProfileResolver, ProfileStore, ProfileTier, ResolvedProfile,
    SystemProfileStore,
};
pub use stage::PipelineStage;
pub use surface::{
    FitTransform, Hdr10Metadata, MemorySurface, SurfaceAction, SurfaceColorSpace, SurfaceHost,
    ensure_surface, fit_to_surface,
};
