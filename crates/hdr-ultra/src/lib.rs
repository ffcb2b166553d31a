//! # hdr-ultra
//!
//! Ultra HDR (JPEG + gain map) containers.
//!
//! - [`muxer`] builds a two-image MPF container from an SDR JPEG and a
//!   gain-map JPEG, byte for byte, and [`muxer::inspect`] reads one back.
//! - [`synth`] produces such a container from a HEIF/HEIC source by
//!   sequencing `heif-dec`, `exiftool`, `ffmpeg` and `ultrahdr_app`, with
//!   the muxer as fallback packager.
//!
//! # Example
//!
//! ```rust
//! use hdr_ultra::{inspect, mux_ultra_hdr};
//!
//! // smallest stream the muxer accepts: SOI, one DQT, EOI
//! let sdr = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x00, 0xFF, 0xD9];
//! let gain_map = [0xFF, 0xD8, 0xFF, 0xD9];
//!
//! let container = mux_ultra_hdr(&sdr, &gain_map, 4.0).unwrap();
//! let info = inspect(&container).unwrap();
//! assert_eq!(info.images.len(), 2);
//! assert_eq!(info.gain_map_max, Some(2.0));
//! ```

#![warn(missing_docs)]

pub mod cfg;
pub mod error;
pub mod jpeg;
pub mod mpf;
pub mod muxer;
pub mod synth;
pub mod tools;
pub mod xmp;

pub use cfg::MetadataCfg;
pub use error::{MuxError, MuxResult, SynthesisError, SynthesisResult};
pub use mpf::{MpImage, parse_mpf};
pub use muxer::{ContainerInfo, MuxLayout, inspect, mux_files, mux_ultra_hdr, mux_with_layout};
pub use synth::{GainMapSynthesizer, Packager, SynthesisConfig, SynthesisReport};
pub use tools::{ProcessRunner, Tool, ToolInvocation, ToolOutput, ToolPaths, ToolRunner};
