//! # hdr-icc
//!
//! The ICC color-management capability the HDR pipeline feeds with
//! profiles and an intent. Built on Little CMS 2.
//!
//! The pipeline only decides *which* profiles and intent to use; this crate
//! turns that decision into an executable transform.
//!
//! # Example
//!
//! ```rust
//! use hdr_icc::{Intent, Profile, StandardProfile, Transform};
//!
//! let src = Profile::from_standard(StandardProfile::DisplayP3).unwrap();
//! let dst = Profile::srgb();
//! let xf = Transform::new(&src, &dst, Intent::Perceptual).unwrap();
//!
//! let mut rgba = vec![0.5f32, 0.5, 0.5, 1.0];
//! xf.apply_rgba(&mut rgba);
//! assert_eq!(rgba[3], 1.0);
//! ```
//!
//! # Built-in profiles
//!
//! sRGB, linear sRGB, BT.2020, Display P3, Adobe RGB (1998), ProPhoto RGB.
//! See [`StandardProfile`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod profile;
mod standard;
mod transform;

pub use error::{IccError, IccResult};
pub use profile::Profile;
pub use standard::StandardProfile;
pub use transform::Transform;

use serde::{Deserialize, Serialize};

/// ICC rendering intent.
///
/// Determines how out-of-gamut colors are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Compresses the source gamut into the destination gamut.
    #[default]
    Perceptual,
    /// Clips out-of-gamut colors, maps media white to media white.
    RelativeColorimetric,
    /// Favours saturation over hue accuracy.
    Saturation,
    /// Clips out-of-gamut colors without white point adaptation.
    AbsoluteColorimetric,
}

impl Intent {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Intent::Perceptual => "Perceptual",
            Intent::RelativeColorimetric => "Relative Colorimetric",
            Intent::Saturation => "Saturation",
            Intent::AbsoluteColorimetric => "Absolute Colorimetric",
        }
    }
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}
