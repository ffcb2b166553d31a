//! Color metadata for a loaded image.
//!
//! [`ColorDescriptor`] collects everything detection learned about a source
//! image: primaries, transfer characteristic, matrix coefficients, signal
//! range, optional HDR10 mastering metadata, optional gain-map parameters and
//! a free-text description.
//!
//! The enums mirror the code points used by container metadata (ffprobe,
//! CICP) but only keep the values the pipeline acts on. Anything else maps to
//! `Unknown`.
//!
//! # Example
//!
//! ```rust
//! use hdr_core::{ColorDescriptor, ColorPrimaries, TransferFunction};
//!
//! let desc = ColorDescriptor {
//!     primaries: ColorPrimaries::Bt2020,
//!     transfer: TransferFunction::Pq,
//!     description: "HDR10 / BT.2020 PQ".into(),
//!     ..Default::default()
//! };
//! assert!(desc.transfer.is_absolute());
//! assert!(!desc.is_synthesized());
//! ```

use serde::{Deserialize, Serialize};

/// Marker substring identifying buffers produced by this workspace's own
/// gain-map synthesis rather than decoded from a file.
pub const SYNTHESIZED_TAG: &str = "Synthesized";

/// Color primaries (gamut) of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPrimaries {
    /// Not signalled or not recognised.
    #[default]
    Unknown,
    /// ITU-R BT.709 / sRGB primaries.
    Bt709,
    /// ITU-R BT.2020 wide-gamut primaries.
    Bt2020,
    /// Display P3 (DCI-P3 primaries, D65 white).
    DisplayP3,
    /// Adobe RGB (1998).
    AdobeRgb,
    /// ProPhoto RGB (ROMM).
    ProPhoto,
}

impl ColorPrimaries {
    /// Returns `true` for any value other than [`ColorPrimaries::Unknown`].
    #[inline]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Bt709 => "BT.709",
            Self::Bt2020 => "BT.2020",
            Self::DisplayP3 => "Display P3",
            Self::AdobeRgb => "Adobe RGB",
            Self::ProPhoto => "ProPhoto",
        }
    }
}

/// Transfer characteristic (OETF/EOTF family) of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// Not signalled or not recognised.
    #[default]
    Unknown,
    /// IEC 61966-2-1 sRGB.
    Srgb,
    /// ITU-R BT.709.
    Bt709,
    /// Scene- or display-linear light.
    Linear,
    /// SMPTE ST.2084 perceptual quantizer.
    Pq,
    /// ARIB STD-B67 hybrid log-gamma.
    Hlg,
}

impl TransferFunction {
    /// Returns `true` for transfers that carry absolute or scene-linear HDR
    /// data (PQ, HLG, Linear).
    #[inline]
    pub fn is_absolute(self) -> bool {
        matches!(self, Self::Pq | Self::Hlg | Self::Linear)
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Srgb => "sRGB",
            Self::Bt709 => "BT.709",
            Self::Linear => "Linear",
            Self::Pq => "PQ",
            Self::Hlg => "HLG",
        }
    }
}

/// YCbCr matrix coefficients signalled by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixCoefficients {
    /// Not signalled or not recognised.
    #[default]
    Unknown,
    /// RGB / GBR, no matrix.
    Identity,
    /// BT.601 (bt470bg, smpte170m).
    Bt601,
    /// BT.709.
    Bt709,
    /// BT.2020 non-constant luminance.
    Bt2020Ncl,
}

/// Signal range of the decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRange {
    /// Not signalled. Treated as full range.
    #[default]
    Unknown,
    /// Full range (0..255 for 8-bit).
    Full,
    /// Limited / studio range (16..235 for 8-bit).
    Limited,
}

/// CIE 1931 xy chromaticities of a mastering display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chromaticities {
    /// Red primary `[x, y]`.
    pub red: [f64; 2],
    /// Green primary `[x, y]`.
    pub green: [f64; 2],
    /// Blue primary `[x, y]`.
    pub blue: [f64; 2],
    /// White point `[x, y]`.
    pub white: [f64; 2],
}

impl Chromaticities {
    /// BT.2020 primaries with a D65 white point.
    pub const BT2020_D65: Self = Self {
        red: [0.708, 0.292],
        green: [0.170, 0.797],
        blue: [0.131, 0.046],
        white: [0.3127, 0.3290],
    };
}

/// HDR10 static metadata (SMPTE ST.2086 mastering display + CTA-861.3
/// content light levels).
///
/// All fields are optional because containers frequently carry only a
/// subset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteringMetadata {
    /// Maximum content light level in nits.
    pub max_cll: Option<u32>,
    /// Maximum frame-average light level in nits.
    pub max_fall: Option<u32>,
    /// Minimum mastering display luminance in nits.
    pub min_luminance: Option<f64>,
    /// Maximum mastering display luminance in nits.
    pub max_luminance: Option<f64>,
    /// Mastering display chromaticities, when signalled.
    pub chromaticities: Option<Chromaticities>,
}

impl MasteringMetadata {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.max_cll.is_none()
            && self.max_fall.is_none()
            && self.min_luminance.is_none()
            && self.max_luminance.is_none()
            && self.chromaticities.is_none()
    }
}

/// Scalar gain-map parameters.
///
/// `min`, `max`, `hdr_capacity_min` and `hdr_capacity_max` are expressed in
/// stops (log2 of the linear boost), as they are stored in Ultra HDR XMP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainMapParams {
    /// Minimum gain in stops.
    pub min: f32,
    /// Maximum gain in stops.
    pub max: f32,
    /// Gamma applied to the encoded gain value.
    pub gamma: f32,
    /// Offset added to SDR values before applying the gain.
    pub offset_sdr: f32,
    /// Offset subtracted from the reconstructed HDR value.
    pub offset_hdr: f32,
    /// Display headroom (stops) at or below which no gain is applied.
    pub hdr_capacity_min: f32,
    /// Display headroom (stops) at or above which the full gain is applied.
    pub hdr_capacity_max: f32,
}

impl Default for GainMapParams {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            gamma: 1.0,
            offset_sdr: 0.0,
            offset_hdr: 0.0,
            hdr_capacity_min: 0.0,
            hdr_capacity_max: 1.0,
        }
    }
}

impl GainMapParams {
    /// Parameters for a gain map whose peak boost is `headroom` (linear).
    ///
    /// ```rust
    /// use hdr_core::GainMapParams;
    /// let p = GainMapParams::from_headroom(4.0);
    /// assert_eq!(p.max, 2.0);
    /// assert_eq!(p.hdr_capacity_max, 2.0);
    /// ```
    ///
    /// Headroom below 1.0 is treated as 1.0 (no boost).
    pub fn from_headroom(headroom: f32) -> Self {
        Self::from_stops(headroom.max(1.0).log2())
    }

    /// Parameters with `max` and `hdr_capacity_max` set to `stops`, as is.
    ///
    /// ```rust
    /// use hdr_core::GainMapParams;
    /// let p = GainMapParams::from_stops(0.5f32.log2());
    /// assert_eq!(p.max, -1.0);
    /// ```
    pub fn from_stops(stops: f32) -> Self {
        Self {
            max: stops,
            hdr_capacity_max: stops,
            ..Default::default()
        }
    }

    /// Peak linear boost, `2^max`.
    #[inline]
    pub fn max_boost(&self) -> f32 {
        self.max.exp2()
    }
}

/// Color metadata for a loaded image.
///
/// Created once per image from detection results and treated as immutable
/// for the duration of a pipeline build and render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorDescriptor {
    /// Color primaries.
    pub primaries: ColorPrimaries,
    /// Transfer characteristic.
    pub transfer: TransferFunction,
    /// YCbCr matrix coefficients.
    pub matrix: MatrixCoefficients,
    /// Sample range.
    pub range: ColorRange,
    /// HDR10 static metadata.
    pub mastering: Option<MasteringMetadata>,
    /// Gain-map parameters, when the container declares a gain map.
    pub gain_map: Option<GainMapParams>,
    /// Free-text description (e.g. `"HDR10 / BT.2020 PQ"`).
    pub description: String,
    /// Set when the container carries a gain map.
    pub has_gain_map: bool,
    /// ICC profile embedded in the source file.
    #[serde(skip)]
    pub embedded_icc: Option<Vec<u8>>,
}

impl Default for ColorDescriptor {
    fn default() -> Self {
        Self {
            primaries: ColorPrimaries::Unknown,
            transfer: TransferFunction::Unknown,
            matrix: MatrixCoefficients::Unknown,
            range: ColorRange::Unknown,
            mastering: None,
            gain_map: None,
            description: "Unknown".into(),
            has_gain_map: false,
            embedded_icc: None,
        }
    }
}

impl ColorDescriptor {
    /// Returns `true` if this buffer was produced by gain-map synthesis.
    #[inline]
    pub fn is_synthesized(&self) -> bool {
        self.description.contains(SYNTHESIZED_TAG)
    }

    /// Returns `true` if the description marks the data as scRGB / linear.
    pub fn describes_linear(&self) -> bool {
        self.description.contains("scRGB") || self.description.contains("Linear")
    }

    /// Returns `true` when a gain map is declared by flag or by parameters.
    #[inline]
    pub fn declares_gain_map(&self) -> bool {
        self.has_gain_map || self.gain_map.is_some()
    }

    /// Maximum mastering luminance in nits, if signalled.
    pub fn max_mastering_nits(&self) -> Option<f64> {
        self.mastering.and_then(|m| m.max_luminance)
    }
}
