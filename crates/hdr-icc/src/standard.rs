//! Built-in RGB profiles.

use crate::{IccError, IccResult, Profile};
use hdr_core::ColorPrimaries;
use lcms2::{CIExyY, CIExyYTRIPLE, Profile as LcmsProfile, ToneCurve};

/// Named standard profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardProfile {
    /// IEC 61966-2-1 sRGB.
    Srgb,
    /// sRGB primaries, linear transfer.
    LinearSrgb,
    /// ITU-R BT.2020.
    Bt2020,
    /// Display P3 (P3 primaries, D65, sRGB curve).
    DisplayP3,
    /// Adobe RGB (1998).
    AdobeRgb,
    /// ProPhoto RGB / ROMM (D50, gamma 1.8).
    ProPhoto,
}

impl StandardProfile {
    /// All built-in profiles.
    pub const ALL: [StandardProfile; 6] = [
        Self::Srgb,
        Self::LinearSrgb,
        Self::Bt2020,
        Self::DisplayP3,
        Self::AdobeRgb,
        Self::ProPhoto,
    ];

    /// Profile matching the given primaries, `None` for unknown primaries.
    pub fn for_primaries(primaries: ColorPrimaries) -> Option<Self> {
        match primaries {
            ColorPrimaries::Unknown => None,
            ColorPrimaries::Bt709 => Some(Self::Srgb),
            ColorPrimaries::Bt2020 => Some(Self::Bt2020),
            ColorPrimaries::DisplayP3 => Some(Self::DisplayP3),
            ColorPrimaries::AdobeRgb => Some(Self::AdobeRgb),
            ColorPrimaries::ProPhoto => Some(Self::ProPhoto),
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::LinearSrgb => "Linear sRGB",
            Self::Bt2020 => "BT.2020",
            Self::DisplayP3 => "Display P3",
            Self::AdobeRgb => "Adobe RGB (1998)",
            Self::ProPhoto => "ProPhoto RGB",
        }
    }

    /// File names this profile commonly ships under in OS color directories.
    pub fn file_names(self) -> &'static [&'static str] {
        match self {
            Self::Srgb => &["sRGB Color Space Profile.icm", "sRGB.icc", "sRGB IEC61966-2.1.icc"],
            Self::LinearSrgb => &["sRGB-linear.icc", "scRGB.icc"],
            Self::Bt2020 => &["Rec2020.icc", "ITU-R_BT2020.icc", "BT2020.icc"],
            Self::DisplayP3 => &["Display P3.icc", "DisplayP3.icc", "P3D65.icc"],
            Self::AdobeRgb => &["AdobeRGB1998.icc", "Adobe RGB (1998).icc", "AdobeRGB.icc"],
            Self::ProPhoto => &["ProPhoto.icm", "ProPhoto.icc", "ROMM-RGB.icc"],
        }
    }

    /// Builds the lcms2 profile.
    pub fn to_profile(self) -> IccResult<Profile> {
        let inner = match self {
            Self::Srgb => LcmsProfile::new_srgb(),
            Self::LinearSrgb => rgb(&d65_white(), &srgb_primaries(), ToneCurve::new(1.0))?,
            Self::Bt2020 => rgb(&d65_white(), &bt2020_primaries(), bt709_curve()?)?,
            Self::DisplayP3 => rgb(&d65_white(), &p3_primaries(), srgb_curve()?)?,
            Self::AdobeRgb => rgb(&d65_white(), &adobe_primaries(), ToneCurve::new(563.0 / 256.0))?,
            Self::ProPhoto => rgb(&d50_white(), &prophoto_primaries(), ToneCurve::new(1.8))?,
        };
        Ok(Profile { inner })
    }
}

fn rgb(white: &CIExyY, primaries: &CIExyYTRIPLE, curve: ToneCurve) -> IccResult<LcmsProfile> {
    let curves = [&curve, &curve, &curve];
    LcmsProfile::new_rgb(white, primaries, &curves).map_err(|e| IccError::CreateFailed(e.to_string()))
}

/// IEC 61966-2-1 piecewise curve (ICC parametric type 4).
fn srgb_curve() -> IccResult<ToneCurve> {
    ToneCurve::new_parametric(4, &[2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045])
        .map_err(|e| IccError::CreateFailed(e.to_string()))
}

/// BT.709/BT.2020 camera curve, inverted to display form.
fn bt709_curve() -> IccResult<ToneCurve> {
    ToneCurve::new_parametric(4, &[1.0 / 0.45, 1.0 / 1.099, 0.099 / 1.099, 1.0 / 4.5, 0.081])
        .map_err(|e| IccError::CreateFailed(e.to_string()))
}

fn d65_white() -> CIExyY {
    CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 }
}

fn d50_white() -> CIExyY {
    CIExyY { x: 0.3457, y: 0.3585, Y: 1.0 }
}

fn triple(r: (f64, f64), g: (f64, f64), b: (f64, f64)) -> CIExyYTRIPLE {
    CIExyYTRIPLE {
        Red: CIExyY { x: r.0, y: r.1, Y: 1.0 },
        Green: CIExyY { x: g.0, y: g.1, Y: 1.0 },
        Blue: CIExyY { x: b.0, y: b.1, Y: 1.0 },
    }
}

fn srgb_primaries() -> CIExyYTRIPLE {
    triple((0.64, 0.33), (0.30, 0.60), (0.15, 0.06))
}

fn bt2020_primaries() -> CIExyYTRIPLE {
    triple((0.708, 0.292), (0.170, 0.797), (0.131, 0.046))
}

fn p3_primaries() -> CIExyYTRIPLE {
    triple((0.680, 0.320), (0.265, 0.690), (0.150, 0.060))
}

fn adobe_primaries() -> CIExyYTRIPLE {
    triple((0.64, 0.33), (0.21, 0.71), (0.15, 0.06))
}

fn prophoto_primaries() -> CIExyYTRIPLE {
    triple((0.7347, 0.2653), (0.1596, 0.8404), (0.0366, 0.0001))
}
