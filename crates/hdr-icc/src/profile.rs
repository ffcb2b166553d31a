//! ICC profile wrapper.

use crate::{IccError, IccResult, StandardProfile};
use lcms2::{ColorSpaceSignature, Profile as LcmsProfile};
use std::path::Path;

/// An RGB ICC color profile.
///
/// # Example
///
/// ```rust,no_run
/// use hdr_icc::Profile;
/// use std::path::Path;
///
/// let monitor = Profile::from_file(Path::new("monitor.icc")).unwrap();
/// println!("{}", monitor.description());
/// ```
pub struct Profile {
    pub(crate) inner: LcmsProfile,
}

impl Profile {
    /// Loads a profile from an `.icc`/`.icm` file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, does not parse, or is not RGB.
    pub fn from_file(path: &Path) -> IccResult<Self> {
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::checked(inner)
    }

    /// Parses raw ICC bytes, e.g. a profile embedded in a JPEG or HEIF.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        if data.len() < 128 {
            return Err(IccError::InvalidProfile(format!(
                "{} bytes is shorter than an ICC header",
                data.len()
            )));
        }
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Self::checked(inner)
    }

    /// The IEC 61966-2-1 sRGB profile.
    pub fn srgb() -> Self {
        Self {
            inner: LcmsProfile::new_srgb(),
        }
    }

    /// Builds a built-in profile.
    pub fn from_standard(standard: StandardProfile) -> IccResult<Self> {
        standard.to_profile()
    }

    fn checked(inner: LcmsProfile) -> IccResult<Self> {
        let profile = Self { inner };
        if !profile.is_rgb() {
            return Err(IccError::NotRgb(profile.color_space()));
        }
        Ok(profile)
    }

    /// Profile description tag, empty if absent.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default()
    }

    /// Color space signature as text.
    pub fn color_space(&self) -> String {
        format!("{:?}", self.inner.color_space())
    }

    /// Returns true if this is an RGB profile.
    pub fn is_rgb(&self) -> bool {
        matches!(self.inner.color_space(), ColorSpaceSignature::RgbData)
    }

    /// Serializes the profile to ICC bytes.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.inner.icc().map_err(|e| IccError::CreateFailed(e.to_string()))
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description())
            .field("color_space", &self.color_space())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb() {
        let profile = Profile::srgb();
        assert!(profile.is_rgb());
        assert!(!profile.description().is_empty());
    }

    #[test]
    fn test_icc_roundtrip() {
        let data = Profile::srgb().to_icc().unwrap();
        let reloaded = Profile::from_icc(&data).unwrap();
        assert!(reloaded.is_rgb());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Profile::from_icc(b"not a profile").is_err());
        assert!(Profile::from_icc(&[0u8; 256]).is_err());
    }
}
