//! Color transforms between ICC profiles.

use crate::{IccError, IccResult, Intent, Profile};
use lcms2::{PixelFormat, Transform as LcmsTransform};

/// Number of pixels converted per lcms2 call in [`Transform::apply_rgba`].
const CHUNK: usize = 4096;

/// A float RGB transform between two profiles.
///
/// Values outside [0, 1] pass through the float pipeline unclamped where
/// the profile curves allow it.
pub struct Transform {
    inner: LcmsTransform<[f32; 3], [f32; 3]>,
    intent: Intent,
}

impl Transform {
    /// Creates a transform from `source` to `dest`.
    pub fn new(source: &Profile, dest: &Profile, intent: Intent) -> IccResult<Self> {
        let inner = LcmsTransform::new(
            &source.inner,
            PixelFormat::RGB_FLT,
            &dest.inner,
            PixelFormat::RGB_FLT,
            intent.into(),
        )
        .map_err(|e| IccError::TransformFailed(e.to_string()))?;
        Ok(Self { inner, intent })
    }

    /// Rendering intent the transform was built with.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Converts RGB pixels in place.
    pub fn apply(&self, pixels: &mut [[f32; 3]]) {
        self.inner.transform_in_place(pixels);
    }

    /// Converts an interleaved RGBA buffer in place. Alpha is untouched;
    /// a trailing partial pixel is ignored.
    pub fn apply_rgba(&self, data: &mut [f32]) {
        let mut rgb: Vec<[f32; 3]> = Vec::with_capacity(CHUNK);
        for block in data.chunks_mut(CHUNK * 4) {
            rgb.clear();
            rgb.extend(block.chunks_exact(4).map(|px| [px[0], px[1], px[2]]));
            self.inner.transform_in_place(&mut rgb);
            for (px, c) in block.chunks_exact_mut(4).zip(&rgb) {
                px[..3].copy_from_slice(c);
            }
        }
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("intent", &self.intent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StandardProfile;

    #[test]
    fn test_identity() {
        let srgb = Profile::srgb();
        let xf = Transform::new(&srgb, &srgb, Intent::Perceptual).unwrap();
        let mut px = [[0.5f32, 0.3, 0.2]];
        xf.apply(&mut px);
        assert!((px[0][0] - 0.5).abs() < 0.01);
        assert!((px[0][1] - 0.3).abs() < 0.01);
        assert!((px[0][2] - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_linearize() {
        let lin = StandardProfile::LinearSrgb.to_profile().unwrap();
        let xf = Transform::new(&Profile::srgb(), &lin, Intent::RelativeColorimetric).unwrap();
        let mut rgba = vec![0.5f32, 0.5, 0.5, 0.25, 0.8, 0.8, 0.8, 1.0];
        xf.apply_rgba(&mut rgba);
        assert!(rgba[0] < 0.5);
        assert!(rgba[4] < 0.8);
        assert_eq!(rgba[3], 0.25);
        assert_eq!(rgba[7], 1.0);
    }

    #[test]
    fn test_p3_to_srgb_neutral() {
        let p3 = StandardProfile::DisplayP3.to_profile().unwrap();
        let xf = Transform::new(&p3, &Profile::srgb(), Intent::Perceptual).unwrap();
        let mut px = [[0.5f32, 0.5, 0.5]];
        xf.apply(&mut px);
        assert!((px[0][0] - px[0][1]).abs() < 0.02);
        assert!((px[0][1] - px[0][2]).abs() < 0.02);
    }
}
