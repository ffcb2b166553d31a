//! Presentation surface policy.
//!
//! HDR10 static metadata derivation, the swap-chain keep/recreate rule and
//! the uniform fit used when the rendered image is drawn to the surface.
//! Metadata is a surface side effect, not a pixel transform, and has to be
//! re-applied on every resize and recreate.

use crate::{PipelineError, PipelineResult};
use hdr_core::{Chromaticities, ColorDescriptor, RenderFormat, RgbaImage};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Chromaticity units per 1.0 (0.00002 steps).
const CHROMA_UNITS: f64 = 50000.0;
/// Min luminance units per nit (0.0001 nit steps).
const MIN_LUM_UNITS: f64 = 10000.0;
/// Max mastering luminance used when none is signalled.
pub const DEFAULT_MAX_MASTERING_NITS: u32 = 1000;

/// HDR10 mastering display + content light level block, in the integer
/// units used by DXGI / HEVC SEI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hdr10Metadata {
    /// Red primary, x and y in 0.00002 units.
    pub red: [u16; 2],
    /// Green primary.
    pub green: [u16; 2],
    /// Blue primary.
    pub blue: [u16; 2],
    /// White point.
    pub white: [u16; 2],
    /// Max mastering luminance, whole nits.
    pub max_mastering_luminance: u32,
    /// Min mastering luminance, 0.0001 nit units.
    pub min_mastering_luminance: u32,
    /// MaxCLL, nits.
    pub max_content_light_level: u16,
    /// MaxFALL, nits.
    pub max_frame_average_light_level: u16,
}

fn chroma(xy: [f64; 2]) -> [u16; 2] {
    let q = |v: f64| (v * CHROMA_UNITS).round().clamp(0.0, u16::MAX as f64) as u16;
    [q(xy[0]), q(xy[1])]
}

impl Hdr10Metadata {
    /// Derives the block from a descriptor.
    ///
    /// Chromaticities default to BT.2020 with a D65 white point; max
    /// mastering luminance defaults to 1000 nits; everything else to 0.
    ///
    /// ```rust
    /// use hdr_core::ColorDescriptor;
    /// use hdr_pipeline::surface::Hdr10Metadata;
    ///
    /// let md = Hdr10Metadata::from_descriptor(&ColorDescriptor::default());
    /// assert_eq!(md.red, [35400, 14600]);
    /// assert_eq!(md.white, [15635, 16450]);
    /// assert_eq!(md.max_mastering_luminance, 1000);
    /// assert_eq!(md.min_mastering_luminance, 0);
    /// ```
    pub fn from_descriptor(desc: &ColorDescriptor) -> Self {
        let m = desc.mastering.unwrap_or_default();
        let c = m.chromaticities.unwrap_or(Chromaticities::BT2020_D65);
        Self {
            red: chroma(c.red),
            green: chroma(c.green),
            blue: chroma(c.blue),
            white: chroma(c.white),
            max_mastering_luminance: m
                .max_luminance
                .map(|v| v.max(0.0).round() as u32)
                .unwrap_or(DEFAULT_MAX_MASTERING_NITS),
            min_mastering_luminance: m
                .min_luminance
                .map(|v| (v.max(0.0) * MIN_LUM_UNITS).round() as u32)
                .unwrap_or(0),
            max_content_light_level: m.max_cll.map(|v| v.min(u16::MAX as u32) as u16).unwrap_or(0),
            max_frame_average_light_level: m.max_fall.map(|v| v.min(u16::MAX as u32) as u16).unwrap_or(0),
        }
    }
}

/// Surface color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceColorSpace {
    /// Gamma 2.2, BT.709 primaries, full range.
    Srgb,
    /// Linear, BT.709 primaries, full range (scRGB).
    ScRgb,
}

/// A presentation surface the policy can drive.
pub trait SurfaceHost {
    /// Current format, `None` if no surface exists yet.
    fn format(&self) -> Option<RenderFormat>;
    /// Resizes the existing surface.
    fn resize(&mut self, width: u32, height: u32) -> PipelineResult<()>;
    /// Drops any existing surface and creates a new one.
    fn recreate(&mut self, width: u32, height: u32, format: RenderFormat) -> PipelineResult<()>;
    /// Sets the surface color space.
    fn set_color_space(&mut self, space: SurfaceColorSpace) -> PipelineResult<()>;
    /// Attaches HDR10 metadata.
    fn set_hdr10_metadata(&mut self, metadata: &Hdr10Metadata) -> PipelineResult<()>;
}

/// What [`ensure_surface`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Size was zero; nothing done.
    Skipped,
    /// Same format, buffers resized.
    Resized,
    /// Format changed or no surface existed.
    Recreated,
}

/// Brings `host` to `width`x`height` in `format`.
///
/// Same format resizes in place; a different format recreates. Float
/// surfaces get the scRGB color space on creation, and HDR10 metadata from
/// `desc` after either path.
pub fn ensure_surface<H: SurfaceHost + ?Sized>(
    host: &mut H,
    width: u32,
    height: u32,
    format: RenderFormat,
    desc: &ColorDescriptor,
) -> PipelineResult<SurfaceAction> {
    if width == 0 || height == 0 {
        return Ok(SurfaceAction::Skipped);
    }

    let action = if host.format() == Some(format) {
        host.resize(width, height)?;
        SurfaceAction::Resized
    } else {
        host.recreate(width, height, format)?;
        if format.is_float() {
            host.set_color_space(SurfaceColorSpace::ScRgb)?;
        }
        SurfaceAction::Recreated
    };

    if format.is_float() {
        host.set_hdr10_metadata(&Hdr10Metadata::from_descriptor(desc))?;
    }
    debug!(width, height, %format, ?action, "surface ensured");
    Ok(action)
}

/// Uniform scale and centring offset of an image on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Left offset in surface pixels.
    pub offset_x: f32,
    /// Top offset in surface pixels.
    pub offset_y: f32,
}

/// Fits an image into a surface, preserving aspect ratio, centred.
///
/// ```rust
/// use hdr_pipeline::surface::fit_to_surface;
///
/// let fit = fit_to_surface((200, 100), (400, 400));
/// assert_eq!(fit.scale, 2.0);
/// assert_eq!((fit.offset_x, fit.offset_y), (0.0, 100.0));
/// ```
pub fn fit_to_surface(image: (u32, u32), surface: (u32, u32)) -> FitTransform {
    let (iw, ih) = (image.0 as f32, image.1 as f32);
    let (sw, sh) = (surface.0 as f32, surface.1 as f32);
    if iw <= 0.0 || ih <= 0.0 {
        return FitTransform {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }
    let scale = (sw / iw).min(sh / ih);
    FitTransform {
        scale,
        offset_x: (sw - iw * scale) / 2.0,
        offset_y: (sh - ih * scale) / 2.0,
    }
}

/// In-memory surface: a float buffer plus the state a swap chain carries.
#[derive(Debug, Default)]
pub struct MemorySurface {
    buffer: Option<RgbaImage>,
    format: Option<RenderFormat>,
    color_space: Option<SurfaceColorSpace>,
    metadata: Option<Hdr10Metadata>,
    recreations: u32,
}

impl MemorySurface {
    /// Creates an empty surface host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current back buffer.
    pub fn buffer(&self) -> Option<&RgbaImage> {
        self.buffer.as_ref()
    }

    /// Current color space.
    pub fn color_space(&self) -> Option<SurfaceColorSpace> {
        self.color_space
    }

    /// Last metadata applied.
    pub fn metadata(&self) -> Option<&Hdr10Metadata> {
        self.metadata.as_ref()
    }

    /// How many times the surface has been (re)created.
    pub fn recreations(&self) -> u32 {
        self.recreations
    }

    /// Clears to black and draws `image` with the uniform fit.
    pub fn present(&mut self, image: &RgbaImage) -> PipelineResult<FitTransform> {
        let format = self.format.unwrap_or_default();
        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| PipelineError::Surface("present before surface creation".into()))?;
        let (sw, sh) = buffer.dimensions();
        let (iw, ih) = image.dimensions();
        let fit = fit_to_surface((iw, ih), (sw, sh));
        let src = image.data();
        buffer
            .data_mut()
            .par_chunks_mut(sw as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let ix = ((x as f32 + 0.5 - fit.offset_x) / fit.scale).floor();
                    let iy = ((y as f32 + 0.5 - fit.offset_y) / fit.scale).floor();
                    if ix < 0.0 || iy < 0.0 || ix >= iw as f32 || iy >= ih as f32 {
                        px.copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
                        continue;
                    }
                    let i = (iy as usize * iw as usize + ix as usize) * 4;
                    for c in 0..4 {
                        px[c] = format.quantize(src[i + c]);
                    }
                }
            });
        Ok(fit)
    }
}

impl SurfaceHost for MemorySurface {
    fn format(&self) -> Option<RenderFormat> {
        self.format
    }

    fn resize(&mut self, width: u32, height: u32) -> PipelineResult<()> {
        self.buffer = Some(RgbaImage::new(width, height));
        Ok(())
    }

    fn recreate(&mut self, width: u32, height: u32, format: RenderFormat) -> PipelineResult<()> {
        self.buffer = Some(RgbaImage::new(width, height));
        self.format = Some(format);
        self.color_space = Some(SurfaceColorSpace::Srgb);
        self.metadata = None;
        self.recreations += 1;
        Ok(())
    }

    fn set_color_space(&mut self, space: SurfaceColorSpace) -> PipelineResult<()> {
        self.color_space = Some(space);
        Ok(())
    }

    fn set_hdr10_metadata(&mut self, metadata: &Hdr10Metadata) -> PipelineResult<()> {
        self.metadata = Some(*metadata);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdr_core::MasteringMetadata;

    #[test]
    fn test_metadata_from_mastering() {
        let desc = ColorDescriptor {
            mastering: Some(MasteringMetadata {
                max_cll: Some(1200),
                max_fall: Some(400),
                min_luminance: Some(0.005),
                max_luminance: Some(4000.0),
                chromaticities: None,
            }),
            ..Default::default()
        };
        let md = Hdr10Metadata::from_descriptor(&desc);
        assert_eq!(md.green, [8500, 39850]);
        assert_eq!(md.blue, [6550, 2300]);
        assert_eq!(md.max_mastering_luminance, 4000);
        assert_eq!(md.min_mastering_luminance, 50);
        assert_eq!(md.max_content_light_level, 1200);
        assert_eq!(md.max_frame_average_light_level, 400);
    }

    #[test]
    fn test_resize_reapplies_metadata() {
        let desc = ColorDescriptor::default();
        let mut host = MemorySurface::new();
        let a = ensure_surface(&mut host, 64, 32, RenderFormat::F16, &desc).unwrap();
        assert_eq!(a, SurfaceAction::Recreated);
        assert_eq!(host.color_space(), Some(SurfaceColorSpace::ScRgb));

        host.metadata = None;
        let b = ensure_surface(&mut host, 128, 64, RenderFormat::F16, &desc).unwrap();
        assert_eq!(b, SurfaceAction::Resized);
        assert!(host.metadata().is_some());
        assert_eq!(host.recreations(), 1);

        let c = ensure_surface(&mut host, 128, 64, RenderFormat::U8, &desc).unwrap();
        assert_eq!(c, SurfaceAction::Recreated);
        assert_eq!(host.color_space(), Some(SurfaceColorSpace::Srgb));
        assert!(host.metadata().is_none());
        assert_eq!(
            ensure_surface(&mut host, 0, 64, RenderFormat::U8, &desc).unwrap(),
            SurfaceAction::Skipped
        );
    }

    #[test]
    fn test_present_letterboxes() {
        let mut host = MemorySurface::new();
        ensure_surface(&mut host, 4, 4, RenderFormat::F16, &ColorDescriptor::default()).unwrap();
        let img = RgbaImage::filled(2, 1, [2.0, 2.0, 2.0, 1.0]);
        let fit = host.present(&img).unwrap();
        assert_eq!(fit.scale, 2.0);
        let buf = host.buffer().unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(buf.get_pixel(1, 1).unwrap(), [2.0, 2.0, 2.0, 1.0]);
        assert_eq!(buf.get_pixel(3, 3).unwrap(), [0.0, 0.0, 0.0, 1.0]);
    }
}
