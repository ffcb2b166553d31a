//! Plan execution.
//!
//! A [`Compositor`] owns image handles and knows how to run one stage; the
//! executor only sequences it. Each stage consumes the previous handle and
//! returns a new one, so the caller's source is never touched.
//!
//! [`CpuCompositor`] is the reference backend: rayon over RGBA `f32`
//! buffers, lcms2 for the CMS stage, and every stage output rounded to the
//! plan's [`RenderFormat`].

use crate::builder::PipelinePlan;
use crate::stage::PipelineStage;
use crate::{PipelineError, PipelineResult};
use glam::{Mat3, Vec3};
use hdr_core::{GainMapParams, RenderFormat, RgbaImage};
use hdr_transfer::gainmap;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Backend that runs pipeline stages.
pub trait Compositor {
    /// Backend image handle.
    type Handle;

    /// Pixel size of a handle.
    fn dimensions(&self, image: &Self::Handle) -> (u32, u32);

    /// Allocates the render target.
    fn create_target(&self, width: u32, height: u32, format: RenderFormat) -> PipelineResult<Self::Handle>;

    /// Runs one stage, returning a new handle.
    fn apply(
        &self,
        input: &Self::Handle,
        stage: &PipelineStage,
        format: RenderFormat,
        gain_map: Option<&Self::Handle>,
    ) -> PipelineResult<Self::Handle>;

    /// Composites `image` onto `target`.
    fn draw(&self, target: &mut Self::Handle, image: &Self::Handle) -> PipelineResult<()>;

    /// Copy of a handle, used to show the source when a render fails.
    fn duplicate(&self, image: &Self::Handle) -> Self::Handle;
}

/// Runs `plan` against `source`, returning the filled render target.
///
/// The target is sized to the source's pixel dimensions.
pub fn execute<C: Compositor>(
    compositor: &C,
    plan: &PipelinePlan,
    source: &C::Handle,
    gain_map: Option<&C::Handle>,
) -> PipelineResult<C::Handle> {
    let (width, height) = compositor.dimensions(source);
    let mut target = compositor
        .create_target(width, height, plan.format)
        .map_err(|e| match e {
            PipelineError::RenderTargetCreationFailed(_) => e,
            other => PipelineError::RenderTargetCreationFailed(other.to_string()),
        })?;

    let mut current: Option<C::Handle> = None;
    for stage in &plan.stages {
        let input = current.as_ref().unwrap_or(source);
        trace!(stage = %stage.describe(), "applying");
        current = Some(compositor.apply(input, stage, plan.format, gain_map)?);
    }

    compositor.draw(&mut target, current.as_ref().unwrap_or(source))?;
    Ok(target)
}

/// Result of [`render`].
#[derive(Debug)]
pub struct RenderOutput<H> {
    /// Rendered image, or a copy of the source when `error` is set.
    pub image: H,
    /// The failure that forced the fallback.
    pub error: Option<PipelineError>,
}

impl<H> RenderOutput<H> {
    /// True if the pipeline ran to completion.
    pub fn is_rendered(&self) -> bool {
        self.error.is_none()
    }
}

/// Like [`execute`], but never fails: any error yields the untransformed
/// source and the error.
pub fn render<C: Compositor>(
    compositor: &C,
    plan: &PipelinePlan,
    source: &C::Handle,
    gain_map: Option<&C::Handle>,
) -> RenderOutput<C::Handle> {
    match execute(compositor, plan, source, gain_map) {
        Ok(image) => RenderOutput { image, error: None },
        Err(error) => {
            warn!(%error, "pipeline failed, showing source");
            RenderOutput {
                image: compositor.duplicate(source),
                error: Some(error),
            }
        }
    }
}

/// CPU compositor over [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct CpuCompositor {
    max_dimension: u32,
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCompositor {
    /// Largest render target edge accepted by default (D3D11 texture limit).
    pub const DEFAULT_MAX_DIMENSION: u32 = 16384;

    /// Compositor with the default size limit.
    pub fn new() -> Self {
        Self {
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
        }
    }

    /// Compositor refusing targets with an edge above `max_dimension`.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    fn per_pixel(input: &RgbaImage, format: RenderFormat, f: impl Fn(Vec3) -> Vec3 + Sync) -> RgbaImage {
        let mut out = input.clone();
        out.data_mut().par_chunks_mut(4).for_each(|px| {
            let v = f(Vec3::new(px[0], px[1], px[2]));
            px[0] = format.quantize(v.x);
            px[1] = format.quantize(v.y);
            px[2] = format.quantize(v.z);
        });
        out
    }

    fn matrix(input: &RgbaImage, m: Mat3, format: RenderFormat) -> RgbaImage {
        Self::per_pixel(input, format, |v| m * v)
    }

    fn cms(
        input: &RgbaImage,
        stage: &PipelineStage,
        format: RenderFormat,
    ) -> PipelineResult<RgbaImage> {
        let PipelineStage::CmsTransform { source, target, intent } = stage else {
            return Err(PipelineError::MissingInput("CmsTransform"));
        };
        let xf = hdr_icc::Transform::new(&source.load()?, &target.load()?, *intent)?;
        let mut out = input.clone();
        xf.apply_rgba(out.data_mut());
        out.data_mut().par_chunks_mut(4).for_each(|px| {
            for c in &mut px[..3] {
                *c = format.quantize(*c);
            }
        });
        Ok(out)
    }

    fn blend(
        input: &RgbaImage,
        gain_map: &RgbaImage,
        params: &GainMapParams,
        weight: f32,
        format: RenderFormat,
    ) -> RgbaImage {
        let (w, h) = input.dimensions();
        let (gw, gh) = gain_map.dimensions();
        let gdata = gain_map.data();
        let mut out = input.clone();
        out.data_mut()
            .par_chunks_mut(w.max(1) as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                // gain maps are usually subsampled; nearest sample
                let gy = (y as u64 * gh as u64 / h.max(1) as u64) as usize;
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let gx = (x as u64 * gw as u64 / w.max(1) as u64) as usize;
                    let gi = (gy * gw as usize + gx) * 4;
                    let gain = [gdata[gi], gdata[gi + 1], gdata[gi + 2]];
                    let sdr = [
                        gainmap::base_to_linear(px[0]),
                        gainmap::base_to_linear(px[1]),
                        gainmap::base_to_linear(px[2]),
                    ];
                    let hdr = gainmap::apply_gain_rgb(params, sdr, gain, weight);
                    for c in 0..3 {
                        px[c] = format.quantize(hdr[c]);
                    }
                }
            });
        out
    }
}

impl Compositor for CpuCompositor {
    type Handle = RgbaImage;

    fn dimensions(&self, image: &RgbaImage) -> (u32, u32) {
        image.dimensions()
    }

    fn create_target(&self, width: u32, height: u32, format: RenderFormat) -> PipelineResult<RgbaImage> {
        if width == 0 || height == 0 || width > self.max_dimension || height > self.max_dimension {
            return Err(PipelineError::RenderTargetCreationFailed(format!(
                "{width}x{height} {format} exceeds limits (max edge {})",
                self.max_dimension
            )));
        }
        debug!(width, height, %format, "render target created");
        Ok(RgbaImage::new(width, height))
    }

    fn apply(
        &self,
        input: &RgbaImage,
        stage: &PipelineStage,
        format: RenderFormat,
        gain_map: Option<&RgbaImage>,
    ) -> PipelineResult<RgbaImage> {
        let out = match stage {
            PipelineStage::RangeExpand { scale, offset } => {
                let (s, o) = (*scale, *offset);
                Self::per_pixel(input, format, |v| v * s + Vec3::splat(o))
            }
            PipelineStage::PrimariesMatrix { matrix, .. } => Self::matrix(input, *matrix, format),
            PipelineStage::ScRgbScale { factor } => Self::matrix(input, Mat3::from_diagonal(Vec3::splat(*factor)), format),
            PipelineStage::CmsTransform { .. } => Self::cms(input, stage, format)?,
            PipelineStage::GainMapBlend { params, weight } => {
                let gm = gain_map.ok_or(PipelineError::MissingInput("gain map image"))?;
                if gm.is_empty() {
                    return Err(PipelineError::MissingInput("gain map image"));
                }
                Self::blend(input, gm, params, *weight, format)
            }
        };
        Ok(out)
    }

    fn draw(&self, target: &mut RgbaImage, image: &RgbaImage) -> PipelineResult<()> {
        target.check_same_size(image)?;
        target.data_mut().copy_from_slice(image.data());
        Ok(())
    }

    fn duplicate(&self, image: &RgbaImage) -> RgbaImage {
        image.clone()
    }
}
