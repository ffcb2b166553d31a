//! Pipeline plan construction.
//!
//! [`PipelineBuilder::build`] turns a descriptor and a target capability
//! into an immutable [`PipelinePlan`]: the branch, the render format and the
//! ordered stage list, plus a human-readable trace of every decision.
//!
//! Building never fails. Profile problems drop the CMS stage and are noted
//! in the trace.

use crate::branch::{Branch, TransferKind, effective_transfer, render_format, select_branch};
use crate::profile::{ProfileResolver, ProfileStore};
use crate::stage::{BT2020_TO_BT709, P3_TO_BT709, PipelineStage};
use crate::PipelineConfig;
use hdr_core::{ColorDescriptor, ColorPrimaries, ColorRange, RenderFormat};
use hdr_transfer::gainmap;
use tracing::{debug, warn};

/// Reference white of scRGB, in nits.
pub const SCRGB_WHITE_NITS: f32 = 80.0;

/// Boost for synthesized linear buffers: 1.0 lands at 200 nits.
pub const SYNTHESIZED_BOOST: f32 = 2.5;

const IDENTITY: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Inputs of one build besides the config.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// The image's color metadata.
    pub descriptor: &'a ColorDescriptor,
    /// Detection flagged the source as HDR-potential.
    pub source_hdr: bool,
    /// Whether the target surface is HDR-capable; `None` derives it from the
    /// render format.
    pub target_hdr: Option<bool>,
    /// The decoder delivered a gain-map image.
    pub gain_map_attached: bool,
    /// Display headroom in stops, for weighting a gain-map blend.
    pub display_headroom: Option<f32>,
}

impl<'a> BuildRequest<'a> {
    /// Request with every optional signal unset.
    pub fn new(descriptor: &'a ColorDescriptor) -> Self {
        Self {
            descriptor,
            source_hdr: false,
            target_hdr: None,
            gain_map_attached: false,
            display_headroom: None,
        }
    }
}

/// Result of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    /// Selected branch.
    pub branch: Branch,
    /// Render target format; every stage runs at this precision.
    pub format: RenderFormat,
    /// Whether the target was treated as HDR-capable.
    pub target_hdr: bool,
    /// Stages in execution order.
    pub stages: Vec<PipelineStage>,
    /// Decision log.
    pub trace: Vec<String>,
}

impl PipelinePlan {
    /// True when no stage will modify the source.
    pub fn is_passthrough(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Builds plans against a config and a profile store.
pub struct PipelineBuilder<'a, S: ProfileStore + ?Sized> {
    config: &'a PipelineConfig,
    store: &'a S,
}

impl<'a, S: ProfileStore + ?Sized> PipelineBuilder<'a, S> {
    /// Creates a builder.
    pub fn new(config: &'a PipelineConfig, store: &'a S) -> Self {
        Self { config, store }
    }

    /// Builds the plan for one image.
    pub fn build(&self, req: &BuildRequest<'_>) -> PipelinePlan {
        let desc = req.descriptor;
        let mut trace = vec!["--- Pipeline Start ---".to_string()];

        let mut format = render_format(desc, self.config, req.source_hdr);
        let target_hdr = req.target_hdr.unwrap_or(format.is_float());
        trace.push(format!("[Setup] Target format: {format}, HDR target: {target_hdr}"));
        trace.push(format!(
            "[Setup] Metadata: {}, Transfer: {}",
            desc.description,
            effective_transfer(desc, self.config).name()
        ));

        let branch = select_branch(desc, self.config, target_hdr, req.gain_map_attached);
        debug!(?branch, %format, target_hdr, "branch selected");
        trace.push(format!("[Branch] {}", branch.label()));

        let mut stages = Vec::new();
        match branch {
            Branch::Absolute(kind) => self.absolute(desc, kind, &mut stages, &mut trace),
            Branch::GainMap => self.gain_map(req, &mut stages, &mut trace),
            Branch::Standard => self.standard(desc, &mut stages, &mut trace),
        }

        if !format.is_float() && stages.iter().any(PipelineStage::requires_hdr) {
            format = RenderFormat::F16;
            trace.push(format!("[Setup] Promoted target format to {format} for HDR stages"));
        }

        for stage in &stages {
            debug!(stage = %stage.describe(), "stage");
        }

        PipelinePlan {
            branch,
            format,
            target_hdr,
            stages,
            trace,
        }
    }

    fn absolute(
        &self,
        desc: &ColorDescriptor,
        kind: TransferKind,
        stages: &mut Vec<PipelineStage>,
        trace: &mut Vec<String>,
    ) {
        let synthesized = desc.is_synthesized();
        // kind already reflects data_is_pq
        if kind == TransferKind::Linear && !synthesized && desc.describes_linear() {
            let max_nits = desc
                .max_mastering_nits()
                .map(|n| n as f32)
                .filter(|n| *n > 0.0)
                .unwrap_or_else(|| self.config.effective_max_nits());
            let factor = max_nits / SCRGB_WHITE_NITS;
            stages.push(PipelineStage::ScRgbScale { factor });
            trace.push(format!("[A] scRGB scale (x{factor}) applied to normalized linear data"));
        } else if synthesized {
            let rows = match desc.primaries {
                ColorPrimaries::DisplayP3 => P3_TO_BT709,
                ColorPrimaries::Bt2020 => BT2020_TO_BT709,
                _ => IDENTITY,
            };
            stages.push(PipelineStage::boosted_matrix(rows, SYNTHESIZED_BOOST));
            trace.push(format!(
                "[A] Synthesized linear: boost (x{SYNTHESIZED_BOOST}) and {} -> BT.709 matrix",
                desc.primaries.name()
            ));
        } else {
            trace.push("[A] Passthrough to HDR surface".into());
        }
    }

    fn gain_map(&self, req: &BuildRequest<'_>, stages: &mut Vec<PipelineStage>, trace: &mut Vec<String>) {
        if !req.gain_map_attached {
            trace.push("[B] Gain-map metadata found but image missing, showing base image".into());
            return;
        }
        if !self.config.gain_map_blend {
            warn!("gain-map blend not enabled, showing base image unmodified");
            trace.push("[B] Gain map present, blend pending: showing base image".into());
            return;
        }
        let params = req.descriptor.gain_map.unwrap_or_default();
        let weight = req
            .display_headroom
            .map(|h| gainmap::display_weight(&params, h))
            .unwrap_or(1.0);
        stages.push(PipelineStage::GainMapBlend { params, weight });
        trace.push(format!("[B] Gain-map blend (max {:.4} stops, weight {weight:.3})", params.max));
    }

    fn standard(&self, desc: &ColorDescriptor, stages: &mut Vec<PipelineStage>, trace: &mut Vec<String>) {
        if self.config.force_limited_range || desc.range == ColorRange::Limited {
            stages.push(PipelineStage::limited_range());
            trace.push("[C] Expanded limited -> full range".into());
        }

        if self.config.cms_disabled {
            trace.push("[C] CMS disabled".into());
            return;
        }

        let resolver = ProfileResolver::new(self.store, self.config);
        let source = resolver.resolve_source(desc);
        let target = resolver.resolve_target();
        trace.push(format!("[Profile] Source: {} ({:?})", source.profile.label(), source.tier));
        trace.push(format!("[Profile] Target: {} ({:?})", target.profile.label(), target.tier));

        match (source.profile.load(), target.profile.load()) {
            (Ok(_), Ok(_)) => {
                stages.push(PipelineStage::CmsTransform {
                    source: source.profile,
                    target: target.profile,
                    intent: self.config.intent,
                });
                trace.push(format!("[C] CMS applied (intent: {})", self.config.intent.name()));
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(%e, "profile failed to load, skipping CMS");
                trace.push(format!("[C] CMS skipped: {e}"));
            }
        }
    }
}
