//! Branch selection.
//!
//! A pure decision over the descriptor, the config overrides and the target
//! capability. Evaluated in order, first match wins:
//!
//! | Branch | Condition |
//! |--------|-----------|
//! | [`Branch::Absolute`] | transfer is PQ/HLG/Linear (or `data_is_pq`) and target is HDR |
//! | [`Branch::GainMap`] | gain map declared or attached, and target is HDR |
//! | [`Branch::Standard`] | everything else |

use crate::PipelineConfig;
use hdr_core::{ColorDescriptor, RenderFormat, TransferFunction};
use serde::Serialize;

/// Transfer family handled by the absolute branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferKind {
    /// ST 2084.
    Pq,
    /// Hybrid log-gamma.
    Hlg,
    /// Linear light.
    Linear,
}

impl TransferKind {
    fn from_transfer(t: TransferFunction) -> Option<Self> {
        match t {
            TransferFunction::Pq => Some(Self::Pq),
            TransferFunction::Hlg => Some(Self::Hlg),
            TransferFunction::Linear => Some(Self::Linear),
            _ => None,
        }
    }
}

/// Processing branch for one image on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Branch {
    /// Absolute / scene-linear HDR data on an HDR target.
    Absolute(TransferKind),
    /// Gain-map HDR on an HDR target.
    GainMap,
    /// SDR color management.
    Standard,
}

impl Branch {
    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absolute(TransferKind::Pq) => "A: absolute HDR (PQ)",
            Self::Absolute(TransferKind::Hlg) => "A: absolute HDR (HLG)",
            Self::Absolute(TransferKind::Linear) => "A: absolute HDR (Linear)",
            Self::GainMap => "B: gain-map HDR",
            Self::Standard => "C: standard SDR / color management",
        }
    }
}

/// Transfer the pipeline should act on, after the PQ override.
///
/// `data_is_pq` wins over the signalled transfer on purpose, so a Linear
/// descriptor flagged as PQ-coded takes the PQ path and never gets the
/// scRGB scale.
pub fn effective_transfer(desc: &ColorDescriptor, config: &PipelineConfig) -> TransferFunction {
    if config.data_is_pq {
        TransferFunction::Pq
    } else {
        desc.transfer
    }
}

/// Picks the branch.
///
/// `gain_map_attached` is set when the decoder delivered a gain-map image
/// alongside the base image.
pub fn select_branch(
    desc: &ColorDescriptor,
    config: &PipelineConfig,
    target_hdr: bool,
    gain_map_attached: bool,
) -> Branch {
    if target_hdr {
        if let Some(kind) = TransferKind::from_transfer(effective_transfer(desc, config)) {
            return Branch::Absolute(kind);
        }
        if desc.declares_gain_map() || gain_map_attached {
            return Branch::GainMap;
        }
    }
    Branch::Standard
}

/// Surface format for a build.
///
/// Half float when the source is HDR-potential, the data is PQ, or the
/// buffer is synthesized linear; 8-bit otherwise.
pub fn render_format(desc: &ColorDescriptor, config: &PipelineConfig, source_hdr: bool) -> RenderFormat {
    let transfer = effective_transfer(desc, config);
    let synthesized_linear = desc.is_synthesized() && transfer == TransferFunction::Linear;
    if source_hdr || transfer == TransferFunction::Pq || synthesized_linear {
        RenderFormat::F16
    } else {
        RenderFormat::U8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdr_core::{GainMapParams, TransferFunction as T};

    fn desc(transfer: T) -> ColorDescriptor {
        ColorDescriptor {
            transfer,
            ..Default::default()
        }
    }

    #[test]
    fn test_decision_table() {
        let cfg = PipelineConfig::default();
        let cases = [
            (T::Pq, true, false, Branch::Absolute(TransferKind::Pq)),
            (T::Hlg, true, false, Branch::Absolute(TransferKind::Hlg)),
            (T::Linear, true, true, Branch::Absolute(TransferKind::Linear)),
            (T::Pq, false, false, Branch::Standard),
            (T::Srgb, true, true, Branch::GainMap),
            (T::Srgb, true, false, Branch::Standard),
            (T::Srgb, false, true, Branch::Standard),
            (T::Unknown, false, false, Branch::Standard),
        ];
        for (t, hdr, attached, expected) in cases {
            assert_eq!(select_branch(&desc(t), &cfg, hdr, attached), expected, "{t:?} hdr={hdr}");
        }
    }

    #[test]
    fn test_declared_gain_map() {
        let cfg = PipelineConfig::default();
        let mut d = desc(T::Srgb);
        d.gain_map = Some(GainMapParams::default());
        assert_eq!(select_branch(&d, &cfg, true, false), Branch::GainMap);
        d.gain_map = None;
        d.has_gain_map = true;
        assert_eq!(select_branch(&d, &cfg, true, false), Branch::GainMap);
    }

    #[test]
    fn test_pq_override() {
        let cfg = PipelineConfig {
            data_is_pq: true,
            ..Default::default()
        };
        assert_eq!(
            select_branch(&desc(T::Srgb), &cfg, true, false),
            Branch::Absolute(TransferKind::Pq)
        );
        assert_eq!(render_format(&desc(T::Srgb), &cfg, false), RenderFormat::F16);
    }

    #[test]
    fn test_pq_override_beats_linear() {
        let cfg = PipelineConfig {
            data_is_pq: true,
            ..Default::default()
        };
        let mut d = desc(T::Linear);
        d.description = "scRGB Linear".into();
        assert_eq!(effective_transfer(&d, &cfg), T::Pq);
        assert_eq!(select_branch(&d, &cfg, true, false), Branch::Absolute(TransferKind::Pq));
    }

    #[test]
    fn test_render_format() {
        let cfg = PipelineConfig::default();
        assert_eq!(render_format(&desc(T::Srgb), &cfg, false), RenderFormat::U8);
        assert_eq!(render_format(&desc(T::Srgb), &cfg, true), RenderFormat::F16);
        assert_eq!(render_format(&desc(T::Pq), &cfg, false), RenderFormat::F16);
        assert_eq!(render_format(&desc(T::Hlg), &cfg, false), RenderFormat::U8);
        assert_eq!(render_format(&desc(T::Linear), &cfg, false), RenderFormat::U8);
        let mut synth = desc(T::Linear);
        synth.description = "Synthesized HDR".into();
        assert_eq!(render_format(&synth, &cfg, false), RenderFormat::F16);
    }
}
