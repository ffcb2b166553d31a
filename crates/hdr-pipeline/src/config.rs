//! Pipeline configuration.
//!
//! Everything a pipeline build depends on besides the image itself: the
//! rendering intent, overrides that the user toggles (CMS bypass, PQ data,
//! forced limited range), the nit scale for normalized linear sources and
//! where to look for ICC profiles.
//!
//! ```yaml
//! intent: relative_colorimetric
//! cms_disabled: false
//! pq_max_nits: 4000
//! target_profile: /usr/share/color/icc/monitor.icc
//! profile_dirs:
//!   - /usr/share/color/icc
//! ```

use crate::{PipelineError, PipelineResult};
use hdr_icc::Intent;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration passed into every pipeline build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// ICC rendering intent for the CMS stage.
    pub intent: Intent,
    /// Skip the CMS stage entirely.
    pub cms_disabled: bool,
    /// Treat the source as PQ-coded regardless of its signalled transfer.
    pub data_is_pq: bool,
    /// Treat the source as limited range regardless of its signalled range.
    pub force_limited_range: bool,
    /// Peak luminance represented by 1.0 in normalized linear sources.
    pub pq_max_nits: f32,
    /// Explicit source profile, used when the primaries give no match.
    pub source_profile: Option<PathBuf>,
    /// Explicit target (display/export) profile.
    pub target_profile: Option<PathBuf>,
    /// Extra directories searched for standard profiles, before the OS ones.
    pub profile_dirs: Vec<PathBuf>,
    /// Apply the gain map per pixel in the gain-map branch.
    pub gain_map_blend: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            intent: Intent::Perceptual,
            cms_disabled: false,
            data_is_pq: false,
            force_limited_range: false,
            pq_max_nits: 10000.0,
            source_profile: None,
            target_profile: None,
            profile_dirs: Vec::new(),
            gain_map_blend: false,
        }
    }
}

impl PipelineConfig {
    /// Loads a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses a YAML config. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> PipelineResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Max nits with non-positive values replaced by 10000.
    pub fn effective_max_nits(&self) -> f32 {
        if self.pq_max_nits > 0.0 {
            self.pq_max_nits
        } else {
            10000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.effective_max_nits(), 10000.0);
        assert!(!cfg.gain_map_blend);
    }

    #[test]
    fn test_partial_yaml() {
        let cfg = PipelineConfig::from_yaml_str(
            "intent: saturation\ncms_disabled: true\npq_max_nits: 0\n",
        )
        .unwrap();
        assert_eq!(cfg.intent, Intent::Saturation);
        assert!(cfg.cms_disabled);
        assert_eq!(cfg.effective_max_nits(), 10000.0);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/nonexistent/hdr.yaml").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { .. }));
    }
}
