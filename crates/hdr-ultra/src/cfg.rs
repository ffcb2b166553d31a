//! `metadata.cfg` for the Ultra HDR packaging tool.
//!
//! One `--option values...` per line, floats with six decimals:
//!
//! ```text
//! --maxContentBoost 4.000000 4.000000 4.000000
//! --minContentBoost 1.000000 1.000000 1.000000
//! --gamma 1.000000 1.000000 1.000000
//! --offsetSdr 0.000000 0.000000 0.000000
//! --offsetHdr 0.000000 0.000000 0.000000
//! --hdrCapacityMin 1.000000
//! --hdrCapacityMax 4.000000
//! --useBaseColorSpace 1
//! ```

use std::fmt;
use std::io;
use std::path::Path;

/// Smallest max content boost written; the packager rejects
/// `hdrCapacityMax <= hdrCapacityMin`.
pub const MIN_CONTENT_BOOST_FLOOR: f32 = 1.01;

/// Gain-map metadata handed to the packaging tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetadataCfg {
    /// Linear peak boost of the gain map.
    pub max_content_boost: f32,
    /// Gain-map gamma.
    pub gamma: f32,
}

impl MetadataCfg {
    /// Config for a boost and gamma.
    pub fn new(max_content_boost: f32, gamma: f32) -> Self {
        Self {
            max_content_boost,
            gamma,
        }
    }

    /// Boost as written, after the capacity floor.
    pub fn effective_boost(&self) -> f32 {
        if self.max_content_boost.is_finite() {
            self.max_content_boost.max(MIN_CONTENT_BOOST_FLOOR)
        } else {
            MIN_CONTENT_BOOST_FLOOR
        }
    }

    /// Writes the config file.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_string())
    }
}

impl fmt::Display for MetadataCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.effective_boost();
        let g = self.gamma;
        writeln!(f, "--maxContentBoost {b:.6} {b:.6} {b:.6}")?;
        writeln!(f, "--minContentBoost 1.000000 1.000000 1.000000")?;
        writeln!(f, "--gamma {g:.6} {g:.6} {g:.6}")?;
        writeln!(f, "--offsetSdr 0.000000 0.000000 0.000000")?;
        writeln!(f, "--offsetHdr 0.000000 0.000000 0.000000")?;
        writeln!(f, "--hdrCapacityMin 1.000000")?;
        writeln!(f, "--hdrCapacityMax {b:.6}")?;
        writeln!(f, "--useBaseColorSpace 1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let text = MetadataCfg::new(4.0, 1.0).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "--maxContentBoost 4.000000 4.000000 4.000000");
        assert_eq!(lines[2], "--gamma 1.000000 1.000000 1.000000");
        assert_eq!(lines[6], "--hdrCapacityMax 4.000000");
        assert_eq!(lines[7], "--useBaseColorSpace 1");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_capacity_floor() {
        let text = MetadataCfg::new(1.0, 2.2).to_string();
        assert!(text.contains("--maxContentBoost 1.010000 1.010000 1.010000"));
        assert!(text.contains("--hdrCapacityMax 1.010000"));
        assert!(text.contains("--gamma 2.200000"));
        assert_eq!(MetadataCfg::new(f32::NAN, 1.0).effective_boost(), MIN_CONTENT_BOOST_FLOOR);
    }
}
