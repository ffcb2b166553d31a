//! Pipeline stages.
//!
//! A plan is an ordered list of [`PipelineStage`]s. Stages are plain data;
//! the compositor decides how to run them.

use crate::profile::ColorProfile;
use glam::{Mat3, Vec3};
use hdr_core::GainMapParams;
use hdr_icc::Intent;

/// Display P3 -> BT.709 (scRGB), row-major.
pub const P3_TO_BT709: [[f32; 3]; 3] = [
    [1.2249, -0.2247, 0.0000],
    [-0.0420, 1.0419, 0.0000],
    [-0.0196, -0.0786, 1.0982],
];

/// BT.2020 -> BT.709 (scRGB), row-major.
pub const BT2020_TO_BT709: [[f32; 3]; 3] = [
    [1.6605, -0.5876, -0.0728],
    [-0.1246, 1.1329, -0.0083],
    [-0.0181, -0.1006, 1.1187],
];

/// Builds a glam matrix from row-major coefficients.
pub fn mat3_from_rows(rows: [[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(rows[0][0], rows[1][0], rows[2][0]),
        Vec3::new(rows[0][1], rows[1][1], rows[2][1]),
        Vec3::new(rows[0][2], rows[1][2], rows[2][2]),
    )
}

/// Row-major coefficients of a glam matrix.
pub fn mat3_rows(m: &Mat3) -> [[f32; 3]; 3] {
    let r = m.transpose().to_cols_array_2d();
    [r[0], r[1], r[2]]
}

/// One transform in a pipeline plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    /// `rgb' = rgb * scale + offset`, alpha unchanged.
    RangeExpand {
        /// Per-channel gain.
        scale: f32,
        /// Per-channel offset, applied after the gain.
        offset: f32,
    },
    /// 3x3 primaries conversion with the boost already folded in.
    PrimariesMatrix {
        /// Final matrix, `boost * base`.
        matrix: Mat3,
        /// The boost that was folded into `matrix`.
        boost: Option<f32>,
    },
    /// Diagonal scale for normalized linear data into scRGB units.
    ScRgbScale {
        /// Multiplier (max nits / 80).
        factor: f32,
    },
    /// ICC conversion.
    CmsTransform {
        /// Source profile.
        source: ColorProfile,
        /// Target profile.
        target: ColorProfile,
        /// Rendering intent.
        intent: Intent,
    },
    /// Per-pixel gain-map recovery.
    GainMapBlend {
        /// Gain-map scalars.
        params: GainMapParams,
        /// Display weight in [0, 1].
        weight: f32,
    },
}

impl PipelineStage {
    /// Limited -> full range expansion for 8-bit-normalized data.
    pub fn limited_range() -> Self {
        let scale = 255.0 / 219.0;
        Self::RangeExpand {
            scale,
            offset: -(16.0 / 255.0) * scale,
        }
    }

    /// Primaries matrix with `boost` pre-multiplied into the coefficients.
    pub fn boosted_matrix(rows: [[f32; 3]; 3], boost: f32) -> Self {
        Self::PrimariesMatrix {
            matrix: mat3_from_rows(rows) * boost,
            boost: Some(boost),
        }
    }

    /// Returns `true` if the stage can produce values above 1.0.
    pub fn requires_hdr(&self) -> bool {
        match self {
            Self::RangeExpand { .. } | Self::CmsTransform { .. } => false,
            Self::PrimariesMatrix { .. } | Self::ScRgbScale { .. } | Self::GainMapBlend { .. } => true,
        }
    }

    /// One-line summary.
    pub fn describe(&self) -> String {
        match self {
            Self::RangeExpand { scale, offset } => {
                format!("RangeExpand scale={scale:.6} offset={offset:.6}")
            }
            Self::PrimariesMatrix { matrix, boost } => {
                let r = mat3_rows(matrix);
                let boost = boost.map(|b| format!(" boost=x{b}")).unwrap_or_default();
                format!(
                    "PrimariesMatrix [{:.4} {:.4} {:.4}; {:.4} {:.4} {:.4}; {:.4} {:.4} {:.4}]{boost}",
                    r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2]
                )
            }
            Self::ScRgbScale { factor } => format!("ScRgbScale x{factor}"),
            Self::CmsTransform { source, target, intent } => format!(
                "CmsTransform {} -> {} ({})",
                source.label(),
                target.label(),
                intent.name()
            ),
            Self::GainMapBlend { params, weight } => format!(
                "GainMapBlend max={:.4} stops weight={weight:.3}",
                params.max
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_row_major_roundtrip() {
        let m = mat3_from_rows(P3_TO_BT709);
        assert_eq!(mat3_rows(&m), P3_TO_BT709);
        // first output channel is the first row
        let out = m * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(out.x, 1.2249);
        assert_relative_eq!(out.y, -0.0420);
    }

    #[test]
    fn test_limited_range_maps_16_235() {
        let PipelineStage::RangeExpand { scale, offset } = PipelineStage::limited_range() else {
            panic!("expected RangeExpand");
        };
        assert_relative_eq!(16.0 / 255.0 * scale + offset, 0.0, epsilon = 1e-6);
        assert_relative_eq!(235.0 / 255.0 * scale + offset, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_boost_premultiplied() {
        let PipelineStage::PrimariesMatrix { matrix, boost } =
            PipelineStage::boosted_matrix(BT2020_TO_BT709, 2.5)
        else {
            panic!("expected PrimariesMatrix");
        };
        assert_eq!(boost, Some(2.5));
        assert_relative_eq!(mat3_rows(&matrix)[0][0], 1.6605 * 2.5, epsilon = 1e-5);
    }
}
