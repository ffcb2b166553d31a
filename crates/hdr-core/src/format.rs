//! Render target pixel formats.
//!
//! A pipeline build picks exactly one [`RenderFormat`] and every stage runs at
//! that precision.
//!
//! # Usage
//!
//! ```rust
//! use hdr_core::RenderFormat;
//!
//! let fmt = RenderFormat::F16;
//! assert!(fmt.is_float());
//! assert_eq!(fmt.bytes_per_pixel(), 8);
//! // Out-of-range values survive a half-float surface
//! assert!(fmt.quantize(4.0) > 1.0);
//! assert_eq!(RenderFormat::U8.quantize(4.0), 1.0);
//! ```

use half::f16;
use serde::{Deserialize, Serialize};

/// Pixel format of the render target surface.
///
/// - `U8` - 8-bit normalized BGRA/RGBA, values clamped to [0, 1]
/// - `F16` - 16-bit half float RGBA (scRGB), unclamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// 8-bit unsigned normalized.
    #[default]
    U8,
    /// 16-bit half-precision float.
    F16,
}

impl RenderFormat {
    /// Whether this is a floating-point (HDR-capable) format.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16)
    }

    /// Bytes per RGBA pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::U8 => 4,
            Self::F16 => 8,
        }
    }

    /// Rounds a working-precision value to what the surface can store.
    #[inline]
    pub fn quantize(&self, v: f32) -> f32 {
        match self {
            Self::U8 => (v.clamp(0.0, 1.0) * 255.0).round() / 255.0,
            Self::F16 => f16::from_f32(v).to_f32(),
        }
    }

    /// Name used in logs and CLI output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "B8G8R8A8_UNORM",
            Self::F16 => "R16G16B16A16_FLOAT",
        }
    }
}

impl std::fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_clamps() {
        assert_eq!(RenderFormat::U8.quantize(-0.5), 0.0);
        assert_eq!(RenderFormat::U8.quantize(2.0), 1.0);
        let q = RenderFormat::U8.quantize(0.5);
        assert!((q - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_f16_keeps_range() {
        let q = RenderFormat::F16.quantize(12.5);
        assert_eq!(q, 12.5);
        assert!(RenderFormat::F16.quantize(-0.25) < 0.0);
    }
}
