//! Float RGBA image buffer.
//!
//! [`RgbaImage`] is the working buffer of the CPU compositor: interleaved
//! RGBA `f32` samples in row-major order, straight (non-premultiplied) alpha.

use crate::error::{Error, Result};

/// Interleaved RGBA `f32` image.
#[derive(Clone, PartialEq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl RgbaImage {
    /// Creates a transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * 4],
        }
    }

    /// Wraps existing RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data.len() != width * height * 4`.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Builds an image from 8-bit RGBA bytes, normalizing to [0, 1].
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        Self::from_data(width, height, bytes.iter().map(|&b| b as f32 / 255.0).collect())
    }

    /// Creates an image filled with one pixel value.
    pub fn filled(width: u32, height: u32, pixel: [f32; 4]) -> Self {
        let mut img = Self::new(width, height);
        img.fill(pixel);
        img
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns `true` for a zero-area image.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Raw samples, mutable.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image, returning its samples.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Reads a pixel, `None` when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Writes a pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&pixel);
    }

    /// Sets every pixel to `pixel`.
    pub fn fill(&mut self, pixel: [f32; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&pixel);
        }
    }

    /// Checks that `other` has the same dimensions.
    pub fn check_same_size(&self, other: &Self) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                a_width: self.width,
                a_height: self.height,
                b_width: other.width,
                b_height: other.height,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
