//! Manual Ultra HDR muxer.
//!
//! Splices an XMP APP1 and an MPF APP2 segment into an SDR JPEG and appends
//! the gain-map JPEG, producing a two-image MPF container:
//!
//! ```text
//! SOI [APP0] APP1(XMP) APP2(MPF) ...rest of SDR... | gain-map JPEG
//! <----------------- primary_size -----------------> <- secondary ->
//! ```

use crate::jpeg::{self, APP1, XMP_NAMESPACE};
use crate::mpf::{self, MPF_SEGMENT_LEN, MpImage, TIFF_HEADER_OFFSET};
use crate::xmp;
use crate::{MuxError, MuxResult};
use hdr_core::GainMapParams;
use std::path::Path;
use tracing::{debug, info};

/// Byte layout of a muxed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxLayout {
    /// Where the new segments were inserted in the SDR JPEG.
    pub insertion_point: usize,
    /// Length of the XMP APP1 segment.
    pub xmp_segment_len: usize,
    /// File offset of the MPF TIFF header.
    pub tiff_header_offset: usize,
    /// Bytes of the primary image including the inserted segments.
    pub primary_size: usize,
    /// Gain-map offset relative to the TIFF header.
    pub offset_to_second: usize,
    /// Gain-map length.
    pub secondary_size: usize,
}

impl MuxLayout {
    /// Total container length.
    pub fn total_len(&self) -> usize {
        self.primary_size + self.secondary_size
    }
}

/// Computes the layout for an SDR JPEG and segment sizes.
pub fn plan_layout(sdr: &[u8], xmp_segment_len: usize, secondary_size: usize) -> MuxResult<MuxLayout> {
    let insertion_point = jpeg::insertion_point(sdr)?;
    let tiff_header_offset = insertion_point + xmp_segment_len + TIFF_HEADER_OFFSET;
    let primary_size = sdr.len() + xmp_segment_len + MPF_SEGMENT_LEN;
    let layout = MuxLayout {
        insertion_point,
        xmp_segment_len,
        tiff_header_offset,
        primary_size,
        offset_to_second: primary_size - tiff_header_offset,
        secondary_size,
    };
    if u32::try_from(layout.total_len()).is_err() {
        return Err(MuxError::ContainerTooLarge(layout.total_len()));
    }
    Ok(layout)
}

/// Muxes `sdr` and `gain_map` into one container.
///
/// `headroom` is the linear peak boost (e.g. 4.0 for two stops), written
/// to the XMP as `log2(headroom)` without clamping. The gain map is
/// appended verbatim.
pub fn mux_ultra_hdr(sdr: &[u8], gain_map: &[u8], headroom: f32) -> MuxResult<Vec<u8>> {
    mux_with_layout(sdr, gain_map, headroom).map(|(bytes, _)| bytes)
}

/// Like [`mux_ultra_hdr`], also returning the layout used.
pub fn mux_with_layout(sdr: &[u8], gain_map: &[u8], headroom: f32) -> MuxResult<(Vec<u8>, MuxLayout)> {
    if !headroom.is_finite() || headroom <= 0.0 {
        return Err(MuxError::InvalidHeadroom(headroom));
    }

    let params = GainMapParams::from_stops(headroom.log2());
    let text = xmp::gain_map_xmp(&params, gain_map.len());
    let xmp_segment = jpeg::app_segment(APP1, "XMP", &[XMP_NAMESPACE, text.as_bytes()])?;

    let layout = plan_layout(sdr, xmp_segment.len(), gain_map.len())?;
    // sizes fit u32, checked by plan_layout
    let mpf_segment = mpf::build_mpf_segment(
        layout.primary_size as u32,
        layout.secondary_size as u32,
        layout.offset_to_second as u32,
    );

    let mut out = Vec::with_capacity(layout.total_len());
    out.extend_from_slice(&sdr[..layout.insertion_point]);
    out.extend_from_slice(&xmp_segment);
    out.extend_from_slice(&mpf_segment);
    out.extend_from_slice(&sdr[layout.insertion_point..]);

    debug_assert_eq!(out.len(), layout.primary_size);
    debug_assert_eq!(layout.offset_to_second + layout.tiff_header_offset, layout.primary_size);
    if out.len() != layout.primary_size {
        return Err(MuxError::OffsetMismatch {
            expected: layout.primary_size,
            actual: out.len(),
        });
    }

    out.extend_from_slice(gain_map);
    debug!(?layout, headroom, "muxed ultra hdr container");
    Ok((out, layout))
}

/// File-to-file variant of [`mux_ultra_hdr`].
pub fn mux_files(sdr: &Path, gain_map: &Path, output: &Path, headroom: f32) -> MuxResult<MuxLayout> {
    let sdr_bytes = std::fs::read(sdr)?;
    let gm_bytes = std::fs::read(gain_map)?;
    let (bytes, layout) = mux_with_layout(&sdr_bytes, &gm_bytes, headroom)?;
    std::fs::write(output, bytes)?;
    info!(output = %output.display(), size = layout.total_len(), "wrote ultra hdr container");
    Ok(layout)
}

/// What [`inspect`] finds in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    /// MPF images, primary first.
    pub images: Vec<MpImage>,
    /// `hdrgm:GainMapMax` from the XMP, in stops.
    pub gain_map_max: Option<f32>,
    /// `hdrgm:HDRCapacityMax` from the XMP, in stops.
    pub hdr_capacity_max: Option<f32>,
    /// Whether each listed image starts with an SOI marker.
    pub images_valid: bool,
}

/// Reads back the MPF directory and gain-map XMP of a container.
pub fn inspect(data: &[u8]) -> MuxResult<ContainerInfo> {
    let images = mpf::parse_mpf(data)?;
    let packet = jpeg::find_xmp(data)?;
    let images_valid = images
        .iter()
        .all(|img| data.get(img.range()).is_some_and(jpeg::is_jpeg));
    Ok(ContainerInfo {
        gain_map_max: packet.and_then(xmp::parse_gain_map_max),
        hdr_capacity_max: packet.and_then(xmp::parse_capacity_max),
        images,
        images_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::tests::tiny_jpeg;

    #[test]
    fn test_layout_invariant() {
        let sdr = tiny_jpeg();
        let gm = tiny_jpeg();
        let (out, layout) = mux_with_layout(&sdr, &gm, 4.0).unwrap();
        assert_eq!(layout.insertion_point, 20);
        assert_eq!(layout.offset_to_second + layout.tiff_header_offset, layout.primary_size);
        assert_eq!(out.len(), layout.total_len());
        assert_eq!(&out[layout.tiff_header_offset..layout.tiff_header_offset + 2], b"II");
        assert_eq!(&out[layout.primary_size..], &gm[..]);
    }

    #[test]
    fn test_without_app0() {
        let sdr = vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x07, 0xFF, 0xD9];
        let (out, layout) = mux_with_layout(&sdr, b"gain", 2.0).unwrap();
        assert_eq!(layout.insertion_point, 2);
        assert_eq!(&out[2..4], &[0xFF, 0xE1]);
        assert_eq!(&out[layout.primary_size..], b"gain");
    }

    #[test]
    fn test_rejects() {
        assert!(matches!(
            mux_ultra_hdr(b"GIF89a", b"x", 4.0),
            Err(MuxError::InvalidJpeg(_))
        ));
        assert!(matches!(
            mux_ultra_hdr(&tiny_jpeg(), b"x", f32::NAN),
            Err(MuxError::InvalidHeadroom(_))
        ));
        assert!(matches!(
            mux_ultra_hdr(&tiny_jpeg(), b"x", 0.0),
            Err(MuxError::InvalidHeadroom(_))
        ));
    }

    #[test]
    fn test_inspect() {
        let sdr = tiny_jpeg();
        let gm = tiny_jpeg();
        let out = mux_ultra_hdr(&sdr, &gm, 4.0).unwrap();
        let info = inspect(&out).unwrap();
        assert_eq!(info.images.len(), 2);
        assert!(info.images_valid);
        assert_eq!(info.gain_map_max, Some(2.0));
        assert_eq!(info.hdr_capacity_max, Some(2.0));
    }
}
