//! CIPA DC-007 Multi-Picture Format directory.
//!
//! The writer emits the fixed two-image APP2 segment used by Ultra HDR
//! containers; the reader accepts any MPF directory in either byte order
//! and returns absolute image ranges.
//!
//! Writer layout (offsets relative to the TIFF header):
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | `II*\0`, IFD offset 8 |
//! | 8 | entry count 3 |
//! | 10 | B000 version `0100`, B001 image count 2, B002 entry array |
//! | 46 | next IFD 0 |
//! | 50 | 2 x 16-byte MP entries |

use crate::jpeg::{self, APP2};
use crate::{MuxError, MuxResult};
use std::ops::Range;

/// Identifier at the start of the APP2 payload.
pub const MPF_IDENTIFIER: &[u8; 4] = b"MPF\0";
/// Payload length of the written segment.
pub const MPF_PAYLOAD_LEN: usize = 92;
/// Full segment length including marker and length field.
pub const MPF_SEGMENT_LEN: usize = MPF_PAYLOAD_LEN + 4;
/// Bytes from segment start to the TIFF header (marker, length, identifier).
pub const TIFF_HEADER_OFFSET: usize = 8;

const TAG_VERSION: u16 = 0xB000;
const TAG_NUMBER_OF_IMAGES: u16 = 0xB001;
const TAG_MP_ENTRY: u16 = 0xB002;
const TYPE_LONG: u16 = 4;
const TYPE_UNDEFINED: u16 = 7;
const ENTRY_ARRAY_OFFSET: u32 = 50;
const MP_ENTRY_LEN: usize = 16;

/// Attribute bytes of the primary image entry.
pub const PRIMARY_ATTRIBUTE: [u8; 4] = [0x03, 0x00, 0x01, 0x00];
/// Attribute bytes of the gain-map entry.
pub const SECONDARY_ATTRIBUTE: [u8; 4] = [0x00, 0x00, 0x02, 0x00];

/// Builds the APP2 MPF segment for a primary and one secondary image.
///
/// `offset_to_second` is relative to the TIFF header, as MPF requires.
pub fn build_mpf_segment(primary_size: u32, secondary_size: u32, offset_to_second: u32) -> Vec<u8> {
    fn ifd_entry(out: &mut Vec<u8>, tag: u16, ty: u16, count: u32, value: [u8; 4]) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&ty.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value);
    }

    let mut seg = Vec::with_capacity(MPF_SEGMENT_LEN);
    seg.extend_from_slice(&[0xFF, APP2]);
    seg.extend_from_slice(&((MPF_PAYLOAD_LEN + 2) as u16).to_be_bytes());
    seg.extend_from_slice(MPF_IDENTIFIER);

    seg.extend_from_slice(b"II");
    seg.extend_from_slice(&0x002Au16.to_le_bytes());
    seg.extend_from_slice(&8u32.to_le_bytes());

    seg.extend_from_slice(&3u16.to_le_bytes());
    ifd_entry(&mut seg, TAG_VERSION, TYPE_UNDEFINED, 4, *b"0100");
    ifd_entry(&mut seg, TAG_NUMBER_OF_IMAGES, TYPE_LONG, 1, 2u32.to_le_bytes());
    ifd_entry(
        &mut seg,
        TAG_MP_ENTRY,
        TYPE_UNDEFINED,
        (2 * MP_ENTRY_LEN) as u32,
        ENTRY_ARRAY_OFFSET.to_le_bytes(),
    );
    seg.extend_from_slice(&0u32.to_le_bytes());

    for (attr, size, offset) in [
        (PRIMARY_ATTRIBUTE, primary_size, 0u32),
        (SECONDARY_ATTRIBUTE, secondary_size, offset_to_second),
    ] {
        seg.extend_from_slice(&attr);
        seg.extend_from_slice(&size.to_le_bytes());
        seg.extend_from_slice(&offset.to_le_bytes());
        seg.extend_from_slice(&[0; 4]);
    }

    seg.resize(MPF_SEGMENT_LEN, 0);
    seg
}

/// One image listed in an MPF directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpImage {
    /// Raw attribute word, in the directory's byte order.
    pub attribute: u32,
    /// Image size in bytes.
    pub size: u32,
    /// Absolute file offset of the image's SOI.
    pub offset: usize,
}

impl MpImage {
    /// Byte range of the image in the file.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size as usize
    }
}

struct TiffReader<'a> {
    data: &'a [u8],
    base: usize,
    little: bool,
}

impl TiffReader<'_> {
    fn bytes<const N: usize>(&self, at: usize) -> MuxResult<[u8; N]> {
        let start = self.base + at;
        self.data
            .get(start..start + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| MuxError::InvalidMpf(format!("read past end at TIFF offset {at}")))
    }

    fn u16(&self, at: usize) -> MuxResult<u16> {
        let b = self.bytes::<2>(at)?;
        Ok(if self.little { u16::from_le_bytes(b) } else { u16::from_be_bytes(b) })
    }

    fn u32(&self, at: usize) -> MuxResult<u32> {
        let b = self.bytes::<4>(at)?;
        Ok(if self.little { u32::from_le_bytes(b) } else { u32::from_be_bytes(b) })
    }
}

/// Reads the MP entry table of a container.
///
/// Offsets are made absolute; the primary image (stored offset 0) starts at
/// the beginning of the file.
pub fn parse_mpf(data: &[u8]) -> MuxResult<Vec<MpImage>> {
    let seg = jpeg::segments(data)?
        .into_iter()
        .find(|s| s.marker == APP2 && s.bytes(data).starts_with(MPF_IDENTIFIER))
        .ok_or_else(|| MuxError::InvalidMpf("no MPF segment".into()))?;

    let base = seg.payload.start + MPF_IDENTIFIER.len();
    let little = match data.get(base..base + 2) {
        Some(b"II") => true,
        Some(b"MM") => false,
        _ => return Err(MuxError::InvalidMpf("bad TIFF byte order".into())),
    };
    let r = TiffReader { data, base, little };
    if r.u16(2)? != 0x002A {
        return Err(MuxError::InvalidMpf("bad TIFF magic".into()));
    }

    let ifd = r.u32(4)? as usize;
    let count = r.u16(ifd)? as usize;
    let mut entries: Option<(usize, usize)> = None;
    let mut number_of_images: Option<usize> = None;
    for i in 0..count {
        let at = ifd + 2 + i * 12;
        match r.u16(at)? {
            TAG_NUMBER_OF_IMAGES => number_of_images = Some(r.u32(at + 8)? as usize),
            TAG_MP_ENTRY => entries = Some((r.u32(at + 4)? as usize, r.u32(at + 8)? as usize)),
            _ => {}
        }
    }

    let (len, offset) = entries.ok_or_else(|| MuxError::InvalidMpf("no MP entry tag".into()))?;
    let n = number_of_images.unwrap_or(len / MP_ENTRY_LEN).min(len / MP_ENTRY_LEN);
    (0..n)
        .map(|i| {
            let at = offset + i * MP_ENTRY_LEN;
            let stored = r.u32(at + 8)? as usize;
            Ok(MpImage {
                attribute: r.u32(at)?,
                size: r.u32(at + 4)?,
                offset: if stored == 0 { 0 } else { base + stored },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_bytes() {
        let seg = build_mpf_segment(1000, 200, 900);
        assert_eq!(seg.len(), MPF_SEGMENT_LEN);
        assert_eq!(&seg[..4], &[0xFF, 0xE2, 0x00, 0x5E]);
        assert_eq!(&seg[4..8], b"MPF\0");
        assert_eq!(&seg[8..16], &[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        assert_eq!(&seg[16..18], &[0x03, 0x00]);
        // B000 "0100"
        assert_eq!(&seg[18..30], &[0x00, 0xB0, 0x07, 0x00, 0x04, 0, 0, 0, 0x30, 0x31, 0x30, 0x30]);
        // B002 -> II + 50
        assert_eq!(&seg[42..54], &[0x02, 0xB0, 0x07, 0x00, 0x20, 0, 0, 0, 0x32, 0, 0, 0]);
        let primary = TIFF_HEADER_OFFSET + 50;
        assert_eq!(&seg[primary..primary + 4], &PRIMARY_ATTRIBUTE);
        assert_eq!(&seg[primary + 4..primary + 8], &1000u32.to_le_bytes());
        let second = primary + 16;
        assert_eq!(&seg[second..second + 4], &SECONDARY_ATTRIBUTE);
        assert_eq!(&seg[second + 8..second + 12], &900u32.to_le_bytes());
        assert!(seg[second + 16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_written() {
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&build_mpf_segment(500, 40, 480));
        data.extend_from_slice(&[0xFF, 0xD9]);
        let images = parse_mpf(&data).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].offset, 0);
        assert_eq!(images[0].size, 500);
        assert_eq!(images[1].offset, 2 + TIFF_HEADER_OFFSET + 480);
        assert_eq!(images[1].range().len(), 40);
    }

    #[test]
    fn test_parse_big_endian() {
        let mut p = Vec::new();
        p.extend_from_slice(b"MPF\0MM\0\x2A\0\0\0\x08");
        p.extend_from_slice(&2u16.to_be_bytes());
        for (tag, ty, count, value) in [(0xB001u16, 4u16, 1u32, 2u32), (0xB002, 7, 32, 38)] {
            p.extend_from_slice(&tag.to_be_bytes());
            p.extend_from_slice(&ty.to_be_bytes());
            p.extend_from_slice(&count.to_be_bytes());
            p.extend_from_slice(&value.to_be_bytes());
        }
        p.extend_from_slice(&0u32.to_be_bytes());
        for (size, offset) in [(300u32, 0u32), (64, 250)] {
            p.extend_from_slice(&0x0003_0000u32.to_be_bytes());
            p.extend_from_slice(&size.to_be_bytes());
            p.extend_from_slice(&offset.to_be_bytes());
            p.extend_from_slice(&[0; 4]);
        }
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE2];
        data.extend_from_slice(&((p.len() + 2) as u16).to_be_bytes());
        data.extend_from_slice(&p);

        let images = parse_mpf(&data).unwrap();
        assert_eq!(images[0].attribute, 0x0003_0000);
        assert_eq!(images[1].size, 64);
        assert_eq!(images[1].offset, 10 + 250);
    }

    #[test]
    fn test_missing_mpf() {
        let data = [0xFF, 0xD8, 0xFF, 0xD9];
        assert!(matches!(parse_mpf(&data), Err(MuxError::InvalidMpf(_))));
    }
}
