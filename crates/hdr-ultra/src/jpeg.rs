//! Minimal JPEG marker-segment handling.
//!
//! Only what container muxing needs: walking the header segments, building
//! APPn segments and finding where new ones can be spliced in. Entropy-coded
//! data is never touched.

use crate::{MuxError, MuxResult};
use std::ops::Range;

/// Start of image.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// JFIF marker.
pub const APP0: u8 = 0xE0;
/// EXIF / XMP marker.
pub const APP1: u8 = 0xE1;
/// ICC / MPF marker.
pub const APP2: u8 = 0xE2;
/// Start of scan; header parsing stops here.
pub const SOS: u8 = 0xDA;
/// End of image.
pub const EOI: u8 = 0xD9;

/// Namespace prefix of an XMP APP1 payload.
pub const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Largest payload a segment can carry (length field counts itself).
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// One marker segment in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Marker byte (the one after 0xFF).
    pub marker: u8,
    /// File offset of the 0xFF byte.
    pub offset: usize,
    /// Payload range, after the length field.
    pub payload: Range<usize>,
}

impl Segment {
    /// Total length including marker and length field.
    pub fn len(&self) -> usize {
        self.payload.end - self.offset
    }

    /// Payload bytes of this segment in `data`.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload.clone()]
    }
}

/// Checks the SOI marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == SOI
}

/// Lists header segments up to the first SOS or EOI.
pub fn segments(data: &[u8]) -> MuxResult<Vec<Segment>> {
    if !is_jpeg(data) {
        return Err(MuxError::InvalidJpeg("missing SOI marker".into()));
    }

    let mut out = Vec::new();
    let mut pos = 2usize;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(MuxError::InvalidJpeg(format!("expected marker at offset {pos}")));
        }
        let offset = pos;
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        if pos >= data.len() {
            break;
        }
        let marker = data[pos];
        pos += 1;

        if marker == EOI || marker == SOS {
            break;
        }
        // standalone
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            continue;
        }

        if pos + 2 > data.len() {
            return Err(MuxError::InvalidJpeg(format!("truncated segment at offset {offset}")));
        }
        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if seg_len < 2 || pos + seg_len > data.len() {
            return Err(MuxError::InvalidJpeg(format!(
                "segment 0x{marker:02X} at offset {offset} overruns the file"
            )));
        }
        out.push(Segment {
            marker,
            offset,
            payload: pos + 2..pos + seg_len,
        });
        pos += seg_len;
    }
    Ok(out)
}

/// Builds an APPn segment from payload parts.
pub fn app_segment(marker: u8, kind: &'static str, parts: &[&[u8]]) -> MuxResult<Vec<u8>> {
    let len: usize = parts.iter().map(|p| p.len()).sum();
    if len > MAX_SEGMENT_PAYLOAD {
        return Err(MuxError::SegmentTooLarge { kind, len });
    }
    let mut seg = Vec::with_capacity(len + 4);
    seg.extend_from_slice(&[0xFF, marker]);
    seg.extend_from_slice(&((len + 2) as u16).to_be_bytes());
    for p in parts {
        seg.extend_from_slice(p);
    }
    Ok(seg)
}

/// Offset where new APP segments go: after SOI, or after a leading APP0.
pub fn insertion_point(data: &[u8]) -> MuxResult<usize> {
    if !is_jpeg(data) {
        return Err(MuxError::InvalidJpeg("missing SOI marker".into()));
    }
    if data.len() > 6 && data[2] == 0xFF && data[3] == APP0 {
        let app0_len = u16::from_be_bytes([data[4], data[5]]) as usize;
        let end = 4 + app0_len;
        if app0_len < 2 || end > data.len() {
            return Err(MuxError::InvalidJpeg("APP0 segment overruns the file".into()));
        }
        return Ok(end);
    }
    Ok(2)
}

/// XMP packet text of the first XMP APP1 segment, if any.
pub fn find_xmp(data: &[u8]) -> MuxResult<Option<&str>> {
    let xmp = segments(data)?
        .into_iter()
        .filter(|s| s.marker == APP1)
        .map(|s| s.bytes(data))
        .find(|p| p.starts_with(XMP_NAMESPACE))
        .map(|p| &p[XMP_NAMESPACE.len()..]);
    Ok(xmp.and_then(|p| std::str::from_utf8(p).ok()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// SOI, JFIF APP0, a DQT stub, SOS with two bytes of scan data, EOI.
    pub(crate) fn tiny_jpeg() -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        v.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        v.extend_from_slice(b"JFIF\0");
        v.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        v.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x04, 0x00, 0x01]);
        v.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x12, 0x34]);
        v.extend_from_slice(&[0xFF, 0xD9]);
        v
    }

    #[test]
    fn test_segments() {
        let data = tiny_jpeg();
        let segs = segments(&data).unwrap();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].marker, APP0);
        assert_eq!(segs[0].offset, 2);
        assert_eq!(segs[0].len(), 18);
        assert!(segs[0].bytes(&data).starts_with(b"JFIF"));
        assert_eq!(segs[1].marker, 0xDB);
    }

    #[test]
    fn test_insertion_point() {
        assert_eq!(insertion_point(&tiny_jpeg()).unwrap(), 20);
        assert_eq!(insertion_point(&[0xFF, 0xD8, 0xFF, 0xDB, 0, 2, 0xFF, 0xD9]).unwrap(), 2);
        assert!(insertion_point(b"PNG").is_err());
        assert!(insertion_point(&[0xFF, 0xD8, 0xFF, 0xE0, 0x40, 0x00, 0, 0]).is_err());
    }

    #[test]
    fn test_app_segment() {
        let seg = app_segment(APP1, "XMP", &[b"ab", b"cd"]).unwrap();
        assert_eq!(seg, vec![0xFF, 0xE1, 0x00, 0x06, b'a', b'b', b'c', b'd']);
        let big = vec![0u8; MAX_SEGMENT_PAYLOAD + 1];
        assert!(matches!(
            app_segment(APP1, "XMP", &[&big]),
            Err(MuxError::SegmentTooLarge { .. })
        ));
    }

    #[test]
    fn test_truncated() {
        let mut data = tiny_jpeg();
        data.truncate(10);
        assert!(segments(&data).is_err());
    }
}
