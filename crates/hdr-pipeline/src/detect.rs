//! Color metadata detection from ffprobe output.
//!
//! Parses the JSON produced by [`ffprobe_args`] into a [`ColorDescriptor`]
//! plus an HDR-potential flag. Container-level gain-map hints (Apple, Samsung
//! and ISO 21496-1 tags) are picked up heuristically from the raw text since
//! ffprobe reports them in vendor-specific places.

use crate::PipelineResult;
use hdr_core::{
    Chromaticities, ColorDescriptor, ColorPrimaries, ColorRange, GainMapParams, MasteringMetadata,
    MatrixCoefficients, TransferFunction,
};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Above this many nits a source is treated as HDR-potential.
pub const HDR_POTENTIAL_NITS: f64 = 200.0;

const GAIN_MAP_MARKERS: &[&str] = &[
    "hdrgainmap",
    "gainmapmax",
    "tmap",
    "gain_map",
    "apple:photo:2020:aux:hdrgainmap",
    "hdr headroom",
];

const HEIC_VENDORS: &[&str] = &["samsung", "galaxy", "apple", "iphone"];

static HEADROOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:HDR Headroom|hdr_headroom)"?\s*[:=]\s*"?([\d\.-]+)"#).expect("valid regex literal")
});

/// Detection result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedSource {
    /// Descriptor built from the stream and side data.
    pub descriptor: ColorDescriptor,
    /// Source may carry more than SDR range.
    pub hdr_potential: bool,
}

/// Arguments for an ffprobe call whose output [`from_ffprobe_json`] reads.
pub fn ffprobe_args(path: &Path) -> Vec<String> {
    [
        "-v",
        "quiet",
        "-show_format",
        "-show_streams",
        "-show_entries",
        "format_tags:stream_tags:stream_side_data_list",
        "-of",
        "json",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(path.display().to_string()))
    .collect()
}

fn map_primaries(s: &str) -> ColorPrimaries {
    match s {
        "bt709" => ColorPrimaries::Bt709,
        "bt2020" => ColorPrimaries::Bt2020,
        "smpte432" | "smpte431" => ColorPrimaries::DisplayP3,
        _ => ColorPrimaries::Unknown,
    }
}

fn map_transfer(s: &str) -> TransferFunction {
    match s {
        "smpte2084" => TransferFunction::Pq,
        "arib-std-b67" => TransferFunction::Hlg,
        "iec61966-2-1" | "srgb" => TransferFunction::Srgb,
        "bt709" => TransferFunction::Bt709,
        "linear" => TransferFunction::Linear,
        _ => TransferFunction::Unknown,
    }
}

fn map_matrix(s: &str) -> MatrixCoefficients {
    match s {
        "bt2020nc" => MatrixCoefficients::Bt2020Ncl,
        "bt709" => MatrixCoefficients::Bt709,
        "bt470bg" | "smpte170m" => MatrixCoefficients::Bt601,
        "gbr" => MatrixCoefficients::Identity,
        _ => MatrixCoefficients::Unknown,
    }
}

fn map_range(s: &str) -> ColorRange {
    match s {
        "limited" | "tv" => ColorRange::Limited,
        "full" | "pc" => ColorRange::Full,
        _ => ColorRange::Unknown,
    }
}

/// Parses `"num/den"` (or a bare number) as ffprobe prints rationals.
fn rational(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    let s = v.as_str()?;
    match s.split_once('/') {
        Some((n, d)) => {
            let (n, d) = (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?);
            (d != 0.0).then(|| n / d)
        }
        None => s.trim().parse().ok(),
    }
}

fn integer(v: &Value) -> Option<u32> {
    v.as_u64()
        .map(|n| n.min(u32::MAX as u64) as u32)
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn chromaticities(sd: &Value) -> Option<Chromaticities> {
    let xy = |k: &str| Some([rational(sd.get(format!("{k}_x"))?)?, rational(sd.get(format!("{k}_y"))?)?]);
    Some(Chromaticities {
        red: xy("red")?,
        green: xy("green")?,
        blue: xy("blue")?,
        white: xy("white_point")?,
    })
}

/// Reads CLL and mastering display side data. `None` if neither is present.
fn mastering(side_data: &[Value]) -> Option<MasteringMetadata> {
    let mut m = MasteringMetadata::default();
    for sd in side_data {
        if let Some(v) = sd.get("max_content").and_then(integer) {
            m.max_cll = Some(v);
        }
        if let Some(v) = sd.get("max_average").and_then(integer) {
            m.max_fall = Some(v);
        }
        if let Some(v) = sd.get("min_luminance").and_then(rational) {
            m.min_luminance = Some(v);
        }
        if let Some(v) = sd.get("max_luminance").and_then(rational) {
            m.max_luminance = Some(v);
        }
        if m.chromaticities.is_none() {
            m.chromaticities = chromaticities(sd);
        }
    }
    (!m.is_empty()).then_some(m)
}

fn describe(primaries: ColorPrimaries, transfer: TransferFunction, raw_p: &str, raw_t: &str) -> (String, bool) {
    use ColorPrimaries as P;
    use TransferFunction as T;
    match (primaries, transfer) {
        (P::Bt709, T::Srgb) => ("sRGB".into(), false),
        (P::Bt2020, T::Pq) => ("HDR10 / BT.2020 PQ".into(), true),
        (P::Bt2020, T::Hlg) => ("HLG / BT.2020".into(), true),
        (P::Bt2020, _) => ("BT.2020".into(), true),
        _ => (format!("{raw_p}/{raw_t}"), false),
    }
}

fn is_heif(path: Option<&Path>) -> bool {
    path.and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("heic") || e.eq_ignore_ascii_case("heif"))
}

/// Builds a descriptor from ffprobe JSON.
///
/// `path` is the probed file; its extension feeds the HEIF vendor
/// heuristic.
pub fn from_ffprobe_json(json: &str, path: Option<&Path>) -> PipelineResult<DetectedSource> {
    let root: Value = serde_json::from_str(json)?;
    let streams = root
        .get("streams")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let stream = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
        .or_else(|| streams.first());

    let field = |k: &str| {
        stream
            .and_then(|s| s.get(k))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let (raw_p, raw_t) = (field("color_primaries"), field("color_transfer"));

    let mut desc = ColorDescriptor {
        primaries: map_primaries(&raw_p),
        transfer: map_transfer(&raw_t),
        matrix: map_matrix(&field("color_space")),
        range: map_range(&field("color_range")),
        description: String::new(),
        ..Default::default()
    };

    let side_data: Vec<Value> = streams
        .iter()
        .filter_map(|s| s.get("side_data_list").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect();
    desc.mastering = mastering(&side_data);

    let mut hdr_potential = false;
    if !raw_p.is_empty() {
        let (text, hdr) = describe(desc.primaries, desc.transfer, &raw_p, &raw_t);
        desc.description = text;
        hdr_potential = hdr;
    }

    if let Some(m) = &desc.mastering {
        let bright = |v: Option<f64>| v.is_some_and(|n| n > HDR_POTENTIAL_NITS);
        if bright(m.max_cll.map(f64::from)) || bright(m.max_luminance) {
            hdr_potential = true;
            if !desc.description.contains("HDR") {
                desc.description.push_str(" (HDR Potential)");
            }
        }
    }

    let icc = side_data.iter().find(|sd| {
        sd.get("side_data_type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.eq_ignore_ascii_case("icc profile"))
    });
    if let Some(icc) = icc {
        match icc.get("name").and_then(Value::as_str) {
            Some(name) => desc.description = name.to_string(),
            None if desc.description.is_empty() => desc.description = "Embedded ICC".into(),
            None => {}
        }
    }

    let lower = json.to_lowercase();
    let gain_map_context = GAIN_MAP_MARKERS.iter().any(|m| lower.contains(m));
    let vendor_heif = is_heif(path) && HEIC_VENDORS.iter().any(|v| lower.contains(v));
    if gain_map_context || vendor_heif {
        hdr_potential = true;
        desc.has_gain_map = true;
        if desc.description.is_empty() {
            desc.description = if lower.contains("apple") {
                "Apple HDR (Gain Map)".into()
            } else {
                "Single-Stream/Gain-Map HDR".into()
            };
        } else if !desc.description.contains("HDR") {
            desc.description.push_str(" [HDR Potential]");
        }

        let headroom = HEADROOM_RE
            .captures(json)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f32>().ok());
        if let Some(h) = headroom {
            desc.gain_map = Some(GainMapParams::from_headroom(h));
            debug!(headroom = h, "gain-map headroom");
        }
    }

    if desc.description.is_empty() {
        desc.description = "Unknown".into();
    }
    debug!(
        primaries = %raw_p,
        transfer = %raw_t,
        hdr_potential,
        gain_map = desc.has_gain_map,
        "ffprobe color info"
    );
    Ok(DetectedSource {
        descriptor: desc,
        hdr_potential,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HDR10: &str = r#"{
        "streams": [{
            "codec_type": "video",
            "color_range": "tv",
            "color_space": "bt2020nc",
            "color_transfer": "smpte2084",
            "color_primaries": "bt2020",
            "side_data_list": [
                {
                    "side_data_type": "Mastering display metadata",
                    "red_x": "34000/50000", "red_y": "16000/50000",
                    "green_x": "13250/50000", "green_y": "34500/50000",
                    "blue_x": "7500/50000", "blue_y": "3000/50000",
                    "white_point_x": "15635/50000", "white_point_y": "16450/50000",
                    "min_luminance": "50/10000",
                    "max_luminance": "10000000/10000"
                },
                { "side_data_type": "Content light level metadata", "max_content": 1000, "max_average": 400 }
            ]
        }]
    }"#;

    #[test]
    fn test_hdr10_stream() {
        let d = from_ffprobe_json(HDR10, None).unwrap();
        assert!(d.hdr_potential);
        let desc = &d.descriptor;
        assert_eq!(desc.primaries, ColorPrimaries::Bt2020);
        assert_eq!(desc.transfer, TransferFunction::Pq);
        assert_eq!(desc.matrix, MatrixCoefficients::Bt2020Ncl);
        assert_eq!(desc.range, ColorRange::Limited);
        assert_eq!(desc.description, "HDR10 / BT.2020 PQ");
        let m = desc.mastering.unwrap();
        assert_eq!(m.max_cll, Some(1000));
        assert_eq!(m.max_fall, Some(400));
        assert_relative_eq!(m.min_luminance.unwrap(), 0.005);
        assert_relative_eq!(m.max_luminance.unwrap(), 1000.0);
        assert_relative_eq!(m.chromaticities.unwrap().red[0], 0.68);
    }

    #[test]
    fn test_srgb_jpeg() {
        let json = r#"{"streams":[{"codec_type":"video","color_primaries":"bt709","color_transfer":"iec61966-2-1","color_range":"pc"}]}"#;
        let d = from_ffprobe_json(json, None).unwrap();
        assert!(!d.hdr_potential);
        assert_eq!(d.descriptor.description, "sRGB");
        assert_eq!(d.descriptor.range, ColorRange::Full);
        assert!(d.descriptor.mastering.is_none());
    }

    #[test]
    fn test_bright_cll_marks_potential() {
        let json = r#"{"streams":[{"color_primaries":"smpte432","color_transfer":"bt709",
            "side_data_list":[{"max_content": 600, "max_average": 100}]}]}"#;
        let d = from_ffprobe_json(json, None).unwrap();
        assert!(d.hdr_potential);
        assert_eq!(d.descriptor.description, "smpte432/bt709 (HDR Potential)");
        assert_eq!(d.descriptor.primaries, ColorPrimaries::DisplayP3);
    }

    #[test]
    fn test_icc_name() {
        let json = r#"{"streams":[{"side_data_list":[{"side_data_type":"ICC profile","name":"Display P3","size":536}]}]}"#;
        let d = from_ffprobe_json(json, None).unwrap();
        assert_eq!(d.descriptor.description, "Display P3");

        let json = r#"{"streams":[{"side_data_list":[{"side_data_type":"ICC Profile"}]}]}"#;
        let d = from_ffprobe_json(json, None).unwrap();
        assert_eq!(d.descriptor.description, "Embedded ICC");
    }

    #[test]
    fn test_apple_headroom() {
        let json = r#"{"streams":[{"codec_type":"video","tags":{"make":"Apple"}}],
            "format":{"tags":{"HDR Headroom":"4.0","com.apple.photo":"apple:photo:2020:aux:hdrgainmap"}}}"#;
        let d = from_ffprobe_json(json, None).unwrap();
        assert!(d.hdr_potential);
        assert!(d.descriptor.has_gain_map);
        assert_eq!(d.descriptor.description, "Apple HDR (Gain Map)");
        assert_relative_eq!(d.descriptor.gain_map.unwrap().max, 2.0);
    }

    #[test]
    fn test_headroom_pattern() {
        LazyLock::force(&HEADROOM_RE);
        let caps = HEADROOM_RE.captures(r#""hdr_headroom": "8""#).unwrap();
        assert_eq!(&caps[1], "8");
    }

    #[test]
    fn test_vendor_heif() {
        let json = r#"{"streams":[{"codec_type":"video","color_primaries":"bt709","color_transfer":"bt709"}],
            "format":{"tags":{"make":"samsung"}}}"#;
        let d = from_ffprobe_json(json, Some(Path::new("photo.HEIC"))).unwrap();
        assert!(d.descriptor.has_gain_map);
        assert_eq!(d.descriptor.description, "bt709/bt709 [HDR Potential]");

        let d = from_ffprobe_json(json, Some(Path::new("photo.jpg"))).unwrap();
        assert!(!d.descriptor.has_gain_map);
    }

    #[test]
    fn test_empty_and_invalid() {
        let d = from_ffprobe_json("{}", None).unwrap();
        assert_eq!(d.descriptor.description, "Unknown");
        assert!(!d.hdr_potential);
        assert!(from_ffprobe_json("not json", None).is_err());
    }

    #[test]
    fn test_ffprobe_args() {
        let args = ffprobe_args(Path::new("a.heic"));
        assert_eq!(args.last().map(String::as_str), Some("a.heic"));
        assert!(args.contains(&"json".to_string()));
    }
}
