//! Gain-map XMP packet.
//!
//! One packet declares the gain map three times (Adobe `hdrgm`, Apple
//! `apple-hdrgm` and Google `gainmap`) so every reader finds one it knows,
//! plus a Google container directory listing the primary and gain-map
//! items.

use hdr_core::GainMapParams;
use regex::Regex;
use std::sync::LazyLock;

static GAIN_MAP_MAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hdrgm:GainMapMax="([-\d\.]+)""#).expect("valid regex literal"));
static CAPACITY_MAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hdrgm:HDRCapacityMax="([-\d\.]+)""#).expect("valid regex literal"));

/// Builds the XMP packet for a gain map of `gain_map_len` bytes.
///
/// Log2-domain values are written with four decimals.
///
/// ```rust
/// use hdr_core::GainMapParams;
/// use hdr_ultra::xmp::gain_map_xmp;
///
/// let xmp = gain_map_xmp(&GainMapParams::from_headroom(4.0), 1234);
/// assert!(xmp.contains(r#"hdrgm:GainMapMax="2.0000""#));
/// assert!(xmp.contains(r#"Item:Length="1234""#));
/// ```
pub fn gain_map_xmp(params: &GainMapParams, gain_map_len: usize) -> String {
    let max = params.max;
    let cap_max = params.hdr_capacity_max;
    let min = params.min;
    let cap_min = params.hdr_capacity_min;
    let gamma = params.gamma;
    let osdr = params.offset_sdr;
    let ohdr = params.offset_hdr;
    format!(
        r#"<?xpacket begin="?" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="XMP Core 5.5.0">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:hdrgm="http://ns.adobe.com/hdr-gain-map/1.0/"
    xmlns:apple-hdrgm="http://ns.apple.com/HDRGainMap/1.0/"
    xmlns:gainmap="http://ns.google.com/photos/1.0/gainmap/"
    xmlns:Container="http://ns.google.com/photos/1.0/container/"
    xmlns:Item="http://ns.google.com/photos/1.0/container/item/"
    hdrgm:Version="1.0"
    hdrgm:GainMapMax="{max:.4}"
    hdrgm:GainMapMin="{min:.1}"
    hdrgm:Gamma="{gamma:.1}"
    hdrgm:OffsetSdr="{osdr:.1}"
    hdrgm:OffsetHdr="{ohdr:.1}"
    hdrgm:HDRCapacityMin="{cap_min:.1}"
    hdrgm:HDRCapacityMax="{cap_max:.4}"
    hdrgm:BaseRendition="SDR"
    apple-hdrgm:Version="1.0"
    gainmap:Version="1.0"
    gainmap:GainMapMax="{max:.4}"
    gainmap:GainMapMin="{min:.1}"
    gainmap:Gamma="{gamma:.1}">
   <Container:Directory>
    <rdf:Seq>
     <rdf:li rdf:parseType="Resource">
      <Container:Item Item:Mime="image/jpeg" Item:Semantic="Primary"/>
     </rdf:li>
     <rdf:li rdf:parseType="Resource">
      <Container:Item Item:Mime="image/jpeg" Item:Semantic="GainMap">
       <Container:Item Item:Length="{gain_map_len}"/>
      </Container:Item>
     </rdf:li>
    </rdf:Seq>
   </Container:Directory>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#
    )
}

fn capture(re: &Regex, xmp: &str) -> Option<f32> {
    re.captures(xmp)?.get(1)?.as_str().parse().ok()
}

/// `hdrgm:GainMapMax` in stops.
pub fn parse_gain_map_max(xmp: &str) -> Option<f32> {
    capture(&GAIN_MAP_MAX_RE, xmp)
}

/// `hdrgm:HDRCapacityMax` in stops.
pub fn parse_capacity_max(xmp: &str) -> Option<f32> {
    capture(&CAPACITY_MAX_RE, xmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_fields() {
        let xmp = gain_map_xmp(&GainMapParams::from_headroom(8.0), 10);
        assert!(xmp.contains(r#"hdrgm:GainMapMin="0.0""#));
        assert!(xmp.contains(r#"hdrgm:Gamma="1.0""#));
        assert!(xmp.contains(r#"hdrgm:HDRCapacityMin="0.0""#));
        assert!(xmp.contains(r#"gainmap:GainMapMax="3.0000""#));
        assert!(xmp.starts_with("<?xpacket begin"));
        assert!(xmp.ends_with(r#"<?xpacket end="w"?>"#));
    }

    #[test]
    fn test_patterns_compile() {
        LazyLock::force(&GAIN_MAP_MAX_RE);
        LazyLock::force(&CAPACITY_MAX_RE);
        assert_eq!(parse_capacity_max(r#"hdrgm:HDRCapacityMax="-0.5""#), Some(-0.5));
    }

    #[test]
    fn test_parse_back() {
        let xmp = gain_map_xmp(&GainMapParams::from_headroom(6.0), 10);
        assert_relative_eq!(parse_gain_map_max(&xmp).unwrap(), 6f32.log2(), epsilon = 1e-4);
        assert_relative_eq!(parse_capacity_max(&xmp).unwrap(), 6f32.log2(), epsilon = 1e-4);
        assert_eq!(parse_gain_map_max("<x/>"), None);
    }
}
