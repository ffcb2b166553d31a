//! Manual Ultra HDR muxing.

use crate::MuxArgs;
use anyhow::{Context, Result};
use hdr_ultra::mux_files;

/// Splices the gain map into the SDR JPEG and writes the container.
pub fn run(args: MuxArgs, verbose: bool) -> Result<()> {
    let layout = mux_files(&args.sdr, &args.gain_map, &args.output, args.headroom).with_context(|| {
        format!(
            "Failed to mux {} + {}",
            args.sdr.display(),
            args.gain_map.display()
        )
    })?;

    println!(
        "{} ({})",
        args.output.display(),
        super::format_size(layout.total_len() as u64)
    );
    if verbose {
        println!("  Insertion point: {}", layout.insertion_point);
        println!("  XMP segment:     {} bytes", layout.xmp_segment_len);
        println!("  TIFF header:     {}", layout.tiff_header_offset);
        println!("  Primary size:    {}", layout.primary_size);
        println!("  Gain map offset: {} (relative)", layout.offset_to_second);
        println!("  Gain map size:   {}", layout.secondary_size);
    }
    Ok(())
}
