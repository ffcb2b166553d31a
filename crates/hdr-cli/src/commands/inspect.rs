//! Container inspection (MPF directory + gain map XMP).

use crate::InspectArgs;
use anyhow::{Context, Result};
use hdr_ultra::inspect;

/// Prints the MPF directory of each container.
pub fn run(args: InspectArgs) -> Result<()> {
    for path in &args.input {
        let data = std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let info = inspect(&data).with_context(|| format!("Not an Ultra HDR container: {}", path.display()))?;

        println!("{}", path.display());
        println!("  File size:  {}", super::format_size(data.len() as u64));
        for (i, img) in info.images.iter().enumerate() {
            let role = if i == 0 { "primary" } else { "gain map" };
            println!(
                "  Image {i}:    offset {:>8}  size {:>8}  attr {:08X}  ({role})",
                img.offset, img.size, img.attribute
            );
        }
        println!("  SOI check:  {}", if info.images_valid { "ok" } else { "FAILED" });
        match info.gain_map_max {
            Some(stops) => println!("  GainMapMax: {stops:.4} stops (x{:.3})", stops.exp2()),
            None => println!("  GainMapMax: missing"),
        }
        if let Some(cap) = info.hdr_capacity_max {
            println!("  Capacity:   {cap:.4} stops");
        }

        if args.input.len() > 1 {
            println!();
        }
    }
    Ok(())
}
