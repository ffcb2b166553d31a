//! HDR10 surface metadata.

use crate::Hdr10Args;
use anyhow::Result;
use hdr_pipeline::Hdr10Metadata;

/// Prints the HDR10 block a presentation surface would receive.
pub fn run(args: Hdr10Args) -> Result<()> {
    let desc = super::load_descriptor(&args.descriptor)?;
    let metadata = Hdr10Metadata::from_descriptor(&desc);
    super::print_structured(&metadata, args.format)
}
