//! HEIF/HEIC to Ultra HDR synthesis.

use crate::SynthArgs;
use anyhow::{Context, Result};
use hdr_ultra::{GainMapSynthesizer, Packager, ProcessRunner, SynthesisConfig};

/// Runs the full synthesis with real tools.
pub fn run(args: SynthArgs, verbose: bool) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SynthesisConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SynthesisConfig::default(),
    };
    if let Some(dir) = args.workspace {
        config.workspace = dir;
    }
    if let Some(boost) = args.boost {
        config.max_content_boost = boost;
    }
    if let Some(gamma) = args.gamma {
        config.gamma = gamma;
    }
    config.lossless |= args.lossless;
    if args.no_hint {
        config.use_boost_hint = false;
    }

    let report = GainMapSynthesizer::new(&config, &ProcessRunner)
        .run(&args.input)
        .with_context(|| format!("Synthesis failed for {}", args.input.display()))?;

    if verbose {
        for line in &report.log {
            eprintln!("  {line}");
        }
    }

    let output = match &args.output {
        Some(dest) => {
            std::fs::copy(&report.output, dest)
                .with_context(|| format!("Failed to copy to {}", dest.display()))?;
            dest.clone()
        }
        None => report.output.clone(),
    };
    let packager = match report.packager {
        Packager::UltraHdrApp => "ultrahdr_app",
        Packager::ManualMuxer => "built-in muxer",
    };
    println!("{}", output.display());
    println!("  Boost:    x{:.3}", report.max_content_boost);
    if let Some(hint) = report.boost_hint {
        println!("  Hint:     x{hint:.3} (from source metadata)");
    }
    println!("  Packager: {packager}");
    Ok(())
}
