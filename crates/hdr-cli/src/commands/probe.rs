//! Color metadata detection via ffprobe.

use crate::ProbeArgs;
use anyhow::{Context, Result, bail};
use hdr_pipeline::detect::ffprobe_args;
use hdr_pipeline::from_ffprobe_json;
use std::process::Command;
use tracing::debug;

/// Runs ffprobe (or reads its saved output) and prints the detected source.
pub fn run(args: ProbeArgs, verbose: bool) -> Result<()> {
    let (json, path) = match (&args.json, &args.input) {
        (Some(file), _) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read: {}", file.display()))?;
            (text, args.input.as_deref())
        }
        (None, Some(input)) => (run_ffprobe(&args, input)?, Some(input.as_path())),
        (None, None) => bail!("Either an input file or --json is required"),
    };

    let detected = from_ffprobe_json(&json, path).context("Failed to interpret ffprobe output")?;
    if verbose {
        eprintln!(
            "{}: {} (HDR potential: {})",
            path.map(|p| p.display().to_string()).unwrap_or_else(|| "<json>".into()),
            detected.descriptor.description,
            detected.hdr_potential
        );
    }
    super::print_structured(&detected, args.format)
}

fn run_ffprobe(args: &ProbeArgs, input: &std::path::Path) -> Result<String> {
    let probe_args = ffprobe_args(input);
    debug!(ffprobe = %args.ffprobe.display(), args = ?probe_args, "spawn");
    let out = Command::new(&args.ffprobe)
        .args(&probe_args)
        .output()
        .with_context(|| format!("Failed to run {}", args.ffprobe.display()))?;
    if !out.status.success() {
        bail!(
            "ffprobe failed on {} ({}): {}",
            input.display(),
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
