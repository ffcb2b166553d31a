//! CLI command implementations

pub mod curve;
pub mod hdr10;
pub mod inspect;
pub mod mux;
pub mod plan;
pub mod probe;
pub mod synth;

use crate::OutputFormat;
use anyhow::{Context, Result};
use hdr_core::ColorDescriptor;
use serde::Serialize;
use std::path::Path;

/// Loads a descriptor from YAML or JSON.
///
/// Accepts a bare descriptor or `hdr probe` output, which nests it under
/// a `descriptor` key.
pub fn load_descriptor(path: &Path) -> Result<ColorDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    parse_descriptor(&text).with_context(|| format!("Invalid descriptor: {}", path.display()))
}

fn parse_descriptor(text: &str) -> Result<ColorDescriptor> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if let Some(inner) = value.get("descriptor") {
        value = inner.clone();
    }
    Ok(serde_yaml::from_value(value)?)
}

/// Prints `value` to stdout in the requested format.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    };
    print!("{text}");
    Ok(())
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
