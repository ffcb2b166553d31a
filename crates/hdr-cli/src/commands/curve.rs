//! Curve table dump.
//!
//! One `input output` pair per line, suitable for plotting or for loading
//! as a 1D LUT.

use crate::{CurveArgs, CurveKind};
use anyhow::{Context, Result, bail};
use hdr_transfer::table;
use std::fmt::Write as _;

/// Samples the chosen curve and writes the table.
pub fn run(args: CurveArgs) -> Result<()> {
    if args.size < 2 {
        bail!("Table size must be at least 2, got {}", args.size);
    }
    let values = sample(args.curve, args.size, args.scale);
    if !table::is_monotonic(&values) {
        tracing::warn!(curve = ?args.curve, "table is not monotonic");
    }

    let text = format_table(&values);
    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write: {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn sample(curve: CurveKind, size: usize, scale: f32) -> Vec<f32> {
    match curve {
        CurveKind::PqEotf => table::pq_eotf_table(size),
        CurveKind::PqOetf => table::linear_to_pq_table(size),
        CurveKind::Hlg => table::linear_to_hlg_table(size),
        CurveKind::Aces => table::aces_tonemap_table(size, scale),
    }
}

fn format_table(values: &[f32]) -> String {
    let last = (values.len().max(2) - 1) as f32;
    let mut out = String::with_capacity(values.len() * 20);
    for (i, v) in values.iter().enumerate() {
        let _ = writeln!(out, "{:.6} {:.6}", i as f32 / last, v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table() {
        let text = format_table(&sample(CurveKind::PqEotf, 3, 1.0));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0.000000 0.000000");
        assert!(lines[2].starts_with("1.000000 1.0000"));
    }

    #[test]
    fn test_aces_scale() {
        let plain = sample(CurveKind::Aces, 16, 1.0);
        let stretched = sample(CurveKind::Aces, 16, 8.0);
        assert!(stretched[15] > plain[15]);
    }
}
