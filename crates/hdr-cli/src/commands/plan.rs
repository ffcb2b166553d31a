//! Pipeline planning for a color descriptor.

use crate::PlanArgs;
use anyhow::{Context, Result};
use hdr_core::RgbaImage;
use hdr_pipeline::{
    BuildRequest, BuiltinProfileStore, CpuCompositor, PipelineBuilder, PipelineConfig, PipelinePlan,
    ProfileStore, SystemProfileStore, render,
};

const RAMP_WIDTH: u32 = 32;

/// Builds the plan and prints branch, format, stages and the decision trace.
pub fn run(args: PlanArgs, verbose: bool) -> Result<()> {
    let mut desc = super::load_descriptor(&args.descriptor)?;
    if let Some(icc) = &args.icc {
        let bytes = std::fs::read(icc).with_context(|| format!("Failed to read: {}", icc.display()))?;
        desc.embedded_icc = Some(bytes);
    }

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let store: Box<dyn ProfileStore> = if args.builtin_profiles {
        Box::new(BuiltinProfileStore)
    } else {
        Box::new(SystemProfileStore::new(&config.profile_dirs))
    };

    let target_hdr = match (args.hdr_target, args.sdr_target) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let request = BuildRequest {
        source_hdr: args.source_hdr,
        target_hdr,
        gain_map_attached: args.gain_map,
        display_headroom: args.headroom,
        ..BuildRequest::new(&desc)
    };
    let plan = PipelineBuilder::new(&config, store.as_ref()).build(&request);

    print_plan(&plan, verbose);
    if args.render {
        render_ramp(&plan, args.gain_map);
    }
    Ok(())
}

fn print_plan(plan: &PipelinePlan, verbose: bool) {
    println!("Branch:     {}", plan.branch.label());
    println!("Format:     {}", plan.format);
    println!("HDR target: {}", plan.target_hdr);
    if plan.is_passthrough() {
        println!("Stages:     none (passthrough)");
    } else {
        println!("Stages:");
        for (i, stage) in plan.stages.iter().enumerate() {
            println!("  {}. {}", i + 1, stage.describe());
        }
    }
    if verbose || !plan.is_passthrough() {
        println!("Trace:");
        for line in &plan.trace {
            println!("  {line}");
        }
    }
}

/// Runs the plan over a horizontal grey ramp and prints the output range.
fn render_ramp(plan: &PipelinePlan, with_gain_map: bool) {
    let mut source = RgbaImage::new(RAMP_WIDTH, 1);
    for x in 0..RAMP_WIDTH {
        let v = x as f32 / (RAMP_WIDTH - 1) as f32;
        source.set_pixel(x, 0, [v, v, v, 1.0]);
    }
    let gain_map = with_gain_map.then(|| RgbaImage::filled(RAMP_WIDTH, 1, [1.0, 1.0, 1.0, 1.0]));

    let out = render(&CpuCompositor::new(), plan, &source, gain_map.as_ref());
    if let Some(err) = &out.error {
        println!("Render:     failed ({err}), showing source");
    }
    let (lo, hi) = out
        .image
        .data()
        .chunks_exact(4)
        .flat_map(|px| px[..3].iter().copied())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    println!("Render:     ramp 0..1 -> {lo:.4}..{hi:.4}");
}
