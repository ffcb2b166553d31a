//! hdr - HDR color pipeline and Ultra HDR container tool
//!
//! Probes media color metadata, plans display pipelines, dumps tone curves
//! and builds or inspects JPEG + gain map containers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hdr")]
#[command(author, version, about = "HDR color pipeline and Ultra HDR container tool")]
#[command(long_about = "
Color metadata detection, display pipeline planning and Ultra HDR
(JPEG + gain map) container synthesis.

Examples:
  hdr probe clip.mov                        # Detect color metadata via ffprobe
  hdr probe --json probe.json -f json       # Parse saved ffprobe output
  hdr plan desc.yaml --hdr-target           # Show branch, format and stages
  hdr plan desc.yaml -c pipeline.yaml --render
  hdr curve pq-eotf --size 4096             # Dump a curve table
  hdr hdr10 desc.yaml                       # Surface HDR10 metadata
  hdr mux base.jpg gainmap.jpg -o out.jpg --headroom 4
  hdr inspect out.jpg                       # MPF directory and XMP values
  hdr synth photo.heic -o photo_uhdr.jpg    # Full HEIC -> Ultra HDR run
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect color metadata with ffprobe
    #[command(visible_alias = "p")]
    Probe(ProbeArgs),

    /// Build a display pipeline for a color descriptor
    Plan(PlanArgs),

    /// Dump a transfer or tone curve table
    Curve(CurveArgs),

    /// Derive HDR10 surface metadata for a descriptor
    Hdr10(Hdr10Args),

    /// Mux an SDR JPEG and a gain map into an Ultra HDR container
    #[command(visible_alias = "m")]
    Mux(MuxArgs),

    /// Show the MPF directory and gain map values of a container
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Convert a HEIF/HEIC with gain map into an Ultra HDR JPEG
    Synth(SynthArgs),
}

/// Serialization used for structured output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Media file passed to ffprobe
    #[arg(required_unless_present = "json")]
    pub input: Option<PathBuf>,

    /// Read previously captured ffprobe JSON instead of running ffprobe
    #[arg(long, conflicts_with = "input")]
    pub json: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Descriptor YAML (or `hdr probe` output)
    pub descriptor: PathBuf,

    /// Pipeline config YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Treat the target surface as HDR-capable
    #[arg(long, conflicts_with = "sdr_target")]
    pub hdr_target: bool,

    /// Treat the target surface as SDR
    #[arg(long)]
    pub sdr_target: bool,

    /// The decoded source holds HDR data
    #[arg(long)]
    pub source_hdr: bool,

    /// A decoded gain map image is attached
    #[arg(long)]
    pub gain_map: bool,

    /// Display headroom (HDR peak / SDR white) for the gain map blend
    #[arg(long)]
    pub headroom: Option<f32>,

    /// ICC profile embedded in the source
    #[arg(long)]
    pub icc: Option<PathBuf>,

    /// Use built-in standard profiles instead of searching OS directories
    #[arg(long)]
    pub builtin_profiles: bool,

    /// Run the plan over a test ramp and report the output range
    #[arg(long)]
    pub render: bool,
}

/// Curves `hdr curve` can dump.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CurveKind {
    /// PQ code value -> normalized linear
    PqEotf,
    /// Normalized linear -> PQ code value
    PqOetf,
    /// Normalized linear -> HLG signal
    Hlg,
    /// ACES filmic tone map
    Aces,
}

#[derive(Args)]
pub struct CurveArgs {
    /// Curve to sample
    #[arg(value_enum)]
    pub curve: CurveKind,

    /// Number of table entries
    #[arg(short, long, default_value = "1024")]
    pub size: usize,

    /// Input scale for the ACES curve domain
    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct Hdr10Args {
    /// Descriptor YAML (or `hdr probe` output)
    pub descriptor: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct MuxArgs {
    /// Primary SDR JPEG
    pub sdr: PathBuf,

    /// Gain map JPEG
    pub gain_map: PathBuf,

    /// Output container
    #[arg(short, long)]
    pub output: PathBuf,

    /// HDR headroom as a linear ratio
    #[arg(long, default_value = "4.0")]
    pub headroom: f32,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Container files
    #[arg(required = true)]
    pub input: Vec<PathBuf>,
}

#[derive(Args)]
pub struct SynthArgs {
    /// HEIF/HEIC input
    pub input: PathBuf,

    /// Copy the finished container here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Synthesis config YAML (tool paths, defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Workspace directory (cleared on every run)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Max content boost when the source carries no hint
    #[arg(short, long)]
    pub boost: Option<f32>,

    /// Gain map gamma
    #[arg(long)]
    pub gamma: Option<f32>,

    /// Re-encode the base image losslessly
    #[arg(long)]
    pub lossless: bool,

    /// Ignore the boost hint found in the source metadata
    #[arg(long)]
    pub no_hint: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Probe(args) => commands::probe::run(args, cli.verbose),
        Commands::Plan(args) => commands::plan::run(args, cli.verbose),
        Commands::Curve(args) => commands::curve::run(args),
        Commands::Hdr10(args) => commands::hdr10::run(args),
        Commands::Mux(args) => commands::mux::run(args, cli.verbose),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Synth(args) => commands::synth::run(args, cli.verbose),
    }
}
