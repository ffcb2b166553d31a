//! Gain-map container synthesis.
//!
//! Turns a HEIF/HEIC with an auxiliary gain map into an Ultra HDR JPEG by
//! driving external tools in a fixed sequence. Each step's output files feed
//! the next, so steps never overlap:
//!
//! 1. **Extract** - `heif-dec` writes the base JPEG and auxiliary images;
//!    one auxiliary is picked as the gain map.
//! 2. **Analyze** - `exiftool` dump, scanned for a max-boost hint.
//!    Failures here are logged and ignored.
//! 3. **Prepare base** - optional lossless re-encode through Y4M; non-JPEG
//!    gain maps are converted with `ffmpeg`.
//! 4. **Config** - `metadata.cfg` for the packager.
//! 5. **Package** - `ultrahdr_app`; if it is missing or fails, the manual
//!    muxer builds the container from the same two JPEGs.
//!
//! The workspace directory is cleared at the start of every run, so runs
//! sharing a workspace must not overlap.

use crate::cfg::MetadataCfg;
use crate::muxer;
use crate::tools::{Tool, ToolInvocation, ToolOutput, ToolPaths, ToolRunner};
use crate::{SynthesisError, SynthesisResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extracted base image name.
pub const BASE_JPEG: &str = "base-s.jpg";
/// Prefix heif-dec gives auxiliary images of [`BASE_JPEG`].
pub const AUX_PREFIX: &str = "base-s-";
/// Metadata dump.
pub const METADATA_DUMP: &str = "meta_all.txt";
/// Lossless intermediate.
pub const LOSSLESS_Y4M: &str = "base_lossless.y4m";
/// Lossless base re-encode.
pub const LOSSLESS_JPEG: &str = "base-lossless.jpg";
/// Converted gain map.
pub const GAIN_MAP_JPEG: &str = "gainmap_final.jpg";
/// Packager config.
pub const METADATA_CFG: &str = "metadata.cfg";
/// Final container.
pub const OUTPUT_JPEG: &str = "out_uhdr.jpg";

const GAIN_MAP_NAME_HINTS: &[&str] = &["gainmap", "aux", "-1"];

/// Synthesis settings.
///
/// ```yaml
/// workspace: /tmp/uhdr
/// max_content_boost: 4.0
/// gamma: 1.0
/// lossless: true
/// tools:
///   ultrahdr_app: /opt/libultrahdr/bin/ultrahdr_app
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Tool locations.
    pub tools: ToolPaths,
    /// Scratch directory; cleared on every run.
    pub workspace: PathBuf,
    /// Linear peak boost, used when no hint is found.
    pub max_content_boost: f32,
    /// Gain-map gamma.
    pub gamma: f32,
    /// Re-encode the base through an uncompressed intermediate.
    pub lossless: bool,
    /// Let a boost found in the source metadata override `max_content_boost`.
    pub use_boost_hint: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            workspace: PathBuf::from("UltraHdr_Workspace"),
            max_content_boost: 4.0,
            gamma: 1.0,
            lossless: false,
            use_boost_hint: true,
        }
    }
}

impl SynthesisConfig {
    /// Loads a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> SynthesisResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SynthesisError::ConfigNotFound(path.to_path_buf()));
        }
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Parses YAML.
    pub fn from_yaml_str(yaml: &str) -> SynthesisResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Which path produced the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Packager {
    /// The external packaging tool.
    UltraHdrApp,
    /// The built-in MPF muxer.
    ManualMuxer,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisReport {
    /// Finished container.
    pub output: PathBuf,
    /// Base JPEG that was packaged.
    pub base: PathBuf,
    /// Gain-map JPEG that was packaged.
    pub gain_map: PathBuf,
    /// Boost written to the config (after hint and floor).
    pub max_content_boost: f32,
    /// Boost hint found in the metadata dump.
    pub boost_hint: Option<f32>,
    /// Who built the container.
    pub packager: Packager,
    /// Step log.
    pub log: Vec<String>,
}

/// Picks the gain map among auxiliary image paths.
///
/// First name (case-insensitive) containing `gainmap`, `aux` or `-1` wins.
pub fn classify_gain_map(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .is_some_and(|n| GAIN_MAP_NAME_HINTS.iter().any(|h| n.contains(h)))
    })
}

/// Scans an `exiftool -a -G1 -s` dump for a max boost.
///
/// Lines mentioning `GainMapMax` or `HDRCapacityMax` with a positive value
/// yield `max(1, value)`; the last one wins.
pub fn parse_boost_hint(dump: &str) -> Option<f32> {
    dump.lines()
        .filter(|l| l.contains("GainMapMax") || l.contains("HDRCapacityMax"))
        .filter_map(|l| l.split_once(':'))
        .filter_map(|(_, v)| v.trim().parse::<f32>().ok())
        .filter(|v| *v > 0.0 && v.is_finite())
        .map(|v| v.max(1.0))
        .last()
}

/// Best-effort removal of the files in `dir`.
fn clear_workspace(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            let _ = std::fs::remove_file(&path);
        }
    }
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg"))
}

/// Runs synthesis with a [`ToolRunner`].
pub struct GainMapSynthesizer<'a, R: ToolRunner + ?Sized> {
    config: &'a SynthesisConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner + ?Sized> GainMapSynthesizer<'a, R> {
    /// Creates a synthesizer.
    pub fn new(config: &'a SynthesisConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    fn ws(&self, name: &str) -> PathBuf {
        self.config.workspace.join(name)
    }

    fn invocation(&self, tool: Tool) -> ToolInvocation {
        ToolInvocation::new(tool, self.config.tools.get(tool)).current_dir(&self.config.workspace)
    }

    fn run_checked(&self, inv: ToolInvocation) -> SynthesisResult<ToolOutput> {
        self.runner.run(&inv)?.check(inv.tool)
    }

    fn require(tool: Tool, path: &Path) -> SynthesisResult<()> {
        if path.is_file() {
            return Ok(());
        }
        Err(SynthesisError::ToolExecutionFailed {
            tool: tool.name(),
            code: Some(0),
            message: format!("expected output {} was not written", path.display()),
        })
    }

    /// Synthesizes a container from `input`.
    pub fn run(&self, input: &Path) -> SynthesisResult<SynthesisReport> {
        if !input.is_file() {
            return Err(SynthesisError::InputNotFound(input.to_path_buf()));
        }
        let mut log = Vec::new();

        std::fs::create_dir_all(&self.config.workspace)?;
        clear_workspace(&self.config.workspace);
        log.push(format!("[Setup] Workspace: {}", self.config.workspace.display()));

        let (base, aux) = self.extract(input, &mut log)?;
        let boost_hint = self.analyze(input, &mut log);
        let base = self.prepare_base(input, base, &mut log)?;
        let gain_map = self.prepare_gain_map(aux, &mut log)?;

        let boost = match boost_hint {
            Some(h) if self.config.use_boost_hint => h,
            _ => self.config.max_content_boost,
        };
        let cfg = MetadataCfg::new(boost, self.config.gamma);
        let cfg_path = self.ws(METADATA_CFG);
        cfg.write(&cfg_path)?;
        log.push(format!(
            "[Config] maxContentBoost {:.6}, gamma {:.6}",
            cfg.effective_boost(),
            cfg.gamma
        ));

        let output = self.ws(OUTPUT_JPEG);
        let packager = self.package(&base, &gain_map, &cfg_path, &output, cfg.effective_boost(), &mut log)?;
        info!(output = %output.display(), ?packager, "synthesis complete");

        Ok(SynthesisReport {
            output,
            base,
            gain_map,
            max_content_boost: cfg.effective_boost(),
            boost_hint,
            packager,
            log,
        })
    }

    fn extract(&self, input: &Path, log: &mut Vec<String>) -> SynthesisResult<(PathBuf, PathBuf)> {
        let base = self.ws(BASE_JPEG);
        info!(input = %input.display(), "extracting");
        self.run_checked(
            self.invocation(Tool::HeifDec)
                .args(["--with-aux", "--with-exif", "--with-xmp", "--skip-exif-offset", "--no-colons"])
                .arg(input)
                .arg(&base),
        )?;
        Self::require(Tool::HeifDec, &base)?;

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&self.config.workspace)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(AUX_PREFIX))
            })
            .collect();
        candidates.sort();

        let aux = classify_gain_map(&candidates)
            .cloned()
            .ok_or_else(|| SynthesisError::NoGainMapFound {
                dir: self.config.workspace.clone(),
                count: candidates.len(),
            })?;
        log.push(format!("[Extract] Base {}, gain map {}", base.display(), aux.display()));
        Ok((base, aux))
    }

    fn analyze(&self, input: &Path, log: &mut Vec<String>) -> Option<f32> {
        let inv = self.invocation(Tool::ExifTool).args(["-a", "-G1", "-s"]).arg(input);
        let dump = match self.runner.run(&inv).and_then(|o| o.check(Tool::ExifTool)) {
            Ok(out) => out.stdout,
            Err(e) => {
                warn!(%e, "metadata analysis skipped");
                log.push(format!("[Analyze] Skipped: {e}"));
                return None;
            }
        };
        if let Err(e) = std::fs::write(self.ws(METADATA_DUMP), &dump) {
            warn!(%e, "could not save metadata dump");
        }
        let hint = parse_boost_hint(&dump);
        match hint {
            Some(h) => log.push(format!("[Analyze] Max boost hint: {h:.2}")),
            None => log.push("[Analyze] No boost hint, keeping defaults".into()),
        }
        hint
    }

    fn prepare_base(&self, input: &Path, base: PathBuf, log: &mut Vec<String>) -> SynthesisResult<PathBuf> {
        if !self.config.lossless {
            return Ok(base);
        }
        let y4m = self.ws(LOSSLESS_Y4M);
        let jpeg = self.ws(LOSSLESS_JPEG);
        self.run_checked(self.invocation(Tool::HeifDec).arg(input).arg(&y4m))?;
        Self::require(Tool::HeifDec, &y4m)?;
        self.run_checked(
            self.invocation(Tool::Ffmpeg)
                .arg("-i")
                .arg(&y4m)
                .args(["-q:v", "1", "-pix_fmt", "yuvj444p"])
                .arg(&jpeg)
                .arg("-y"),
        )?;
        Self::require(Tool::Ffmpeg, &jpeg)?;
        log.push(format!("[Base] Lossless path via {}", y4m.display()));
        Ok(jpeg)
    }

    fn prepare_gain_map(&self, aux: PathBuf, log: &mut Vec<String>) -> SynthesisResult<PathBuf> {
        if is_jpeg_path(&aux) {
            return Ok(aux);
        }
        let out = self.ws(GAIN_MAP_JPEG);
        self.run_checked(
            self.invocation(Tool::Ffmpeg)
                .arg("-i")
                .arg(&aux)
                .args(["-q:v", "1"])
                .arg(&out)
                .arg("-y"),
        )?;
        Self::require(Tool::Ffmpeg, &out)?;
        log.push(format!("[GainMap] Converted {} to JPEG", aux.display()));
        Ok(out)
    }

    fn package(
        &self,
        base: &Path,
        gain_map: &Path,
        cfg: &Path,
        output: &Path,
        headroom: f32,
        log: &mut Vec<String>,
    ) -> SynthesisResult<Packager> {
        let inv = self
            .invocation(Tool::UltraHdrApp)
            .args(["-m", "0", "-i"])
            .arg(base)
            .arg("-g")
            .arg(gain_map)
            .arg("-f")
            .arg(cfg)
            .arg("-z")
            .arg(output);

        let failure = match self.runner.run(&inv).and_then(|o| o.check(Tool::UltraHdrApp)) {
            Ok(_) if output.is_file() => {
                log.push("[Package] ultrahdr_app succeeded".into());
                return Ok(Packager::UltraHdrApp);
            }
            Ok(_) => "no output written".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(reason = %failure, "packager failed, using manual muxer");
        log.push(format!("[Package] ultrahdr_app failed ({failure}), manual MPF mux"));
        let _ = std::fs::remove_file(output);
        let layout = muxer::mux_files(base, gain_map, output, headroom)?;
        log.push(format!(
            "[Package] Muxed {} bytes (primary {}, gain map {})",
            layout.total_len(),
            layout.primary_size,
            layout.secondary_size
        ));
        Ok(Packager::ManualMuxer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let names: Vec<PathBuf> = ["base-s-depth.png", "base-s-urn_com_apple_photo_2020_aux_hdrgainmap.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(classify_gain_map(&names), Some(&names[1]));
        let names = vec![PathBuf::from("base-s-1.jpg")];
        assert_eq!(classify_gain_map(&names), Some(&names[0]));
        assert_eq!(classify_gain_map(&[PathBuf::from("base-s-depth.png")]), None);
    }

    #[test]
    fn test_boost_hint() {
        let dump = "[XMP-hdrgm]     Version                         : 1.0\n\
                    [XMP-hdrgm]     GainMapMax                      : 2.3\n\
                    [XMP-hdrgm]     HDRCapacityMax                  : 0.5\n";
        assert_eq!(parse_boost_hint(dump), Some(1.0));
        assert_eq!(parse_boost_hint("[XMP-hdrgm] GainMapMax : 3.5"), Some(3.5));
        assert_eq!(parse_boost_hint("[XMP-hdrgm] GainMapMax : -1"), None);
        assert_eq!(parse_boost_hint("nothing here"), None);
    }

    #[test]
    fn test_config_yaml() {
        let cfg = SynthesisConfig::from_yaml_str("lossless: true\ntools:\n  ffmpeg: /opt/ff/ffmpeg\n").unwrap();
        assert!(cfg.lossless);
        assert_eq!(cfg.tools.ffmpeg, PathBuf::from("/opt/ff/ffmpeg"));
        assert_eq!(cfg.tools.heif_dec, PathBuf::from("heif-dec"));
        assert_eq!(cfg.max_content_boost, 4.0);
        assert!(matches!(
            SynthesisConfig::from_file("/nonexistent/synth.yaml"),
            Err(SynthesisError::ConfigNotFound(_))
        ));
    }
}
