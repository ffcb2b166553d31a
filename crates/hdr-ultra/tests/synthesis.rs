//! Orchestration against a scripted tool runner.

use hdr_ultra::{
    GainMapSynthesizer, Packager, SynthesisConfig, SynthesisError, SynthesisResult, Tool,
    ToolInvocation, ToolOutput, ToolRunner, inspect,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

const TINY_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x00, 0xFF, 0xD9];

/// Fakes each tool by writing the files it would produce.
struct ScriptedRunner {
    calls: RefCell<Vec<ToolInvocation>>,
    aux_name: &'static str,
    packager_present: bool,
    exif_dump: &'static str,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            aux_name: "base-s-urn_com_apple_photo_2020_aux_hdrgainmap.jpg",
            packager_present: true,
            exif_dump: "[XMP-hdrgm]     GainMapMax                      : 3.0\n",
        }
    }

    fn tools_called(&self) -> Vec<Tool> {
        self.calls.borrow().iter().map(|c| c.tool).collect()
    }
}

fn ok(stdout: &str) -> SynthesisResult<ToolOutput> {
    Ok(ToolOutput {
        status: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    })
}

fn last_path(inv: &ToolInvocation) -> PathBuf {
    inv.args
        .iter()
        .rev()
        .find(|a| a.to_string_lossy() != "-y")
        .map(PathBuf::from)
        .unwrap_or_default()
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, inv: &ToolInvocation) -> SynthesisResult<ToolOutput> {
        self.calls.borrow_mut().push(inv.clone());
        let cwd = inv.cwd.clone().unwrap_or_default();
        match inv.tool {
            Tool::HeifDec => {
                let out = last_path(inv);
                std::fs::write(&out, TINY_JPEG)?;
                if inv.args.iter().any(|a| a == "--with-aux") && !self.aux_name.is_empty() {
                    std::fs::write(cwd.join(self.aux_name), TINY_JPEG)?;
                }
                ok("")
            }
            Tool::ExifTool => ok(self.exif_dump),
            Tool::Ffmpeg => {
                std::fs::write(last_path(inv), TINY_JPEG)?;
                ok("")
            }
            Tool::UltraHdrApp if self.packager_present => {
                std::fs::write(last_path(inv), b"packaged")?;
                ok("")
            }
            Tool::UltraHdrApp => Err(SynthesisError::ToolMissing {
                tool: "ultrahdr_app",
                path: inv.program.clone(),
            }),
        }
    }
}

fn setup() -> (tempfile::TempDir, PathBuf, SynthesisConfig) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.heic");
    std::fs::write(&input, b"heic").unwrap();
    let config = SynthesisConfig {
        workspace: dir.path().join("ws"),
        ..Default::default()
    };
    (dir, input, config)
}

fn read_cfg(config: &SynthesisConfig) -> String {
    std::fs::read_to_string(config.workspace.join("metadata.cfg")).unwrap()
}

#[test]
fn packager_path() {
    let (_dir, input, config) = setup();
    let runner = ScriptedRunner::new();
    let report = GainMapSynthesizer::new(&config, &runner).run(&input).unwrap();

    assert_eq!(report.packager, Packager::UltraHdrApp);
    assert_eq!(report.boost_hint, Some(3.0));
    assert_eq!(report.max_content_boost, 3.0);
    assert_eq!(
        runner.tools_called(),
        vec![Tool::HeifDec, Tool::ExifTool, Tool::UltraHdrApp]
    );
    assert!(read_cfg(&config).starts_with("--maxContentBoost 3.000000 3.000000 3.000000\n"));
    assert!(config.workspace.join("meta_all.txt").is_file());

    let calls = runner.calls.borrow();
    let args: Vec<String> = calls[2].args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    assert_eq!(&args[..3], &["-m", "0", "-i"]);
    assert_eq!(args[4], "-g");
    assert_eq!(args[6], "-f");
    assert_eq!(args[8], "-z");
}

#[test]
fn missing_packager_falls_back_to_muxer() {
    let (_dir, input, config) = setup();
    let runner = ScriptedRunner {
        packager_present: false,
        exif_dump: "",
        ..ScriptedRunner::new()
    };
    let report = GainMapSynthesizer::new(&config, &runner).run(&input).unwrap();

    assert_eq!(report.packager, Packager::ManualMuxer);
    assert_eq!(report.boost_hint, None);
    assert_eq!(report.max_content_boost, 4.0);
    let bytes = std::fs::read(&report.output).unwrap();
    let info = inspect(&bytes).unwrap();
    assert_eq!(info.images.len(), 2);
    assert_eq!(info.gain_map_max, Some(2.0));
    assert_eq!(&bytes[info.images[1].range()], TINY_JPEG);
}

#[test]
fn no_gain_map_aborts() {
    let (_dir, input, config) = setup();
    let runner = ScriptedRunner {
        aux_name: "",
        ..ScriptedRunner::new()
    };
    let err = GainMapSynthesizer::new(&config, &runner).run(&input).unwrap_err();
    assert!(matches!(err, SynthesisError::NoGainMapFound { count: 0, .. }));
    assert_eq!(runner.tools_called(), vec![Tool::HeifDec]);
    assert!(!config.workspace.join("out_uhdr.jpg").exists());
}

#[test]
fn lossless_and_png_gain_map() {
    let (_dir, input, mut config) = setup();
    config.lossless = true;
    config.use_boost_hint = false;
    config.max_content_boost = 1.0;
    let runner = ScriptedRunner {
        aux_name: "base-s-aux-1.png",
        ..ScriptedRunner::new()
    };
    let report = GainMapSynthesizer::new(&config, &runner).run(&input).unwrap();

    assert_eq!(
        runner.tools_called(),
        vec![
            Tool::HeifDec,
            Tool::ExifTool,
            Tool::HeifDec,
            Tool::Ffmpeg,
            Tool::Ffmpeg,
            Tool::UltraHdrApp
        ]
    );
    assert!(report.base.ends_with("base-lossless.jpg"));
    assert!(report.gain_map.ends_with("gainmap_final.jpg"));
    assert!(read_cfg(&config).contains("--hdrCapacityMax 1.010000"));
}

#[test]
fn stale_workspace_files_are_cleared() {
    let (_dir, input, config) = setup();
    std::fs::create_dir_all(&config.workspace).unwrap();
    std::fs::write(config.workspace.join("base-s-old-gainmap.jpg"), b"stale").unwrap();
    let runner = ScriptedRunner {
        aux_name: "",
        ..ScriptedRunner::new()
    };
    let err = GainMapSynthesizer::new(&config, &runner).run(&input).unwrap_err();
    assert!(matches!(err, SynthesisError::NoGainMapFound { .. }));
}

#[test]
fn missing_input() {
    let (_dir, _input, config) = setup();
    let runner = ScriptedRunner::new();
    let err = GainMapSynthesizer::new(&config, &runner)
        .run(Path::new("/nonexistent/photo.heic"))
        .unwrap_err();
    assert!(matches!(err, SynthesisError::InputNotFound(_)));
    assert!(runner.tools_called().is_empty());
}
