//! External tool invocation.
//!
//! Synthesis drives command-line tools one at a time. [`ToolRunner`] is the
//! seam: [`ProcessRunner`] spawns real processes, tests script the outputs.

use crate::{SynthesisError, SynthesisResult};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// The tools synthesis can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// libheif decoder.
    HeifDec,
    /// ExifTool metadata dumper.
    ExifTool,
    /// FFmpeg.
    Ffmpeg,
    /// libultrahdr sample app, the packager.
    UltraHdrApp,
}

impl Tool {
    /// Executable base name.
    pub fn name(self) -> &'static str {
        match self {
            Self::HeifDec => "heif-dec",
            Self::ExifTool => "exiftool",
            Self::Ffmpeg => "ffmpeg",
            Self::UltraHdrApp => "ultrahdr_app",
        }
    }
}

/// Where each tool lives. Bare names are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// `heif-dec`.
    pub heif_dec: PathBuf,
    /// `exiftool`.
    pub exiftool: PathBuf,
    /// `ffmpeg`.
    pub ffmpeg: PathBuf,
    /// `ultrahdr_app`.
    pub ultrahdr_app: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            heif_dec: Tool::HeifDec.name().into(),
            exiftool: Tool::ExifTool.name().into(),
            ffmpeg: Tool::Ffmpeg.name().into(),
            ultrahdr_app: Tool::UltraHdrApp.name().into(),
        }
    }
}

impl ToolPaths {
    /// Configured path of `tool`.
    pub fn get(&self, tool: Tool) -> &Path {
        match tool {
            Tool::HeifDec => &self.heif_dec,
            Tool::ExifTool => &self.exiftool,
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::UltraHdrApp => &self.ultrahdr_app,
        }
    }
}

/// One process call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Which tool.
    pub tool: Tool,
    /// Executable path.
    pub program: PathBuf,
    /// Arguments.
    pub args: Vec<OsString>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
}

impl ToolInvocation {
    /// Invocation of `tool` at `program` without arguments.
    pub fn new(tool: Tool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` if killed by a signal.
    pub status: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl ToolOutput {
    /// Exit code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turns a non-zero exit into [`SynthesisError::ToolExecutionFailed`].
    pub fn check(self, tool: Tool) -> SynthesisResult<Self> {
        if self.success() {
            return Ok(self);
        }
        Err(SynthesisError::ToolExecutionFailed {
            tool: tool.name(),
            code: self.status,
            message: self.stderr.trim().to_string(),
        })
    }
}

/// Runs a process to completion.
pub trait ToolRunner {
    /// Spawns, waits and captures. A tool that cannot be started is
    /// [`SynthesisError::ToolMissing`]; a non-zero exit is not an error here.
    fn run(&self, invocation: &ToolInvocation) -> SynthesisResult<ToolOutput>;
}

/// [`ToolRunner`] over `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, inv: &ToolInvocation) -> SynthesisResult<ToolOutput> {
        debug!(cmd = %inv.display(), "spawn");
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args);
        if let Some(dir) = &inv.cwd {
            cmd.current_dir(dir);
        }
        let out = cmd.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => SynthesisError::ToolMissing {
                tool: inv.tool.name(),
                path: inv.program.clone(),
            },
            _ => SynthesisError::Io(e),
        })?;
        Ok(ToolOutput {
            status: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
