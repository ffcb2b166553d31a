//! Source and target profile resolution.
//!
//! Source priority, first hit wins:
//!
//! 1. Standard profile for the descriptor's primaries (known primaries only,
//!    and only if the store can supply it)
//! 2. Configured source profile path
//! 3. ICC bytes embedded in the image
//! 4. sRGB
//!
//! Target: configured target path, else sRGB.
//!
//! A profile counts only if lcms2 can load it. A miss or an unreadable
//! profile in any tier is logged as [`PipelineError::ProfileNotFound`] and
//! resolution moves on; it never fails.

use crate::{PipelineConfig, PipelineError, PipelineResult};
use hdr_core::ColorDescriptor;
use hdr_icc::{Profile, StandardProfile};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A profile the CMS stage can load.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorProfile {
    /// A named standard profile, optionally backed by a file on disk.
    Standard {
        /// Which standard.
        kind: StandardProfile,
        /// File the profile was found at; `None` means build it in memory.
        path: Option<PathBuf>,
    },
    /// An arbitrary profile file.
    File(PathBuf),
    /// Raw ICC bytes from the image container.
    Embedded(Vec<u8>),
}

impl ColorProfile {
    /// The in-memory sRGB profile.
    pub fn srgb() -> Self {
        Self::Standard {
            kind: StandardProfile::Srgb,
            path: None,
        }
    }

    /// Loads the profile through lcms2.
    pub fn load(&self) -> PipelineResult<Profile> {
        let profile = match self {
            Self::Standard { path: Some(p), .. } | Self::File(p) => Profile::from_file(p)?,
            Self::Standard { kind, path: None } => kind.to_profile()?,
            Self::Embedded(bytes) => Profile::from_icc(bytes)?,
        };
        Ok(profile)
    }

    /// Short label for traces.
    pub fn label(&self) -> String {
        match self {
            Self::Standard { kind, path: Some(p) } => format!("{} ({})", kind.name(), p.display()),
            Self::Standard { kind, path: None } => format!("{} (built-in)", kind.name()),
            Self::File(p) => p.display().to_string(),
            Self::Embedded(b) => format!("embedded ICC ({} bytes)", b.len()),
        }
    }
}

/// Where standard profiles come from.
pub trait ProfileStore {
    /// Returns the standard profile if this store can supply it.
    fn locate(&self, kind: StandardProfile) -> Option<ColorProfile>;
}

/// Always supplies standard profiles, built in memory by lcms2.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinProfileStore;

impl ProfileStore for BuiltinProfileStore {
    fn locate(&self, kind: StandardProfile) -> Option<ColorProfile> {
        Some(ColorProfile::Standard { kind, path: None })
    }
}

/// Looks for standard profile files in OS color directories.
///
/// sRGB is always available (built in) when not found on disk, matching
/// the universal fallback; other standards must exist as files.
#[derive(Debug, Clone)]
pub struct SystemProfileStore {
    dirs: Vec<PathBuf>,
}

impl SystemProfileStore {
    /// Store searching `extra` first, then the platform directories.
    pub fn new(extra: &[PathBuf]) -> Self {
        let mut dirs = extra.to_vec();
        dirs.extend(platform_profile_dirs());
        Self { dirs }
    }

    /// Store searching only the given directories.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Directories searched, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn find_file(&self, kind: StandardProfile) -> Option<PathBuf> {
        self.dirs
            .iter()
            .flat_map(|d| kind.file_names().iter().map(move |n| d.join(n)))
            .find(|p| p.is_file())
    }
}

impl ProfileStore for SystemProfileStore {
    fn locate(&self, kind: StandardProfile) -> Option<ColorProfile> {
        match self.find_file(kind) {
            Some(path) => Some(ColorProfile::Standard {
                kind,
                path: Some(path),
            }),
            None if kind == StandardProfile::Srgb => Some(ColorProfile::srgb()),
            None => None,
        }
    }
}

fn platform_profile_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if cfg!(target_os = "windows") {
        let root = std::env::var_os("SystemRoot").unwrap_or_else(|| "C:\\Windows".into());
        dirs.push(Path::new(&root).join("System32").join("spool").join("drivers").join("color"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/ColorSync/Profiles"));
        dirs.push(PathBuf::from("/System/Library/ColorSync/Profiles"));
    } else {
        dirs.push(PathBuf::from("/usr/share/color/icc"));
        dirs.push(PathBuf::from("/usr/local/share/color/icc"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(Path::new(&home).join(".local/share/icc"));
        }
    }
    dirs
}

/// Which tier produced a resolved profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTier {
    /// Standard profile for the descriptor's primaries.
    Primaries,
    /// Configured path.
    Configured,
    /// Embedded ICC bytes.
    Embedded,
    /// sRGB fallback.
    Fallback,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    /// The chosen profile.
    pub profile: ColorProfile,
    /// The tier that produced it.
    pub tier: ProfileTier,
}

/// Resolves source and target profiles against a store.
pub struct ProfileResolver<'a, S: ProfileStore + ?Sized> {
    store: &'a S,
    config: &'a PipelineConfig,
}

impl<'a, S: ProfileStore + ?Sized> ProfileResolver<'a, S> {
    /// Creates a resolver.
    pub fn new(store: &'a S, config: &'a PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Resolves the source profile for `desc`.
    pub fn resolve_source(&self, desc: &ColorDescriptor) -> ResolvedProfile {
        if let Some(kind) = StandardProfile::for_primaries(desc.primaries) {
            match self.store.locate(kind) {
                Some(profile) => {
                    if let Some(resolved) = usable(profile, ProfileTier::Primaries) {
                        debug!(profile = %resolved.profile.label(), "source profile from primaries");
                        return resolved;
                    }
                }
                None => miss(PipelineError::ProfileNotFound(kind.name().into())),
            }
        }

        if let Some(path) = &self.config.source_profile {
            if let Some(resolved) = usable(ColorProfile::File(path.clone()), ProfileTier::Configured) {
                return resolved;
            }
        }

        if let Some(bytes) = &desc.embedded_icc {
            if let Some(resolved) = usable(ColorProfile::Embedded(bytes.clone()), ProfileTier::Embedded) {
                return resolved;
            }
        }

        ResolvedProfile {
            profile: ColorProfile::srgb(),
            tier: ProfileTier::Fallback,
        }
    }

    /// Resolves the target profile.
    pub fn resolve_target(&self) -> ResolvedProfile {
        self.config
            .target_profile
            .as_ref()
            .and_then(|path| usable(ColorProfile::File(path.clone()), ProfileTier::Configured))
            .unwrap_or(ResolvedProfile {
                profile: ColorProfile::srgb(),
                tier: ProfileTier::Fallback,
            })
    }
}

/// Keeps `profile` only if lcms2 can load it.
fn usable(profile: ColorProfile, tier: ProfileTier) -> Option<ResolvedProfile> {
    match profile.load() {
        Ok(_) => Some(ResolvedProfile { profile, tier }),
        Err(e) => {
            miss(PipelineError::ProfileNotFound(format!("{}: {e}", profile.label())));
            None
        }
    }
}

fn miss(err: PipelineError) {
    warn!(%err, "falling back to next profile tier");
}
