use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{ConvertError, Result};

/// Preset folder below the platform configuration directory.
const PRESET_SUBDIR: &str = "Toneboosters/TB Equalizer Pro_programs/User/Converted";

/// What to do when the destination preset file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Write `<stem>_new.xml` (then `_new2`, `_new3`, ...).
    #[default]
    Rename,
    Overwrite,
    /// Leave the existing file alone and do not convert.
    Skip,
}

/// Top-level configuration for a conversion batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub output_dir: Option<PathBuf>,
    pub on_conflict: ConflictPolicy,
    pub parallel: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            on_conflict: ConflictPolicy::default(),
            parallel: true,
        }
    }
}

impl ConvertConfig {
    /// Loads a TOML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| ConvertError::Config(err.to_string()))
    }

    /// Directory presets are written to: the configured one, or the TB
    /// Equalizer Pro user folder for the host.
    pub fn resolve_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_output_dir(),
        }
    }
}

/// `%APPDATA%\...` on Windows, `~/.config/...` on Linux. The macOS location is
/// not known.
pub fn default_output_dir() -> Result<PathBuf> {
    if cfg!(target_os = "macos") {
        return Err(ConvertError::UnknownPresetDir);
    }
    dirs::config_dir()
        .map(|dir| dir.join(PRESET_SUBDIR))
        .ok_or(ConvertError::UnknownPresetDir)
}
