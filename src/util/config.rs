//! Configuration file support for ccprobe.
//!
//! ccprobe reads two configuration files:
//! - Global: `~/.ccprobe/config.toml` - User-wide defaults
//! - Project: `.ccprobe/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. The `CCPROBE_TMPDIR`
//! and `CCPROBE_EXE_DIR` environment variables take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::HostEnv;
use crate::probe::ProbeSettings;

/// Overrides the directory for generated probe sources.
pub const TMPDIR_VAR: &str = "CCPROBE_TMPDIR";

/// Overrides the root directory for run-check executables.
pub const EXE_DIR_VAR: &str = "CCPROBE_EXE_DIR";

/// ccprobe configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe settings
    pub probe: ProbeConfig,
}

/// The `[probe]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Directory for generated sources and object files
    pub work_dir: Option<PathBuf>,

    /// Root directory for run-check executables
    pub exe_dir: Option<PathBuf>,

    /// Show toolchain output while probing
    pub verbose: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.probe.work_dir.is_some() {
            self.probe.work_dir = other.probe.work_dir;
        }
        if other.probe.exe_dir.is_some() {
            self.probe.exe_dir = other.probe.exe_dir;
        }
        if other.probe.verbose.is_some() {
            self.probe.verbose = other.probe.verbose;
        }
    }

    /// Resolve into probe settings, applying environment overrides.
    ///
    /// Unset directories fall back to the system temp dir.
    pub fn to_settings(&self, env: &dyn HostEnv) -> ProbeSettings {
        let defaults = ProbeSettings::default();

        let work_dir = env
            .string_env(TMPDIR_VAR)
            .map(PathBuf::from)
            .or_else(|| self.probe.work_dir.clone())
            .unwrap_or(defaults.work_dir);
        let exe_dir = env
            .string_env(EXE_DIR_VAR)
            .map(PathBuf::from)
            .or_else(|| self.probe.exe_dir.clone())
            .unwrap_or(defaults.exe_dir);

        ProbeSettings {
            work_dir,
            exe_dir,
            verbose: self.probe.verbose.unwrap_or(defaults.verbose),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ccprobe/config.toml)
/// 2. Global config (~/.ccprobe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global ccprobe config directory (~/.ccprobe).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ccprobe"))
}

/// Get the global config path (~/.ccprobe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.ccprobe/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".ccprobe").join("config.toml")
}
