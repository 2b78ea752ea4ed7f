//! ---
//! nd_section: "01-core-functionality"
//! nd_subsection: "module"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Settings file discovery and parsing."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dominoes_harness::{InvocationConfig, LauncherConfig};
use dominoes_logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything the harness reads from its settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSettings {
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub invocation: InvocationConfig,
}

/// Settings together with the file they came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: HarnessSettings,
    pub source: Option<PathBuf>,
}

impl HarnessSettings {
    pub const ENV_CONFIG_PATH: &'static str = "NOISY_DOMINOES_CONFIG";
    pub const DEFAULT_CANDIDATES: [&'static str; 2] = ["dominoes.toml", "configs/dominoes.toml"];

    /// Load settings, honouring `NOISY_DOMINOES_CONFIG`, then the first
    /// existing candidate. Falls back to built-in defaults.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedSettings> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                return Self::load_explicit(env_path);
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                return Self::load_explicit(path);
            }
        }

        debug!(
            inspected = %candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "no settings file found; using defaults"
        );
        Ok(LoadedSettings {
            settings: HarnessSettings::default(),
            source: None,
        })
    }

    /// Load settings from a path the operator named. The file must exist.
    pub fn load_explicit(path: impl AsRef<Path>) -> Result<LoadedSettings> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(anyhow!("settings file {} does not exist", path.display()));
        }
        let settings = Self::from_path(&path)?;
        Ok(LoadedSettings {
            settings,
            source: Some(path),
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading settings");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read settings file {}", path.display()))?;
        contents
            .parse::<HarnessSettings>()
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }
}

impl std::str::FromStr for HarnessSettings {
    type Err = anyhow::Error;

    /// Parses only. Range checks run on the invocation once command-line
    /// overrides are merged in.
    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(content).with_context(|| "failed to parse settings")
    }
}
