//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Invocation configuration for a single simulation run."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
//! Every field maps onto exactly one flag of `noisy_dominoes.py`. Defaults
//! reproduce the standard high-noise run; the serde names follow the flag
//! names so settings files read like the command line.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

fn default_output_directory() -> PathBuf {
    PathBuf::from("tmp_h")
}

fn default_trial_count() -> u32 {
    100
}

fn default_resolution() -> u32 {
    512
}

fn default_framerate() -> u32 {
    60
}

fn default_noise_profile() -> PathBuf {
    PathBuf::from("noise_high.json")
}

/// Parameters of one simulation launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationConfig {
    #[serde(rename = "dir", default = "default_output_directory")]
    pub output_directory: PathBuf,
    #[serde(rename = "num", default = "default_trial_count")]
    pub trial_count: u32,
    #[serde(default = "default_resolution")]
    pub height: u32,
    #[serde(default = "default_resolution")]
    pub width: u32,
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Render passes to keep, e.g. `_img`. Absent means the flag is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_passes: Option<Vec<String>>,
    #[serde(default)]
    pub save_movies: bool,
    #[serde(rename = "noise", default = "default_noise_profile")]
    pub noise_profile: PathBuf,
    #[serde(default)]
    pub spacing_jitter: f64,
    #[serde(default)]
    pub lateral_jitter: f64,
    #[serde(rename = "mrot", default)]
    pub rotation_bounds: RotationBounds,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            trial_count: default_trial_count(),
            height: default_resolution(),
            width: default_resolution(),
            framerate: default_framerate(),
            save_passes: None,
            save_movies: false,
            noise_profile: default_noise_profile(),
            spacing_jitter: 0.0,
            lateral_jitter: 0.0,
            rotation_bounds: RotationBounds::default(),
        }
    }
}

impl InvocationConfig {
    /// Check structural invariants before anything is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.output_directory.as_os_str().is_empty() {
            return Err(HarnessError::invalid("dir", "must not be empty"));
        }
        for (field, value) in [
            ("num", self.trial_count),
            ("height", self.height),
            ("width", self.width),
            ("framerate", self.framerate),
        ] {
            if value == 0 {
                return Err(HarnessError::invalid(field, "must be greater than zero"));
            }
        }
        if self.noise_profile.as_os_str().is_empty() {
            return Err(HarnessError::invalid("noise", "must not be empty"));
        }
        for (field, value) in [
            ("spacing_jitter", self.spacing_jitter),
            ("lateral_jitter", self.lateral_jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HarnessError::invalid(
                    field,
                    format!("must be a finite non-negative number, got {}", value),
                ));
            }
        }
        self.rotation_bounds.validate()?;
        if let Some(passes) = &self.save_passes {
            if passes.is_empty() {
                return Err(HarnessError::invalid(
                    "save_passes",
                    "must name at least one pass when present",
                ));
            }
            if let Some(bad) = passes.iter().find(|p| p.trim().is_empty() || p.contains(',')) {
                return Err(HarnessError::invalid(
                    "save_passes",
                    format!("invalid pass name {:?}", bad),
                ));
            }
        }
        Ok(())
    }

    /// Whether `--save_movies` will actually produce anything.
    ///
    /// The simulation drops the movie request when no passes are saved.
    pub fn movies_effective(&self) -> bool {
        self.save_movies && self.save_passes.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Inclusive rotation range for randomized initial object rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct RotationBounds {
    pub min: f64,
    pub max: f64,
}

impl RotationBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(HarnessError::invalid("mrot", "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(HarnessError::invalid(
                "mrot",
                format!("lower bound {} exceeds upper bound {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

impl From<[f64; 2]> for RotationBounds {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<RotationBounds> for [f64; 2] {
    fn from(bounds: RotationBounds) -> Self {
        [bounds.min, bounds.max]
    }
}

impl fmt::Display for RotationBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", format_bound(self.min), format_bound(self.max))
    }
}

impl FromStr for RotationBounds {
    type Err = String;

    /// Accepts `[min,max]` or `min,max`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [min, max] = parts.as_slice() else {
            return Err(format!("expected [min,max], got {:?}", s));
        };
        let parse = |part: &str| {
            part.parse::<f64>()
                .map_err(|err| format!("invalid rotation bound {:?}: {}", part, err))
        };
        Ok(Self::new(parse(*min)?, parse(*max)?))
    }
}

// Integral bounds render without a fraction, matching `[-45,45]`.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
