//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Structural checks for rigid-body noise profiles."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
//! The simulation consumes the profile itself; this module only confirms the
//! file will be accepted so a long render queue does not die on its first
//! trial.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NoiseProfileError;

/// Noise applied along each axis, or one value for all three.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisNoise {
    Uniform(f64),
    PerAxis(AxisTriple),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisTriple {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

/// Rigid-body noise parameters. `None` disables noise for that parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseProfile {
    /// Gaussian sigma around object positions.
    #[serde(default)]
    pub position: Option<AxisNoise>,
    /// von Mises precision for rotation noise.
    #[serde(default)]
    pub rotation: Option<AxisNoise>,
    /// von Mises precision for initial velocity direction.
    #[serde(default)]
    pub velocity_dir: Option<AxisNoise>,
    /// Log-normal sigma around initial speed.
    #[serde(default)]
    pub velocity_mag: Option<f64>,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub static_friction: Option<f64>,
    #[serde(default)]
    pub dynamic_friction: Option<f64>,
    #[serde(default)]
    pub bounciness: Option<f64>,
    /// von Mises precision for collision force normals.
    #[serde(default)]
    pub collision_dir: Option<AxisNoise>,
    #[serde(default)]
    pub collision_mag: Option<f64>,
    /// Collisions with impulse below this are left untouched.
    #[serde(default)]
    pub coll_threshold: Option<f64>,
    /// First frame at which noise is injected.
    #[serde(default)]
    pub start_simulate: Option<u32>,
}

impl NoiseProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NoiseProfileError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let profile = Self::from_json(&raw)?;
        Ok(profile)
    }

    pub fn from_json(raw: &str) -> Result<Self, NoiseProfileError> {
        let profile: NoiseProfile = serde_json::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), NoiseProfileError> {
        let axes = [
            ("position", self.position),
            ("rotation", self.rotation),
            ("velocity_dir", self.velocity_dir),
            ("collision_dir", self.collision_dir),
        ];
        for (key, noise) in axes {
            match noise {
                Some(AxisNoise::Uniform(value)) => check_magnitude(key, value)?,
                Some(AxisNoise::PerAxis(triple)) => {
                    for value in [triple.x, triple.y, triple.z].into_iter().flatten() {
                        check_magnitude(key, value)?;
                    }
                }
                None => {}
            }
        }
        let scalars = [
            ("velocity_mag", self.velocity_mag),
            ("mass", self.mass),
            ("static_friction", self.static_friction),
            ("dynamic_friction", self.dynamic_friction),
            ("bounciness", self.bounciness),
            ("collision_mag", self.collision_mag),
            ("coll_threshold", self.coll_threshold),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                check_magnitude(key, value)?;
            }
        }
        Ok(())
    }

    /// True when no parameter injects noise.
    pub fn is_noiseless(&self) -> bool {
        *self == NoiseProfile::default()
    }
}

fn check_magnitude(key: &'static str, value: f64) -> Result<(), NoiseProfileError> {
    if !value.is_finite() {
        return Err(NoiseProfileError::Invalid {
            key,
            reason: format!("must be finite, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(NoiseProfileError::Invalid {
            key,
            reason: format!("must be non-negative, got {}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HIGH_NOISE: &str = r#"{
        "position": {"x": 0.05, "y": 0.0, "z": 0.05},
        "rotation": {"x": 10.0, "y": 10.0, "z": 10.0},
        "velocity_dir": null,
        "velocity_mag": null,
        "mass": 0.2,
        "static_friction": null,
        "dynamic_friction": null,
        "bounciness": null,
        "collision_dir": 5.0,
        "collision_mag": 0.1,
        "coll_threshold": 0.01,
        "start_simulate": 0
    }"#;

    #[test]
    fn parses_a_full_profile() {
        let profile = NoiseProfile::from_json(HIGH_NOISE).unwrap();
        assert_eq!(profile.mass, Some(0.2));
        assert_eq!(profile.collision_dir, Some(AxisNoise::Uniform(5.0)));
        assert!(matches!(profile.position, Some(AxisNoise::PerAxis(t)) if t.y == Some(0.0)));
        assert_eq!(profile.start_simulate, Some(0));
        assert!(!profile.is_noiseless());
    }

    #[test]
    fn all_null_profile_is_noiseless() {
        let profile = NoiseProfile::from_json(r#"{"mass": null, "position": null}"#).unwrap();
        assert!(profile.is_noiseless());
        assert!(NoiseProfile::from_json("{}").unwrap().is_noiseless());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = NoiseProfile::from_json(r#"{"gravity": 1.0}"#).unwrap_err();
        assert!(matches!(err, NoiseProfileError::Parse(_)));
    }

    #[test]
    fn negative_magnitudes_are_rejected() {
        let err = NoiseProfile::from_json(r#"{"rotation": {"x": -1.0}}"#).unwrap_err();
        assert!(matches!(err, NoiseProfileError::Invalid { key: "rotation", .. }));
        let err = NoiseProfile::from_json(r#"{"collision_mag": -0.5}"#).unwrap_err();
        assert!(matches!(err, NoiseProfileError::Invalid { key: "collision_mag", .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HIGH_NOISE.as_bytes()).unwrap();
        file.flush().unwrap();
        let profile = NoiseProfile::load(file.path()).unwrap();
        assert_eq!(profile.coll_threshold, Some(0.01));
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = NoiseProfile::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, NoiseProfileError::Read(_)));
    }
}
