//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Command-line flags understood by noisy_dominoes.py."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::ffi::OsString;

use crate::config::InvocationConfig;

// Flag spellings are the simulation's own and must not be renamed.
pub const FLAG_DIR: &str = "--dir";
pub const FLAG_NUM: &str = "--num";
pub const FLAG_HEIGHT: &str = "--height";
pub const FLAG_WIDTH: &str = "--width";
pub const FLAG_FRAMERATE: &str = "--framerate";
pub const FLAG_SAVE_PASSES: &str = "--save_passes";
pub const FLAG_SAVE_MOVIES: &str = "--save_movies";
pub const FLAG_NOISE: &str = "--noise";
pub const FLAG_SPACING_JITTER: &str = "--spacing_jitter";
pub const FLAG_LATERAL_JITTER: &str = "--lateral_jitter";
pub const FLAG_MROT: &str = "--mrot";

/// A flag and its value. Boolean switches carry no value.
pub type FlagPair = (&'static str, Option<OsString>);

impl InvocationConfig {
    /// Flags in the order they are passed to the simulation.
    ///
    /// Optional flags only appear when set.
    pub fn flag_pairs(&self) -> Vec<FlagPair> {
        let mut pairs: Vec<FlagPair> = vec![
            (FLAG_DIR, Some(self.output_directory.clone().into_os_string())),
            (FLAG_NUM, Some(OsString::from(self.trial_count.to_string()))),
            (FLAG_HEIGHT, Some(OsString::from(self.height.to_string()))),
            (FLAG_WIDTH, Some(OsString::from(self.width.to_string()))),
            (FLAG_FRAMERATE, Some(OsString::from(self.framerate.to_string()))),
        ];
        if let Some(passes) = &self.save_passes {
            pairs.push((FLAG_SAVE_PASSES, Some(OsString::from(passes.join(",")))));
        }
        if self.save_movies {
            pairs.push((FLAG_SAVE_MOVIES, None));
        }
        pairs.extend([
            (FLAG_NOISE, Some(self.noise_profile.clone().into_os_string())),
            (FLAG_SPACING_JITTER, Some(OsString::from(format_float(self.spacing_jitter)))),
            (FLAG_LATERAL_JITTER, Some(OsString::from(format_float(self.lateral_jitter)))),
            (FLAG_MROT, Some(OsString::from(self.rotation_bounds.to_string()))),
        ]);
        pairs
    }

    /// Flatten [`Self::flag_pairs`] into argv tokens.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        for (flag, value) in self.flag_pairs() {
            args.push(OsString::from(flag));
            if let Some(value) = value {
                args.push(value);
            }
        }
        args
    }
}

// Debug formatting keeps the decimal point (`0.0`), which argparse reads as float.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}
