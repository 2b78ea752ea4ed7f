//! ---
//! nd_section: "05-external-interfaces"
//! nd_subsection: "binary"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Command-line overrides layered over the settings file."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::path::PathBuf;

use clap::Args;
use dominoes_common::HarnessSettings;
use dominoes_harness::RotationBounds;

/// Per-run overrides. Unset options keep the settings file value.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Output directory for rendered trials
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Number of trials to simulate
    #[arg(long, value_name = "N")]
    pub num: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frames per second
    #[arg(long)]
    pub framerate: Option<u32>,

    /// Render passes to save, comma separated (e.g. _img)
    #[arg(long, alias = "save_passes", value_delimiter = ',', value_name = "PASS")]
    pub save_passes: Option<Vec<String>>,

    /// Also write a movie per trial
    #[arg(long, alias = "save_movies")]
    pub save_movies: bool,

    /// Noise profile JSON file
    #[arg(long, value_name = "FILE")]
    pub noise: Option<PathBuf>,

    /// Jitter applied to object spacing
    #[arg(long, alias = "spacing_jitter")]
    pub spacing_jitter: Option<f64>,

    /// Jitter applied to lateral position
    #[arg(long, alias = "lateral_jitter")]
    pub lateral_jitter: Option<f64>,

    /// Rotation bounds as [min,max] or min,max
    #[arg(long, allow_hyphen_values = true, value_name = "[MIN,MAX]")]
    pub mrot: Option<RotationBounds>,

    /// Interpreter used to run the script; empty runs the script directly
    #[arg(long, value_name = "PROGRAM")]
    pub python: Option<String>,

    /// Path to noisy_dominoes.py
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Working directory for the simulation
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut HarnessSettings) {
        let invocation = &mut settings.invocation;
        if let Some(dir) = &self.dir {
            invocation.output_directory = dir.clone();
        }
        if let Some(num) = self.num {
            invocation.trial_count = num;
        }
        if let Some(height) = self.height {
            invocation.height = height;
        }
        if let Some(width) = self.width {
            invocation.width = width;
        }
        if let Some(framerate) = self.framerate {
            invocation.framerate = framerate;
        }
        if let Some(passes) = &self.save_passes {
            invocation.save_passes = Some(passes.clone());
        }
        if self.save_movies {
            invocation.save_movies = true;
        }
        if let Some(noise) = &self.noise {
            invocation.noise_profile = noise.clone();
        }
        if let Some(jitter) = self.spacing_jitter {
            invocation.spacing_jitter = jitter;
        }
        if let Some(jitter) = self.lateral_jitter {
            invocation.lateral_jitter = jitter;
        }
        if let Some(bounds) = self.mrot {
            invocation.rotation_bounds = bounds;
        }

        let launcher = &mut settings.launcher;
        if let Some(python) = &self.python {
            launcher.interpreter = Some(python.clone());
        }
        if let Some(script) = &self.script {
            launcher.script = script.clone();
        }
        if let Some(dir) = &self.working_dir {
            launcher.working_dir = Some(dir.clone());
        }
    }
}
