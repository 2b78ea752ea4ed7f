//! ---
//! nd_section: "05-external-interfaces"
//! nd_subsection: "binary"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Subcommand handlers for the launcher CLI."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use dominoes_common::HarnessSettings;
use dominoes_harness::HarnessInvoker;
use serde::Serialize;
use tracing::info;

use crate::overrides::Overrides;

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Print the command instead of launching it
    #[arg(long)]
    pub dry_run: bool,

    /// Validate the noise profile before launching
    #[arg(long)]
    pub verify_noise: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ArgsArgs {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Emit the flag/value pairs as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Serialize)]
struct FlagEntry {
    flag: &'static str,
    value: Option<String>,
}

pub async fn run(settings: &HarnessSettings, args: &RunArgs) -> Result<ExitCode> {
    let invoker =
        HarnessInvoker::new(settings.launcher.clone()).verify_noise(args.verify_noise);
    if args.dry_run {
        let spec = invoker.prepare(&settings.invocation)?;
        println!("{}", spec);
        return Ok(ExitCode::SUCCESS);
    }
    let report = invoker.run(&settings.invocation).await?;
    info!(
        elapsed_secs = report.elapsed.as_secs_f64(),
        output_dir = %settings.invocation.output_directory.display(),
        "simulation completed"
    );
    Ok(ExitCode::SUCCESS)
}

pub fn print_args(settings: &HarnessSettings, args: &ArgsArgs) -> Result<ExitCode> {
    settings.invocation.validate()?;
    if args.json {
        let entries: Vec<FlagEntry> = settings
            .invocation
            .flag_pairs()
            .into_iter()
            .map(|(flag, value)| FlagEntry {
                flag,
                value: value.map(|v| v.to_string_lossy().into_owned()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for token in settings.invocation.to_args() {
            println!("{}", token.to_string_lossy());
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn check(settings: &HarnessSettings) -> Result<ExitCode> {
    let invoker = HarnessInvoker::new(settings.launcher.clone());
    let spec = invoker.prepare(&settings.invocation)?;
    let profile = invoker.check_noise(&settings.invocation)?;
    if spec.interpreted() && !spec.script().is_file() {
        println!("warning: script {} not found", spec.script().display());
    }
    println!(
        "configuration ok: {} trials into {}",
        settings.invocation.trial_count,
        settings.invocation.output_directory.display()
    );
    println!(
        "noise profile ok: {}{}",
        settings.invocation.noise_profile.display(),
        if profile.is_noiseless() { " (no noise)" } else { "" }
    );
    Ok(ExitCode::SUCCESS)
}
