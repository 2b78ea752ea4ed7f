//! ---
//! nd_section: "05-external-interfaces"
//! nd_subsection: "binary"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Launcher CLI for noisy dominoes simulation runs."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dominoes_common::{HarnessSettings, LoadedSettings, VersionInfo};
use dominoes_harness::error::USAGE_EXIT_CODE;
use dominoes_harness::HarnessError;
use dominoes_logging::LogFormat;
use tracing::debug;

mod commands;
mod overrides;

use overrides::Overrides;

const SERVICE_NAME: &str = "dominoes-run";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    StructuredJson,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::StructuredJson => LogFormat::StructuredJson,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Launch the noisy dominoes simulation with a configured set of flags",
    long_about = None
)]
struct Cli {
    /// Settings file (TOML). Defaults to $NOISY_DOMINOES_CONFIG, ./dominoes.toml
    /// or ./configs/dominoes.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Console log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Print extended version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Launch the simulation (default)")]
    Run(commands::RunArgs),
    #[command(about = "Print the argument list handed to the simulation")]
    Args(commands::ArgsArgs),
    #[command(about = "Validate the configuration and noise profile without launching")]
    Check(commands::CheckArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return ExitCode::SUCCESS;
    }
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let LoadedSettings {
        mut settings,
        source,
    } = match &cli.config {
        Some(path) => HarnessSettings::load_explicit(path)?,
        None => HarnessSettings::load_with_source(&HarnessSettings::DEFAULT_CANDIDATES)?,
    };
    if let Some(format) = cli.log_format {
        settings.logging.format = format.into();
    }
    let _log_guard = dominoes_logging::init(SERVICE_NAME, &settings.logging)?;
    debug!(source = ?source, "settings resolved");

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(commands::RunArgs::default()));
    match command {
        Commands::Run(args) => {
            args.overrides.apply(&mut settings);
            commands::run(&settings, &args).await
        }
        Commands::Args(args) => {
            args.overrides.apply(&mut settings);
            commands::print_args(&settings, &args)
        }
        Commands::Check(args) => {
            args.overrides.apply(&mut settings);
            commands::check(&settings)
        }
    }
}

/// Harness failures carry their own code; anything else is a settings problem.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<HarnessError>()
        .map(HarnessError::exit_code)
        .unwrap_or(USAGE_EXIT_CODE)
}
