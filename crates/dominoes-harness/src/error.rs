//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Error taxonomy for simulation launches."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

use crate::launcher::ChildExit;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Exit code used when the simulation could not be started.
pub const LAUNCH_EXIT_CODE: u8 = 127;
/// Exit code used when the operator interrupted the run.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;
/// Exit code used for rejected configuration or noise profiles.
pub const USAGE_EXIT_CODE: u8 = 2;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unable to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("simulation {exit}")]
    ChildProcess { exit: ChildExit },
    #[error("run interrupted by {signal}")]
    Interrupted { signal: &'static str },
    #[error("invalid invocation setting `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("noise profile {}: {source}", path.display())]
    NoiseProfile {
        path: PathBuf,
        #[source]
        source: NoiseProfileError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum NoiseProfileError {
    #[error("unreadable: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{key}` {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl HarnessError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        HarnessError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Process exit code the front end should terminate with.
    ///
    /// Child failures are mirrored; everything else maps to a fixed code.
    pub fn exit_code(&self) -> u8 {
        match self {
            HarnessError::Launch { .. } => LAUNCH_EXIT_CODE,
            HarnessError::ChildProcess { exit } => exit.failure_code(),
            HarnessError::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            HarnessError::InvalidConfig { .. } | HarnessError::NoiseProfile { .. } => {
                USAGE_EXIT_CODE
            }
            HarnessError::Io(_) => 1,
        }
    }
}
