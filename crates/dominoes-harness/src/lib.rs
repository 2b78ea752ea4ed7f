//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Simulation launch harness and shared exports."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
//! Builds the command line for `noisy_dominoes.py`, launches it once and
//! reports how it ended. The simulation itself is an external program; this
//! crate never looks at what it renders.

pub mod args;
pub mod config;
pub mod error;
pub mod invoker;
pub mod launcher;
pub mod noise;
pub mod signal;

pub use args::FlagPair;
pub use config::{InvocationConfig, RotationBounds};
pub use error::{HarnessError, NoiseProfileError, Result};
pub use invoker::{HarnessInvoker, RunReport};
pub use launcher::{ChildExit, ChildHandle, CommandSpec, LauncherConfig, ProcessLauncher, TokioLauncher};
pub use noise::{AxisNoise, AxisTriple, NoiseProfile};
