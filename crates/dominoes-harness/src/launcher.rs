//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Child process construction and spawning."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::config::InvocationConfig;
use crate::error::{HarnessError, Result};

fn default_interpreter() -> Option<String> {
    Some("python".to_owned())
}

fn default_script() -> PathBuf {
    PathBuf::from("noisy_dominoes.py")
}

fn default_interrupt_grace_secs() -> u64 {
    10
}

/// How the simulation entry point is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherConfig {
    /// Interpreter used to run the script. Empty or absent executes the
    /// script directly.
    #[serde(default = "default_interpreter")]
    pub interpreter: Option<String>,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    /// Working directory of the child. Relative script and noise paths
    /// resolve against it.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Raw arguments appended after the generated flags.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// How long an interrupted child may take to exit before it is killed.
    #[serde(default = "default_interrupt_grace_secs")]
    pub interrupt_grace_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script: default_script(),
            working_dir: None,
            extra_args: Vec::new(),
            interrupt_grace_secs: default_interrupt_grace_secs(),
        }
    }
}

impl LauncherConfig {
    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter
            .as_deref()
            .map(str::trim)
            .filter(|interp| !interp.is_empty())
    }

    pub fn interrupt_grace(&self) -> Duration {
        Duration::from_secs(self.interrupt_grace_secs)
    }

    /// Resolve `path` the way the child will see it.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Fully resolved command line for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
    script: PathBuf,
    interpreted: bool,
    working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(launcher: &LauncherConfig, config: &InvocationConfig) -> Self {
        let mut args = Vec::new();
        let program = match launcher.interpreter() {
            Some(interpreter) => {
                args.push(launcher.script.clone().into_os_string());
                OsString::from(interpreter)
            }
            None => launcher.script.clone().into_os_string(),
        };
        args.extend(config.to_args());
        args.extend(launcher.extra_args.iter().map(OsString::from));
        Self {
            program,
            args,
            script: launcher.resolve(&launcher.script),
            interpreted: launcher.interpreter().is_some(),
            working_dir: launcher.working_dir.clone(),
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Script location as seen from the harness.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Whether the script is handed to an interpreter rather than executed.
    pub fn interpreted(&self) -> bool {
        self.interpreted
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Shell-quoted rendering for dry runs and logs.
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|token| shell_quote(&token.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        token.to_owned()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// How a finished child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// Exit code, absent when the child was killed by a signal.
    pub code: Option<i32>,
    /// Terminating signal on Unix.
    pub signal: Option<i32>,
}

impl ChildExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Non-zero code to report for a failed child.
    pub fn failure_code(&self) -> u8 {
        match (self.code, self.signal) {
            (Some(code), _) if (1..=255).contains(&code) => code as u8,
            (None, Some(signal)) if (1..=127).contains(&signal) => 128 + signal as u8,
            _ => 1,
        }
    }
}

impl From<ExitStatus> for ChildExit {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;
        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exited with status {}", code),
            (None, Some(signal)) => write!(f, "terminated by signal {}", signal),
            (None, None) => f.write_str("terminated without a status"),
        }
    }
}

/// Abstraction over process creation so the invoker can be tested without
/// real children.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ChildHandle>>;
}

/// A running child.
#[async_trait]
pub trait ChildHandle: Send {
    async fn wait(&mut self) -> std::io::Result<ChildExit>;
    /// Deliver `signal` (`"SIGINT"`, `"SIGTERM"`) to the child. Does not reap.
    async fn interrupt(&mut self, signal: &'static str) -> std::io::Result<()>;
    /// Terminate the child and reap it.
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// Spawns real processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ChildHandle>> {
        let program = spec.program().to_string_lossy().into_owned();
        if let Some(dir) = spec.working_dir() {
            if !dir.is_dir() {
                return Err(HarnessError::Launch {
                    program,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("working directory {} does not exist", dir.display()),
                    ),
                });
            }
        }
        if spec.interpreted() && !spec.script().is_file() {
            return Err(HarnessError::Launch {
                program,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("script {} not found", spec.script().display()),
                ),
            });
        }
        debug!(command = %spec, "spawning simulation");
        let child = spec
            .to_command()
            .spawn()
            .map_err(|source| HarnessError::Launch { program, source })?;
        Ok(Box::new(TokioChild(child)))
    }
}

struct TokioChild(Child);

#[async_trait]
impl ChildHandle for TokioChild {
    async fn wait(&mut self) -> std::io::Result<ChildExit> {
        self.0.wait().await.map(ChildExit::from)
    }

    #[cfg(unix)]
    async fn interrupt(&mut self, signal: &'static str) -> std::io::Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Already reaped.
        let Some(pid) = self.0.id() else {
            return Ok(());
        };
        let signal: Signal = signal.parse()?;
        kill(Pid::from_raw(pid as i32), signal)?;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn interrupt(&mut self, _signal: &'static str) -> std::io::Result<()> {
        self.0.start_kill()
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.0.kill().await
    }
}
