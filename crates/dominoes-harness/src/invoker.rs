//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Single-shot simulation launch and exit propagation."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::future::Future;
use std::time::{Duration, Instant};

use dominoes_logging::{log_run_event, LogContext, RunOutcome};
use tracing::{info, warn};

use crate::config::InvocationConfig;
use crate::error::{HarnessError, Result};
use crate::launcher::{
    ChildExit, ChildHandle, CommandSpec, LauncherConfig, ProcessLauncher, TokioLauncher,
};
use crate::noise::NoiseProfile;
use crate::signal::shutdown_signal;

/// Outcome of a run whose child exited with status zero.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub command: String,
    pub exit: ChildExit,
    pub elapsed: Duration,
}

enum Waited {
    Exited(std::io::Result<ChildExit>),
    Interrupted(&'static str),
}

/// Launches the simulation once per [`HarnessInvoker::run`] call.
pub struct HarnessInvoker<L = TokioLauncher> {
    launcher: L,
    settings: LauncherConfig,
    verify_noise: bool,
}

impl HarnessInvoker<TokioLauncher> {
    pub fn new(settings: LauncherConfig) -> Self {
        Self::with_launcher(TokioLauncher, settings)
    }
}

impl<L: ProcessLauncher> HarnessInvoker<L> {
    pub fn with_launcher(launcher: L, settings: LauncherConfig) -> Self {
        Self {
            launcher,
            settings,
            verify_noise: false,
        }
    }

    /// Check the noise profile before spawning.
    pub fn verify_noise(mut self, enabled: bool) -> Self {
        self.verify_noise = enabled;
        self
    }

    /// Validate `config` and build the command line without spawning.
    pub fn prepare(&self, config: &InvocationConfig) -> Result<CommandSpec> {
        config.validate()?;
        if self.verify_noise {
            self.check_noise(config)?;
        }
        if config.save_movies && !config.movies_effective() {
            warn!("--save_movies has no effect without --save_passes");
        }
        Ok(CommandSpec::new(&self.settings, config))
    }

    /// Load and validate the noise profile `config` points at.
    pub fn check_noise(&self, config: &InvocationConfig) -> Result<NoiseProfile> {
        let path = self.settings.resolve(&config.noise_profile);
        let profile =
            NoiseProfile::load(&path).map_err(|source| HarnessError::NoiseProfile { path, source })?;
        if profile.is_noiseless() {
            info!(noise = %config.noise_profile.display(), "noise profile injects no noise");
        }
        Ok(profile)
    }

    /// Launch and wait, aborting on Ctrl+C or SIGTERM.
    pub async fn run(&self, config: &InvocationConfig) -> Result<RunReport> {
        self.run_until(config, shutdown_signal()).await
    }

    /// Launch and wait until the child exits or `shutdown` resolves.
    pub async fn run_until<F>(&self, config: &InvocationConfig, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = &'static str>,
    {
        let output_dir = config.output_directory.to_string_lossy();
        let noise = config.noise_profile.to_string_lossy();
        let ctx = LogContext::new()
            .with_output_dir(&output_dir)
            .with_noise(&noise)
            .with_trials(config.trial_count);

        let spec = match self.prepare(config) {
            Ok(spec) => spec,
            Err(err) => {
                log_run_event(Some(&ctx), "run.prepare", &err.to_string(), RunOutcome::Fault);
                return Err(err);
            }
        };
        let command = spec.render();
        info!(%command, "launching simulation");

        let started = Instant::now();
        let mut child = match self.launcher.spawn(&spec) {
            Ok(child) => child,
            Err(err) => {
                log_run_event(Some(&ctx), "run.launch", &err.to_string(), RunOutcome::Fault);
                return Err(err);
            }
        };

        tokio::pin!(shutdown);
        let waited = tokio::select! {
            status = child.wait() => Waited::Exited(status),
            signal = &mut shutdown => Waited::Interrupted(signal),
        };
        let elapsed = started.elapsed();

        match waited {
            Waited::Interrupted(signal) => {
                warn!(signal, "interrupt received; forwarding to simulation");
                self.stop_child(child.as_mut(), signal).await;
                let err = HarnessError::Interrupted { signal };
                log_run_event(Some(&ctx), "run.interrupted", &err.to_string(), RunOutcome::Fault);
                Err(err)
            }
            Waited::Exited(Err(err)) => {
                log_run_event(Some(&ctx), "run.wait", &err.to_string(), RunOutcome::Fault);
                Err(HarnessError::Io(err))
            }
            Waited::Exited(Ok(exit)) if exit.success() => {
                log_run_event(
                    Some(&ctx),
                    "run.completed",
                    &format!("simulation finished in {:.1}s", elapsed.as_secs_f64()),
                    RunOutcome::Success,
                );
                Ok(RunReport {
                    command,
                    exit,
                    elapsed,
                })
            }
            Waited::Exited(Ok(exit)) => {
                let err = HarnessError::ChildProcess { exit };
                log_run_event(Some(&ctx), "run.failed", &err.to_string(), RunOutcome::Fault);
                Err(err)
            }
        }
    }

    /// Forward `signal` and reap the child, killing it if the signal cannot
    /// be delivered or the grace period runs out.
    async fn stop_child(&self, child: &mut dyn ChildHandle, signal: &'static str) {
        let grace = self.settings.interrupt_grace();
        match child.interrupt(signal).await {
            Ok(()) => match tokio::time::timeout(grace, child.wait()).await {
                Ok(Ok(exit)) => {
                    info!(%exit, "simulation stopped after interrupt");
                    return;
                }
                Ok(Err(err)) => warn!(?err, "failed to reap interrupted simulation"),
                Err(_) => warn!(
                    grace_secs = grace.as_secs(),
                    "simulation ignored interrupt; killing"
                ),
            },
            Err(err) => warn!(?err, signal, "failed to forward interrupt; killing simulation"),
        }
        if let Err(err) = child.kill().await {
            warn!(?err, "failed to stop simulation");
        }
    }
}
