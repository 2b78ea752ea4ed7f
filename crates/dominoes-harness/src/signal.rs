//! ---
//! nd_section: "11-simulation"
//! nd_subsection: "01-harness"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Operator interrupt detection."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use tokio::signal;
use tracing::warn;

/// Resolve with the signal name once the operator asks the run to stop.
///
/// A handler that cannot be installed never fires rather than aborting the run.
pub async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        tokio::select! {
            name = ctrl_c() => name,
            name = terminate() => name,
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await
    }
}

async fn ctrl_c() -> &'static str {
    if let Err(err) = signal::ctrl_c().await {
        warn!(?err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

#[cfg(unix)]
async fn terminate() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(err) => {
            warn!(?err, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
    "SIGTERM"
}
