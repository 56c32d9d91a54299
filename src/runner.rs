//! Drive a supervised tool to completion for the command line.
//!
//! The supervisor itself has no timeout; this layer polls `is_running()`
//! and calls `stop()` once the configured deadline passes.
//! Output capture after exit is not covered: a tool that leaves a background
//! child holding its pipes keeps `result()` blocked past the deadline.

use crate::config::{Config, SupervisorConfig};
use anyhow::{Context, Result};
use nutmeg_av::{Launchable, Supervisor};
use std::time::Instant;

/// Resolve `tool` using the configured overrides and wrap `launchable`.
pub fn supervisor<L: Launchable>(config: &Config, tool: &str, launchable: L) -> Result<Supervisor<L>> {
    let name = config.tool_name(tool);
    let supervisor = Supervisor::new(&name, &config.resolver(), launchable)
        .with_context(|| format!("Cannot run {}", tool))?;
    Ok(supervisor.verbose(config.supervisor.verbose))
}

/// Launch `request`, wait for it within the configured timeout, and return
/// the interpreted result.
pub fn run_to_completion<L: Launchable>(
    mut supervisor: Supervisor<L>,
    request: L::Request,
    settings: &SupervisorConfig,
) -> Result<L::Output> {
    let pid = supervisor.run(request)?;
    let started = Instant::now();
    tracing::debug!("{} running with PID {}", supervisor.tool(), pid);

    if let Some(timeout) = settings.timeout() {
        while supervisor.is_running() {
            if started.elapsed() >= timeout {
                supervisor.stop()?;
                anyhow::bail!(
                    "{} timed out after {:?} and was stopped",
                    supervisor.tool(),
                    timeout
                );
            }
            std::thread::sleep(settings.poll_interval());
        }
    }

    let outcome = supervisor.result().map(|_| ());
    if let Err(e) = outcome {
        if let Some(captured) = supervisor.captured() {
            for line in captured.stderr.iter().filter(|l| !l.trim().is_empty()) {
                tracing::debug!("{} stderr: {}", supervisor.tool(), line);
            }
        }
        return Err(e).with_context(|| format!("{} failed", supervisor.tool()));
    }

    tracing::debug!(
        "{} finished in {:.2}s",
        supervisor.tool(),
        started.elapsed().as_secs_f64()
    );

    supervisor
        .into_result()?
        .ok_or_else(|| anyhow::anyhow!("no output captured"))
}
