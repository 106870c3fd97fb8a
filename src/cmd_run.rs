//! The `run` subcommand: drive a decision script as one task.
//!
//! Events stream to stdout as JSON lines while logs go to stderr and the
//! log file. Ctrl-C requests a cooperative stop; the task then ends with a
//! `stopped` event instead of being killed mid-action.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use webpilot_agent::{Decision, Orchestrator, OrchestratorConfig, ScriptedDecider};
use webpilot_protocols::TaskStatus;

use crate::config::Config;
use crate::session::open_session;

pub(crate) async fn run(
    config: &Config,
    script: &Path,
    instruction: &str,
    max_steps: Option<u32>,
    screenshots: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(script)
        .with_context(|| format!("reading decision script {}", script.display()))?;
    let decisions: Vec<Decision> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing decision script {}", script.display()))?;
    info!(decisions = decisions.len(), "loaded decision script");

    let session = open_session(config, None).await?;
    let decider = std::sync::Arc::new(ScriptedDecider::new(decisions));
    let orchestrator = Orchestrator::with_config(
        session,
        decider,
        OrchestratorConfig {
            max_steps: max_steps.unwrap_or(config.agent.max_steps),
            capture_screenshots: screenshots || config.agent.capture_screenshots,
            ..OrchestratorConfig::default()
        },
    );

    let mut events = orchestrator.subscribe();
    let task_id = orchestrator.start_task(instruction)?;

    let mut interrupt = Box::pin(tokio::signal::ctrl_c());
    let mut stop_requested = false;
    loop {
        tokio::select! {
            event = events.recv() => {
                let event = event.context("event stream closed before the task finished")?;
                if event.task_id() != task_id {
                    continue;
                }
                println!("{}", serde_json::to_string(&event)?);
                if event.is_terminal() {
                    break;
                }
            }
            _ = &mut interrupt, if !stop_requested => {
                warn!("interrupt received, stopping task");
                orchestrator.stop_task();
                stop_requested = true;
            }
        }
    }

    let state = orchestrator
        .status()
        .context("task finished without recording a state")?;
    info!(status = ?state.status, steps = state.step_count(), "task finished");

    let succeeded = state.status == TaskStatus::Done
        && state.done.as_ref().is_some_and(|done| done.success);
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
