//! The decision-maker boundary.
//!
//! The orchestrator never chooses an action itself; it hands a
//! [`DeciderInput`] across this trait and gets a [`Decision`] back. A
//! production implementation wraps a language-model call and lives outside
//! this crate. [`ScriptedDecider`] replays a fixed decision list and backs
//! the CLI `run` command and the orchestrator tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use webpilot_protocols::{DoneResult, Narrative, PageSnapshot, ToolAction, ToolResult};

use crate::error::AgentError;

/// Everything the decider sees for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct DeciderInput {
    /// The task's original natural-language instruction.
    pub instruction: String,
    /// 1-based step number.
    pub step: u32,
    /// Fresh perception pass over the active page.
    pub snapshot: PageSnapshot,
    /// Results of the previous step's actions, in execution order. Empty on
    /// the first step.
    pub last_results: Vec<ToolResult>,
    /// The loop guard saw recent page/action pairs repeating.
    pub progress_stalled: bool,
}

/// One step's worth of decisions.
///
/// `actions` execute in order; when `done` is set the task ends after they
/// resolve. A decision with neither actions nor `done` is legal and simply
/// moves on to the next perception pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub narrative: Narrative,
    #[serde(default)]
    pub actions: Vec<ToolAction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub done: Option<DoneResult>,
}

impl Decision {
    /// Decision that only executes actions.
    pub fn act(actions: Vec<ToolAction>) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    /// Decision that ends the task with a verdict.
    pub fn finish(success: bool, result: Option<String>) -> Self {
        Self {
            done: Some(DoneResult { success, result }),
            ..Self::default()
        }
    }

    pub fn with_narrative(mut self, narrative: Narrative) -> Self {
        self.narrative = narrative;
        self
    }
}

/// Chooses the next actions for a running task.
#[async_trait]
pub trait Decider: Send + Sync {
    /// Produce the decision for one step. An `Err` here is task-fatal; a
    /// decider that wants to give up returns a `done` verdict with
    /// `success: false` instead.
    async fn decide(&self, input: &DeciderInput) -> Result<Decision, AgentError>;
}

/// Replays a fixed list of decisions, one per step.
///
/// When the script runs out, the task is closed with an unsuccessful done
/// verdict rather than spinning until the step ceiling.
pub struct ScriptedDecider {
    script: Mutex<VecDeque<Decision>>,
    seen: Mutex<Vec<DeciderInput>>,
}

impl ScriptedDecider {
    pub fn new(script: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Inputs received so far, in step order.
    pub fn seen(&self) -> Vec<DeciderInput> {
        self.seen.lock().clone()
    }

    /// Decisions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl Decider for ScriptedDecider {
    async fn decide(&self, input: &DeciderInput) -> Result<Decision, AgentError> {
        self.seen.lock().push(input.clone());
        Ok(self.script.lock().pop_front().unwrap_or_else(|| {
            Decision::finish(false, Some("decision script exhausted".to_string()))
        }))
    }
}

#[cfg(test)]
#[path = "decider_tests.rs"]
mod tests;
