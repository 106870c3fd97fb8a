//! The agent event stream.
//!
//! Every event carries the id of the task that produced it; consumers on a
//! shared channel must filter by that id. Per-step order is fixed:
//! `step-start`, `thinking`, one `action-executed` per action, `step-complete`.
//! A task ends with exactly one of `done`, `error`, or `stopped`.

use crate::result::ToolResult;
use crate::task::{Narrative, StepStatus, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum AgentEvent {
    /// A new step began against the given page.
    StepStart {
        task_id: TaskId,
        step: u32,
        url: String,
        /// The loop guard saw this state/action pair repeating.
        #[serde(default)]
        progress_stalled: bool,
        timestamp: DateTime<Utc>,
    },
    /// The decision-maker's narrative for the step.
    Thinking {
        task_id: TaskId,
        step: u32,
        narrative: Narrative,
        timestamp: DateTime<Utc>,
    },
    /// One action finished (successfully or not).
    ActionExecuted {
        task_id: TaskId,
        step: u32,
        /// 0-based position within the step's action list.
        action_index: usize,
        tool: String,
        result: ToolResult,
        timestamp: DateTime<Utc>,
    },
    /// The step's actions are all accounted for.
    StepComplete {
        task_id: TaskId,
        step: u32,
        status: StepStatus,
        timestamp: DateTime<Utc>,
    },
    /// The decision-maker declared the task finished.
    Done {
        task_id: TaskId,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        result: Option<String>,
        steps: u32,
        timestamp: DateTime<Utc>,
    },
    /// The task died on a fatal error.
    Error {
        task_id: TaskId,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        step: Option<u32>,
        timestamp: DateTime<Utc>,
    },
    /// The task was cancelled by request.
    Stopped {
        task_id: TaskId,
        steps: u32,
        timestamp: DateTime<Utc>,
    },
}

impl AgentEvent {
    /// Id of the task this event belongs to.
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::StepStart { task_id, .. }
            | Self::Thinking { task_id, .. }
            | Self::ActionExecuted { task_id, .. }
            | Self::StepComplete { task_id, .. }
            | Self::Done { task_id, .. }
            | Self::Error { task_id, .. }
            | Self::Stopped { task_id, .. } => *task_id,
        }
    }

    /// Whether this event ends its task.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Error { .. } | Self::Stopped { .. }
        )
    }

    /// The wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StepStart { .. } => "step-start",
            Self::Thinking { .. } => "thinking",
            Self::ActionExecuted { .. } => "action-executed",
            Self::StepComplete { .. } => "step-complete",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
            Self::Stopped { .. } => "stopped",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
