//! Task and step bookkeeping shared between the orchestrator and its clients.

use crate::action::ToolAction;
use crate::result::ToolResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique id of one task run. Never reused.
pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Running,
    Done,
    Stopped,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Thinking,
    Acting,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    Executing,
    Done,
    Error,
}

/// Decision-maker narrative attached to a step. All fields are opaque
/// transport; nothing here is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thinking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evaluation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_goal: Option<String>,
}

/// One action inside a step: what ran and how it went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecution {
    pub action: ToolAction,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<ToolResult>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ActionExecution {
    pub fn begin(action: ToolAction) -> Self {
        Self {
            action,
            status: ActionStatus::Executing,
            result: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Mark finished with the given result; status follows its success flag.
    pub fn finish(&mut self, result: ToolResult) {
        self.status = if result.success {
            ActionStatus::Done
        } else {
            ActionStatus::Error
        };
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    /// Force a terminal status without a result (fatal-error unwinding).
    pub fn abort(&mut self) {
        if self.status == ActionStatus::Executing {
            self.status = ActionStatus::Error;
            self.finished_at = Some(Utc::now());
        }
    }
}

/// One iteration of the task loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step number.
    pub step: u32,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub narrative: Option<Narrative>,
    #[serde(default)]
    pub actions: Vec<ActionExecution>,
    /// Set when the loop guard saw this page/action pair repeat.
    #[serde(default)]
    pub progress_stalled: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepRecord {
    pub fn begin(step: u32) -> Self {
        Self {
            step,
            status: StepStatus::Thinking,
            narrative: None,
            actions: Vec::new(),
            progress_stalled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = StepStatus::Complete;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self) {
        self.status = StepStatus::Error;
        self.finished_at = Some(Utc::now());
    }

    /// Terminal cleanup: no action may be left `executing`.
    pub fn abort_in_flight(&mut self) {
        for action in &mut self.actions {
            action.abort();
        }
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }
}

/// Terminal verdict reported by the decision-maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoneResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<String>,
}

/// Observable state of one task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: TaskId,
    pub instruction: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub done: Option<DoneResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskState {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            instruction: instruction.into(),
            status: TaskStatus::Running,
            steps: Vec::new(),
            done: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn step_count(&self) -> u32 {
        self.steps.len() as u32
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
