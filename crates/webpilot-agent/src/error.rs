//! Error types for the step orchestrator.

use thiserror::Error;

use webpilot_browser::BrowserError;

/// Errors that can end a task, or prevent one from starting.
///
/// Individual tool failures are not here: those travel as failed
/// `ToolResult`s for the decider to react to. Only conditions that stop the
/// loop itself become an `AgentError`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// One task at a time; the running one must finish or be stopped first.
    #[error("a task is already running")]
    Busy,

    /// The hard step ceiling was hit without a done verdict.
    #[error("step limit of {0} reached without the task completing")]
    StepLimitReached(u32),

    /// A perception pass failed; the loop cannot continue without one.
    #[error("perception failed: {0}")]
    Perception(#[from] BrowserError),

    /// The decision-maker itself failed (as opposed to deciding to give up).
    #[error("decider failed: {0}")]
    Decider(String),
}

/// Result type for orchestrator operations.
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
