//! Step orchestration for webpilot: the control loop that drives a browser
//! session from a plain-language instruction to a terminal verdict.
//!
//! ## The loop
//!
//! ```text
//! instruction ──► ┌──────────────┐  DeciderInput   ┌─────────┐
//!                 │ Orchestrator │ ──────────────► │ Decider │
//! events      ◄── │  (task loop) │ ◄────────────── │         │
//!                 └──────┬───────┘    Decision     └─────────┘
//!                        │ perceive / execute
//!                        ▼
//!            AutomationSession (webpilot-browser)
//! ```
//!
//! One [`Orchestrator`] runs at most one task at a time. Each step it takes a
//! fresh page snapshot, hands it to the [`Decider`] together with the results
//! of the previous step, executes whatever actions come back, and broadcasts
//! typed [`AgentEvent`]s along the way. A rolling [`LoopGuard`] watches for
//! the same page/action pair repeating and raises an advisory
//! `progress_stalled` flag that travels back to the decider; it never fails
//! the task on its own.
//!
//! [`Decider`] is the crate's only open seam: production wires a model client
//! behind it, tests and scripted runs replay a [`ScriptedDecider`].
//!
//! [`AgentEvent`]: webpilot_protocols::AgentEvent

mod decider;
mod error;
mod loop_guard;
mod orchestrator;

pub use decider::{Decider, DeciderInput, Decision, ScriptedDecider};
pub use error::{AgentError, AgentResult};
pub use loop_guard::LoopGuard;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
