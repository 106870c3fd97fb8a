//! The per-task control loop.
//!
//! One [`Orchestrator`] drives at most one task at a time: perceive the page,
//! ask the [`Decider`] what to do, execute the chosen actions in order, emit
//! events, repeat. Per step the event order is fixed: `step-start`,
//! `thinking`, one `action-executed` per action, `step-complete`. A task ends
//! with exactly one `done`, `error`, or `stopped` event.
//!
//! Sequential tasks share the broadcast channel, so consumers filter every
//! event by its task id. Stops are cooperative: the cancellation token is
//! checked between steps and between actions, and the result of an action
//! that was already in flight when the stop arrived is discarded.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use webpilot_browser::{AutomationSession, BrowserError};
use webpilot_protocols::{
    ActionExecution, AgentEvent, CaptureFormat, DoneResult, PageSnapshot, StepRecord, StepStatus,
    TaskId, TaskState, TaskStatus, ToolResult,
};

use crate::decider::{Decider, DeciderInput};
use crate::error::{AgentError, AgentResult};
use crate::loop_guard::{action_signature, page_fingerprint, LoopGuard};

/// Tunables for the task loop.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hard ceiling on steps per task; exceeding it ends the task as an
    /// error.
    pub max_steps: u32,
    /// Attach a viewport screenshot to every perception pass.
    pub capture_screenshots: bool,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            capture_screenshots: false,
            event_capacity: 256,
        }
    }
}

struct RunningTask {
    id: TaskId,
    state: Arc<Mutex<TaskState>>,
    cancel: CancellationToken,
}

/// Runs tasks against one automation session, one at a time.
pub struct Orchestrator {
    session: Arc<AutomationSession>,
    decider: Arc<dyn Decider>,
    config: OrchestratorConfig,
    events: broadcast::Sender<AgentEvent>,
    current: Mutex<Option<RunningTask>>,
}

impl Orchestrator {
    pub fn new(session: Arc<AutomationSession>, decider: Arc<dyn Decider>) -> Self {
        Self::with_config(session, decider, OrchestratorConfig::default())
    }

    pub fn with_config(
        session: Arc<AutomationSession>,
        decider: Arc<dyn Decider>,
        config: OrchestratorConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            session,
            decider,
            config,
            events,
            current: Mutex::new(None),
        }
    }

    /// Subscribe to the event stream. Every task's events arrive on this one
    /// channel; consumers must filter by [`AgentEvent::task_id`].
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Begin a task on a spawned loop and return its id.
    ///
    /// Rejected with [`AgentError::Busy`] while another task is running; a
    /// finished task's slot is reclaimed. Requires a Tokio runtime.
    pub fn start_task(&self, instruction: impl Into<String>) -> AgentResult<TaskId> {
        let mut current = self.current.lock();
        if let Some(running) = current.as_ref() {
            if !running.state.lock().status.is_terminal() {
                return Err(AgentError::Busy);
            }
        }

        let state = TaskState::new(instruction);
        let id = state.id;
        info!(task_id = %id, "starting task");

        let state = Arc::new(Mutex::new(state));
        let cancel = CancellationToken::new();
        let runner = TaskRunner {
            session: Arc::clone(&self.session),
            decider: Arc::clone(&self.decider),
            events: self.events.clone(),
            config: self.config.clone(),
            state: Arc::clone(&state),
            cancel: cancel.clone(),
            guard: LoopGuard::new(),
        };
        tokio::spawn(runner.run());

        *current = Some(RunningTask { id, state, cancel });
        Ok(id)
    }

    /// Request a cooperative stop of the running task. Returns whether a
    /// running task was told to stop.
    pub fn stop_task(&self) -> bool {
        let current = self.current.lock();
        match current.as_ref() {
            Some(running) if !running.state.lock().status.is_terminal() => {
                info!(task_id = %running.id, "stop requested");
                running.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// State of the current (or most recent) task.
    pub fn status(&self) -> Option<TaskState> {
        self.current
            .lock()
            .as_ref()
            .map(|running| running.state.lock().clone())
    }

    /// Id of the current (or most recent) task.
    pub fn current_task_id(&self) -> Option<TaskId> {
        self.current.lock().as_ref().map(|running| running.id)
    }
}

/// Drives one task to its terminal state on a spawned tokio task.
struct TaskRunner {
    session: Arc<AutomationSession>,
    decider: Arc<dyn Decider>,
    events: broadcast::Sender<AgentEvent>,
    config: OrchestratorConfig,
    state: Arc<Mutex<TaskState>>,
    cancel: CancellationToken,
    guard: LoopGuard,
}

impl TaskRunner {
    async fn run(mut self) {
        let id = self.state.lock().id;
        let mut last_results: Vec<ToolResult> = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                self.finish_stopped(id);
                return;
            }

            let step = self.state.lock().step_count() + 1;
            if step > self.config.max_steps {
                let message = AgentError::StepLimitReached(self.config.max_steps).to_string();
                self.finish_error(id, message, None);
                return;
            }

            let snapshot = match self.perceive().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.finish_error(id, AgentError::from(e).to_string(), None);
                    return;
                }
            };

            let stalled = self.guard.stalled();
            if stalled {
                warn!(task_id = %id, step, "repeating page/action pattern, progress stalled");
            }

            {
                let mut state = self.state.lock();
                let mut record = StepRecord::begin(step);
                record.progress_stalled = stalled;
                state.steps.push(record);
            }
            self.emit(AgentEvent::StepStart {
                task_id: id,
                step,
                url: snapshot.url.clone(),
                progress_stalled: stalled,
                timestamp: Utc::now(),
            });

            let input = DeciderInput {
                instruction: self.state.lock().instruction.clone(),
                step,
                snapshot: snapshot.clone(),
                last_results: std::mem::take(&mut last_results),
                progress_stalled: stalled,
            };
            let decision = match self.decider.decide(&input).await {
                Ok(decision) => decision,
                Err(e) => {
                    self.fail_step(id, step);
                    self.finish_error(id, e.to_string(), Some(step));
                    return;
                }
            };

            self.guard.record(
                page_fingerprint(&snapshot),
                action_signature(&decision.actions),
            );

            {
                let mut state = self.state.lock();
                if let Some(record) = state.steps.last_mut() {
                    record.narrative = Some(decision.narrative.clone());
                    record.status = StepStatus::Acting;
                }
            }
            self.emit(AgentEvent::Thinking {
                task_id: id,
                step,
                narrative: decision.narrative.clone(),
                timestamp: Utc::now(),
            });

            let mut results = Vec::with_capacity(decision.actions.len());
            let mut stopped_mid_step = false;
            for (action_index, action) in decision.actions.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    stopped_mid_step = true;
                    break;
                }

                {
                    let mut state = self.state.lock();
                    if let Some(record) = state.steps.last_mut() {
                        record.actions.push(ActionExecution::begin(action.clone()));
                    }
                }

                let result = self.session.execute(action).await;

                if self.cancel.is_cancelled() {
                    // The action already ran; a stop discards its result.
                    stopped_mid_step = true;
                    break;
                }

                {
                    let mut state = self.state.lock();
                    if let Some(record) = state.steps.last_mut() {
                        if let Some(execution) = record.actions.last_mut() {
                            execution.finish(result.clone());
                        }
                    }
                }
                self.emit(AgentEvent::ActionExecuted {
                    task_id: id,
                    step,
                    action_index,
                    tool: action.name().to_string(),
                    result: result.clone(),
                    timestamp: Utc::now(),
                });
                results.push(result);
            }

            self.complete_step(id, step);

            if stopped_mid_step || self.cancel.is_cancelled() {
                self.finish_stopped(id);
                return;
            }

            if let Some(done) = decision.done {
                self.finish_done(id, done);
                return;
            }

            last_results = results;
        }
    }

    async fn perceive(&self) -> Result<PageSnapshot, BrowserError> {
        let mut snapshot = self.session.perceive(None, None).await?;
        if self.config.capture_screenshots {
            // The snapshot is still usable without its screenshot.
            match self.screenshot().await {
                Ok(image) => snapshot.screenshot = Some(image),
                Err(e) => warn!("screenshot capture failed: {e}"),
            }
        }
        Ok(snapshot)
    }

    async fn screenshot(&self) -> Result<String, BrowserError> {
        let page = self.session.host().active_page().await?;
        page.screenshot(CaptureFormat::Png, None).await
    }

    /// Close out the current step; no action may be left `executing`.
    fn complete_step(&self, id: TaskId, step: u32) {
        {
            let mut state = self.state.lock();
            if let Some(record) = state.steps.last_mut() {
                record.abort_in_flight();
                record.complete();
            }
        }
        self.emit(AgentEvent::StepComplete {
            task_id: id,
            step,
            status: StepStatus::Complete,
            timestamp: Utc::now(),
        });
    }

    fn fail_step(&self, id: TaskId, step: u32) {
        {
            let mut state = self.state.lock();
            if let Some(record) = state.steps.last_mut() {
                record.abort_in_flight();
                record.fail();
            }
        }
        self.emit(AgentEvent::StepComplete {
            task_id: id,
            step,
            status: StepStatus::Error,
            timestamp: Utc::now(),
        });
    }

    fn finish_done(&self, id: TaskId, done: DoneResult) {
        let steps = {
            let mut state = self.state.lock();
            state.status = TaskStatus::Done;
            state.done = Some(done.clone());
            state.finished_at = Some(Utc::now());
            state.step_count()
        };
        info!(task_id = %id, steps, success = done.success, "task done");
        self.emit(AgentEvent::Done {
            task_id: id,
            success: done.success,
            result: done.result,
            steps,
            timestamp: Utc::now(),
        });
    }

    fn finish_stopped(&self, id: TaskId) {
        let steps = {
            let mut state = self.state.lock();
            state.status = TaskStatus::Stopped;
            state.finished_at = Some(Utc::now());
            if let Some(record) = state.steps.last_mut() {
                record.abort_in_flight();
            }
            state.step_count()
        };
        info!(task_id = %id, steps, "task stopped");
        self.emit(AgentEvent::Stopped {
            task_id: id,
            steps,
            timestamp: Utc::now(),
        });
    }

    fn finish_error(&self, id: TaskId, message: String, step: Option<u32>) {
        {
            let mut state = self.state.lock();
            state.status = TaskStatus::Error;
            state.error = Some(message.clone());
            state.finished_at = Some(Utc::now());
            if let Some(record) = state.steps.last_mut() {
                record.abort_in_flight();
            }
        }
        warn!(task_id = %id, "task failed: {message}");
        self.emit(AgentEvent::Error {
            task_id: id,
            message,
            step,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: AgentEvent) {
        debug!(task_id = %event.task_id(), kind = event.kind(), "agent event");
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
