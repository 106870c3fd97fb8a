use super::*;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;

use webpilot_browser::testing::{FakeHost, FakePage};
use webpilot_browser::{BrowserHost, DomNodeData, DomSnapshotData, PageContext, PerceptionConfig};
use webpilot_protocols::{
    ActionStatus, ClickParams, Narrative, ScrollInfo, ScrollParams, ToolAction,
};

use crate::decider::{Decision, ScriptedDecider};

/// One indexed button on a page three viewports tall.
fn demo_page() -> DomSnapshotData {
    let body = DomNodeData::element("body")
        .with_rect(0.0, 0.0, 1280.0, 1000.0)
        .with_child(
            DomNodeData::element("button")
                .with_attr("id", "go")
                .with_rect(40.0, 40.0, 100.0, 30.0)
                .with_text("Go"),
        );
    let root = DomNodeData::document().with_child(
        DomNodeData::element("html")
            .with_rect(0.0, 0.0, 1280.0, 1000.0)
            .with_child(body),
    );
    let mut snapshot = DomSnapshotData::new("https://demo.test/", "Demo", root);
    snapshot.scroll = ScrollInfo::new(0.0, 0.0, 1280.0, 3000.0, 1280.0, 1000.0);
    snapshot
}

fn orchestrator(decider: Arc<dyn Decider>) -> (Orchestrator, Arc<FakePage>) {
    orchestrator_with(decider, OrchestratorConfig::default())
}

fn orchestrator_with(
    decider: Arc<dyn Decider>,
    config: OrchestratorConfig,
) -> (Orchestrator, Arc<FakePage>) {
    let page = FakePage::new(demo_page());
    let host = FakeHost::new(page.clone());
    let session = Arc::new(AutomationSession::new(
        host,
        PerceptionConfig::default(),
        1_000,
    ));
    (Orchestrator::with_config(session, decider, config), page)
}

fn scroll_down() -> ToolAction {
    ToolAction::Scroll(ScrollParams {
        amount: Some(100.0),
        ..ScrollParams::default()
    })
}

/// Receive until (and including) the terminal event.
async fn drain(rx: &mut broadcast::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event stream stalled")
            .expect("event channel closed");
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return events;
        }
    }
}

fn kinds(events: &[AgentEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind()).collect()
}

/// Blocks inside `decide` until released; hands out one fixed decision per
/// release.
struct GateDecider {
    entered: Notify,
    release: Notify,
    decision: Decision,
}

impl GateDecider {
    fn new(decision: Decision) -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            decision,
        })
    }
}

#[async_trait]
impl Decider for GateDecider {
    async fn decide(&self, _input: &DeciderInput) -> Result<Decision, AgentError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.decision.clone())
    }
}

/// Scrolls on every step and never declares done.
struct EndlessDecider;

#[async_trait]
impl Decider for EndlessDecider {
    async fn decide(&self, _input: &DeciderInput) -> Result<Decision, AgentError> {
        Ok(Decision::act(vec![scroll_down()]))
    }
}

/// Fails every decision outright.
struct FailingDecider;

#[async_trait]
impl Decider for FailingDecider {
    async fn decide(&self, _input: &DeciderInput) -> Result<Decision, AgentError> {
        Err(AgentError::Decider("model unavailable".to_string()))
    }
}

/// A host with no browser behind it.
struct DeadHost;

#[async_trait]
impl BrowserHost for DeadHost {
    async fn active_page(&self) -> Result<Arc<dyn PageContext>, BrowserError> {
        Err(BrowserError::NotConnected)
    }

    async fn open_page(&self, _url: &str) -> Result<Arc<dyn PageContext>, BrowserError> {
        Err(BrowserError::NotConnected)
    }
}

#[tokio::test]
async fn test_task_runs_decisions_to_done() {
    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision::act(vec![ToolAction::ClickElement(ClickParams {
            index: Some(1),
            ..ClickParams::default()
        })])
        .with_narrative(Narrative {
            next_goal: Some("press the button".to_string()),
            ..Narrative::default()
        }),
        Decision::finish(true, Some("pressed".to_string())),
    ]));
    let (orch, page) = orchestrator(decider);
    let mut rx = orch.subscribe();

    let id = orch.start_task("press the Go button").unwrap();
    let events = drain(&mut rx).await;

    assert!(events.iter().all(|e| e.task_id() == id));
    assert_eq!(
        kinds(&events),
        vec![
            "step-start",
            "thinking",
            "action-executed",
            "step-complete",
            "step-start",
            "thinking",
            "step-complete",
            "done",
        ]
    );
    match &events[1] {
        AgentEvent::Thinking { narrative, step, .. } => {
            assert_eq!(*step, 1);
            assert_eq!(narrative.next_goal.as_deref(), Some("press the button"));
        }
        other => panic!("expected thinking, got {other:?}"),
    }
    assert_eq!(page.clicks().len(), 1);

    let state = orch.status().unwrap();
    assert_eq!(state.id, id);
    assert_eq!(state.status, TaskStatus::Done);
    assert_eq!(state.steps.len(), 2);
    assert_eq!(state.steps[0].actions.len(), 1);
    assert_eq!(state.steps[0].actions[0].status, ActionStatus::Done);
    assert_eq!(
        state.done.as_ref().unwrap().result.as_deref(),
        Some("pressed")
    );
    assert!(state.finished_at.is_some());
}

#[tokio::test]
async fn test_start_rejected_while_task_running() {
    let gate = GateDecider::new(Decision::finish(true, None));
    let (orch, _) = orchestrator(gate.clone());
    let mut rx = orch.subscribe();

    let first = orch.start_task("first").unwrap();
    gate.entered.notified().await;

    // decide() is in flight, so the slot is occupied.
    assert!(matches!(orch.start_task("second"), Err(AgentError::Busy)));

    gate.release.notify_one();
    let events = drain(&mut rx).await;
    assert_eq!(events.last().unwrap().kind(), "done");

    // A finished slot is reclaimed.
    let third = orch.start_task("third").unwrap();
    assert_ne!(third, first);
    gate.release.notify_one();
    drain(&mut rx).await;
}

#[tokio::test]
async fn test_stop_request_ends_task_as_stopped() {
    let gate = GateDecider::new(Decision::act(vec![scroll_down()]));
    let (orch, _) = orchestrator(gate.clone());
    let mut rx = orch.subscribe();
    orch.start_task("scroll forever").unwrap();

    // Step 1 runs to completion.
    gate.entered.notified().await;
    gate.release.notify_one();

    // Step 2 is mid-decide when the stop lands; its actions never start.
    gate.entered.notified().await;
    assert!(orch.stop_task());
    gate.release.notify_one();

    let events = drain(&mut rx).await;
    assert_eq!(
        kinds(&events),
        vec![
            "step-start",
            "thinking",
            "action-executed",
            "step-complete",
            "step-start",
            "thinking",
            "step-complete",
            "stopped",
        ]
    );

    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Stopped);
    assert_eq!(state.steps.len(), 2);
    assert!(state.steps[1].actions.is_empty());
    assert!(
        state
            .steps
            .iter()
            .flat_map(|s| s.actions.iter())
            .all(|a| a.status != ActionStatus::Executing)
    );
    assert!(!orch.stop_task());
}

#[tokio::test]
async fn test_step_ceiling_fails_the_task() {
    let (orch, _) = orchestrator_with(
        Arc::new(EndlessDecider),
        OrchestratorConfig {
            max_steps: 3,
            ..OrchestratorConfig::default()
        },
    );
    let mut rx = orch.subscribe();
    orch.start_task("never finishes").unwrap();
    let events = drain(&mut rx).await;

    match events.last().unwrap() {
        AgentEvent::Error { message, step, .. } => {
            assert!(message.contains("step limit of 3"), "got: {message}");
            assert_eq!(*step, None);
        }
        other => panic!("expected error event, got {other:?}"),
    }
    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Error);
    assert_eq!(state.steps.len(), 3);
    assert!(state.error.as_ref().unwrap().contains("step limit"));
}

#[tokio::test]
async fn test_repeating_pattern_sets_progress_stalled() {
    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision::act(vec![scroll_down()]),
        Decision::act(vec![scroll_down()]),
        Decision::act(vec![scroll_down()]),
        Decision::act(vec![scroll_down()]),
        Decision::finish(true, None),
    ]));
    let (orch, _) = orchestrator(decider.clone());
    let mut rx = orch.subscribe();
    orch.start_task("scroll in place").unwrap();
    let events = drain(&mut rx).await;

    let seen = decider.seen();
    assert_eq!(seen.len(), 5);
    assert!(!seen[0].progress_stalled);
    assert!(!seen[1].progress_stalled);
    assert!(!seen[2].progress_stalled);
    // Three identical page/action pairs are on record by step 4.
    assert!(seen[3].progress_stalled);

    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Done);
    assert!(!state.steps[0].progress_stalled);
    assert!(state.steps[3].progress_stalled);

    let stalled_starts: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::StepStart {
                progress_stalled, ..
            } => Some(*progress_stalled),
            _ => None,
        })
        .collect();
    assert_eq!(stalled_starts, vec![false, false, false, true, true]);
}

#[tokio::test]
async fn test_perception_failure_is_task_fatal() {
    let session = Arc::new(AutomationSession::new(
        Arc::new(DeadHost),
        PerceptionConfig::default(),
        1_000,
    ));
    let decider = Arc::new(ScriptedDecider::new(vec![Decision::finish(true, None)]));
    let orch = Orchestrator::new(session, decider);
    let mut rx = orch.subscribe();
    orch.start_task("anything").unwrap();
    let events = drain(&mut rx).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        AgentEvent::Error { message, step, .. } => {
            assert!(message.contains("perception failed"), "got: {message}");
            assert_eq!(*step, None);
        }
        other => panic!("expected error event, got {other:?}"),
    }
    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Error);
    assert!(state.steps.is_empty());
}

#[tokio::test]
async fn test_tool_failure_does_not_end_the_task() {
    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision::act(vec![ToolAction::ClickElement(ClickParams {
            index: Some(99),
            ..ClickParams::default()
        })]),
        Decision::finish(true, None),
    ]));
    let (orch, _) = orchestrator(decider.clone());
    let mut rx = orch.subscribe();
    orch.start_task("click a ghost").unwrap();
    let events = drain(&mut rx).await;

    assert_eq!(events.last().unwrap().kind(), "done");
    let failed = events
        .iter()
        .find_map(|e| match e {
            AgentEvent::ActionExecuted { result, .. } => Some(result.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!failed.is_success());
    assert!(failed.error_message().contains("take a fresh snapshot"));

    // The next step's input carries the failure back to the decider.
    let seen = decider.seen();
    assert_eq!(seen[1].last_results.len(), 1);
    assert!(!seen[1].last_results[0].is_success());

    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Done);
    assert_eq!(state.steps[0].actions[0].status, ActionStatus::Error);
    assert_eq!(state.steps[0].status, StepStatus::Complete);
}

#[tokio::test]
async fn test_decider_error_fails_step_and_task() {
    let (orch, _) = orchestrator(Arc::new(FailingDecider));
    let mut rx = orch.subscribe();
    orch.start_task("anything").unwrap();
    let events = drain(&mut rx).await;

    assert_eq!(kinds(&events), vec!["step-start", "step-complete", "error"]);
    match &events[1] {
        AgentEvent::StepComplete { status, .. } => assert_eq!(*status, StepStatus::Error),
        other => panic!("expected step-complete, got {other:?}"),
    }
    match events.last().unwrap() {
        AgentEvent::Error { message, step, .. } => {
            assert!(message.contains("model unavailable"), "got: {message}");
            assert_eq!(*step, Some(1));
        }
        other => panic!("expected error event, got {other:?}"),
    }
    let state = orch.status().unwrap();
    assert_eq!(state.status, TaskStatus::Error);
    assert_eq!(state.steps[0].status, StepStatus::Error);
}

#[tokio::test]
async fn test_screenshots_attach_to_decider_snapshots_when_enabled() {
    let decider = Arc::new(ScriptedDecider::new(vec![Decision::finish(true, None)]));
    let (orch, page) = orchestrator_with(
        decider.clone(),
        OrchestratorConfig {
            capture_screenshots: true,
            ..OrchestratorConfig::default()
        },
    );
    let mut rx = orch.subscribe();
    orch.start_task("look").unwrap();
    drain(&mut rx).await;

    let seen = decider.seen();
    assert_eq!(seen[0].snapshot.screenshot.as_deref(), Some("ZmFrZQ=="));
    assert_eq!(page.screenshots(), vec!["png".to_string()]);
}

#[tokio::test]
async fn test_sequential_tasks_share_the_channel() {
    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision::finish(true, None),
        Decision::finish(true, None),
    ]));
    let (orch, _) = orchestrator(decider);
    let mut rx = orch.subscribe();

    let first = orch.start_task("one").unwrap();
    let first_events = drain(&mut rx).await;
    let second = orch.start_task("two").unwrap();
    let second_events = drain(&mut rx).await;

    assert_ne!(first, second);
    assert!(first_events.iter().all(|e| e.task_id() == first));
    assert!(second_events.iter().all(|e| e.task_id() == second));
}

#[tokio::test]
async fn test_status_is_empty_before_first_task() {
    let (orch, _) = orchestrator(Arc::new(ScriptedDecider::new(Vec::new())));
    assert!(orch.status().is_none());
    assert!(orch.current_task_id().is_none());
    assert!(!orch.stop_task());
}
