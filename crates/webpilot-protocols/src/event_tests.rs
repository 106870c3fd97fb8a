use super::*;
use uuid::Uuid;

fn sample_id() -> TaskId {
    Uuid::new_v4()
}

#[test]
fn test_event_tag_names() {
    let id = sample_id();
    let event = AgentEvent::StepStart {
        task_id: id,
        step: 1,
        url: "https://example.com".to_string(),
        progress_stalled: false,
        timestamp: Utc::now(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "step-start");
    assert_eq!(json["task_id"], id.to_string());

    let event = AgentEvent::ActionExecuted {
        task_id: id,
        step: 1,
        action_index: 0,
        tool: "click-element".to_string(),
        result: ToolResult::success_empty(),
        timestamp: Utc::now(),
    };
    assert_eq!(serde_json::to_value(&event).unwrap()["event"], "action-executed");
}

#[test]
fn test_kind_matches_serialized_tag() {
    let id = sample_id();
    let events = [
        AgentEvent::Thinking {
            task_id: id,
            step: 2,
            narrative: Narrative::default(),
            timestamp: Utc::now(),
        },
        AgentEvent::StepComplete {
            task_id: id,
            step: 2,
            status: StepStatus::Complete,
            timestamp: Utc::now(),
        },
        AgentEvent::Done {
            task_id: id,
            success: true,
            result: Some("found it".to_string()),
            steps: 3,
            timestamp: Utc::now(),
        },
        AgentEvent::Error {
            task_id: id,
            message: "browser connection lost".to_string(),
            step: Some(3),
            timestamp: Utc::now(),
        },
        AgentEvent::Stopped {
            task_id: id,
            steps: 1,
            timestamp: Utc::now(),
        },
    ];
    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.kind());
        assert_eq!(event.task_id(), id);
    }
}

#[test]
fn test_terminal_classification() {
    let id = sample_id();
    let done = AgentEvent::Done {
        task_id: id,
        success: false,
        result: None,
        steps: 0,
        timestamp: Utc::now(),
    };
    assert!(done.is_terminal());

    let start = AgentEvent::StepStart {
        task_id: id,
        step: 1,
        url: String::new(),
        progress_stalled: false,
        timestamp: Utc::now(),
    };
    assert!(!start.is_terminal());
}

#[test]
fn test_round_trip() {
    let event = AgentEvent::Stopped {
        task_id: sample_id(),
        steps: 4,
        timestamp: Utc::now(),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: AgentEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
