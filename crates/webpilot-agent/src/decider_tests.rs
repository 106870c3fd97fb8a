use super::*;
use webpilot_protocols::{ScrollInfo, ScrollParams};

fn input(step: u32) -> DeciderInput {
    DeciderInput {
        instruction: "find the pricing page".to_string(),
        step,
        snapshot: PageSnapshot {
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            tree_text: String::new(),
            elements: Vec::new(),
            scroll: ScrollInfo::default(),
            generation: 1,
            screenshot: None,
        },
        last_results: Vec::new(),
        progress_stalled: false,
    }
}

#[tokio::test]
async fn test_scripted_decider_replays_in_order() {
    let decider = ScriptedDecider::new(vec![
        Decision::act(vec![ToolAction::Scroll(ScrollParams::default())]),
        Decision::finish(true, Some("done".to_string())),
    ]);
    assert_eq!(decider.remaining(), 2);

    let first = decider.decide(&input(1)).await.unwrap();
    assert_eq!(first.actions.len(), 1);
    assert!(first.done.is_none());

    let second = decider.decide(&input(2)).await.unwrap();
    assert!(second.actions.is_empty());
    assert!(second.done.unwrap().success);
    assert_eq!(decider.remaining(), 0);

    let seen = decider.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].step, 1);
    assert_eq!(seen[1].step, 2);
}

#[tokio::test]
async fn test_exhausted_script_gives_up_cleanly() {
    let decider = ScriptedDecider::new(Vec::new());
    let decision = decider.decide(&input(1)).await.unwrap();
    let done = decision.done.expect("exhaustion must end the task");
    assert!(!done.success);
    assert!(done.result.unwrap().contains("exhausted"));
}

#[test]
fn test_decision_wire_shape() {
    let json = r#"{
        "narrative": {"thinking": "scroll to see more", "next_goal": "reach the footer"},
        "actions": [{"tool": "scroll", "params": {"direction": "down", "amount": 400}}]
    }"#;
    let decision: Decision = serde_json::from_str(json).unwrap();
    assert_eq!(
        decision.narrative.thinking.as_deref(),
        Some("scroll to see more")
    );
    assert_eq!(decision.actions.len(), 1);
    assert!(decision.done.is_none());

    let done: Decision =
        serde_json::from_str(r#"{"done": {"success": true, "result": "found it"}}"#).unwrap();
    assert!(done.actions.is_empty());
    assert_eq!(done.done.unwrap().result.as_deref(), Some("found it"));
}

#[test]
fn test_decision_round_trips() {
    let decision = Decision::act(vec![ToolAction::Scroll(ScrollParams::default())])
        .with_narrative(Narrative {
            thinking: Some("down we go".to_string()),
            ..Narrative::default()
        });
    let wire = serde_json::to_string(&decision).unwrap();
    let back: Decision = serde_json::from_str(&wire).unwrap();
    assert_eq!(back, decision);
}
