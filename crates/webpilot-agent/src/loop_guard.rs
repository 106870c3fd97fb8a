//! Non-progress detection.
//!
//! The guard keeps a rolling window of `(page fingerprint, action signature)`
//! pairs, one per step. The same pair coming back means the agent keeps
//! seeing the same page and keeps choosing the same plan. The observation is
//! advisory: it sets `progress_stalled` on the step and in the decider's
//! input, and never fails the task on its own.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use webpilot_protocols::{PageSnapshot, ToolAction};

/// Steps of history the guard looks back over.
pub const WINDOW: usize = 8;

/// Occurrences of one pair within the window that flag a stall.
pub const THRESHOLD: usize = 3;

/// Structural signature of one perceived page state.
pub fn page_fingerprint(snapshot: &PageSnapshot) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.url.hash(&mut hasher);
    snapshot.element_count().hash(&mut hasher);
    snapshot.tree_text.hash(&mut hasher);
    hasher.finish()
}

/// Signature of one step's decided actions, order preserved.
pub fn action_signature(actions: &[ToolAction]) -> u64 {
    let mut hasher = DefaultHasher::new();
    actions.len().hash(&mut hasher);
    for action in actions {
        match serde_json::to_string(action) {
            Ok(wire) => wire.hash(&mut hasher),
            Err(_) => action.name().hash(&mut hasher),
        }
    }
    hasher.finish()
}

/// Rolling repetition detector; one instance per task.
#[derive(Debug)]
pub struct LoopGuard {
    window: VecDeque<(u64, u64)>,
    stalled: bool,
}

impl LoopGuard {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW),
            stalled: false,
        }
    }

    /// Record one step's pair and re-evaluate the window.
    pub fn record(&mut self, fingerprint: u64, signature: u64) {
        if self.window.len() == WINDOW {
            self.window.pop_front();
        }
        self.window.push_back((fingerprint, signature));
        self.stalled = self
            .window
            .iter()
            .any(|pair| self.window.iter().filter(|p| *p == pair).count() >= THRESHOLD);
    }

    /// Whether the window currently holds a repeating pair. Reflects
    /// observations up to the last `record`, so the flag reaches the decider
    /// on the step after the repetition completed.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    /// Forget everything; a new task starts clean.
    pub fn reset(&mut self) {
        self.window.clear();
        self.stalled = false;
    }
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "loop_guard_tests.rs"]
mod tests;
