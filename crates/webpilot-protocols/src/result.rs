//! Tool execution result type.

use serde::{Deserialize, Serialize};

/// Outcome of a single tool action.
///
/// `error` is only ever present on failure; a successful result carries its
/// payload in `data` and no error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the action achieved its effect.
    pub success: bool,

    /// Structured payload (shape depends on the action).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Failure message when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result with a structured payload.
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful result with no payload.
    pub fn success_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failed result with a message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Failed result that also carries partial payload (e.g. a batch fill
    /// where some fields went through).
    pub fn failure_with_data(error: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Error text, or an empty string for successful results.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
