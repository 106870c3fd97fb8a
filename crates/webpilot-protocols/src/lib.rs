//! # WebPilot Protocols
//!
//! Wire-level types shared by the browser core, the step orchestrator, and
//! anything driving them: the closed tool-action catalog, tool results, page
//! snapshots with indexed elements, and the agent event stream.
//!
//! Everything here is plain data. Execution lives in `webpilot-browser`,
//! the task loop in `webpilot-agent`.

pub mod action;
pub mod event;
pub mod result;
pub mod snapshot;
pub mod task;

pub use action::{
    CaptureFormat, CaptureParams, ClickParams, DropdownTargetParams, ElementTarget,
    EvaluateJsParams, ExtractLinksParams, FillFormParams, FindElementsParams, FormField,
    GetElementsParams, GetPageMetadataParams, GetPageTextParams, GoBackParams, HighlightParams,
    NavigateParams, ScrollDirection, ScrollParams, SearchPageParams, SelectDropdownOptionParams,
    SendKeysParams, TargetError, ToolAction, TypeTextParams, WaitForElementParams,
    WaitForNavigationParams, TOOL_NAMES,
};
pub use event::AgentEvent;
pub use result::ToolResult;
pub use snapshot::{IndexedElement, PageSnapshot, Rect, ScrollInfo};
pub use task::{
    ActionExecution, ActionStatus, DoneResult, Narrative, StepRecord, StepStatus, TaskId,
    TaskState, TaskStatus,
};
