//! Browser core for webpilot: indexed DOM perception, the tool-action
//! executors, and the Chrome DevTools Protocol (CDP) backend they run
//! against.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐  PageContext   ┌─────────────────┐   WebSocket
//! │ AutomationSession │ ─────────────► │     CdpPage     │ ◄───────────► Chrome
//! │  (tool executors) │                │  (cdp backend)  │      CDP
//! └───────────────────┘                └─────────────────┘
//!          │                                    ▲
//!          │ dom::build_tree                    │ BrowserManager
//!          ▼                                    │ (launch/attach)
//!   indexed element tree ──► element registry ──┘
//! ```
//!
//! Perception walks a structured snapshot of the live DOM into a compact
//! indexed tree; actions address elements by those indices (or by CSS
//! selector, or coordinates) and resolve them back to live nodes through the
//! element registry. Everything an executor does to a page goes through the
//! [`PageContext`] trait, so the whole tool layer also runs against the
//! in-memory [`testing::FakePage`].
//!
//! ## Connecting
//!
//! [`BrowserManager`] attaches to a running browser's debug endpoint, or
//! launches one when none is listening:
//!
//! ```bash
//! # or let auto_launch start it:
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! Existing sessions (logins, cookies) are preserved when attaching to the
//! user's own browser.

pub mod cdp;
pub mod config;
pub mod dom;
mod error;
mod manager;
mod markdown;
mod page;
mod query;
pub mod testing;
mod tools;

pub use cdp::{CdpClient, CdpPage, PageSession};
pub use config::{BrowserConfig, PerceptionConfig, DEFAULT_PRESERVED_ATTRIBUTES};
pub use dom::{DomNodeData, DomSnapshotData, ElementRegistry};
pub use error::BrowserError;
pub use manager::BrowserManager;
pub use page::{
    BrowserHost, DropdownOption, ElementSummary, NodeHandle, PageContext, TypeOutcome,
};
pub use tools::AutomationSession;
