//! Chrome DevTools Protocol (CDP) backend.
//!
//! A pure Rust CDP client: one WebSocket to the browser endpoint, flat
//! per-target sessions multiplexed over it, and a [`PageContext`]
//! implementation on top.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect and automate:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://localhost:9222", timeout).await?;
//!    let session = client.new_page("https://example.com").await?;
//!    ```
//!
//! [`PageContext`]: crate::page::PageContext

mod client;
mod page;
pub mod protocol;
mod scripts;
mod session;
mod snapshot;

pub use client::CdpClient;
pub use page::CdpPage;
pub use protocol::{BrowserVersion, PageInfo};
pub use session::PageSession;
