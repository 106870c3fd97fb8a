//! Session plumbing: command dispatch over the shared WebSocket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::SinkExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use crate::cdp::client::{PendingRequest, WsSink};
use crate::cdp::protocol::CdpRequest;
use crate::error::BrowserError;

/// A session attached to a single page target.
///
/// Shares the client's WebSocket; every command carries this session's id so
/// the browser routes it to the right target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    request_id: Arc<AtomicU64>,
    command_timeout: Duration,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
        request_id: Arc<AtomicU64>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
            command_timeout,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page target.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: Some(self.session_id.clone()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP session send: {}", json);

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(BrowserError::Timeout(self.command_timeout.as_millis() as u64))
            }
        }
    }

    /// Enable the CDP domains perception and input rely on.
    pub(crate) async fn enable_domains(&self) -> Result<(), BrowserError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}
