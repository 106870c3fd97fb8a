//! CDP client: owns the browser WebSocket and routes responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::error::BrowserError;

use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use super::session::PageSession;

pub(crate) type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A command waiting for its response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, BrowserError>>,
}

/// Connection to a browser's DevTools endpoint.
///
/// All page sessions share this client's WebSocket; responses are matched to
/// callers by request id. Event frames are logged and dropped, page state is
/// read by polling.
pub struct CdpClient {
    /// HTTP endpoint, e.g. `http://127.0.0.1:9222`.
    http_endpoint: String,
    /// WebSocket sender (shared with sessions).
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Request id counter (shared with sessions).
    request_id: Arc<AtomicU64>,
    /// Pending requests (shared with sessions).
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    /// Per-command response deadline.
    command_timeout: Duration,
    /// Reader task; aborted on drop.
    _recv_task: JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a browser debug endpoint (`http://host:port`).
    pub async fn connect(endpoint: &str, command_timeout: Duration) -> Result<Self, BrowserError> {
        let version_url = format!("{}/json/version", endpoint);
        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|_| BrowserError::EndpointUnreachable(endpoint.to_string()))?
            .json()
            .await?;

        debug!(browser = %version.browser, "connecting to browser WebSocket");

        let (stream, _) = connect_async(&version.web_socket_debugger_url).await?;
        let (ws_tx, ws_rx) = stream.split();

        let pending: Arc<Mutex<HashMap<u64, PendingRequest>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let recv_task = tokio::spawn(Self::receive_loop(ws_rx, Arc::clone(&pending)));

        Ok(Self {
            http_endpoint: endpoint.to_string(),
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_tx)),
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            command_timeout,
            _recv_task: recv_task,
        })
    }

    /// Read incoming frames until the socket closes.
    async fn receive_loop(mut ws_rx: WsStream, pending: Arc<Mutex<HashMap<u64, PendingRequest>>>) {
        while let Some(msg) = ws_rx.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) | Err(_) => break,
                _ => continue,
            };

            let response: CdpResponse = match serde_json::from_str(&text) {
                Ok(r) => r,
                Err(err) => {
                    warn!("unparseable CDP message: {}", err);
                    continue;
                }
            };

            if let Some(id) = response.id {
                if let Some(request) = pending.lock().remove(&id) {
                    let outcome = match response.error {
                        Some(e) => Err(BrowserError::Protocol {
                            code: e.code,
                            message: e.message,
                        }),
                        None => Ok(response.result.unwrap_or(Value::Null)),
                    };
                    let _ = request.tx.send(outcome);
                }
            } else if let Some(method) = response.method.as_deref() {
                trace!("CDP event: {}", method);
            }
        }

        debug!("CDP WebSocket closed");
        for (_, request) in pending.lock().drain() {
            let _ = request.tx.send(Err(BrowserError::SessionClosed));
        }
    }

    /// Send a browser-level CDP command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: None,
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
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

    /// List open pages via the /json/list endpoint.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, BrowserError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages.into_iter().filter(|p| p.page_type == "page").collect())
    }

    /// Open a new tab at `url` and attach to it.
    pub async fn new_page(&self, url: &str) -> Result<PageSession, BrowserError> {
        let endpoint = format!("{}/json/new?{}", self.http_endpoint, url);
        let client = reqwest::Client::new();
        let info: PageInfo = client.put(&endpoint).send().await?.json().await?;

        debug!(target_id = %info.id, %url, "opened new page");
        self.attach_page(&info.id).await
    }

    /// Attach a flat session to an existing page target.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, BrowserError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true,
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            Arc::clone(&self.ws_tx),
            Arc::clone(&self.pending),
            Arc::clone(&self.request_id),
            self.command_timeout,
        );
        session.enable_domains().await?;
        Ok(session)
    }

    /// Bring a tab to the foreground.
    pub async fn activate_page(&self, target_id: &str) -> Result<(), BrowserError> {
        self.call("Target.activateTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
