//! CDP WebSocket client.

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
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Per-command response timeout.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests waiting for their response, keyed by request id.
#[derive(Default)]
pub(crate) struct PendingRequests {
    inner: Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>,
}

impl PendingRequests {
    fn register(&self, id: u64) -> oneshot::Receiver<Result<Value, CdpError>> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().insert(id, tx);
        rx
    }

    fn forget(&self, id: u64) {
        self.inner.lock().remove(&id);
    }

    /// Hand a response to its waiting caller. Events are ignored.
    fn resolve(&self, response: CdpResponse) {
        let Some(id) = response.id else {
            if let Some(method) = response.method {
                trace!("CDP event {} ({:?})", method, response.session_id);
            }
            return;
        };

        let Some(tx) = self.inner.lock().remove(&id) else {
            debug!("Response for unknown request {}", id);
            return;
        };

        let result = match response.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        };
        let _ = tx.send(result);
    }

    /// Drop every sender so waiting callers see `SessionClosed`.
    fn clear(&self) {
        self.inner.lock().clear();
    }
}

/// The browser WebSocket, shared by the client and every page session.
pub(crate) struct Connection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    next_id: AtomicU64,
    pending: PendingRequests,
}

impl Connection {
    /// Send one command and wait for its response.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let rx = self.pending.register(id);
        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.forget(id);
            return Err(e.into());
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.forget(id);
                Err(CdpError::Timeout(format!("{} timed out", method)))
            }
        }
    }
}

/// CDP client for one browser instance.
pub struct CdpClient {
    http_endpoint: String,
    browser: String,
    conn: Arc<Connection>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at `endpoint` (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        let ws_url = url::Url::parse(&version.web_socket_debugger_url)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let conn = Arc::new(Connection {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            next_id: AtomicU64::new(1),
            pending: PendingRequests::default(),
        });

        let recv_task = {
            let conn = conn.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, &conn).await;
                conn.pending.clear();
            })
        };

        debug!("Connected to {} (protocol {})", version.browser, version.protocol_version);

        Ok(Self {
            http_endpoint,
            browser: version.browser,
            conn,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, conn: &Connection) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => conn.pending.resolve(resp),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Browser product string, e.g. `Chrome/126.0.6478.126`.
    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// Send a browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.send(method, params, None).await
    }

    /// Open a new tab and attach a flattened session to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new", self.http_endpoint);
        let page_info: PageInfo = reqwest::Client::new()
            .put(&create_url)
            .send()
            .await?
            .json()
            .await?;
        debug!("Created {} target {}", page_info.page_type, page_info.id);

        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": page_info.id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(page_info.id, session_id, self.conn.clone());
        session.enable_domains().await?;
        Ok(session)
    }

    /// Close a page target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
