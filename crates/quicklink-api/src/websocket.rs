//! Authenticated Home Assistant WebSocket command channel.
//!
//! Connects to `/api/websocket`, performs the `auth_required` → `auth` →
//! `auth_ok` handshake, then spawns a reader and a writer task. Commands
//! are tagged with strictly increasing ids and their `result` frames are
//! routed back to the caller through a pending-request table.
//!
//! # Example
//!
//! ```rust,ignore
//! use quicklink_api::{HassClient, TransportConfig, websocket_url};
//!
//! let url = websocket_url(&"http://homeassistant.local:8123".parse()?)?;
//! let client = HassClient::connect(url, &token, &TransportConfig::default()).await?;
//! let entries = client.list_entries().await?;
//! client.close();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const OUTGOING_CHANNEL_CAPACITY: usize = 64;

// ── URL helpers ──────────────────────────────────────────────────────

/// Derive the WebSocket endpoint from an instance base URL.
///
/// `http://host:8123` becomes `ws://host:8123/api/websocket`, `https`
/// becomes `wss`. URLs that already use a `ws`/`wss` scheme keep it.
pub fn websocket_url(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::WebSocketConnect(format!(
                "unsupported URL scheme '{other}'"
            )));
        }
    };
    let host = base
        .host_str()
        .ok_or_else(|| Error::WebSocketConnect(format!("URL has no host: {base}")))?;
    let port = base.port().map(|p| format!(":{p}")).unwrap_or_default();
    let prefix = base.path().trim_end_matches('/');
    let prefix = prefix.strip_suffix("/api/websocket").unwrap_or(prefix);
    Ok(Url::parse(&format!(
        "{scheme}://{host}{port}{prefix}/api/websocket"
    ))?)
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for connection attempts.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the second attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Attempts after the first one before giving up. Default: 3.
    pub max_retries: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

// ── HassClient ───────────────────────────────────────────────────────

struct PendingCall {
    command: String,
    tx: oneshot::Sender<Result<Value, Error>>,
}

type PendingTable = DashMap<u64, PendingCall>;

/// Handle to an authenticated WebSocket connection.
///
/// Dropping the handle (or calling [`close`](Self::close)) stops the
/// background tasks; outstanding calls then fail with
/// [`Error::ConnectionClosed`].
pub struct HassClient {
    outgoing: mpsc::Sender<String>,
    pending: Arc<PendingTable>,
    next_id: AtomicU64,
    timeout: Duration,
    ha_version: Option<String>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for HassClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HassClient")
            .field("ha_version", &self.ha_version)
            .field("pending", &self.pending.len())
            .field("closed", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl HassClient {
    /// Connect and authenticate with a long-lived access token.
    pub async fn connect(
        ws_url: Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        info!(url = %ws_url, "connecting to Home Assistant");
        let connector = transport.websocket_connector()?;

        let connect = tokio_tungstenite::connect_async_tls_with_config(
            ws_url.as_str(),
            None,
            false,
            connector,
        );
        let (mut ws, _response) = tokio::time::timeout(transport.timeout, connect)
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: transport.timeout_secs(),
            })?
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        let ha_version = tokio::time::timeout(transport.timeout, authenticate(&mut ws, token))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: transport.timeout_secs(),
            })??;
        info!(version = ha_version.as_deref().unwrap_or("unknown"), "authenticated");

        let (outgoing, outgoing_rx) = mpsc::channel(OUTGOING_CHANNEL_CAPACITY);
        let pending = Arc::new(PendingTable::new());
        let cancel = CancellationToken::new();

        let (write, read) = ws.split();
        tokio::spawn(writer_loop(write, outgoing_rx, cancel.clone()));
        tokio::spawn(reader_loop(read, Arc::clone(&pending), cancel.clone()));

        Ok(Self {
            outgoing,
            pending,
            next_id: AtomicU64::new(1),
            timeout: transport.timeout,
            ha_version,
            cancel,
        })
    }

    /// Connect, retrying transient failures with exponential backoff.
    ///
    /// Authentication failures are returned immediately.
    pub async fn connect_with_retry(
        ws_url: Url,
        token: &SecretString,
        transport: &TransportConfig,
        reconnect: &ReconnectConfig,
    ) -> Result<Self, Error> {
        let mut attempt: u32 = 0;
        loop {
            match Self::connect(ws_url.clone(), token, transport).await {
                Ok(client) => return Ok(client),
                Err(e) if e.is_transient() && attempt < reconnect.max_retries => {
                    let delay = calculate_backoff(attempt, reconnect);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Version reported by the server in `auth_ok`, if any.
    pub fn ha_version(&self) -> Option<&str> {
        self.ha_version.as_deref()
    }

    /// `true` once the connection has been closed from either side.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Send a command and wait for its `result` frame.
    ///
    /// `payload` must serialize to a JSON object (or `null`); its fields
    /// are merged into the command frame next to `id` and `type`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        command: &str,
        payload: impl Serialize,
    ) -> Result<T, Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::ConnectionClosed {
                reason: "connection is closed".into(),
            });
        }

        let mut frame = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return Err(Error::Deserialization {
                    message: format!("command payload for {command} is not an object"),
                    body: other.to_string(),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: e.to_string(),
                    body: String::new(),
                });
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        frame.insert("id".into(), json!(id));
        frame.insert("type".into(), json!(command));
        let text = Value::Object(frame).to_string();

        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            id,
            PendingCall {
                command: command.to_owned(),
                tx,
            },
        );
        // The reader may have failed the table between the check above
        // and the insert.
        if self.cancel.is_cancelled() {
            self.pending.remove(&id);
            return Err(Error::ConnectionClosed {
                reason: "connection is closed".into(),
            });
        }

        debug!(id, command, "sending command");
        if self.outgoing.send(text).await.is_err() {
            self.pending.remove(&id);
            return Err(Error::ConnectionClosed {
                reason: "connection is closed".into(),
            });
        }

        let value = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result?,
            Ok(Err(_)) => {
                return Err(Error::ConnectionClosed {
                    reason: "connection dropped before a reply arrived".into(),
                });
            }
            Err(_) => {
                self.pending.remove(&id);
                return Err(Error::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
            message: format!("{e} (command {command})"),
            body: value.to_string(),
        })
    }

    /// Stop the background tasks and close the socket.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for HassClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Handshake ────────────────────────────────────────────────────────

/// Read the next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut WsStream) -> Result<Value, Error> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(text.as_str()).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: text.to_string(),
                });
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(Error::ConnectionClosed {
                    reason: "closed during handshake".into(),
                });
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
        }
    }
}

fn message_type(value: &Value) -> &str {
    value["type"].as_str().unwrap_or("")
}

async fn authenticate(ws: &mut WsStream, token: &SecretString) -> Result<Option<String>, Error> {
    let hello = next_json(ws).await?;
    if message_type(&hello) != "auth_required" {
        return Err(Error::Handshake {
            expected: "auth_required".into(),
            got: message_type(&hello).into(),
        });
    }

    let auth = json!({ "type": "auth", "access_token": token.expose_secret() });
    ws.send(Message::Text(auth.to_string().into()))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    let reply = next_json(ws).await?;
    match message_type(&reply) {
        "auth_ok" => Ok(reply["ha_version"].as_str().map(String::from)),
        "auth_invalid" => Err(Error::Authentication {
            message: reply["message"]
                .as_str()
                .unwrap_or("access token rejected")
                .to_owned(),
        }),
        other => Err(Error::Handshake {
            expected: "auth_ok".into(),
            got: other.into(),
        }),
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn writer_loop(
    mut write: futures_util::stream::SplitSink<WsStream, Message>,
    mut rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = write.send(Message::Text(frame.into())).await {
                    warn!(error = %e, "WebSocket write failed");
                    cancel.cancel();
                    break;
                }
            }
        }
    }
    let _ = write.close().await;
    debug!("WebSocket writer exiting");
}

async fn reader_loop(
    mut read: futures_util::stream::SplitStream<WsStream>,
    pending: Arc<PendingTable>,
    cancel: CancellationToken,
) {
    let reason = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break "connection closed by client".to_owned(),
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => route_frame(text.as_str(), &pending),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|cf| format!("close frame {}: {}", cf.code, cf.reason))
                        .unwrap_or_else(|| "close frame".to_owned());
                    info!(%reason, "WebSocket closed by server");
                    break reason;
                }
                Some(Ok(_)) => trace!("ignoring non-text frame"),
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket read failed");
                    break e.to_string();
                }
                None => break "stream ended".to_owned(),
            }
        }
    };

    cancel.cancel();
    fail_pending(&pending, &reason);
    debug!("WebSocket reader exiting");
}

/// Route a `result` frame to the caller waiting on its id.
fn route_frame(text: &str, pending: &PendingTable) {
    let frame: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "failed to parse WebSocket frame");
            return;
        }
    };

    if message_type(&frame) != "result" {
        trace!(kind = message_type(&frame), "ignoring non-result frame");
        return;
    }

    let Some(id) = frame["id"].as_u64() else {
        debug!("result frame without id");
        return;
    };
    let Some((_, call)) = pending.remove(&id) else {
        debug!(id, "result for unknown or expired request");
        return;
    };

    let result = if frame["success"].as_bool().unwrap_or(false) {
        Ok(frame.get("result").cloned().unwrap_or(Value::Null))
    } else {
        let error = &frame["error"];
        Err(Error::Command {
            command: call.command,
            code: error["code"].as_str().unwrap_or("unknown_error").to_owned(),
            message: error["message"].as_str().unwrap_or_default().to_owned(),
        })
    };

    // The caller may have timed out and gone away.
    let _ = call.tx.send(result);
}

fn fail_pending(pending: &PendingTable, reason: &str) {
    let ids: Vec<u64> = pending.iter().map(|r| *r.key()).collect();
    for id in ids {
        if let Some((_, call)) = pending.remove(&id) {
            let _ = call.tx.send(Err(Error::ConnectionClosed {
                reason: reason.to_owned(),
            }));
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(16)).unwrap_or(16);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────
