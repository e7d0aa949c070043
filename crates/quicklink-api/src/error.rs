use thiserror::Error;

/// Top-level error type for the `quicklink-api` crate.
///
/// Covers every failure mode of the Home Assistant surfaces this crate
/// talks to: the WebSocket command channel and the REST probe.
/// `quicklink-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The access token was rejected during the WebSocket handshake
    /// or by the REST API.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server sent something other than the expected handshake frame.
    #[error("Unexpected handshake message: expected {expected}, got {got}")]
    Handshake { expected: String, got: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed while requests were outstanding.
    #[error("WebSocket closed: {reason}")]
    ConnectionClosed { reason: String },

    // ── Commands ────────────────────────────────────────────────────
    /// The server answered a command with `success: false`.
    #[error("Command {command} failed ({code}): {message}")]
    Command {
        command: String,
        code: String,
        message: String,
    },

    /// Non-success HTTP status from the REST API.
    #[error("REST API error (HTTP {status}): {message}")]
    Rest { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON (de)serialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token was rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) | Self::ConnectionClosed { .. } => {
                true
            }
            _ => false,
        }
    }

    /// The remote error code for a failed command, if any.
    pub fn command_error_code(&self) -> Option<&str> {
        match self {
            Self::Command { code, .. } => Some(code),
            _ => None,
        }
    }
}
