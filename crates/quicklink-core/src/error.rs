// ── Core error types ──
//
// User-facing errors from quicklink-core. Consumers never see raw
// WebSocket frames or JSON parse failures directly; the
// `From<quicklink_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Home Assistant at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Connection to Home Assistant lost: {reason}")]
    Disconnected { reason: String },

    #[error("Home Assistant did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Model errors ─────────────────────────────────────────────────
    #[error("Unknown link type: {link_type}")]
    UnknownLinkType { link_type: String },

    #[error("Entry cannot be saved: {reason}")]
    NotSaveable { reason: String },

    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },

    #[error("Link index {index} out of range (entry has {len} links)")]
    LinkIndexOutOfRange { index: usize, len: usize },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Link resolution failed: {message}")]
    ResolverFailed { message: String },

    #[error("Entry store request failed: {message}")]
    StoreFailed { message: String },

    /// A command the server answered with `success: false`.
    #[error("Home Assistant rejected the request: {message}")]
    Api {
        message: String,
        /// Remote error code (e.g. `not_found`, `invalid_format`).
        code: Option<String>,
        /// HTTP status code, for REST failures.
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for failures where the remote side was never reached or
    /// went away mid-request.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Disconnected { .. } | Self::Timeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<quicklink_api::Error> for CoreError {
    fn from(err: quicklink_api::Error) -> Self {
        match err {
            quicklink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            quicklink_api::Error::Handshake { expected, got } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("unexpected handshake (expected {expected}, got {got})"),
            },
            quicklink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            quicklink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            quicklink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            quicklink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            quicklink_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            quicklink_api::Error::ConnectionClosed { reason } => {
                CoreError::Disconnected { reason }
            }
            quicklink_api::Error::Command {
                command,
                code,
                message,
            } => CoreError::Api {
                message: if message.is_empty() {
                    format!("{command} failed")
                } else {
                    message
                },
                code: Some(code),
                status: None,
            },
            quicklink_api::Error::Rest { status, message } => CoreError::Api {
                message,
                code: None,
                status: Some(status),
            },
            quicklink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
