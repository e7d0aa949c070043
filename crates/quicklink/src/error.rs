//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use quicklink_config::ConfigError;
use quicklink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Home Assistant at {url}")]
    #[diagnostic(
        code(quicklink::connection_failed),
        help(
            "Check that Home Assistant is running and reachable.\n\
             Reason: {reason}\n\
             Try: quicklink status --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Connection to Home Assistant was lost")]
    #[diagnostic(code(quicklink::disconnected), help("{reason}"))]
    Disconnected { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(quicklink::auth_failed),
        help(
            "Create a long-lived access token under your Home Assistant user profile,\n\
             then run: quicklink config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(quicklink::no_credentials),
        help(
            "Configure one with: quicklink config init\n\
             Or set the QUICKLINK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Entry '{entry_id}' not found")]
    #[diagnostic(
        code(quicklink::not_found),
        help("Run: quicklink entries list to see stored entries")
    )]
    EntryNotFound { entry_id: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Home Assistant error ({code}): {message}")]
    #[diagnostic(code(quicklink::api_error))]
    ApiError { code: String, message: String },

    #[error("Link resolution failed: {message}")]
    #[diagnostic(
        code(quicklink::resolve_failed),
        help("Check that both targets exist, or raise resolve_timeout in the config.")
    )]
    ResolveFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(quicklink::validation))]
    Validation { field: String, reason: String },

    #[error("Entry cannot be saved: {reason}")]
    #[diagnostic(
        code(quicklink::not_saveable),
        help("Every entry needs a source, a destination and at least one link type.")
    )]
    NotSaveable { reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(quicklink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: quicklink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(quicklink::no_config),
        help(
            "Create one with: quicklink config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(code(quicklink::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(quicklink::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(quicklink::timeout),
        help("Increase timeout with --timeout or check instance responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    #[diagnostic(code(quicklink::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(quicklink::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    #[diagnostic(code(quicklink::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::EntryNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NotSaveable { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Disconnected { reason } => CliError::Disconnected { reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::EntryNotFound { entry_id } => CliError::EntryNotFound { entry_id },
            CoreError::NotSaveable { reason } => CliError::NotSaveable { reason },
            CoreError::UnknownLinkType { link_type } => CliError::Validation {
                field: "link type".into(),
                reason: format!("unknown link type '{link_type}' (see: quicklink links types)"),
            },
            CoreError::LinkIndexOutOfRange { index, len } => CliError::Validation {
                field: "link".into(),
                reason: format!("index {index} out of range ({len} links)"),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::ResolverFailed { message } => CliError::ResolveFailed { message },
            CoreError::StoreFailed { message } => CliError::ApiError {
                code: "store_failed".into(),
                message,
            },
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Config {
            message: err.to_string(),
        }
    }
}
