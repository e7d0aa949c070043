// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Home Assistant instance. They
// carry the access token and connection tuning, but never touch disk.
// The CLI constructs a `ConnectionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled root store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single Home Assistant instance.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Instance base URL (e.g. `http://homeassistant.local:8123`).
    pub url: Url,
    /// Long-lived access token.
    pub token: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Connect and per-command timeout.
    pub timeout: Duration,
    /// Upper bound on a single link resolution round trip.
    pub resolve_timeout: Duration,
    /// Connection attempts after the first before giving up.
    pub connect_retries: u32,
}

impl ConnectionConfig {
    /// Config with default tuning for the given instance and token.
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            resolve_timeout: Duration::from_secs(15),
            connect_retries: 2,
        }
    }
}
