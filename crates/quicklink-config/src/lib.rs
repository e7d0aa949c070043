//! Shared configuration for quicklink.
//!
//! TOML profiles, access-token resolution (env + keyring + plaintext),
//! and translation to `quicklink_core::ConnectionConfig`. The CLI adds
//! `GlobalOpts`-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quicklink_core::{ConnectionConfig, TlsVerification};

/// Keyring service name under which tokens are stored.
pub const KEYRING_SERVICE: &str = "quicklink";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no access token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named Home Assistant profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Connect and per-command timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Link resolution timeout, seconds.
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            resolve_timeout: default_resolve_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_resolve_timeout() -> u64 {
    15
}

/// A named Home Assistant instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Instance base URL (e.g. "http://homeassistant.local:8123").
    pub url: String,

    /// Long-lived access token (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "quicklink", "quicklink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("quicklink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered over defaults and under
/// `QUICKLINK_`-prefixed environment variables
/// (`QUICKLINK_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("QUICKLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Resolve the access token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?
        .set_password(token)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Profile translation ─────────────────────────────────────────────

/// Parse and validate a profile URL.
pub fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

/// TLS mode for a profile; `insecure` wins over `ca_cert`.
pub fn tls_verification(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ConnectionConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    let url = parse_url(&profile.url)?;
    let token = resolve_token(profile, profile_name)?;

    let mut config = ConnectionConfig::new(url, token);
    config.tls = tls_verification(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.resolve_timeout = Duration::from_secs(defaults.resolve_timeout);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn profile(url: &str) -> Profile {
        Profile {
            url: url.into(),
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile_name(), "default");
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_and_defaults_load_from_toml() {
        let (_dir, path) = write_config(
            r#"
default_profile = "home"

[defaults]
output = "json"
resolve_timeout = 5

[profiles.home]
url = "http://homeassistant.local:8123"
token_env = "HASS_TOKEN"
timeout = 10
"#,
        );
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile_name(), "home");
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.resolve_timeout, 5);
        assert_eq!(config.defaults.color, "auto");

        let home = config.profile("home").unwrap();
        assert_eq!(home.token_env.as_deref(), Some("HASS_TOKEN"));
        assert_eq!(home.timeout, Some(10));
        assert!(matches!(
            config.profile("work"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut home = profile("https://ha.example.org");
        home.insecure = Some(true);
        config.profiles.insert("default".into(), home);
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let home = loaded.profile("default").unwrap();
        assert_eq!(home.url, "https://ha.example.org");
        assert_eq!(home.insecure, Some(true));
        assert!(home.token.is_none());
    }

    #[test]
    fn token_env_takes_priority_over_plaintext() {
        let mut p = profile("http://ha:8123");
        p.token_env = Some("PATH".into());
        p.token = Some("plaintext".into());
        let token = resolve_token(&p, "quicklink-test-env").unwrap();
        assert_eq!(token.expose_secret(), std::env::var("PATH").unwrap());
    }

    #[test]
    fn missing_token_is_reported() {
        let mut p = profile("http://ha:8123");
        p.token_env = Some("QUICKLINK_TEST_UNSET_TOKEN_VARIABLE".into());
        let result = resolve_token(&p, "quicklink-test-missing-profile");
        assert!(matches!(result, Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn connection_config_from_profile() {
        let mut p = profile("http://homeassistant.local:8123");
        p.token = Some("plaintext-token".into());
        p.ca_cert = Some(PathBuf::from("/etc/ha-ca.pem"));
        p.timeout = Some(12);
        let defaults = Defaults::default();

        let config = profile_to_connection_config(&p, "quicklink-test-plain", &defaults).unwrap();
        assert_eq!(config.url.as_str(), "http://homeassistant.local:8123/");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.resolve_timeout, Duration::from_secs(15));
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ha-ca.pem"))
        );
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let mut p = profile("https://ha");
        p.ca_cert = Some(PathBuf::from("/ca.pem"));
        p.insecure = Some(true);
        assert_eq!(
            tls_verification(&p, &Defaults::default()),
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn url_must_be_http() {
        assert!(parse_url("ws://ha:8123").is_err());
        assert!(parse_url("not a url").is_err());
        assert!(parse_url("https://ha.example.org").is_ok());
    }
}
