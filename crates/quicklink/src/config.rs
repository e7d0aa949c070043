//! CLI configuration: thin wrapper around `quicklink_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--url`, `--token`, `--insecure`, `--timeout`).

use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

use quicklink_core::{ConnectionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use quicklink_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `ConnectionConfig` from the config file, active profile, and
/// CLI overrides. Flags alone (`--url` + `--token`) suffice when no
/// profile exists.
pub fn build_connection_config(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let cfg = load_config_or_warn();
    let profile_name = active_profile_name(global, &cfg);

    let mut conn = match cfg.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, &cfg, global)?,
        None => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            from_flags(global, &profile_name)?
        }
    };

    conn.resolve_timeout = Duration::from_secs(cfg.defaults.resolve_timeout);
    Ok(conn)
}

/// Like `load_config_or_default`, but says why the file was ignored.
fn load_config_or_warn() -> Config {
    quicklink_config::load_config().unwrap_or_else(|e| {
        warn!(
            path = %config_path().display(),
            error = %e,
            "ignoring unreadable config file"
        );
        Config::default()
    })
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    let url = quicklink_config::parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => quicklink_config::resolve_token(profile, profile_name)?,
    };

    let mut conn = ConnectionConfig::new(url, token);
    conn.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        quicklink_config::tls_verification(profile, &cfg.defaults)
    };
    conn.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(cfg.defaults.timeout),
    );
    Ok(conn)
}

fn from_flags(global: &GlobalOpts, profile_name: &str) -> Result<ConnectionConfig, CliError> {
    let raw_url = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = quicklink_config::parse_url(raw_url)?;

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.to_owned(),
        })?;

    let mut conn = ConnectionConfig::new(url, token);
    if global.insecure {
        conn.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        conn.timeout = Duration::from_secs(secs);
    }
    Ok(conn)
}
