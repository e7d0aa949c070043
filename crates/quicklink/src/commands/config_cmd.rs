//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Mask plaintext tokens in place.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "default_profile = \"{}\"", cfg.default_profile_name());
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "resolve_timeout = {}", cfg.defaults.resolve_timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("Long-lived access token: ").map_err(prompt_err)?;
    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "access token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Offer to store the token in the system keyring.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in
/// the keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        quicklink_config::store_token(profile_name, token)?;
        eprintln!("   ✓ token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.default_profile_name().to_owned()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let token = prompt_token()?;
            quicklink_config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token for profile '{profile_name}' stored in system keyring");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: quicklink config init");
                return Ok(());
            }
            let default = cfg.default_profile_name();
            let lines: Vec<String> = cfg
                .profiles
                .iter()
                .map(|(name, p)| {
                    let marker = if name == default { " *" } else { "" };
                    format!("{name}{marker}\t{}", p.url)
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, merged into any existing config.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("quicklink configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Home Assistant URL")
        .default("http://homeassistant.local:8123".into())
        .validate_with(|input: &String| -> Result<(), String> {
            quicklink_config::parse_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let token = prompt_token()?;
    let token_field = prompt_token_storage(&token, &profile_name)?;

    let insecure = url.starts_with("https")
        && Confirm::new()
            .with_prompt("Accept self-signed certificates?")
            .default(false)
            .interact()
            .map_err(prompt_err)?;

    let profile = Profile {
        url,
        token: token_field,
        token_env: None,
        ca_cert: None,
        insecure: insecure.then_some(true),
        timeout: None,
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    let written = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: quicklink status");
    Ok(())
}
