//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use quicklink_core::{LinkType, Target, catalog};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses instead of prompting when stdin is not a terminal.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Spinner on stderr while waiting on Home Assistant. Hidden when quiet
/// or when stderr is not a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Parse a `--source` / `--destination` value.
pub fn parse_target(flag: &str, raw: &str) -> Result<Target, CliError> {
    raw.parse()
        .map_err(|e: quicklink_core::CoreError| CliError::Validation {
            field: flag.into(),
            reason: e.to_string(),
        })
}

pub fn parse_link_type(raw: &str) -> Result<LinkType, CliError> {
    Ok(LinkType::parse(raw.trim())?)
}

/// Parse a link type for `--reverse` / `--no-reverse`.
pub fn parse_reversible(raw: &str) -> Result<LinkType, CliError> {
    let descriptor = catalog::describe_str(raw.trim())?;
    if !descriptor.supports_reverse {
        return Err(CliError::Validation {
            field: "reverse".into(),
            reason: format!("{} links cannot be reversed", descriptor.link_type),
        });
    }
    Ok(descriptor.link_type)
}

/// Split a `TYPE=VALUE` flag value. The value may be empty.
pub fn parse_assignment<'a>(flag: &str, raw: &'a str) -> Result<(LinkType, &'a str), CliError> {
    let (ty, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: flag.into(),
        reason: format!("expected TYPE=VALUE, got '{raw}'"),
    })?;
    Ok((parse_link_type(ty)?, value))
}

/// Load an `--extra` value: inline YAML or `@path`. Empty clears the
/// extra data. Non-empty documents must be YAML mappings.
pub fn load_extra(raw: &str) -> Result<Option<String>, CliError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))?,
        None => raw.to_owned(),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }

    let parsed: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| CliError::Validation {
            field: "extra".into(),
            reason: format!("invalid YAML: {e}"),
        })?;
    if !parsed.is_mapping() {
        return Err(CliError::Validation {
            field: "extra".into(),
            reason: "extra data must be a YAML mapping".into(),
        });
    }
    Ok(Some(text))
}
