//! `status`: connectivity and authentication check.

use quicklink_core::{ConnectionConfig, InstanceStatus, status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &InstanceStatus) -> String {
    [
        format!("URL:       {}", s.url),
        format!("API:       {}", s.api_message),
        format!("Location:  {}", s.location_name.as_deref().unwrap_or("-")),
        format!("Version:   {}", s.version.as_deref().unwrap_or("-")),
        format!("Time zone: {}", s.time_zone.as_deref().unwrap_or("-")),
        format!(
            "WebSocket: authenticated (HA {})",
            s.websocket_version.as_deref().unwrap_or("unknown")
        ),
        format!("Latency:   {}ms", s.latency_ms),
    ]
    .join("\n")
}

pub async fn handle(conn: &ConnectionConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = super::util::spinner("Contacting Home Assistant...", global.quiet);
    let probed = status::probe(conn).await;
    spinner.finish_and_clear();

    let report = probed?;
    let out = output::render_single(&global.output, &report, detail, |s| {
        s.version.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
