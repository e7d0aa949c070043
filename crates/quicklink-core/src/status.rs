// ── Instance status probe ──
//
// REST check of reachability and token, followed by a WebSocket
// handshake. Used by `quicklink status`.

use std::time::Instant;

use quicklink_api::RestClient;
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::HassBackend;
use crate::backend::hass::build_transport;
use crate::config::ConnectionConfig;
use crate::error::CoreError;

/// What a successful probe learned about the instance.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStatus {
    pub url: String,
    /// Message from `GET /api/` ("API running.").
    pub api_message: String,
    pub location_name: Option<String>,
    pub version: Option<String>,
    pub time_zone: Option<String>,
    /// Version announced during the WebSocket handshake.
    pub websocket_version: Option<String>,
    pub latency_ms: u64,
}

/// Probe the instance over REST, then authenticate over WebSocket.
pub async fn probe(config: &ConnectionConfig) -> Result<InstanceStatus, CoreError> {
    let started = Instant::now();
    let rest = RestClient::new(
        config.url.clone(),
        config.token.clone(),
        &build_transport(config),
    )?;

    let api_message = rest.check_api().await.map_err(|e| with_url(e.into(), config))?;
    let instance = rest.instance_config().await?;
    debug!(?instance, "instance config");

    let backend = HassBackend::connect(config).await?;
    let websocket_version = backend.ha_version().map(str::to_owned);
    backend.client().close();

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(url = %config.url, latency_ms, "instance reachable");

    Ok(InstanceStatus {
        url: config.url.to_string(),
        api_message,
        location_name: instance.location_name,
        version: instance.version,
        time_zone: instance.time_zone,
        websocket_version,
        latency_ms,
    })
}

fn with_url(err: CoreError, config: &ConnectionConfig) -> CoreError {
    match err {
        CoreError::ConnectionFailed { url, reason } if url.is_empty() || url == "<unknown>" => {
            CoreError::ConnectionFailed {
                url: config.url.to_string(),
                reason,
            }
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn unreachable_instance_is_a_connection_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = ConnectionConfig::new(
            format!("http://127.0.0.1:{port}").parse().unwrap(),
            SecretString::from("token"),
        );
        config.timeout = Duration::from_secs(2);

        let err = probe(&config).await.unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err}");
    }
}
