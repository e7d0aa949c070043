// Home Assistant implementation of the store and resolver traits,
// backed by one authenticated WebSocket connection.

use std::sync::Arc;

use quicklink_api::{
    HassClient, RawEntry, RawTarget, ReconnectConfig, TlsMode, TransportConfig, websocket_url,
};
use tracing::{debug, warn};

use super::{CapabilityResolver, EntryStore};
use crate::config::{ConnectionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Entry, EntryId, Target};
use crate::reconcile::Resolution;

/// Cheaply cloneable handle shared by the list controller and the
/// reconciler.
#[derive(Debug, Clone)]
pub struct HassBackend {
    client: Arc<HassClient>,
}

impl HassBackend {
    /// Connect and authenticate, retrying transient failures.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let url = websocket_url(&config.url)?;
        let reconnect = ReconnectConfig {
            max_retries: config.connect_retries,
            ..ReconnectConfig::default()
        };

        let client = HassClient::connect_with_retry(url, &config.token, &transport, &reconnect)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::ConnectionFailed { url, reason } if url.is_empty() => {
                    CoreError::ConnectionFailed {
                        url: config.url.to_string(),
                        reason,
                    }
                }
                other => other,
            })?;

        Ok(Self::from_client(client))
    }

    pub fn from_client(client: HassClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &HassClient {
        &self.client
    }

    pub fn ha_version(&self) -> Option<&str> {
        self.client.ha_version()
    }
}

impl EntryStore for HassBackend {
    async fn list_entries(&self) -> Result<Vec<Entry>, CoreError> {
        let rows = self.client.list_entries().await?;
        debug!(count = rows.len(), "fetched entries");

        rows.into_iter()
            .map(|raw| {
                let id = raw.entry_id.clone().unwrap_or_default();
                Entry::try_from(raw).map_err(|e| {
                    warn!(entry_id = %id, error = %e, "rejecting malformed entry");
                    CoreError::StoreFailed {
                        message: format!("entry {id}: {e}"),
                    }
                })
            })
            .collect()
    }

    async fn remove_entry(&self, entry_id: &EntryId) -> Result<(), CoreError> {
        self.client
            .remove_entry(entry_id.as_str())
            .await
            .map_err(|e| entry_error(entry_id, e))
    }

    async fn set_enabled(&self, entry_id: &EntryId, enabled: bool) -> Result<(), CoreError> {
        self.client
            .toggle_enabled(entry_id.as_str(), enabled)
            .await
            .map_err(|e| entry_error(entry_id, e))
    }

    async fn save_entry(&self, entry: &Entry) -> Result<(), CoreError> {
        Ok(self.client.update_entry(&RawEntry::from(entry)).await?)
    }
}

impl CapabilityResolver for HassBackend {
    async fn resolve(&self, source: &Target, destination: &Target) -> Result<Resolution, CoreError> {
        let raw = self
            .client
            .load_trigger_action(&RawTarget::from(source), &RawTarget::from(destination))
            .await?;
        Resolution::try_from(raw)
    }
}

/// Entries deleted elsewhere come back as `not_found`.
fn entry_error(entry_id: &EntryId, err: quicklink_api::Error) -> CoreError {
    if err.command_error_code() == Some("not_found") {
        return CoreError::EntryNotFound {
            entry_id: entry_id.to_string(),
        };
    }
    CoreError::from(err)
}

pub(crate) fn build_transport(config: &ConnectionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
