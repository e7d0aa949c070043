// `quick_automation/*` WebSocket commands
//
// Thin typed wrappers over `HassClient::call`. Payload shapes follow the
// integration's command schemas; ids are passed through untouched.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::{RawEntry, RawResolution, RawTarget};
use crate::websocket::HassClient;

impl HassClient {
    /// List every persisted entry.
    ///
    /// `quick_automation/list`
    pub async fn list_entries(&self) -> Result<Vec<RawEntry>, Error> {
        debug!("listing entries");
        self.call("quick_automation/list", Value::Null).await
    }

    /// Delete an entry by id.
    ///
    /// `quick_automation/remove_entry` with `{"entry_id": ...}`
    pub async fn remove_entry(&self, entry_id: &str) -> Result<(), Error> {
        debug!(entry_id, "removing entry");
        let _: Value = self
            .call(
                "quick_automation/remove_entry",
                json!({ "entry_id": entry_id }),
            )
            .await?;
        Ok(())
    }

    /// Set an entry's enabled flag.
    ///
    /// `quick_automation/toggle_enabled` with `{"entry_id": ..., "enabled": ...}`
    pub async fn toggle_enabled(&self, entry_id: &str, enabled: bool) -> Result<(), Error> {
        debug!(entry_id, enabled, "toggling entry");
        let _: Value = self
            .call(
                "quick_automation/toggle_enabled",
                json!({ "entry_id": entry_id, "enabled": enabled }),
            )
            .await?;
        Ok(())
    }

    /// Create or update an entry.
    ///
    /// `quick_automation/update_entry`. The server creates a new entry
    /// when `entry_id` is absent.
    pub async fn update_entry(&self, entry: &RawEntry) -> Result<(), Error> {
        debug!(
            entry_id = entry.entry_id.as_deref().unwrap_or("<new>"),
            links = entry.links.len(),
            "saving entry"
        );
        let _: Value = self.call("quick_automation/update_entry", entry).await?;
        Ok(())
    }

    /// Ask the server which links are possible between two targets.
    ///
    /// `quick_automation/load_trigger_action` with `{"source": ..., "destination": ...}`
    pub async fn load_trigger_action(
        &self,
        source: &RawTarget,
        destination: &RawTarget,
    ) -> Result<RawResolution, Error> {
        debug!(?source, ?destination, "resolving link candidates");
        self.call(
            "quick_automation/load_trigger_action",
            json!({ "source": source, "destination": destination }),
        )
        .await
    }
}
