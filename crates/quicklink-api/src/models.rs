// Wire models for the `quick_automation/*` WebSocket commands.
//
// These mirror the JSON the integration sends and accepts, field for
// field. `quicklink-core` converts them into its domain types.

use serde::{Deserialize, Serialize};

/// One endpoint of a link as it appears on the wire.
///
/// At most one of the two fields is populated; an empty object means
/// "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// A link candidate or configured link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    #[serde(rename = "type")]
    pub link_type: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    /// YAML document with extra service data; empty string when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub trigger: Option<String>,
}

/// A persisted entry as returned by `quick_automation/list`.
///
/// Also used as the payload of `quick_automation/update_entry`, where
/// `entry_id` is omitted for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    pub title: String,
    pub enabled: bool,
    #[serde(default)]
    pub source: RawTarget,
    #[serde(default)]
    pub destination: RawTarget,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

/// Response of `quick_automation/load_trigger_action`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawResolution {
    pub title: String,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

/// Subset of `GET /api/config` used by the status probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_target_serializes_as_empty_object() {
        let value = serde_json::to_value(RawTarget::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn create_payload_omits_entry_id() {
        let entry = RawEntry {
            entry_id: None,
            title: "Kitchen - Hallway".into(),
            enabled: true,
            source: RawTarget {
                entity_id: Some("light.kitchen".into()),
                device_id: None,
            },
            destination: RawTarget {
                entity_id: Some("light.hallway".into()),
                device_id: None,
            },
            links: Vec::new(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("entry_id").is_none());
        assert_eq!(value["source"], json!({"entity_id": "light.kitchen"}));
    }

    #[test]
    fn list_row_with_null_trigger_deserializes() {
        let row = json!({
            "entry_id": "6f1c2a9e0b7d4c11",
            "title": "Remote - Lamp",
            "enabled": false,
            "source": {"device_id": "d1"},
            "destination": {"entity_id": "light.lamp"},
            "links": [{
                "type": "toggle",
                "enabled": true,
                "reverse": false,
                "extra": "",
                "triggers": ["single", "double"],
                "trigger": null
            }]
        });
        let entry: RawEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.entry_id.as_deref(), Some("6f1c2a9e0b7d4c11"));
        assert_eq!(entry.links[0].link_type, "toggle");
        assert_eq!(entry.links[0].triggers, vec!["single", "double"]);
        assert!(entry.links[0].trigger.is_none());
    }
}
