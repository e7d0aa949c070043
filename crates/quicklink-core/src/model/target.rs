// ── Link endpoints ──
//
// A target names the source or destination of an entry: one entity,
// one device, or nothing yet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ── Target ──────────────────────────────────────────────────────────

/// One endpoint of an entry.
///
/// Holds at most one identifier. Serializes to the wire form
/// `{"entity_id": ..}`, `{"device_id": ..}` or `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "quicklink_api::RawTarget", from = "quicklink_api::RawTarget")]
pub enum Target {
    #[default]
    Unset,
    Entity(String),
    Device(String),
}

impl Target {
    pub fn entity(id: impl Into<String>) -> Self {
        Self::Entity(id.into())
    }

    pub fn device(id: impl Into<String>) -> Self {
        Self::Device(id.into())
    }

    /// A target is set when it names an entity or a device.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Device(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("-"),
            Self::Entity(id) => write!(f, "entity:{id}"),
            Self::Device(id) => write!(f, "device:{id}"),
        }
    }
}

/// Parses `entity:<id>`, `device:<id>`, or a bare id. Bare ids that
/// contain a `.` (`light.kitchen`) are entities, anything else a device.
impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, id) = match s.split_once(':') {
            Some(("entity", id)) => ("entity", id.trim()),
            Some(("device", id)) => ("device", id.trim()),
            _ if s.contains('.') => ("entity", s),
            _ => ("device", s),
        };
        if id.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: format!("empty {kind} id in target '{s}'"),
            });
        }
        Ok(match kind {
            "entity" => Self::entity(id),
            _ => Self::device(id),
        })
    }
}

// ── TargetRole ──────────────────────────────────────────────────────

/// Which endpoint of an entry a target fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TargetRole {
    Source,
    Destination,
}

// ── TargetSelection ─────────────────────────────────────────────────

/// What a target picker emits: zero or more entity ids and device ids.
///
/// Pickers may produce a list even in single-select mode; only the last
/// element of a list counts. An entity selection wins over a device
/// selection. Blank ids are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetSelection {
    #[serde(default, deserialize_with = "one_or_many")]
    pub entity_id: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub device_id: Vec<String>,
}

impl TargetSelection {
    pub fn entities<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_id: ids.into_iter().map(Into::into).collect(),
            device_id: Vec::new(),
        }
    }

    pub fn devices<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_id: Vec::new(),
            device_id: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Collapse the selection to a single target.
    pub fn into_target(self) -> Target {
        fn last_present(ids: Vec<String>) -> Option<String> {
            ids.into_iter().last().filter(|id| !id.trim().is_empty())
        }

        if let Some(id) = last_present(self.entity_id) {
            return Target::Entity(id);
        }
        match last_present(self.device_id) {
            Some(id) => Target::Device(id),
            None => Target::Unset,
        }
    }
}

impl From<TargetSelection> for Target {
    fn from(selection: TargetSelection) -> Self {
        selection.into_target()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => vec![id],
        OneOrMany::Many(ids) => ids,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_prefixed_and_bare_targets() {
        assert_eq!(
            "entity:light.kitchen".parse::<Target>().unwrap(),
            Target::entity("light.kitchen")
        );
        assert_eq!(
            "device:4f1e2d".parse::<Target>().unwrap(),
            Target::device("4f1e2d")
        );
        assert_eq!(
            "switch.porch".parse::<Target>().unwrap(),
            Target::entity("switch.porch")
        );
        assert_eq!(
            "9b3c0a77e1".parse::<Target>().unwrap(),
            Target::device("9b3c0a77e1")
        );
        assert!("entity:".parse::<Target>().is_err());
        assert!("  ".parse::<Target>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for target in [Target::entity("light.a"), Target::device("abc")] {
            assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
        }
    }

    #[test]
    fn wire_form() {
        assert_eq!(
            serde_json::to_value(Target::entity("light.a")).unwrap(),
            json!({"entity_id": "light.a"})
        );
        assert_eq!(serde_json::to_value(Target::Unset).unwrap(), json!({}));
        let parsed: Target = serde_json::from_value(json!({"device_id": "d1"})).unwrap();
        assert_eq!(parsed, Target::device("d1"));
    }

    #[test]
    fn multi_select_collapses_to_last_element() {
        let selection: TargetSelection =
            serde_json::from_value(json!({"entity_id": ["light.a", "light.b"]})).unwrap();
        assert_eq!(selection.into_target(), Target::entity("light.b"));
    }

    #[test]
    fn single_string_selection() {
        let selection: TargetSelection =
            serde_json::from_value(json!({"device_id": "remote-1"})).unwrap();
        assert_eq!(selection.into_target(), Target::device("remote-1"));
    }

    #[test]
    fn entity_selection_wins_over_device() {
        let selection = TargetSelection {
            entity_id: vec!["light.a".into()],
            device_id: vec!["dev".into()],
        };
        assert_eq!(selection.into_target(), Target::entity("light.a"));
    }

    #[test]
    fn blank_or_empty_selection_is_unset() {
        assert_eq!(TargetSelection::default().into_target(), Target::Unset);
        assert_eq!(
            TargetSelection::entities([""]).into_target(),
            Target::Unset
        );
        let selection: TargetSelection =
            serde_json::from_value(json!({"entity_id": null, "device_id": []})).unwrap();
        assert_eq!(selection.into_target(), Target::Unset);
    }
}
