// ── Link domain types ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::catalog;
use crate::error::CoreError;

/// The fixed set of link kinds an entry can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkType {
    /// Mirror on/off state.
    OnOff,
    /// Mirror brightness.
    Brightness,
    /// Mirror color temperature.
    LeftRight,
    /// Run an action when the source fires a trigger.
    Toggle,
}

impl LinkType {
    /// Parse a wire identifier, failing with [`CoreError::UnknownLinkType`].
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        name.parse().map_err(|_| CoreError::UnknownLinkType {
            link_type: name.to_owned(),
        })
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One configurable relation within an entry.
///
/// The type, the trigger menu, and the position in the entry's link
/// list come from the resolver and are never changed by editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub enabled: bool,
    /// Stored as given. Only honored for types that support reversal.
    pub reverse: Option<bool>,
    pub trigger: Option<String>,
    pub triggers: Vec<String>,
    /// Extra service data as a YAML document, passed through untouched.
    pub extra: Option<String>,
}

impl Link {
    /// A fresh enabled link with no options, as a resolver would offer it.
    pub fn new(link_type: LinkType) -> Self {
        Self {
            link_type,
            enabled: true,
            reverse: None,
            trigger: None,
            triggers: Vec::new(),
            extra: None,
        }
    }

    /// Whether the link actually runs reversed.
    pub fn effective_reverse(&self) -> bool {
        catalog::describe(self.link_type).supports_reverse && self.reverse == Some(true)
    }

    /// Extra data, with an empty document treated as absent.
    pub fn extra_data(&self) -> Option<&str> {
        self.extra.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_identifiers() {
        let names: Vec<&str> = LinkType::iter().map(LinkType::as_str).collect();
        assert_eq!(names, ["on_off", "brightness", "left_right", "toggle"]);
        assert_eq!(LinkType::parse("left_right").unwrap(), LinkType::LeftRight);
        assert_eq!(
            serde_json::to_value(LinkType::OnOff).unwrap(),
            serde_json::json!("on_off")
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = LinkType::parse("color_loop").unwrap_err();
        assert!(matches!(err, CoreError::UnknownLinkType { ref link_type } if link_type == "color_loop"));
    }

    #[test]
    fn reverse_ignored_for_toggle() {
        let mut toggle = Link::new(LinkType::Toggle);
        toggle.reverse = Some(true);
        assert!(!toggle.effective_reverse());
        assert_eq!(toggle.reverse, Some(true));

        let mut brightness = Link::new(LinkType::Brightness);
        brightness.reverse = Some(true);
        assert!(brightness.effective_reverse());
    }

    #[test]
    fn blank_extra_counts_as_absent() {
        let mut link = Link::new(LinkType::OnOff);
        link.extra = Some(String::new());
        assert_eq!(link.extra_data(), None);
        link.extra = Some("transition: 2".into());
        assert_eq!(link.extra_data(), Some("transition: 2"));
    }
}
