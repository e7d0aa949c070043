// ── Entry domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::link::Link;
use super::target::Target;
use crate::catalog;

/// Server-assigned identifier of a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A quick automation: a directional set of links between two targets.
///
/// `entry_id` is `None` until the store has persisted the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub entry_id: Option<EntryId>,
    pub title: String,
    pub enabled: bool,
    pub source: Target,
    pub destination: Target,
    /// In resolver order.
    pub links: Vec<Link>,
}

impl Entry {
    /// Comma-separated titles of the enabled links, e.g.
    /// `"ON/OFF, Brightness (Reversed)"`.
    pub fn summary(&self) -> String {
        self.links
            .iter()
            .filter(|link| link.enabled)
            .map(|link| {
                let title = catalog::describe(link.link_type).title;
                if link.effective_reverse() {
                    format!("{title} (Reversed)")
                } else {
                    title.to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn enabled_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkType;
    use pretty_assertions::assert_eq;

    fn entry_with(links: Vec<Link>) -> Entry {
        Entry {
            entry_id: Some(EntryId::new("abc")),
            title: "Switch - Lamp".into(),
            enabled: true,
            source: Target::device("switch"),
            destination: Target::entity("light.lamp"),
            links,
        }
    }

    #[test]
    fn summary_lists_enabled_links_with_reverse_marker() {
        let mut brightness = Link::new(LinkType::Brightness);
        brightness.reverse = Some(true);
        let mut temperature = Link::new(LinkType::LeftRight);
        temperature.enabled = false;
        let mut toggle = Link::new(LinkType::Toggle);
        toggle.reverse = Some(true);

        let entry = entry_with(vec![
            Link::new(LinkType::OnOff),
            brightness,
            temperature,
            toggle,
        ]);
        assert_eq!(entry.summary(), "ON/OFF, Brightness (Reversed), Toggle");
        assert_eq!(entry.enabled_link_count(), 3);
    }

    #[test]
    fn summary_of_entry_without_enabled_links_is_empty() {
        assert_eq!(entry_with(Vec::new()).summary(), "");
    }
}
