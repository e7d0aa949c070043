// ── Wire ↔ domain conversion ──
//
// Bridges `quicklink_api::models` and the canonical domain types.
// Inbound conversion is fallible: an unknown link type rejects the
// whole row or resolver response.

use quicklink_api::{RawEntry, RawLink, RawResolution, RawTarget};

use crate::error::CoreError;
use crate::model::{Entry, EntryId, Link, LinkType, Target};
use crate::reconcile::Resolution;

// ── Targets ─────────────────────────────────────────────────────────

fn present(id: Option<String>) -> Option<String> {
    id.filter(|s| !s.trim().is_empty())
}

impl From<RawTarget> for Target {
    fn from(raw: RawTarget) -> Self {
        if let Some(id) = present(raw.entity_id) {
            return Target::Entity(id);
        }
        match present(raw.device_id) {
            Some(id) => Target::Device(id),
            None => Target::Unset,
        }
    }
}

impl From<Target> for RawTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Unset => RawTarget::default(),
            Target::Entity(id) => RawTarget {
                entity_id: Some(id),
                device_id: None,
            },
            Target::Device(id) => RawTarget {
                entity_id: None,
                device_id: Some(id),
            },
        }
    }
}

impl From<&Target> for RawTarget {
    fn from(target: &Target) -> Self {
        target.clone().into()
    }
}

// ── Links ───────────────────────────────────────────────────────────

impl TryFrom<RawLink> for Link {
    type Error = CoreError;

    fn try_from(raw: RawLink) -> Result<Self, Self::Error> {
        Ok(Link {
            link_type: LinkType::parse(&raw.link_type)?,
            enabled: raw.enabled,
            reverse: raw.reverse,
            trigger: raw.trigger,
            triggers: raw.triggers,
            extra: raw.extra,
        })
    }
}

impl From<&Link> for RawLink {
    fn from(link: &Link) -> Self {
        RawLink {
            link_type: link.link_type.as_str().to_owned(),
            enabled: link.enabled,
            reverse: link.reverse,
            extra: link.extra.clone(),
            triggers: link.triggers.clone(),
            trigger: link.trigger.clone(),
        }
    }
}

fn convert_links(raw: Vec<RawLink>) -> Result<Vec<Link>, CoreError> {
    let links = raw
        .into_iter()
        .map(Link::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    for (i, link) in links.iter().enumerate() {
        if links[..i].iter().any(|l| l.link_type == link.link_type) {
            return Err(CoreError::ValidationFailed {
                message: format!("duplicate link type {}", link.link_type),
            });
        }
    }
    Ok(links)
}

// ── Entries ─────────────────────────────────────────────────────────

impl TryFrom<RawEntry> for Entry {
    type Error = CoreError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        Ok(Entry {
            entry_id: present(raw.entry_id).map(EntryId::from),
            title: raw.title,
            enabled: raw.enabled,
            source: raw.source.into(),
            destination: raw.destination.into(),
            links: convert_links(raw.links)?,
        })
    }
}

/// Builds the `update_entry` payload; `entry_id` is omitted for creation.
impl From<&Entry> for RawEntry {
    fn from(entry: &Entry) -> Self {
        RawEntry {
            entry_id: entry.entry_id.as_ref().map(|id| id.as_str().to_owned()),
            title: entry.title.clone(),
            enabled: entry.enabled,
            source: (&entry.source).into(),
            destination: (&entry.destination).into(),
            links: entry.links.iter().map(RawLink::from).collect(),
        }
    }
}

// ── Resolver responses ──────────────────────────────────────────────

impl TryFrom<RawResolution> for Resolution {
    type Error = CoreError;

    fn try_from(raw: RawResolution) -> Result<Self, Self::Error> {
        Ok(Resolution {
            title: raw.title,
            links: convert_links(raw.links)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_link(link_type: &str) -> RawLink {
        RawLink {
            link_type: link_type.into(),
            enabled: true,
            reverse: None,
            extra: None,
            triggers: Vec::new(),
            trigger: None,
        }
    }

    #[test]
    fn raw_target_prefers_entity_and_skips_blanks() {
        let both = RawTarget {
            entity_id: Some("light.a".into()),
            device_id: Some("d".into()),
        };
        assert_eq!(Target::from(both), Target::entity("light.a"));

        let blank_entity = RawTarget {
            entity_id: Some(String::new()),
            device_id: Some("d".into()),
        };
        assert_eq!(Target::from(blank_entity), Target::device("d"));
        assert_eq!(Target::from(RawTarget::default()), Target::Unset);
    }

    #[test]
    fn entry_round_trip_keeps_extra_verbatim() {
        let mut link = raw_link("brightness");
        link.reverse = Some(true);
        link.extra = Some("transition: 3\n".into());
        let raw = RawEntry {
            entry_id: Some("abc".into()),
            title: "Dimmer - Lamp".into(),
            enabled: true,
            source: RawTarget {
                entity_id: None,
                device_id: Some("dimmer".into()),
            },
            destination: RawTarget {
                entity_id: Some("light.lamp".into()),
                device_id: None,
            },
            links: vec![link],
        };

        let entry = Entry::try_from(raw.clone()).unwrap();
        assert_eq!(entry.entry_id, Some(EntryId::new("abc")));
        assert_eq!(entry.links[0].extra.as_deref(), Some("transition: 3\n"));
        assert_eq!(RawEntry::from(&entry), raw);
    }

    #[test]
    fn unknown_link_type_rejects_entry() {
        let raw = RawEntry {
            entry_id: Some("abc".into()),
            title: "x".into(),
            enabled: true,
            source: RawTarget::default(),
            destination: RawTarget::default(),
            links: vec![raw_link("on_off"), raw_link("strobe")],
        };
        assert!(matches!(
            Entry::try_from(raw),
            Err(CoreError::UnknownLinkType { ref link_type }) if link_type == "strobe"
        ));
    }

    #[test]
    fn duplicate_link_type_rejects_resolution() {
        let raw = RawResolution {
            title: "A - B".into(),
            links: vec![raw_link("toggle"), raw_link("toggle")],
        };
        assert!(matches!(
            Resolution::try_from(raw),
            Err(CoreError::ValidationFailed { .. })
        ));
    }
}
