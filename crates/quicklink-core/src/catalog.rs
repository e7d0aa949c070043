// ── Link catalog ──
//
// Static display metadata per link type.

use strum::IntoEnumIterator;

use crate::error::CoreError;
use crate::model::LinkType;

/// How a link type is presented and which options it honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub link_type: LinkType,
    pub title: &'static str,
    pub supports_reverse: bool,
    /// Label of the trigger picker, for types that have one.
    pub trigger_selector_label: Option<&'static str>,
}

pub fn describe(link_type: LinkType) -> LinkDescriptor {
    let (title, supports_reverse, trigger_selector_label) = match link_type {
        LinkType::OnOff => ("ON/OFF", true, None),
        LinkType::Brightness => ("Brightness", true, None),
        LinkType::LeftRight => ("Color temperature", true, None),
        LinkType::Toggle => ("Toggle", false, Some("Action")),
    };
    LinkDescriptor {
        link_type,
        title,
        supports_reverse,
        trigger_selector_label,
    }
}

/// Look up a wire identifier such as `"on_off"`.
pub fn describe_str(name: &str) -> Result<LinkDescriptor, CoreError> {
    LinkType::parse(name).map(describe)
}

/// Every catalog entry, in declaration order.
pub fn all() -> impl Iterator<Item = LinkDescriptor> {
    LinkType::iter().map(describe)
}
