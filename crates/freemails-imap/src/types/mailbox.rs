//! Folder names and what LIST and EXAMINE say about them.

use std::fmt;

/// Folder name as the server spells it. Modified UTF-7 is not decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Wraps a raw folder name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the server reported while opening a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    /// `EXISTS` count.
    pub exists: u32,
    /// `RECENT` count.
    pub recent: u32,
    /// Tagged reply carried `[READ-ONLY]`.
    pub read_only: bool,
}

/// One line of a LIST reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Name attributes such as `\Noselect` or `\Sent`.
    pub attributes: Vec<MailboxAttribute>,
    /// Hierarchy separator, `None` for a flat namespace.
    pub delimiter: Option<char>,
    /// The folder.
    pub mailbox: Mailbox,
}

impl ListResponse {
    /// Whether `attribute` is among the listed ones.
    #[must_use]
    pub fn has_attribute(&self, attribute: &MailboxAttribute) -> bool {
        self.attributes.contains(attribute)
    }

    /// False for `\Noselect` and `\NonExistent` names, which only exist
    /// as hierarchy nodes.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(|a| matches!(a, MailboxAttribute::NoSelect | MailboxAttribute::NonExistent))
    }
}

/// Name attribute from a LIST reply, including the RFC 6154 roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// `\Noselect`
    NoSelect,
    /// `\NonExistent`
    NonExistent,
    /// `\HasNoChildren`
    HasNoChildren,
    /// `\HasChildren`
    HasChildren,
    /// `\All`: virtual folder with every message.
    All,
    /// `\Archive`
    Archive,
    /// `\Drafts`
    Drafts,
    /// `\Flagged`: virtual folder of starred messages.
    Flagged,
    /// `\Junk`, or the older `\Spam`.
    Junk,
    /// `\Sent`
    Sent,
    /// `\Trash`
    Trash,
    /// Anything else, kept verbatim.
    Unknown(String),
}

const KNOWN_ATTRIBUTES: &[(&str, MailboxAttribute)] = &[
    ("\\Noselect", MailboxAttribute::NoSelect),
    ("\\NonExistent", MailboxAttribute::NonExistent),
    ("\\HasNoChildren", MailboxAttribute::HasNoChildren),
    ("\\HasChildren", MailboxAttribute::HasChildren),
    ("\\All", MailboxAttribute::All),
    ("\\Archive", MailboxAttribute::Archive),
    ("\\Drafts", MailboxAttribute::Drafts),
    ("\\Flagged", MailboxAttribute::Flagged),
    ("\\Junk", MailboxAttribute::Junk),
    ("\\Spam", MailboxAttribute::Junk),
    ("\\Sent", MailboxAttribute::Sent),
    ("\\Trash", MailboxAttribute::Trash),
];

impl MailboxAttribute {
    /// Case-insensitive lookup of a `\Name` attribute.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        KNOWN_ATTRIBUTES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map_or_else(|| Self::Unknown(s.to_string()), |(_, attr)| attr.clone())
    }

    /// Roles of folders holding mail the user wrote or threw away:
    /// drafts, sent, trash and junk.
    #[must_use]
    pub const fn is_outgoing_or_discarded(&self) -> bool {
        matches!(self, Self::Drafts | Self::Sent | Self::Trash | Self::Junk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(attributes: Vec<MailboxAttribute>) -> ListResponse {
        ListResponse {
            attributes,
            delimiter: Some('/'),
            mailbox: Mailbox::new("Archive/2024"),
        }
    }

    #[test]
    fn selectable_unless_noselect() {
        assert!(list(vec![MailboxAttribute::HasNoChildren]).is_selectable());
        assert!(!list(vec![MailboxAttribute::NoSelect]).is_selectable());
        assert!(!list(vec![MailboxAttribute::NonExistent]).is_selectable());
    }

    #[test]
    fn outgoing_or_discarded_attributes() {
        assert!(MailboxAttribute::Sent.is_outgoing_or_discarded());
        assert!(MailboxAttribute::Junk.is_outgoing_or_discarded());
        assert!(!MailboxAttribute::Archive.is_outgoing_or_discarded());
        assert!(!MailboxAttribute::Unknown("\\Custom".into()).is_outgoing_or_discarded());
    }

    #[test]
    fn mailbox_display_keeps_raw_name() {
        let mb = Mailbox::new("&AMk-l&AOk-ments envoy&AOk-s");
        assert_eq!(mb.to_string(), "&AMk-l&AOk-ments envoy&AOk-s");
    }
}
