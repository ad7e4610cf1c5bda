//! FETCH items and SEARCH keys.

/// Data to request in a FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `FLAGS`
    Flags,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `UID`
    Uid,
    /// `BODY[section]`, or `BODY.PEEK[section]` when `peek` is set.
    Body {
        /// `HEADER`, `TEXT`, a part number, or `None` for the whole message.
        section: Option<String>,
        /// Leave `\Seen` untouched.
        peek: bool,
    },
}

impl FetchAttribute {
    /// `BODY.PEEK[HEADER]`: the header block, without marking the message
    /// as read.
    #[must_use]
    pub fn header_peek() -> Self {
        Self::Body {
            section: Some("HEADER".to_string()),
            peek: true,
        }
    }
}

/// A SEARCH key. Several keys in one command must all match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// `ALL`
    All,
    /// `UNSEEN`
    Unseen,
    /// `SEEN`
    Seen,
    /// `UNDELETED`
    Undeleted,
    /// `SINCE date`, date as `d-Mon-yyyy`.
    Since(String),
    /// `BEFORE date`, date as `d-Mon-yyyy`.
    Before(String),
    /// `FROM text`: substring of the From header.
    From(String),
    /// `SUBJECT text`: substring of the Subject header.
    Subject(String),
    /// `NOT key`
    Not(Box<Self>),
}
