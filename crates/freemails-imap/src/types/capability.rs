//! Capabilities and status words.

use std::fmt;

/// Status word of a tagged reply or a status untagged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `OK`
    Ok,
    /// `NO`: the server refused.
    No,
    /// `BAD`: the server did not understand.
    Bad,
    /// `PREAUTH`: greeting of an already logged-in session.
    PreAuth,
    /// `BYE`: the server is hanging up.
    Bye,
}

/// A capability advertised by the server.
///
/// Names this client acts on get a variant; everything else is kept as
/// [`Capability::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1`
    Imap4Rev1,
    /// `IMAP4rev2`
    Imap4Rev2,
    /// `LOGINDISABLED`: LOGIN must not be sent.
    LoginDisabled,
    /// `AUTH=<mechanism>`
    Auth(String),
    /// `SPECIAL-USE`: LIST reports `\Sent`, `\Trash` and friends.
    SpecialUse,
    /// Anything else, as sent.
    Unknown(String),
}

impl Capability {
    /// Reads one capability atom. Names compare case-insensitively.
    #[must_use]
    pub fn parse(atom: &str) -> Self {
        if atom.eq_ignore_ascii_case("IMAP4rev1") {
            Self::Imap4Rev1
        } else if atom.eq_ignore_ascii_case("IMAP4rev2") {
            Self::Imap4Rev2
        } else if atom.eq_ignore_ascii_case("LOGINDISABLED") {
            Self::LoginDisabled
        } else if atom.eq_ignore_ascii_case("SPECIAL-USE") {
            Self::SpecialUse
        } else {
            match atom.split_once('=') {
                Some((key, mechanism)) if key.eq_ignore_ascii_case("AUTH") => {
                    Self::Auth(mechanism.to_string())
                }
                _ => Self::Unknown(atom.to_string()),
            }
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Imap4Rev1 => "IMAP4rev1",
            Self::Imap4Rev2 => "IMAP4rev2",
            Self::LoginDisabled => "LOGINDISABLED",
            Self::SpecialUse => "SPECIAL-USE",
            Self::Auth(mechanism) => return write!(f, "AUTH={mechanism}"),
            Self::Unknown(other) => other,
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mechanism_keeps_its_spelling() {
        let cap = Capability::parse("auth=XOAUTH2");
        assert_eq!(cap, Capability::Auth("XOAUTH2".to_string()));
        assert_eq!(cap.to_string(), "AUTH=XOAUTH2");
    }

    #[test]
    fn unknown_capability_is_preserved() {
        assert_eq!(Capability::parse("X-GM-EXT-1").to_string(), "X-GM-EXT-1");
    }
}
