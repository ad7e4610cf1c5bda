//! Outgoing commands.
//!
//! Only what a read-only scan needs: no SELECT, STORE, COPY, APPEND or
//! EXPUNGE.

mod serialize;
mod tag_generator;
mod types;

use crate::types::{Mailbox, SeqNum};

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, SearchCriteria};

use serialize::Line;

/// A command the client knows how to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `LOGOUT`
    Logout,
    /// `LOGIN user password`
    Login {
        /// Account name.
        username: String,
        /// Plain-text password; never logged.
        password: String,
    },
    /// `LIST reference pattern`
    List {
        /// Usually empty.
        reference: String,
        /// `*` lists everything.
        pattern: String,
    },
    /// `EXAMINE mailbox`
    Examine {
        /// Folder to open read-only.
        mailbox: Mailbox,
    },
    /// `CLOSE`
    Close,
    /// `SEARCH keys...`; no keys means `ALL`.
    Search {
        /// Keys that must all match.
        criteria: Vec<SearchCriteria>,
    },
    /// `FETCH seq items`
    Fetch {
        /// Message to fetch.
        sequence: SeqNum,
        /// Data items wanted.
        items: Vec<FetchAttribute>,
    },
}

impl Command {
    /// Wire form of the command, tagged and terminated by CRLF.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut line = Line::tagged(tag);
        match self {
            Self::Logout => line.word("LOGOUT"),
            Self::Close => line.word("CLOSE"),
            Self::Login { username, password } => {
                line.word("LOGIN").astring(username).astring(password)
            }
            Self::List { reference, pattern } => {
                line.word("LIST").astring(reference).astring(pattern)
            }
            Self::Examine { mailbox } => line.word("EXAMINE").astring(mailbox.as_str()),
            Self::Search { criteria } => line.word("SEARCH").search(criteria),
            Self::Fetch { sequence, items } => line
                .word("FETCH")
                .word(&sequence.to_string())
                .fetch_items(items),
        };
        line.finish()
    }

    /// The command without its tag, password masked. Used for logging.
    #[must_use]
    pub fn redacted(&self) -> String {
        if let Self::Login { username, .. } = self {
            return format!("LOGIN {username} ***");
        }
        let wire = self.serialize("*");
        String::from_utf8_lossy(&wire)
            .trim_start_matches("* ")
            .trim_end()
            .to_string()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(Command::Logout.serialize("A001"), b"A001 LOGOUT\r\n");
        assert_eq!(Command::Close.serialize("A002"), b"A002 CLOSE\r\n");
    }

    #[test]
    fn test_login_command() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 LOGIN user pass\r\n");
    }

    #[test]
    fn test_login_quoted() {
        let cmd = Command::Login {
            username: "user@example.com".to_string(),
            password: "pa\"ss word".to_string(),
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 LOGIN user@example.com \"pa\\\"ss word\"\r\n"
        );
    }

    #[test]
    fn test_login_redacted() {
        let cmd = Command::Login {
            username: "me".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(cmd.redacted(), "LOGIN me ***");
        assert_eq!(Command::Close.redacted(), "CLOSE");
    }

    #[test]
    fn test_examine_quotes_spaces() {
        let cmd = Command::Examine {
            mailbox: Mailbox::new("Bo&AO4-te d'envoi"),
        };
        assert_eq!(
            cmd.serialize("A002"),
            b"A002 EXAMINE \"Bo&AO4-te d'envoi\"\r\n"
        );
    }

    #[test]
    fn test_list_command() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "*".to_string(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn test_search_defaults_to_all() {
        let cmd = Command::Search { criteria: vec![] };
        assert_eq!(cmd.serialize("A003"), b"A003 SEARCH ALL\r\n");
    }

    #[test]
    fn test_search_multiple_keys() {
        let cmd = Command::Search {
            criteria: vec![
                SearchCriteria::Unseen,
                SearchCriteria::Since("1-Feb-2024".to_string()),
            ],
        };
        assert_eq!(
            cmd.serialize("A003"),
            b"A003 SEARCH UNSEEN SINCE 1-Feb-2024\r\n"
        );
    }

    #[test]
    fn test_fetch_header_peek() {
        let cmd = Command::Fetch {
            sequence: SeqNum::new(7).unwrap(),
            items: vec![FetchAttribute::header_peek()],
        };
        assert_eq!(cmd.serialize("A004"), b"A004 FETCH 7 BODY.PEEK[HEADER]\r\n");
    }

    #[test]
    fn test_fetch_several_items() {
        let cmd = Command::Fetch {
            sequence: SeqNum::new(1).unwrap(),
            items: vec![FetchAttribute::Uid, FetchAttribute::Rfc822Size],
        };
        assert_eq!(cmd.serialize("A005"), b"A005 FETCH 1 (UID RFC822.SIZE)\r\n");
    }
}
