//! Protocol data types.
//!
//! Only what a read-only scan of a mailbox touches: capabilities, status
//! words, mailboxes as LIST and EXAMINE report them, and message numbers.

#![allow(clippy::missing_const_for_fn)]

mod capability;
mod identifiers;
mod mailbox;
mod response_code;

pub use capability::{Capability, Status};
pub use identifiers::{SeqNum, Tag};
pub use mailbox::{ListResponse, Mailbox, MailboxAttribute, MailboxStatus};
pub use response_code::ResponseCode;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_message_number() {
        assert_eq!(SeqNum::new(0), None);
        assert_eq!(SeqNum::new(7).map(SeqNum::get), Some(7));
    }

    #[test]
    fn test_capabilities_from_greeting() {
        let parsed: Vec<Capability> = "IMAP4rev1 imap4REV2 special-use AUTH=PLAIN LOGINDISABLED XLIST"
            .split(' ')
            .map(Capability::parse)
            .collect();
        assert_eq!(
            parsed,
            vec![
                Capability::Imap4Rev1,
                Capability::Imap4Rev2,
                Capability::SpecialUse,
                Capability::Auth("PLAIN".to_string()),
                Capability::LoginDisabled,
                Capability::Unknown("XLIST".to_string()),
            ]
        );
    }

    #[test]
    fn test_special_use_attributes() {
        for (raw, expected) in [
            ("\\Noselect", MailboxAttribute::NoSelect),
            ("\\Spam", MailboxAttribute::Junk),
            ("\\Junk", MailboxAttribute::Junk),
            ("\\trash", MailboxAttribute::Trash),
        ] {
            assert_eq!(MailboxAttribute::parse(raw), expected);
        }
    }
}
