//! Message header view.

use crate::encoding::decode_header;
use crate::header::Headers;

/// A message as seen from its header block.
///
/// Only the header fields are kept; any body bytes passed to
/// [`Message::parse`] are ignored.
#[derive(Debug, Clone, Default)]
pub struct Message {
    headers: Headers,
}

impl Message {
    /// Parses the header block of a raw message.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        Self {
            headers: Headers::parse(raw),
        }
    }

    /// Returns the parsed headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a header with encoded-words decoded, or `None` when absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).map(decode_header)
    }

    /// The decoded `From` header, empty when the message has none.
    #[must_use]
    pub fn from(&self) -> String {
        self.header("From").unwrap_or_default()
    }

    /// The decoded `Subject` header, empty when the message has none.
    #[must_use]
    pub fn subject(&self) -> String {
        self.header("Subject").unwrap_or_default()
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
    fn test_missing_headers_are_empty() {
        let message = Message::parse(b"To: x@y.z\r\n\r\n");
        assert_eq!(message.from(), "");
        assert_eq!(message.subject(), "");
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_decoded_folded_subject() {
        let raw = concat!(
            "Subject: =?UTF-8?B?w4l0w6k=?=\r\n",
            " =?UTF-8?Q?_ensoleill=C3=A9?=\r\n",
            "From: Alice <alice@example.com>\r\n",
            "\r\n",
            "body"
        );
        let message = Message::parse(raw.as_bytes());
        assert_eq!(message.subject(), "Été ensoleillé");
        assert_eq!(message.from(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_plain_headers_pass_through() {
        let message = Message::parse(b"From: bob@trusted.com\nSubject: [ci] build #12 ok\n");
        assert_eq!(message.from(), "bob@trusted.com");
        assert_eq!(message.subject(), "[ci] build #12 ok");
    }
}
