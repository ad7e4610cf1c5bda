//! Header block parsing.

use crate::encoding::latin1;

/// Header fields in the order they appear.
///
/// Lookups ignore ASCII case. A field name may occur more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// No fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Value of the first field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter_named(name).next()
    }

    /// Values of every field called `name`, in message order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.iter_named(name).collect()
    }

    fn iter_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All fields as `(name, value)`, names spelled as in the message.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields, repeats included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads fields up to the first empty line, so a whole message may be
    /// passed. Continuation lines are joined with their leading whitespace
    /// kept, values are trimmed, and lines without a colon are skipped.
    /// Input that is not UTF-8 is taken as Latin-1.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let text = std::str::from_utf8(raw).map_or_else(|_| latin1(raw), str::to_string);
        let mut headers = Self::new();
        let mut pending: Option<(&str, String)> = None;

        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .take_while(|line| !line.is_empty());
        for line in lines {
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = &mut pending {
                    value.push_str(line);
                }
                continue;
            }
            headers.finish_field(pending.take());
            pending = line
                .split_once(':')
                .map(|(name, value)| (name.trim(), value.to_string()));
        }
        headers.finish_field(pending);
        headers
    }

    fn finish_field(&mut self, field: Option<(&str, String)>) {
        if let Some((name, value)) = field {
            self.push(name, value.trim());
        }
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
    fn test_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.push("Reply-To", "list@example.org");
        assert_eq!(headers.get("reply-to"), Some("list@example.org"));
        assert_eq!(headers.get("REPLY-TO"), Some("list@example.org"));
        assert_eq!(headers.get("Subject"), None);
    }

    #[test]
    fn test_stops_at_body_and_unfolds() {
        let raw = concat!(
            "From: Alice <alice@example.com>\r\n",
            "Date: Tue, 2 Jan 2024 10:00:00 +0000\r\n",
            "Subject: Quarterly\r\n",
            "\treport\r\n",
            "\r\n",
            "Subject: body, not a header\r\n"
        );
        let headers = Headers::parse(raw.as_bytes());
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("from"), Some("Alice <alice@example.com>"));
        assert_eq!(headers.get("Subject"), Some("Quarterly\treport"));
    }

    #[test]
    fn test_repeated_fields_keep_order() {
        let headers = Headers::parse(b"Received: a\nX-Tag: t\nReceived: b\n");
        assert_eq!(headers.get_all("received"), vec!["a", "b"]);
        assert_eq!(headers.get("Received"), Some("a"));
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Received", "X-Tag", "Received"]);
    }

    #[test]
    fn test_mbox_separator_is_skipped() {
        let headers = Headers::parse(b"From x Mon Jan 1\nSubject: ok\n");
        assert_eq!(headers.get("Subject"), Some("ok"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_latin1_fallback() {
        let headers = Headers::parse(b"Subject: caf\xe9\r\n\r\n");
        assert_eq!(headers.get("Subject"), Some("café"));
    }

    #[test]
    fn test_empty_input() {
        assert!(Headers::parse(b"").is_empty());
        assert!(Headers::parse(b"\r\nSubject: late\r\n").is_empty());
    }

    #[test]
    fn test_value_with_colon() {
        let headers = Headers::parse(b"Subject: Re: Fwd: hello\r\n");
        assert_eq!(headers.get("subject"), Some("Re: Fwd: hello"));
    }
}
