//! Tags and message numbers.

use std::fmt;
use std::num::NonZeroU32;

/// Command tag, echoed by the server in the tagged reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Wraps a tag string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a message in the open mailbox, counting from 1.
///
/// Positions shift when messages are expunged; a mailbox opened with
/// EXAMINE never expunges, so they hold for the whole scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqNum(pub NonZeroU32);

impl SeqNum {
    /// `None` for 0, which is never a valid position.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// The position as a plain integer.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_sort_numerically() {
        let mut seqs: Vec<SeqNum> = [10, 2, 33].into_iter().filter_map(SeqNum::new).collect();
        seqs.sort();
        assert_eq!(seqs.iter().map(ToString::to_string).collect::<Vec<_>>(), ["2", "10", "33"]);
    }

    #[test]
    fn tag_prints_as_is() {
        assert_eq!(Tag::new("A0042").to_string(), "A0042");
    }
}
