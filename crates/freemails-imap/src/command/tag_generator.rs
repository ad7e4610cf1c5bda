//! Command tags.

use std::cell::Cell;

/// Hands out `A0000`, `A0001`, ... for one connection.
///
/// Only the client owning the connection sends commands, so a `Cell` is
/// all the synchronisation needed.
#[derive(Debug, Clone)]
pub struct TagGenerator {
    counter: Cell<u32>,
    prefix: char,
}

impl TagGenerator {
    /// Generator whose tags start with `prefix`.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: Cell::new(0),
            prefix,
        }
    }

    /// Returns the next tag: the prefix and the counter, zero-padded to
    /// four digits. Wraps to 0 after `u32::MAX`.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.replace(self.counter.get().wrapping_add(1));
        format!("{}{n:04}", self.prefix)
    }

    /// Number of tags handed out so far, modulo 2^32.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.counter.get()
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
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
    fn test_sequence() {
        let tags = TagGenerator::default();
        let first: Vec<String> = (0..3).map(|_| tags.next()).collect();
        assert_eq!(first, ["A0000", "A0001", "A0002"]);
        assert_eq!(tags.current(), 3);
    }

    #[test]
    fn test_padding_stops_at_four_digits() {
        let tags = TagGenerator::new('F');
        tags.counter.set(12_345);
        assert_eq!(tags.next(), "F12345");
    }

    #[test]
    fn test_wraps_instead_of_panicking() {
        let tags = TagGenerator::default();
        tags.counter.set(u32::MAX);
        assert_eq!(tags.next(), format!("A{}", u32::MAX));
        assert_eq!(tags.next(), "A0000");
    }
}
