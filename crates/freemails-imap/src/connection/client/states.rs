//! Connection states.
//!
//! `NotAuthenticated` and `Authenticated` carry nothing; `Selected` holds
//! the open mailbox so the client can report it.

use crate::types::{Mailbox, MailboxStatus};

/// Connected, not logged in yet. LOGIN and LOGOUT only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Logged in, no mailbox open. LIST and EXAMINE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// A mailbox is open.
#[derive(Debug, Clone)]
pub struct Selected {
    pub(crate) mailbox: Mailbox,
    pub(crate) status: MailboxStatus,
}

impl Selected {
    /// State for `mailbox`, opened with `status`.
    #[must_use]
    pub const fn new(mailbox: Mailbox, status: MailboxStatus) -> Self {
        Self { mailbox, status }
    }

    /// Name of the open mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.mailbox.as_str()
    }

    /// Counts and access mode reported when the mailbox was opened.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        &self.status
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
    fn test_selected_reports_what_was_opened() {
        let selected = Selected::new(
            Mailbox::new("Archive/2024"),
            MailboxStatus {
                exists: 12,
                recent: 0,
                read_only: true,
            },
        );

        assert_eq!(selected.mailbox(), "Archive/2024");
        assert_eq!(selected.status().exists, 12);
        assert!(selected.status().read_only);
    }
}
