//! Services backed by a live IMAP connection.
//!
//! This module bridges the scanner with the `freemails-imap` client.

pub mod mailbox;

pub use mailbox::{ImapMailbox, list_mailbox, scan_mailbox};
