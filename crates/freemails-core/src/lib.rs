//! # freemails-core
//!
//! Core logic for the `freemails` triage tool.
//!
//! This crate provides:
//! - **Settings**: the typed configuration record and its JSON store
//! - **Filter engine**: glob pattern matching and the freed/locked decision
//! - **Folder scanner**: walks a mailbox folder by folder and reports a
//!   verdict for every message
//! - **IMAP mailbox**: the [`MailSource`] backed by `freemails-imap`
//!
//! # Example
//!
//! ```ignore
//! use freemails_core::{ScanOptions, SettingsStore, list_mailbox};
//!
//! let settings = SettingsStore::from_env()?.load()?;
//! let summary = list_mailbox(&settings, &ScanOptions::default(), &mut printer).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod filter;
pub mod scanner;
pub mod service;

pub use config::{SettingName, Settings, SettingsStore};
pub use error::{Error, Result};
pub use filter::{Decision, Reason, Verdict, classify, folder_override, matches_filter, sender_key};
pub use scanner::{Folder, MailSource, ScanOptions, ScanSink, ScanSummary, scan};
pub use service::{ImapMailbox, list_mailbox, scan_mailbox};
