//! Folder-by-folder mailbox scan.
//!
//! [`scan`] drives a [`MailSource`] one folder and one message at a time,
//! in the order the source lists folders, and reports to a [`ScanSink`] as
//! it goes. Folders listed in `black_dir` or `white_dir` are reported with a
//! single verdict and never searched or fetched.

use std::collections::BTreeSet;

use freemails_imap::{MailboxAttribute, SearchCriteria, SeqNum};
use freemails_mime::Message;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::filter::{Verdict, classify, folder_override};
use crate::{Error, Result};

/// Folders skipped by default, as raw (modified UTF-7) mailbox names.
pub const DEFAULT_EXCLUDED_FOLDERS: [&str; 11] = [
    "Bo&AO4-te d'envoi",
    "Calendrier",
    "&AMk-l&AOk-ments supprim&AOk-s",
    "Journal",
    "Notes",
    "T&AOI-ches",
    "&AMk-l&AOk-ments envoy&AOk-s",
    "Courrier ind&AOk-sirable",
    "Contacts",
    "Calendrier/basic",
    "Brouillons",
];

/// A folder as listed by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Mailbox name, exactly as the server spells it.
    pub name: String,
    /// LIST attributes.
    pub attributes: Vec<MailboxAttribute>,
}

impl Folder {
    /// Creates a folder without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Returns true unless the folder is flagged `\Noselect` or
    /// `\NonExistent`.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(|a| matches!(a, MailboxAttribute::NoSelect | MailboxAttribute::NonExistent))
    }

    /// Returns true for sent, drafts, trash and junk folders.
    #[must_use]
    pub fn is_outgoing_or_discarded(&self) -> bool {
        self.attributes
            .iter()
            .any(MailboxAttribute::is_outgoing_or_discarded)
    }
}

/// Read access to a mailbox, one folder open at a time.
///
/// Refusals must surface as errors for which [`Error::is_refusal`] is true
/// and leave the source usable; any other error ends the scan.
#[allow(async_fn_in_trait)]
pub trait MailSource {
    /// Lists all folders.
    async fn list_folders(&mut self) -> Result<Vec<Folder>>;

    /// Opens `folder` read-only and returns its message count.
    async fn examine(&mut self, folder: &str) -> Result<u32>;

    /// Searches the open folder.
    async fn search(&mut self, criteria: &[SearchCriteria]) -> Result<Vec<SeqNum>>;

    /// Fetches the raw header block of a message in the open folder.
    async fn fetch_header(&mut self, sequence: SeqNum) -> Result<Option<Vec<u8>>>;
}

/// Receives scan results as they are produced.
pub trait ScanSink {
    /// A folder was opened.
    fn folder(&mut self, name: &str, count: u32);

    /// Every message of the folder just opened gets `verdict`.
    fn folder_override(&mut self, name: &str, verdict: &Verdict);

    /// A message was classified.
    fn message(&mut self, from: &str, subject: &str, verdict: &Verdict);

    /// A folder was skipped after the server refused to open or search it.
    fn folder_failed(&mut self, _name: &str, _error: &Error) {}

    /// A message was skipped after the server refused to return it.
    fn message_failed(&mut self, _sequence: SeqNum, _error: &Error) {}
}

/// What to scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Folder names never opened.
    pub excluded: BTreeSet<String>,
    /// Skip folders flagged `\Sent`, `\Drafts`, `\Trash` or `\Junk`.
    pub skip_special_use: bool,
    /// SEARCH criteria; empty means `ALL`.
    pub criteria: Vec<SearchCriteria>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_FOLDERS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            skip_special_use: true,
            criteria: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Options that open every selectable folder.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            excluded: BTreeSet::new(),
            skip_special_use: false,
            criteria: Vec::new(),
        }
    }

    /// Returns true if `folder` should not be opened.
    #[must_use]
    pub fn skips(&self, folder: &Folder) -> bool {
        self.excluded.contains(&folder.name)
            || !folder.is_selectable()
            || (self.skip_special_use && folder.is_outgoing_or_discarded())
    }
}

/// Counters for a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Folders opened.
    pub folders: usize,
    /// Messages classified, overridden folders not included.
    pub messages: usize,
    /// Folders the server refused to open or search.
    pub failed_folders: usize,
    /// Messages the server refused to return.
    pub failed_messages: usize,
}

/// Scans every folder of `source`.
///
/// # Errors
///
/// Returns the first error that is not a refusal. Refusals are reported to
/// `sink` and the scan moves on.
pub async fn scan<M, K>(
    source: &mut M,
    settings: &Settings,
    options: &ScanOptions,
    sink: &mut K,
) -> Result<ScanSummary>
where
    M: MailSource,
    K: ScanSink,
{
    let mut summary = ScanSummary::default();

    for folder in source.list_folders().await? {
        if options.skips(&folder) {
            debug!(folder = %folder.name, "Skipping folder");
            continue;
        }

        let count = match source.examine(&folder.name).await {
            Ok(count) => count,
            Err(err) if err.is_refusal() => {
                warn!(folder = %folder.name, error = %err, "Cannot open folder");
                sink.folder_failed(&folder.name, &err);
                summary.failed_folders += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        sink.folder(&folder.name, count);
        summary.folders += 1;

        if let Some(verdict) = folder_override(&folder.name, settings) {
            debug!(folder = %folder.name, reason = %verdict.reason, "Folder override");
            sink.folder_override(&folder.name, &verdict);
            continue;
        }

        let sequences = match source.search(&options.criteria).await {
            Ok(sequences) => sequences,
            Err(err) if err.is_refusal() => {
                warn!(folder = %folder.name, error = %err, "Cannot search folder");
                sink.folder_failed(&folder.name, &err);
                summary.failed_folders += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        for sequence in sequences {
            let fetched = source
                .fetch_header(sequence)
                .await
                .and_then(|header| header.ok_or(Error::EmptyFetch(sequence.get())));
            let header = match fetched {
                Ok(header) => header,
                Err(err) if err.is_refusal() => {
                    warn!(folder = %folder.name, %sequence, error = %err, "Cannot fetch message");
                    sink.message_failed(sequence, &err);
                    summary.failed_messages += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let message = Message::parse(&header);
            let from = message.from();
            let subject = message.subject();
            let verdict = classify(&from, &subject, settings);
            sink.message(&from, &subject, &verdict);
            summary.messages += 1;
        }
    }

    info!(
        folders = summary.folders,
        messages = summary.messages,
        failed_folders = summary.failed_folders,
        failed_messages = summary.failed_messages,
        "Scan finished"
    );
    Ok(summary)
}
