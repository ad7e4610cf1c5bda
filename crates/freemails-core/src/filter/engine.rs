//! Rule evaluation.

use std::fmt;

use super::matches_filter;
use crate::config::{SettingName, Settings};

/// Outcome for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Kept.
    Freed,
    /// Would be removed from the mailbox.
    Locked,
}

impl Decision {
    /// Lowercase label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Freed => "freed",
            Self::Locked => "locked",
        }
    }

    /// Returns true for [`Decision::Freed`].
    #[must_use]
    pub const fn is_freed(self) -> bool {
        matches!(self, Self::Freed)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that produced a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Sender listed in `black_from`.
    BlackFrom,
    /// Subject listed in `black_subject`.
    BlackSubject,
    /// Sender listed in `white_from`.
    WhiteFrom,
    /// Subject listed in `white_subject`.
    WhiteSubject,
    /// Sender matched a `white_from` pattern.
    WhiteFromFilter,
    /// Subject matched a `white_subject` pattern.
    WhiteSubjectFilter,
    /// No rule applied.
    DefaultRule,
    /// Folder listed in `black_dir`.
    BlackDir,
    /// Folder listed in `white_dir`.
    WhiteDir,
}

impl Reason {
    /// Explanation shown after "because".
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlackFrom => "sender in black_from",
            Self::BlackSubject => "subject in black_subject",
            Self::WhiteFrom => "sender in white_from",
            Self::WhiteSubject => "subject in white_subject",
            Self::WhiteFromFilter => "sender match white_from filter",
            Self::WhiteSubjectFilter => "subject match white_subject filter",
            Self::DefaultRule => "default rule",
            Self::BlackDir => "directory in black_dir",
            Self::WhiteDir => "directory in white_dir",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision and the rule behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Freed or locked.
    pub decision: Decision,
    /// Why.
    pub reason: Reason,
}

impl Verdict {
    const fn freed(reason: Reason) -> Self {
        Self {
            decision: Decision::Freed,
            reason,
        }
    }

    const fn locked(reason: Reason) -> Self {
        Self {
            decision: Decision::Locked,
            reason,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} because {}", self.decision, self.reason)
    }
}

/// Extracts the address used for sender rules.
///
/// `"Alice <alice@example.com>"` gives `alice@example.com`: the text
/// between the first `<` and the next `>`. Without such a pair the header
/// is used verbatim.
#[must_use]
pub fn sender_key(from: &str) -> &str {
    from.split_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map_or(from, |(address, _)| address)
}

/// Classifies a message from its decoded `From` and `Subject` headers.
#[must_use]
pub fn classify(from: &str, subject: &str, settings: &Settings) -> Verdict {
    let sender = sender_key(from);

    if settings.contains(SettingName::BlackFrom, sender) {
        return Verdict::locked(Reason::BlackFrom);
    }
    if settings.contains(SettingName::BlackSubject, subject) {
        return Verdict::locked(Reason::BlackSubject);
    }
    if settings.contains(SettingName::WhiteFrom, sender) {
        return Verdict::freed(Reason::WhiteFrom);
    }
    if settings.contains(SettingName::WhiteSubject, subject) {
        return Verdict::freed(Reason::WhiteSubject);
    }
    if settings
        .list(SettingName::WhiteFrom)
        .iter()
        .any(|pattern| matches_filter(sender, pattern))
    {
        return Verdict::freed(Reason::WhiteFromFilter);
    }
    if settings
        .list(SettingName::WhiteSubject)
        .iter()
        .any(|pattern| matches_filter(subject, pattern))
    {
        return Verdict::freed(Reason::WhiteSubjectFilter);
    }

    Verdict::locked(Reason::DefaultRule)
}

/// Verdict applying to every message of `folder`, if the folder is listed
/// in `black_dir` or `white_dir`. `black_dir` wins when both list it.
#[must_use]
pub fn folder_override(folder: &str, settings: &Settings) -> Option<Verdict> {
    if settings.contains(SettingName::BlackDir, folder) {
        Some(Verdict::locked(Reason::BlackDir))
    } else if settings.contains(SettingName::WhiteDir, folder) {
        Some(Verdict::freed(Reason::WhiteDir))
    } else {
        None
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

    fn settings(entries: &[(SettingName, &str)]) -> Settings {
        let mut settings = Settings::default();
        for (name, value) in entries {
            settings.add(*name, *value).unwrap();
        }
        settings
    }

    #[test]
    fn test_sender_key() {
        assert_eq!(sender_key("Alice <alice@example.com>"), "alice@example.com");
        assert_eq!(sender_key("bob@example.com"), "bob@example.com");
        assert_eq!(sender_key("\"A <b>\" <c@d.e>"), "b");
        assert_eq!(sender_key("Broken <no-end"), "Broken <no-end");
        assert_eq!(sender_key("<>"), "");
        assert_eq!(sender_key(""), "");
    }

    #[test]
    fn test_empty_settings_default_rule() {
        let verdict = classify("a@b.c", "hello", &Settings::default());
        assert_eq!(verdict, Verdict::locked(Reason::DefaultRule));
        assert_eq!(verdict.to_string(), "locked because default rule");
    }

    #[test]
    fn test_black_beats_white() {
        let s = settings(&[
            (SettingName::BlackFrom, "x@y.z"),
            (SettingName::WhiteFrom, "x@y.z"),
        ]);
        assert_eq!(classify("X <x@y.z>", "", &s).reason, Reason::BlackFrom);

        let s = settings(&[
            (SettingName::BlackSubject, "win"),
            (SettingName::WhiteFrom, "x@y.z"),
        ]);
        assert_eq!(classify("x@y.z", "win", &s).reason, Reason::BlackSubject);
    }

    #[test]
    fn test_black_lists_are_exact_only() {
        let s = settings(&[(SettingName::BlackFrom, "*@spam.com")]);
        assert_eq!(
            classify("a@spam.com", "", &s).reason,
            Reason::DefaultRule
        );
    }

    #[test]
    fn test_exact_white_before_glob() {
        let s = settings(&[
            (SettingName::WhiteFrom, "bob@trusted.com"),
            (SettingName::WhiteFrom, "*@trusted.com"),
        ]);
        let verdict = classify("Bob <bob@trusted.com>", "", &s);
        assert_eq!(verdict, Verdict::freed(Reason::WhiteFrom));
    }

    #[test]
    fn test_exact_subject_before_sender_glob() {
        let s = settings(&[
            (SettingName::WhiteFrom, "*@trusted.com"),
            (SettingName::WhiteSubject, "invoice"),
        ]);
        assert_eq!(
            classify("bob@trusted.com", "invoice", &s).reason,
            Reason::WhiteSubject
        );
    }

    #[test]
    fn test_glob_fallback() {
        let s = settings(&[(SettingName::WhiteFrom, "*@trusted.com")]);
        assert_eq!(
            classify("bob@trusted.com", "anything", &s),
            Verdict::freed(Reason::WhiteFromFilter)
        );
        assert_eq!(
            classify("eve@untrusted.org", "anything", &s).reason,
            Reason::DefaultRule
        );
    }

    #[test]
    fn test_subject_glob_and_negation() {
        let s = settings(&[(SettingName::WhiteSubject, "~*unsubscribe*")]);
        assert_eq!(
            classify("a@b.c", "Lunch?", &s),
            Verdict::freed(Reason::WhiteSubjectFilter)
        );
        assert_eq!(
            classify("a@b.c", "click to unsubscribe", &s).reason,
            Reason::DefaultRule
        );
    }

    #[test]
    fn test_missing_headers_are_empty_strings() {
        let s = settings(&[(SettingName::WhiteSubject, "")]);
        assert_eq!(classify("", "", &s).reason, Reason::WhiteSubject);
    }

    #[test]
    fn test_folder_override() {
        let s = settings(&[
            (SettingName::BlackDir, "Spam"),
            (SettingName::WhiteDir, "Family"),
            (SettingName::WhiteDir, "Spam"),
        ]);
        assert_eq!(
            folder_override("Spam", &s),
            Some(Verdict::locked(Reason::BlackDir))
        );
        assert_eq!(
            folder_override("Family", &s),
            Some(Verdict::freed(Reason::WhiteDir))
        );
        assert_eq!(folder_override("INBOX", &s), None);
    }
}
