//! Scan listing.

use std::io::{self, Write};

use freemails_core::{Error, ScanSink, Verdict};
use freemails_imap::SeqNum;

const RULE: &str = "==============================";

/// Prints scan results as they arrive.
///
/// `ScanSink` callbacks cannot fail, so the first write error is kept and
/// returned by [`Printer::finish`].
pub struct Printer<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Printer<W> {
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the first write error, if any.
    pub fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => self.out.flush(),
        }
    }

    fn line(&mut self, line: std::fmt::Arguments<'_>) {
        if self.error.is_none()
            && let Err(err) = writeln!(self.out, "{line}")
        {
            self.error = Some(err);
        }
    }
}

impl<W: Write> ScanSink for Printer<W> {
    fn folder(&mut self, name: &str, count: u32) {
        self.line(format_args!("{RULE} {name} : {count} {RULE}"));
    }

    fn folder_override(&mut self, _name: &str, verdict: &Verdict) {
        let all = if verdict.decision.is_freed() {
            "All freed"
        } else {
            "All locked"
        };
        self.line(format_args!("  {all} because {}", verdict.reason));
    }

    fn message(&mut self, from: &str, subject: &str, verdict: &Verdict) {
        self.line(format_args!("{from} : {subject}"));
        self.line(format_args!("  {verdict}"));
    }

    fn folder_failed(&mut self, name: &str, error: &Error) {
        self.line(format_args!("{RULE} {name} : ? {RULE}"));
        self.line(format_args!("  Skipped: {error}"));
    }

    fn message_failed(&mut self, sequence: SeqNum, error: &Error) {
        self.line(format_args!("Message {sequence} : ?"));
        self.line(format_args!("  Skipped: {error}"));
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
    use freemails_core::{Decision, Reason};

    fn render(f: impl FnOnce(&mut Printer<&mut Vec<u8>>)) -> String {
        let mut out = Vec::new();
        let mut printer = Printer::new(&mut out);
        f(&mut printer);
        printer.finish().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_folder_header() {
        let text = render(|p| p.folder("INBOX", 12));
        assert_eq!(
            text,
            "============================== INBOX : 12 ==============================\n"
        );
    }

    #[test]
    fn test_override_lines() {
        let text = render(|p| {
            p.folder_override(
                "Spam",
                &Verdict {
                    decision: Decision::Locked,
                    reason: Reason::BlackDir,
                },
            );
            p.folder_override(
                "Family",
                &Verdict {
                    decision: Decision::Freed,
                    reason: Reason::WhiteDir,
                },
            );
        });
        assert_eq!(
            text,
            "  All locked because directory in black_dir\n  All freed because directory in white_dir\n"
        );
    }

    #[test]
    fn test_message_lines() {
        let text = render(|p| {
            p.message(
                "Bob <bob@trusted.com>",
                "Hi",
                &Verdict {
                    decision: Decision::Freed,
                    reason: Reason::WhiteFromFilter,
                },
            );
        });
        assert_eq!(
            text,
            "Bob <bob@trusted.com> : Hi\n  freed because sender match white_from filter\n"
        );
    }

    #[test]
    fn test_write_error_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut printer = Printer::new(Broken);
        printer.folder("INBOX", 1);
        printer.folder("Work", 1);
        assert_eq!(printer.finish().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
