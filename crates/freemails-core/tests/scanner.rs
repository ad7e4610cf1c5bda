//! Scanner behaviour against an in-memory mail source.

use std::collections::HashMap;

use freemails_core::{
    Error, Folder, MailSource, Reason, ScanOptions, ScanSink, ScanSummary, SettingName,
    Settings, Verdict, scan,
};
use freemails_imap::{MailboxAttribute, SearchCriteria, SeqNum};

/// A mailbox held in memory that records every call made on it.
#[derive(Default)]
struct FakeSource {
    folders: Vec<Folder>,
    /// Header of each message by folder; `None` is an empty FETCH.
    messages: HashMap<String, Vec<Option<String>>>,
    /// Folders the server refuses to open.
    refused: Vec<String>,
    /// Folder whose SEARCH ends the connection.
    broken: Option<String>,
    open: Option<String>,
    calls: Vec<String>,
}

impl FakeSource {
    fn folder(mut self, name: &str, headers: &[&str]) -> Self {
        self.folders.push(Folder::new(name));
        self.messages.insert(
            name.to_string(),
            headers.iter().map(|h| Some((*h).to_string())).collect(),
        );
        self
    }

    fn flagged(mut self, name: &str, attribute: MailboxAttribute) -> Self {
        self.folders.push(Folder {
            name: name.to_string(),
            attributes: vec![attribute],
        });
        self.messages.insert(name.to_string(), vec![Some(String::new())]);
        self
    }

    fn calls_for(&self, verb: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(verb)).count()
    }
}

impl MailSource for FakeSource {
    async fn list_folders(&mut self) -> freemails_core::Result<Vec<Folder>> {
        self.calls.push("LIST".to_string());
        Ok(self.folders.clone())
    }

    async fn examine(&mut self, folder: &str) -> freemails_core::Result<u32> {
        self.calls.push(format!("EXAMINE {folder}"));
        if self.refused.iter().any(|f| f == folder) {
            self.open = None;
            return Err(freemails_imap::Error::No("no such mailbox".into()).into());
        }
        self.open = Some(folder.to_string());
        Ok(u32::try_from(self.messages[folder].len()).unwrap())
    }

    async fn search(&mut self, _criteria: &[SearchCriteria]) -> freemails_core::Result<Vec<SeqNum>> {
        let folder = self.open.clone().unwrap();
        self.calls.push(format!("SEARCH {folder}"));
        if self.broken.as_deref() == Some(folder.as_str()) {
            return Err(freemails_imap::Error::Bye("shutting down".into()).into());
        }
        let count = u32::try_from(self.messages[&folder].len()).unwrap();
        Ok((1..=count).filter_map(SeqNum::new).collect())
    }

    async fn fetch_header(&mut self, sequence: SeqNum) -> freemails_core::Result<Option<Vec<u8>>> {
        let folder = self.open.clone().unwrap();
        self.calls.push(format!("FETCH {folder} {sequence}"));
        let index = usize::try_from(sequence.get() - 1).unwrap();
        Ok(self.messages[&folder][index].clone().map(String::into_bytes))
    }
}

/// Sink collecting events as text lines.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl ScanSink for Recorder {
    fn folder(&mut self, name: &str, count: u32) {
        self.events.push(format!("folder {name} {count}"));
    }

    fn folder_override(&mut self, name: &str, verdict: &Verdict) {
        self.events.push(format!("all {name} {verdict}"));
    }

    fn message(&mut self, from: &str, subject: &str, verdict: &Verdict) {
        self.events.push(format!("{from} : {subject} : {verdict}"));
    }

    fn folder_failed(&mut self, name: &str, _error: &Error) {
        self.events.push(format!("failed {name}"));
    }

    fn message_failed(&mut self, sequence: SeqNum, _error: &Error) {
        self.events.push(format!("failed message {sequence}"));
    }
}

fn settings(entries: &[(SettingName, &str)]) -> Settings {
    let mut settings = Settings::default();
    for (name, value) in entries {
        settings.add(*name, *value).unwrap();
    }
    settings
}

#[tokio::test]
async fn test_black_dir_is_never_searched_or_fetched() {
    let mut source = FakeSource::default().folder("Promotions", &["From: a@b.c\r\n", "From: d@e.f\r\n"]);
    let settings = settings(&[(SettingName::BlackDir, "Promotions")]);
    let mut sink = Recorder::default();

    let summary = scan(&mut source, &settings, &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            "folder Promotions 2",
            "all Promotions locked because directory in black_dir"
        ]
    );
    assert_eq!(source.calls_for("SEARCH"), 0);
    assert_eq!(source.calls_for("FETCH"), 0);
    assert_eq!(summary.messages, 0);
}

#[tokio::test]
async fn test_white_dir_frees_everything() {
    let mut source = FakeSource::default().folder("Family", &["From: x@y.z\r\n"]);
    let settings = settings(&[(SettingName::WhiteDir, "Family")]);
    let mut sink = Recorder::default();

    scan(&mut source, &settings, &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.events[1], "all Family freed because directory in white_dir");
    assert_eq!(source.calls_for("FETCH"), 0);
}

#[tokio::test]
async fn test_messages_are_classified_in_order() {
    let mut source = FakeSource::default()
        .folder(
            "INBOX",
            &[
                "From: Bob <bob@trusted.com>\r\nSubject: Hi\r\n\r\n",
                "From: promo@shop.com\r\nSubject: =?utf-8?Q?Soldes_=C3=A9t=C3=A9?=\r\n\r\n",
            ],
        )
        .folder("Work", &["Subject: no sender\r\n\r\n"]);
    let settings = settings(&[(SettingName::WhiteFrom, "*@trusted.com")]);
    let mut sink = Recorder::default();

    let summary = scan(&mut source, &settings, &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            "folder INBOX 2",
            "Bob <bob@trusted.com> : Hi : freed because sender match white_from filter",
            "promo@shop.com : Soldes été : locked because default rule",
            "folder Work 1",
            " : no sender : locked because default rule",
        ]
    );
    assert_eq!(
        summary,
        ScanSummary {
            folders: 2,
            messages: 3,
            failed_folders: 0,
            failed_messages: 0,
        }
    );
}

#[tokio::test]
async fn test_excluded_and_special_folders_are_skipped() {
    let mut source = FakeSource::default()
        .folder("Brouillons", &["From: a@b.c\r\n"])
        .flagged("Sent Items", MailboxAttribute::Sent)
        .flagged("[Gmail]", MailboxAttribute::NoSelect)
        .folder("INBOX", &[]);
    let mut sink = Recorder::default();

    scan(&mut source, &Settings::default(), &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(source.calls, vec!["LIST", "EXAMINE INBOX", "SEARCH INBOX"]);
    assert_eq!(sink.events, vec!["folder INBOX 0"]);
}

#[tokio::test]
async fn test_everything_opens_special_use_folders() {
    let mut source = FakeSource::default()
        .flagged("Sent Items", MailboxAttribute::Sent)
        .flagged("[Gmail]", MailboxAttribute::NoSelect);
    let mut sink = Recorder::default();

    scan(&mut source, &Settings::default(), &ScanOptions::everything(), &mut sink)
        .await
        .unwrap();

    assert_eq!(source.calls_for("EXAMINE"), 1);
    assert_eq!(sink.events[0], "folder Sent Items 1");
}

#[tokio::test]
async fn test_refusals_do_not_stop_the_scan() {
    let mut source = FakeSource::default()
        .folder("Archive", &["From: a@b.c\r\n"])
        .folder("INBOX", &["From: a@b.c\r\n"]);
    source.refused.push("Archive".to_string());
    source
        .messages
        .get_mut("INBOX")
        .unwrap()
        .insert(0, None);
    let mut sink = Recorder::default();

    let summary = scan(&mut source, &Settings::default(), &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            "failed Archive",
            "folder INBOX 2",
            "failed message 1",
            "a@b.c :  : locked because default rule",
        ]
    );
    assert_eq!(summary.failed_folders, 1);
    assert_eq!(summary.failed_messages, 1);
    assert_eq!(summary.messages, 1);
}

#[tokio::test]
async fn test_transport_failure_aborts() {
    let mut source = FakeSource::default()
        .folder("INBOX", &["From: a@b.c\r\n"])
        .folder("Work", &["From: a@b.c\r\n"]);
    source.broken = Some("INBOX".to_string());
    let mut sink = Recorder::default();

    let err = scan(&mut source, &Settings::default(), &ScanOptions::default(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Imap(freemails_imap::Error::Bye(_))));
    assert_eq!(source.calls_for("EXAMINE"), 1);
    assert_eq!(sink.events, vec!["folder INBOX 1"]);
}

#[tokio::test]
async fn test_folder_override_uses_reason() {
    let mut source = FakeSource::default().folder("Both", &["From: a@b.c\r\n"]);
    let settings = settings(&[
        (SettingName::BlackDir, "Both"),
        (SettingName::WhiteDir, "Both"),
    ]);
    let mut sink = Recorder::default();

    scan(&mut source, &settings, &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert!(sink.events[1].ends_with(Reason::BlackDir.as_str()));
}
