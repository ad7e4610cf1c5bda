//! `ImapMailbox` driving a scripted IMAP conversation.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use freemails_core::{
    Error, ImapMailbox, MailSource, ScanOptions, ScanSink, SettingName, Settings, Verdict,
    scan_mailbox,
};
use freemails_imap::{Client, SeqNum};

/// Replays server bytes and records what the client writes.
struct ScriptedStream {
    script: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let pos = usize::try_from(self.script.position()).unwrap();
        let data = self.script.get_ref();
        let n = data.len().saturating_sub(pos).min(buf.remaining());
        buf.put_slice(&data[pos..pos + n]);
        self.script.set_position((pos + n) as u64);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

async fn mailbox(script: &[u8]) -> (ImapMailbox<ScriptedStream>, Arc<Mutex<Vec<u8>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let stream = ScriptedStream {
        script: Cursor::new(script.to_vec()),
        sent: Arc::clone(&sent),
    };
    let client = Client::from_stream(stream, Duration::from_secs(5))
        .await
        .unwrap()
        .login("me@example.com", "secret")
        .await
        .unwrap();
    (ImapMailbox::from_client(client), sent)
}

fn sent_lines(sent: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
    String::from_utf8(sent.lock().unwrap().clone())
        .unwrap()
        .split_terminator("\r\n")
        .map(str::to_string)
        .collect()
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl ScanSink for Recorder {
    fn folder(&mut self, name: &str, count: u32) {
        self.events.push(format!("{name} : {count}"));
    }

    fn folder_override(&mut self, _name: &str, verdict: &Verdict) {
        self.events.push(format!("all {verdict}"));
    }

    fn message(&mut self, from: &str, subject: &str, verdict: &Verdict) {
        self.events.push(format!("{from} : {subject} : {verdict}"));
    }

    fn folder_failed(&mut self, name: &str, error: &Error) {
        self.events.push(format!("failed {name}: {error}"));
    }

    fn message_failed(&mut self, sequence: SeqNum, _error: &Error) {
        self.events.push(format!("failed message {sequence}"));
    }
}

#[tokio::test]
async fn test_scan_session() {
    let script = b"* OK [CAPABILITY IMAP4rev1 SPECIAL-USE] ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * LIST (\\HasNoChildren) \"/\" INBOX\r\n\
        * LIST (\\HasNoChildren) \"/\" Archive\r\n\
        * LIST (\\HasNoChildren) \"/\" Spam\r\n\
        * LIST (\\HasNoChildren \\Sent) \"/\" \"Sent Items\"\r\n\
        * LIST (\\Noselect \\HasChildren) \"/\" \"[Gmail]\"\r\n\
        A0001 OK LIST completed\r\n\
        * 2 EXISTS\r\n\
        * 0 RECENT\r\n\
        A0002 OK [READ-ONLY] EXAMINE completed\r\n\
        * SEARCH 1 2\r\n\
        A0003 OK SEARCH completed\r\n\
        * 1 FETCH (BODY[HEADER] {51}\r\nFrom: Alice <alice@example.com>\r\nSubject: Lunch\r\n\r\n)\r\n\
        A0004 OK FETCH completed\r\n\
        A0005 NO message expunged\r\n\
        A0006 OK CLOSE completed\r\n\
        A0007 NO [NONEXISTENT] no such mailbox\r\n\
        * 5 EXISTS\r\n\
        A0008 OK [READ-ONLY] EXAMINE completed\r\n\
        A0009 OK CLOSE completed\r\n\
        * BYE logging out\r\n\
        A0010 OK LOGOUT completed\r\n";
    let (mailbox, sent) = mailbox(script).await;

    let mut settings = Settings::default();
    settings.add(SettingName::WhiteFrom, "*@example.com").unwrap();
    settings.add(SettingName::BlackDir, "Spam").unwrap();
    let mut sink = Recorder::default();

    let summary = scan_mailbox(mailbox, &settings, &ScanOptions::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            "INBOX : 2",
            "Alice <alice@example.com> : Lunch : freed because sender match white_from filter",
            "failed message 2",
            "failed Archive: IMAP error: server refused: no such mailbox",
            "Spam : 5",
            "all locked because directory in black_dir",
        ]
    );
    assert_eq!(summary.folders, 2);
    assert_eq!(summary.failed_folders, 1);

    assert_eq!(
        sent_lines(&sent),
        vec![
            "A0000 LOGIN me@example.com secret",
            "A0001 LIST \"\" \"*\"",
            "A0002 EXAMINE INBOX",
            "A0003 SEARCH ALL",
            "A0004 FETCH 1 BODY.PEEK[HEADER]",
            "A0005 FETCH 2 BODY.PEEK[HEADER]",
            "A0006 CLOSE",
            "A0007 EXAMINE Archive",
            "A0008 EXAMINE Spam",
            "A0009 CLOSE",
            "A0010 LOGOUT",
        ]
    );
}

#[tokio::test]
async fn test_session_released_after_transport_failure() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * LIST () \"/\" INBOX\r\n\
        A0001 OK LIST completed\r\n\
        * 3 EXISTS\r\n\
        A0002 OK [READ-ONLY] EXAMINE completed\r\n";
    let (mailbox, sent) = mailbox(script).await;
    let mut sink = Recorder::default();

    let err = scan_mailbox(mailbox, &Settings::default(), &ScanOptions::default(), &mut sink)
        .await
        .unwrap_err();

    assert!(!err.is_refusal());
    assert_eq!(sink.events, vec!["INBOX : 3"]);
    let lines = sent_lines(&sent);
    assert_eq!(lines[lines.len() - 2..], ["A0003 SEARCH ALL", "A0004 CLOSE"]);
}

#[tokio::test]
async fn test_close_without_open_folder() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * BYE bye\r\n\
        A0001 OK LOGOUT completed\r\n";
    let (mailbox, sent) = mailbox(script).await;

    assert_eq!(mailbox.current_folder(), None);
    mailbox.close().await.unwrap();
    assert_eq!(sent_lines(&sent).last().unwrap(), "A0001 LOGOUT");
}

#[tokio::test]
async fn test_refused_close_only_fails_next_folder() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * LIST () \"/\" A\r\n\
        * LIST () \"/\" B\r\n\
        * LIST () \"/\" C\r\n\
        A0001 OK LIST completed\r\n\
        * 1 EXISTS\r\n\
        A0002 OK [READ-ONLY] EXAMINE completed\r\n\
        A0003 NO close refused\r\n\
        A0004 OK CLOSE completed\r\n\
        * 2 EXISTS\r\n\
        A0005 OK [READ-ONLY] EXAMINE completed\r\n\
        A0006 OK CLOSE completed\r\n\
        A0007 OK LOGOUT completed\r\n";
    let (mailbox, sent) = mailbox(script).await;

    let mut settings = Settings::default();
    for folder in ["A", "B", "C"] {
        settings.add(SettingName::BlackDir, folder).unwrap();
    }
    let mut sink = Recorder::default();

    let summary = scan_mailbox(mailbox, &settings, &ScanOptions::everything(), &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            "A : 1",
            "all locked because directory in black_dir",
            "failed B: IMAP error: server refused: close refused",
            "C : 2",
            "all locked because directory in black_dir",
        ]
    );
    assert_eq!(summary.folders, 2);
    assert_eq!(summary.failed_folders, 1);
    assert_eq!(
        sent_lines(&sent)[2..],
        [
            "A0002 EXAMINE A",
            "A0003 CLOSE",
            "A0004 CLOSE",
            "A0005 EXAMINE C",
            "A0006 CLOSE",
            "A0007 LOGOUT",
        ]
    );
}

#[tokio::test]
async fn test_close_logs_out_when_close_is_refused() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * 4 EXISTS\r\n\
        A0001 OK [READ-ONLY] EXAMINE completed\r\n\
        A0002 BAD not now\r\n\
        A0003 OK LOGOUT completed\r\n";
    let (mut mailbox, sent) = mailbox(script).await;

    assert_eq!(mailbox.examine("INBOX").await.unwrap(), 4);
    assert_eq!(mailbox.current_folder(), Some("INBOX"));
    mailbox.close().await.unwrap();

    assert_eq!(
        sent_lines(&sent)[1..],
        ["A0001 EXAMINE INBOX", "A0002 CLOSE", "A0003 LOGOUT"]
    );
}
