//! Integration tests for the IMAP client.
//!
//! A mock stream replays a scripted server conversation and records what
//! the client wrote, so whole sessions run without a real server.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use freemails_imap::{
    Client, Error, MailboxAttribute, NotAuthenticated, SearchCriteria, SeqNum,
};

/// Mock stream that returns predefined responses.
struct MockStream {
    /// Server bytes, returned in order.
    responses: Cursor<Vec<u8>>,
    /// Commands sent by the client.
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            responses: Cursor::new(responses.to_vec()),
            sent: Arc::clone(&sent),
        };
        (stream, sent)
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let pos = usize::try_from(self.responses.position()).unwrap();
        let data = self.responses.get_ref();
        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let to_read = (data.len() - pos).min(buf.remaining());
        buf.put_slice(&data[pos..pos + to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
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

const TIMEOUT: Duration = Duration::from_secs(5);

async fn connect(script: &[u8]) -> (Client<MockStream, NotAuthenticated>, Arc<Mutex<Vec<u8>>>) {
    let (stream, sent) = MockStream::new(script);
    let client = Client::from_stream(stream, TIMEOUT).await.unwrap();
    (client, sent)
}

fn sent_lines(sent: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
    String::from_utf8(sent.lock().unwrap().clone())
        .unwrap()
        .split_terminator("\r\n")
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_read_only_session() {
    let script = b"* OK [CAPABILITY IMAP4rev1 SPECIAL-USE] ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * LIST (\\HasNoChildren) \"/\" INBOX\r\n\
        * LIST (\\HasNoChildren \\Sent) \"/\" \"Sent Items\"\r\n\
        A0001 OK LIST completed\r\n\
        * FLAGS (\\Seen \\Answered)\r\n\
        * 2 EXISTS\r\n\
        * 0 RECENT\r\n\
        * OK [UIDVALIDITY 3857529045] UIDs valid\r\n\
        A0002 OK [READ-ONLY] EXAMINE completed\r\n\
        * SEARCH 1 2\r\n\
        A0003 OK SEARCH completed\r\n\
        * 1 FETCH (BODY[HEADER] {37}\r\nFrom: a@b.c\r\nSubject: Hello there\r\n\r\n)\r\n\
        A0004 OK FETCH completed\r\n\
        A0005 OK CLOSE completed\r\n\
        * BYE logging out\r\n\
        A0006 OK LOGOUT completed\r\n";

    let (client, sent) = connect(script).await;
    assert!(client.supports_special_use());

    let mut client = client.login("me@example.com", "hunter 2").await.unwrap();

    let folders = client.list("", "*").await.unwrap();
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].mailbox.as_str(), "INBOX");
    assert!(folders[1].has_attribute(&MailboxAttribute::Sent));

    let (mut selected, status) = client.examine("INBOX").await.unwrap();
    assert_eq!(status.exists, 2);
    assert!(status.read_only);
    assert_eq!(selected.mailbox(), "INBOX");

    let ids = selected.search(&[]).await.unwrap();
    assert_eq!(ids.iter().map(|s| s.get()).collect::<Vec<_>>(), vec![1, 2]);

    let header = selected.fetch_header(ids[0]).await.unwrap().unwrap();
    assert_eq!(header, b"From: a@b.c\r\nSubject: Hello there\r\n\r\n");

    let client = selected.close().await.unwrap();
    client.logout().await.unwrap();

    assert_eq!(
        sent_lines(&sent),
        vec![
            "A0000 LOGIN me@example.com \"hunter 2\"",
            "A0001 LIST \"\" \"*\"",
            "A0002 EXAMINE INBOX",
            "A0003 SEARCH ALL",
            "A0004 FETCH 1 BODY.PEEK[HEADER]",
            "A0005 CLOSE",
            "A0006 LOGOUT",
        ]
    );
}

#[tokio::test]
async fn test_login_rejected() {
    let script = b"* OK ready\r\n\
        A0000 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n";
    let (client, _) = connect(script).await;

    let err = client.login("me", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::No(ref text) if text == "Invalid credentials"));
}

#[tokio::test]
async fn test_login_disabled_is_not_attempted() {
    let script = b"* OK [CAPABILITY IMAP4rev1 LOGINDISABLED] ready\r\n";
    let (client, sent) = connect(script).await;

    assert!(matches!(
        client.login("me", "pw").await,
        Err(Error::Protocol(_))
    ));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bye_greeting() {
    let (stream, _) = MockStream::new(b"* BYE too many connections\r\n");
    let result = Client::from_stream(stream, TIMEOUT).await;
    assert!(matches!(result, Err(Error::Bye(_))));
}

#[tokio::test]
async fn test_examine_refusal_keeps_session() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        A0001 NO [NONEXISTENT] No such mailbox\r\n\
        A0002 OK [READ-ONLY] EXAMINE completed\r\n";
    let (client, _) = connect(script).await;
    let client = client.login("me", "pw").await.unwrap();

    let Ok(Err((client, err))) = client.try_examine("Gone").await else {
        panic!("expected a refusal");
    };
    assert!(err.is_refusal());

    let Ok(Ok((selected, status))) = client.try_examine("INBOX").await else {
        panic!("expected INBOX to open");
    };
    assert_eq!(status.exists, 0);
    assert_eq!(selected.mailbox(), "INBOX");
}

#[tokio::test]
async fn test_unsolicited_bye_aborts_command() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        A0001 OK [READ-ONLY] EXAMINE completed\r\n\
        * BYE server shutting down\r\n";
    let (client, _) = connect(script).await;
    let client = client.login("me", "pw").await.unwrap();
    let (mut selected, _) = client.examine("INBOX").await.unwrap();

    let err = selected
        .search(&[SearchCriteria::Unseen])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Bye(_)));
    assert!(!err.is_refusal());
}

#[tokio::test]
async fn test_fetch_nil_header() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        * 1 EXISTS\r\n\
        A0001 OK [READ-ONLY] EXAMINE completed\r\n\
        * 1 FETCH (BODY[HEADER] NIL)\r\n\
        A0002 OK FETCH completed\r\n\
        A0003 OK FETCH completed\r\n";
    let (client, _) = connect(script).await;
    let client = client.login("me", "pw").await.unwrap();
    let (mut selected, _) = client.examine("INBOX").await.unwrap();

    let seq = SeqNum::new(1).unwrap();
    assert_eq!(selected.fetch_header(seq).await.unwrap(), None);
    // No FETCH data at all for the message.
    assert_eq!(selected.fetch_header(seq).await.unwrap(), None);
}

#[tokio::test]
async fn test_connection_closed_mid_command() {
    let script = b"* OK ready\r\nA0000 OK LOGIN completed\r\n* LIST () \"/\" INBOX\r\n";
    let (client, _) = connect(script).await;
    let mut client = client.login("me", "pw").await.unwrap();

    assert!(matches!(client.list("", "*").await, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_close_refusal_keeps_session() {
    let script = b"* OK ready\r\n\
        A0000 OK LOGIN completed\r\n\
        A0001 OK [READ-ONLY] EXAMINE completed\r\n\
        A0002 NO close refused\r\n\
        A0003 OK LOGOUT completed\r\n";
    let (client, sent) = connect(script).await;
    let client = client.login("me", "pw").await.unwrap();
    let (selected, _) = client.examine("INBOX").await.unwrap();

    let Ok(Err((selected, err))) = selected.try_close().await else {
        panic!("expected CLOSE to be refused");
    };
    assert!(err.is_refusal());
    assert_eq!(selected.mailbox(), "INBOX");

    selected.logout().await.unwrap();
    assert_eq!(sent_lines(&sent).last().unwrap(), "A0003 LOGOUT");
}
