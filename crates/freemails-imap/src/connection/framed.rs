//! Reading whole responses off the wire.
//!
//! A response is one CRLF line, and when that line ends in a literal
//! announcement (`{n}`) also the `n` raw bytes and the line that follows
//! them, repeated as long as literals keep coming.

#![allow(clippy::missing_errors_doc)]

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{Error, Result};

const READ_BUFFER: usize = 8 * 1024;

/// Longest line accepted between literals.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest literal accepted. Header blocks are a few kilobytes.
const MAX_LITERAL_SIZE: usize = 16 * 1024 * 1024;

/// Buffered connection that yields complete responses.
///
/// Each response must arrive within `read_timeout`.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    read_timeout: Duration,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream.
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER, stream),
            read_timeout,
        }
    }

    /// Next complete response, literals included.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let limit = self.read_timeout;
        match tokio::time::timeout(limit, self.collect_response()).await {
            Ok(response) => response,
            Err(_) => Err(Error::Timeout(limit)),
        }
    }

    async fn collect_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        loop {
            let line_start = response.len();
            self.append_line(&mut response).await?;
            let Some(size) = literal_size(&response[line_start..]) else {
                return Ok(response);
            };
            if size > MAX_LITERAL_SIZE {
                return Err(Error::Protocol(format!(
                    "literal too large: {size} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }
            let literal_start = response.len();
            response.resize(literal_start + size, 0);
            self.reader.read_exact(&mut response[literal_start..]).await?;
        }
    }

    /// Appends one line, terminator included, to `out`.
    async fn append_line(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let before = out.len();
        let cap = u64::try_from(MAX_LINE_LENGTH).unwrap_or(u64::MAX) + 1;
        let read = (&mut self.reader).take(cap).read_until(b'\n', out).await?;
        if out.ends_with(b"\n") {
            return Ok(());
        }
        if read > MAX_LINE_LENGTH {
            return Err(Error::Protocol("line too long".to_string()));
        }
        let what = if out.len() == before {
            "connection closed by server"
        } else {
            "connection closed mid-line"
        };
        Err(Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, what)))
    }

    /// Reads responses up to and including the tagged completion for `tag`.
    pub async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();
        loop {
            let response = self.read_response().await?;
            let done = response.len() > tag.len()
                && response.starts_with(tag.as_bytes())
                && response[tag.len()] == b' ';
            responses.push(response);
            if done {
                return Ok(responses);
            }
        }
    }

    /// Sends a serialized command and flushes.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Closes the write half.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.reader.get_mut().shutdown().await?;
        Ok(())
    }
}

/// Size announced by a trailing `{n}` or `{n+}` on a CRLF line.
fn literal_size(line: &[u8]) -> Option<usize> {
    let inner = line.strip_suffix(b"}\r\n")?;
    let inner = inner.strip_suffix(b"+").unwrap_or(inner);
    let open = inner.iter().rposition(|&b| b == b'{')?;
    let digits = std::str::from_utf8(&inner[open + 1..]).ok()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
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
    use tokio_test::io::Builder;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_literal_size() {
        assert_eq!(literal_size(b"BODY[HEADER] {123}\r\n"), Some(123));
        assert_eq!(literal_size(b"BODY {123+}\r\n"), Some(123));
        assert_eq!(literal_size(b"{0}\r\n"), Some(0));
        assert_eq!(literal_size(b"no literal\r\n"), None);
        assert_eq!(literal_size(b"incomplete {123"), None);
        assert_eq!(literal_size(b"wrong {abc}\r\n"), None);
        assert_eq!(literal_size(b"empty {}\r\n"), None);
    }

    #[tokio::test]
    async fn test_read_simple_line() {
        let mock = Builder::new().read(b"* OK ready\r\n").build();
        let mut framed = FramedStream::new(mock, TIMEOUT);
        assert_eq!(framed.read_response().await.unwrap(), b"* OK ready\r\n");
    }

    #[tokio::test]
    async fn test_read_crlf_split_across_chunks() {
        let mock = Builder::new().read(b"* OK ready\r").read(b"\n* 1 EXISTS\r\n").build();
        let mut framed = FramedStream::new(mock, TIMEOUT);
        assert_eq!(framed.read_response().await.unwrap(), b"* OK ready\r\n");
        assert_eq!(framed.read_response().await.unwrap(), b"* 1 EXISTS\r\n");
    }

    #[tokio::test]
    async fn test_read_with_literal() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[HEADER] {5}\r\n")
            .read(b"hi\r\n!)\r\n")
            .build();
        let mut framed = FramedStream::new(mock, TIMEOUT);

        let response = framed.read_response().await.unwrap();
        assert_eq!(response, b"* 1 FETCH (BODY[HEADER] {5}\r\nhi\r\n!)\r\n");
    }

    #[tokio::test]
    async fn test_read_until_tagged() {
        let mock = Builder::new()
            .read(b"* SEARCH 1 2\r\n")
            .read(b"A00011 OK not ours\r\n")
            .read(b"A0001 OK SEARCH done\r\n")
            .build();
        let mut framed = FramedStream::new(mock, TIMEOUT);

        let responses = framed.read_until_tagged("A0001").await.unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2], b"A0001 OK SEARCH done\r\n");
    }

    #[tokio::test]
    async fn test_write_command() {
        let mock = Builder::new().write(b"A0001 NOOP\r\n").build();
        let mut framed = FramedStream::new(mock, TIMEOUT);
        framed.write_command(b"A0001 NOOP\r\n").await.unwrap();
    }

    #[tokio::test]
    async fn test_literal_size_validation() {
        let header = format!("* 1 FETCH (BODY[] {{{}}}\r\n", MAX_LITERAL_SIZE + 1);
        let mock = Builder::new().read(header.as_bytes()).build();
        let mut framed = FramedStream::new(mock, TIMEOUT);

        let err = framed.read_response().await.unwrap_err();
        assert!(err.to_string().contains("literal too large"));
    }

    #[tokio::test]
    async fn test_bare_lf_line_is_accepted() {
        let mock = Builder::new().read(b"* OK lenient\n").build();
        let mut framed = FramedStream::new(mock, TIMEOUT);
        assert_eq!(framed.read_response().await.unwrap(), b"* OK lenient\n");
    }

    #[tokio::test]
    async fn test_eof_is_io_error() {
        let mock = Builder::new().read(b"* OK partial").build();
        let mut framed = FramedStream::new(mock, TIMEOUT);
        assert!(matches!(framed.read_response().await, Err(Error::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout() {
        let mock = Builder::new().wait(Duration::from_secs(120)).build();
        let mut framed = FramedStream::new(mock, Duration::from_secs(60));
        assert!(matches!(
            framed.read_response().await,
            Err(Error::Timeout(d)) if d == Duration::from_secs(60)
        ));
    }
}
