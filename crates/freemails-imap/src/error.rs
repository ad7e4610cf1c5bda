//! Client errors.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong talking to the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading from or writing to the socket failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// TLS setup or record layer failure.
    #[error("TLS failure: {0}")]
    Tls(#[from] rustls::Error),

    /// The host name cannot be used for certificate verification.
    #[error("invalid server name for TLS: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// The server sent bytes that are not a valid response.
    #[error("cannot parse server response at byte {position}: {message}")]
    Parse {
        /// Offset into the response line.
        position: usize,
        /// What was expected.
        message: String,
    },

    /// Tagged `NO`: the command was understood and refused.
    #[error("server refused: {0}")]
    No(String),

    /// Tagged `BAD`: the command was not understood.
    #[error("server rejected command: {0}")]
    Bad(String),

    /// `BYE`: the server is closing the connection.
    #[error("server closed the session: {0}")]
    Bye(String),

    /// No data arrived within the read timeout.
    #[error("no answer from server within {0:?}")]
    Timeout(Duration),

    /// The server broke the command/response sequence.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl Error {
    /// True for `NO` and `BAD`: the command failed but the connection can
    /// carry on.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::No(_) | Self::Bad(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_classification() {
        assert!(Error::No("no such mailbox".into()).is_refusal());
        assert!(Error::Bad("syntax".into()).is_refusal());
        assert!(!Error::Bye("shutting down".into()).is_refusal());
        assert!(!Error::Timeout(Duration::from_secs(60)).is_refusal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::No("no such mailbox".into()).to_string(),
            "server refused: no such mailbox"
        );
    }
}
