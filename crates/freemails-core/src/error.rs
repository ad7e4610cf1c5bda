//! Core errors.

use thiserror::Error;

/// Anything that stops a settings operation or a scan.
#[derive(Debug, Error)]
pub enum Error {
    /// From the IMAP client.
    #[error("IMAP error: {0}")]
    Imap(#[from] freemails_imap::Error),

    /// The settings file is not valid JSON for [`crate::Settings`].
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Reading or writing the settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error. The message is shown to the user as is.
    #[error("{0}")]
    Config(String),

    /// A setting needed to open the mailbox is not set.
    #[error("Missing setting: {0} (set it with {0}=<value>)")]
    MissingSetting(&'static str),

    /// The server answered a FETCH without the requested header.
    #[error("No header returned for message {0}")]
    EmptyFetch(u32),

    /// The IMAP session is not in a state that allows the operation.
    #[error("Session error: {0}")]
    Session(&'static str),
}

impl Error {
    /// Refusals spoil one folder or message but leave the session usable.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        match self {
            Self::Imap(err) => err.is_refusal(),
            Self::EmptyFetch(_) => true,
            _ => false,
        }
    }
}

/// Core result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_shown_verbatim() {
        let err = Error::Config("Unknown config item: colour".into());
        assert_eq!(err.to_string(), "Unknown config item: colour");
    }

    #[test]
    fn test_refusals() {
        assert!(Error::Imap(freemails_imap::Error::No("gone".into())).is_refusal());
        assert!(Error::EmptyFetch(3).is_refusal());
        assert!(!Error::Imap(freemails_imap::Error::Bye("bye".into())).is_refusal());
        assert!(!Error::MissingSetting("server").is_refusal());
    }
}
