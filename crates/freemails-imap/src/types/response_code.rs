//! Bracketed response codes.

use super::Capability;

/// `[CODE ...]` at the start of a status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `ALERT`: the text is meant for the user.
    Alert,
    /// `CAPABILITY ...`, usually in the greeting or after LOGIN.
    Capability(Vec<Capability>),
    /// `READ-ONLY`: the folder was opened without write access.
    ReadOnly,
    /// `READ-WRITE`
    ReadWrite,
    /// `TRYCREATE`: the target folder is missing.
    TryCreate,
    /// `AUTHENTICATIONFAILED` (RFC 5530): wrong credentials.
    AuthenticationFailed,
    /// `NONEXISTENT` (RFC 5530): no such folder.
    NonExistent,
    /// Any other code, name only.
    Unknown(String),
}

impl ResponseCode {
    /// Whether this is `READ-ONLY`.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}
