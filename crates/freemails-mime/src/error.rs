//! Decoding errors.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an encoded value could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed encoded-word or quoted-printable text.
    #[error("malformed encoding: {0}")]
    InvalidEncoding(String),

    /// Payload of a `B` encoded-word is not base64.
    #[error("bad base64: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Charset other than UTF-8, ASCII or Latin-1.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),
}
