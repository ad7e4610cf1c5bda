//! Header decoding utilities.
//!
//! Base64 and Quoted-Printable as used inside RFC 2047 encoded-words, plus
//! the charsets mail clients actually emit for them.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data, ignoring embedded whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// With `underscore_is_space` set, `_` decodes to a space as the RFC 2047
/// `Q` encoding requires.
///
/// # Errors
///
/// Returns an error if the input contains an invalid escape sequence.
pub fn decode_quoted_printable(text: &str, underscore_is_space: bool) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                let rest = &bytes[i + 1..];
                if rest.starts_with(b"\r\n") {
                    i += 3;
                } else if rest.starts_with(b"\n") {
                    i += 2;
                } else {
                    let hex = rest
                        .get(..2)
                        .and_then(|h| std::str::from_utf8(h).ok())
                        .and_then(|h| u8::from_str_radix(h, 16).ok())
                        .ok_or_else(|| {
                            Error::InvalidEncoding("Invalid quoted-printable escape".to_string())
                        })?;
                    result.push(hex);
                    i += 3;
                }
            }
            b'_' if underscore_is_space => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Ok(result)
}

/// Converts bytes in the named charset to a string.
///
/// UTF-8, US-ASCII and ISO-8859-1 (with its Windows-1252 superset treated as
/// Latin-1) are supported.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] for any other charset.
pub fn decode_charset(bytes: &[u8], charset: &str) -> Result<String> {
    // RFC 2231 allows a language suffix: utf-8*fr
    let charset = charset.split('*').next().unwrap_or(charset);
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
            Ok(latin1(bytes))
        }
        other => Err(Error::UnsupportedCharset(other.to_string())),
    }
}

/// Maps each byte to the code point of the same value.
#[must_use]
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decodes a single RFC 2047 encoded-word: `=?charset?encoding?text?=`.
///
/// Text that is not an encoded-word is returned unchanged.
///
/// # Errors
///
/// Returns an error if the word is malformed, its payload does not decode,
/// or its charset is unsupported.
pub fn decode_rfc2047(word: &str) -> Result<String> {
    let Some(inner) = word.strip_prefix("=?").and_then(|w| w.strip_suffix("?=")) else {
        return Ok(word.to_string());
    };

    let mut parts = inner.splitn(3, '?');
    let (Some(charset), Some(encoding), Some(payload)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidEncoding("Invalid RFC 2047 format".to_string()));
    };

    let bytes = match encoding {
        "B" | "b" => decode_base64(payload)?,
        "Q" | "q" => decode_quoted_printable(payload, true)?,
        _ => {
            return Err(Error::InvalidEncoding(format!(
                "Unknown encoding: {encoding}"
            )));
        }
    };

    decode_charset(&bytes, charset)
}

/// Decodes every encoded-word in an unstructured header value.
///
/// Whitespace between two adjacent encoded-words is dropped; words that do
/// not decode are kept verbatim.
#[must_use]
pub fn decode_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = String::new();
    let mut previous_was_word = false;
    let mut rest = value;

    while !rest.is_empty() {
        let Some(start) = rest.find("=?") else {
            out.push_str(&pending_space);
            out.push_str(rest);
            return out;
        };

        let (before, candidate) = rest.split_at(start);
        if let Some(len) = encoded_word_len(candidate)
            && let Ok(decoded) = decode_rfc2047(&candidate[..len])
        {
            let only_space = before.chars().all(char::is_whitespace);
            if !(previous_was_word && only_space) {
                out.push_str(&pending_space);
                out.push_str(before);
            }
            out.push_str(&decoded);
            pending_space.clear();
            previous_was_word = true;
            rest = &candidate[len..];

            // Hold trailing whitespace until we know whether a word follows.
            let ws = rest.len() - rest.trim_start().len();
            pending_space.push_str(&rest[..ws]);
            rest = &rest[ws..];
        } else {
            out.push_str(&pending_space);
            pending_space.clear();
            out.push_str(before);
            out.push_str("=?");
            previous_was_word = false;
            rest = &candidate[2..];
        }
    }

    out.push_str(&pending_space);
    out
}

/// Length of the encoded-word at the start of `text`, if there is one.
fn encoded_word_len(text: &str) -> Option<usize> {
    let body = text.strip_prefix("=?")?;
    // charset ? encoding ? payload ?=
    let first = body.find('?')?;
    let second = first + 1 + body[first + 1..].find('?')?;
    let end = second + 1 + body[second + 1..].find("?=")?;
    let word = &body[..end];
    if word.contains(char::is_whitespace) {
        return None;
    }
    Some(2 + end + 2)
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
    use proptest::prelude::*;

    #[test]
    fn test_base64_decode() {
        assert_eq!(decode_base64("SGVs bG8=").unwrap(), b"Hello");
        assert!(decode_base64("***").is_err());
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("H=C3=A9llo", false).unwrap(), "Héllo".as_bytes());
        assert_eq!(decode_quoted_printable("a_b", false).unwrap(), b"a_b");
        assert_eq!(decode_quoted_printable("a_b", true).unwrap(), b"a b");
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld", false).unwrap(), b"HelloWorld");
        assert!(decode_quoted_printable("bad=G1", false).is_err());
        assert!(decode_quoted_printable("cut=4", false).is_err());
    }

    #[test]
    fn test_rfc2047_base64_utf8() {
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
    }

    #[test]
    fn test_rfc2047_q_latin1() {
        assert_eq!(decode_rfc2047("=?ISO-8859-1?Q?Caf=E9_cr=E8me?=").unwrap(), "Café crème");
    }

    #[test]
    fn test_rfc2047_plain_text_untouched() {
        assert_eq!(decode_rfc2047("Hello").unwrap(), "Hello");
    }

    #[test]
    fn test_rfc2047_errors() {
        assert!(decode_rfc2047("=?utf-8?X?abc?=").is_err());
        assert!(decode_rfc2047("=?utf-8?abc?=").is_err());
        assert!(matches!(
            decode_rfc2047("=?koi8-r?B?SMOp?="),
            Err(Error::UnsupportedCharset(_))
        ));
    }

    #[test]
    fn test_decode_header_mixed() {
        assert_eq!(
            decode_header("Re: =?utf-8?Q?r=C3=A9union?= demain"),
            "Re: réunion demain"
        );
    }

    #[test]
    fn test_decode_header_adjacent_words_join() {
        assert_eq!(
            decode_header("=?utf-8?Q?Bon?= \r\n =?utf-8?Q?jour?="),
            "Bonjour"
        );
    }

    #[test]
    fn test_decode_header_keeps_space_before_text() {
        assert_eq!(decode_header("=?utf-8?Q?Bon?= jour"), "Bon jour");
        assert_eq!(decode_header("=?utf-8?Q?fin?=  "), "fin  ");
    }

    #[test]
    fn test_decode_header_invalid_word_is_verbatim() {
        assert_eq!(decode_header("a =?bogus b"), "a =?bogus b");
        assert_eq!(
            decode_header("=?utf-8?Z?x?= =?utf-8?Q?ok?="),
            "=?utf-8?Z?x?= ok"
        );
    }

    #[test]
    fn test_latin1() {
        assert_eq!(latin1(b"\xe9t\xe9"), "été");
    }

    proptest! {
        #[test]
        fn prop_plain_values_unchanged(value in "[^=]{0,40}") {
            prop_assert_eq!(decode_header(&value), value);
        }

        #[test]
        fn prop_decode_header_never_panics(value in "(=\\?|\\?=|[a-zA-Z0-9_ =?-]){0,30}") {
            let _ = decode_header(&value);
        }
    }
}
