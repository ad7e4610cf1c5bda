//! Tokenizer for server responses.
//!
//! Covers the parts of the RFC 9051 grammar that status, LIST, SEARCH and
//! FETCH replies use. Strings come out as bytes because header data is not
//! always UTF-8.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Cursor over one response.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Starts at the first byte of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Unread input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Whether everything has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Next byte, not consumed.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Consumes and returns the next byte.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Moves the cursor forward, stopping at the end.
    pub fn skip(&mut self, n: usize) {
        self.pos = self.input.len().min(self.pos + n);
    }

    /// Consumes `byte` when it comes next.
    pub fn eat(&mut self, byte: u8) -> bool {
        let found = self.peek() == Some(byte);
        if found {
            self.pos += 1;
        }
        found
    }

    fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Consumes one token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };
        let punct = match byte {
            b' ' => Token::Space,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'*' => Token::Asterisk,
            b'+' => Token::Plus,
            b'\r' if self.remaining().starts_with(b"\r\n") => {
                self.skip(2);
                return Ok(Token::Crlf);
            }
            b'"' => return self.quoted(),
            b'{' => return self.literal(),
            b if is_atom_char(b) => return Ok(self.atom()),
            b => return Err(self.error(&format!("unexpected byte {b:#04x}"))),
        };
        self.pos += 1;
        Ok(punct)
    }

    fn quoted(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let mut text = Vec::new();
        loop {
            let byte = match self.advance() {
                Some(b'"') => return Ok(Token::QuotedString(text)),
                Some(b'\r' | b'\n') | None => return Err(self.error("unterminated quoted string")),
                Some(b'\\') => match self.advance() {
                    Some(escaped @ (b'"' | b'\\')) => escaped,
                    Some(other) => {
                        return Err(self.error(&format!("bad escape \\{}", char::from(other))));
                    }
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(byte) => byte,
            };
            text.push(byte);
        }
    }

    /// `{n}` or `{n+}`, CRLF, then `n` raw bytes.
    fn literal(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let size = std::str::from_utf8(self.take_while(|b| b.is_ascii_digit()))
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| self.error("bad literal size"))?;
        self.eat(b'+');
        if !(self.eat(b'}') && self.eat(b'\r') && self.eat(b'\n')) {
            return Err(self.error("literal size not followed by }CRLF"));
        }
        let Some(data) = self.remaining().get(..size) else {
            return Err(self.error("literal shorter than announced"));
        };
        self.skip(size);
        Ok(Token::Literal(data.to_vec()))
    }

    /// An atom, or a `Number` / `Nil` when it reads as one.
    fn atom(&mut self) -> Token<'a> {
        let raw = self.take_while(is_atom_char);
        let text = std::str::from_utf8(raw).unwrap_or_default();
        if text.eq_ignore_ascii_case("NIL") {
            return Token::Nil;
        }
        match text.parse::<u32>() {
            Ok(n) if raw.iter().all(u8::is_ascii_digit) => Token::Number(n),
            _ => Token::Atom(text),
        }
    }

    /// Parse error at the cursor.
    pub(crate) fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Consumes a token of the same kind as `expected`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let got = self.next_token()?;
        if std::mem::discriminant(&got) != std::mem::discriminant(&expected) {
            return Err(self.error(&format!("wanted {expected:?}, found {got:?}")));
        }
        Ok(())
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// A folder name: quoted, literal, or bare up to the next space, `)` or
    /// CR. Bare names may contain brackets (`[Gmail]/Sent`), which atoms
    /// cannot.
    pub fn read_mailbox(&mut self) -> Result<String> {
        if matches!(self.peek(), Some(b'"' | b'{')) {
            return match self.next_token()? {
                Token::QuotedString(raw) | Token::Literal(raw) => {
                    Ok(String::from_utf8_lossy(&raw).into_owned())
                }
                other => Err(self.error(&format!("wanted mailbox name, found {other:?}"))),
            };
        }
        let raw = self.take_while(|b| !matches!(b, b' ' | b'\r' | b')'));
        if raw.is_empty() {
            return Err(self.error("missing mailbox name"));
        }
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// `NIL`, a quoted string or a literal.
    pub fn read_nstring(&mut self) -> Result<Option<Vec<u8>>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(raw) | Token::Literal(raw) => Ok(Some(raw)),
            other => Err(self.error(&format!("wanted string or NIL, found {other:?}"))),
        }
    }

    /// A number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            other => Err(self.error(&format!("wanted number, found {other:?}"))),
        }
    }

    /// An atom.
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(text) => Ok(text),
            other => Err(self.error(&format!("wanted atom, found {other:?}"))),
        }
    }
}

/// Printable ASCII minus the atom-specials that matter in responses. `\`
/// is allowed so `\Seen` and `\Noselect` lex as one atom.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    b.is_ascii_graphic() && !matches!(b, b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'[' | b']')
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

    fn tokens(input: &[u8]) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                Token::Eof => return out,
                t => out.push(t),
            }
        }
    }

    #[test]
    fn test_tagged_response() {
        assert_eq!(
            tokens(b"A001 OK done\r\n"),
            vec![
                Token::Atom("A001"),
                Token::Space,
                Token::Atom("OK"),
                Token::Space,
                Token::Atom("done"),
                Token::Crlf,
            ]
        );
    }

    #[test]
    fn test_numbers_and_nil() {
        assert_eq!(
            tokens(b"42 nil 4294967296"),
            vec![
                Token::Number(42),
                Token::Space,
                Token::Nil,
                Token::Space,
                Token::Atom("4294967296"),
            ]
        );
    }

    #[test]
    fn test_quoted_string_escaped() {
        assert_eq!(
            tokens(b"\"say \\\"hi\\\"\""),
            vec![Token::QuotedString(b"say \"hi\"".to_vec())]
        );
    }

    #[test]
    fn test_quoted_string_unterminated() {
        let mut lexer = Lexer::new(b"\"open\r\n");
        assert!(matches!(lexer.next_token(), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_attribute_atoms() {
        assert_eq!(
            tokens(b"(\\HasNoChildren \\Sent)"),
            vec![
                Token::LParen,
                Token::Atom("\\HasNoChildren"),
                Token::Space,
                Token::Atom("\\Sent"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_literal_keeps_raw_bytes() {
        let mut lexer = Lexer::new(b"{4}\r\n\xe9t\xe9!");
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Literal(b"\xe9t\xe9!".to_vec())
        );
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_literal_plus() {
        let mut lexer = Lexer::new(b"{2+}\r\nok");
        assert_eq!(lexer.next_token().unwrap(), Token::Literal(b"ok".to_vec()));
    }

    #[test]
    fn test_nil_is_not_an_atom() {
        let mut lexer = Lexer::new(b"NIL");
        assert!(lexer.read_atom_string().is_err());
    }

    #[test]
    fn test_incomplete_literal() {
        let mut lexer = Lexer::new(b"{10}\r\nshort");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_unquoted_bracketed_mailbox() {
        let mut lexer = Lexer::new(b"[Gmail]/Sent\r\n");
        assert_eq!(lexer.read_mailbox().unwrap(), "[Gmail]/Sent");
    }

    #[test]
    fn test_quoted_mailbox() {
        let mut lexer = Lexer::new(b"\"Bo&AO4-te d'envoi\"\r\n");
        assert_eq!(lexer.read_mailbox().unwrap(), "Bo&AO4-te d'envoi");
    }
}
