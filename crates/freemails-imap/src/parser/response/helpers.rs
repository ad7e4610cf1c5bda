//! Pieces of response grammar shared by several response kinds.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{Capability, ListResponse, Mailbox, MailboxAttribute, ResponseCode, SeqNum};

/// `[CODE args]`. Arguments of codes without a variant here, such as
/// `UIDVALIDITY 42`, are skipped.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;
    let name = lexer.read_atom_string()?;
    let code = if name.eq_ignore_ascii_case("CAPABILITY") {
        ResponseCode::Capability(parse_capability_data(lexer)?)
    } else {
        simple_code(name)
    };
    while lexer.peek().is_some_and(|b| !matches!(b, b']' | b'\r')) {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;
    Ok(code)
}

fn simple_code(name: &str) -> ResponseCode {
    match name.to_ascii_uppercase().as_str() {
        "ALERT" => ResponseCode::Alert,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "AUTHENTICATIONFAILED" => ResponseCode::AuthenticationFailed,
        "NONEXISTENT" => ResponseCode::NonExistent,
        _ => ResponseCode::Unknown(name.to_string()),
    }
}

/// Capability names, each preceded by a space.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();
    while lexer.eat(b' ') {
        if let Token::Atom(name) = lexer.next_token()? {
            caps.push(Capability::parse(name));
        }
    }
    Ok(caps)
}

/// `(atom atom ...)`, as in FLAGS and LIST attributes. A lone `\*` is
/// returned as `*`.
pub fn parse_atom_list(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    lexer.expect(Token::LParen)?;
    let mut atoms = Vec::new();
    loop {
        let atom = match lexer.next_token()? {
            Token::RParen => return Ok(atoms),
            Token::Space => continue,
            Token::Atom(text) => text,
            Token::Asterisk => "*",
            other => return Err(lexer.error(&format!("{other:?} inside a list"))),
        };
        atoms.push(atom.to_string());
    }
}

/// `(attributes) delimiter name`, after `LIST `.
pub fn parse_list_response(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    let attributes = parse_atom_list(lexer)?
        .iter()
        .map(|name| MailboxAttribute::parse(name))
        .collect();
    lexer.expect_space()?;
    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(raw) => raw.first().copied().map(char::from),
        other => return Err(lexer.error(&format!("wanted hierarchy delimiter, found {other:?}"))),
    };
    lexer.expect_space()?;
    let mailbox = Mailbox::new(lexer.read_mailbox()?);
    Ok(ListResponse {
        attributes,
        delimiter,
        mailbox,
    })
}

/// Message numbers after `SEARCH`. Zeros and stray tokens are dropped.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<SeqNum>> {
    let mut found = Vec::new();
    while lexer.eat(b' ') {
        if let Token::Number(n) = lexer.next_token()? {
            found.extend(SeqNum::new(n));
        }
    }
    Ok(found)
}

/// The rest of the line as text; the CRLF is consumed and dropped.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let rest = lexer.remaining();
    let (text, skip) = match rest.windows(2).position(|pair| pair == b"\r\n") {
        Some(end) => (&rest[..end], end + 2),
        None => (rest, rest.len()),
    };
    lexer.skip(skip);
    String::from_utf8_lossy(text).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_arguments_are_skipped() {
        let mut lexer = Lexer::new(b"[PERMANENTFLAGS (\\Seen \\*)] rest");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(code, ResponseCode::Unknown("PERMANENTFLAGS".to_string()));
        assert_eq!(lexer.remaining(), b" rest");
    }

    #[test]
    fn capability_code() {
        let mut lexer = Lexer::new(b"[CAPABILITY IMAP4rev1 LOGINDISABLED]");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(
            code,
            ResponseCode::Capability(vec![Capability::Imap4Rev1, Capability::LoginDisabled])
        );
    }

    #[test]
    fn list_with_nil_delimiter() {
        let mut lexer = Lexer::new(b"(\\Noselect) NIL Shared\r\n");
        let list = parse_list_response(&mut lexer).unwrap();
        assert_eq!(list.delimiter, None);
        assert_eq!(list.mailbox.as_str(), "Shared");
        assert!(!list.is_selectable());
    }

    #[test]
    fn list_with_literal_name() {
        let mut lexer = Lexer::new(b"() \"/\" {5}\r\nA \"b\"\r\n");
        let list = parse_list_response(&mut lexer).unwrap();
        assert_eq!(list.mailbox.as_str(), "A \"b\"");
    }

    #[test]
    fn search_drops_zero() {
        let mut lexer = Lexer::new(b" 0 3 9\r\n");
        let found = parse_search_response(&mut lexer).unwrap();
        assert_eq!(found, vec![SeqNum::new(3).unwrap(), SeqNum::new(9).unwrap()]);
    }

    #[test]
    fn text_until_crlf() {
        let mut lexer = Lexer::new(b"hello world\r\nnext");
        assert_eq!(read_text_until_crlf(&mut lexer), "hello world");
        assert_eq!(lexer.remaining(), b"next");
    }
}
