//! FETCH response parsing.

use crate::parser::lexer::{Lexer, Token};
use crate::Result;

use super::helpers::parse_atom_list;
use super::types::FetchItem;

/// Parses the parenthesized data of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => match name.to_uppercase().as_str() {
                "FLAGS" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Flags(parse_atom_list(lexer)?));
                }
                "UID" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Uid(lexer.read_number()?));
                }
                "RFC822.SIZE" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Rfc822Size(lexer.read_number()?));
                }
                upper @ ("BODY" | "BODY.PEEK" | "RFC822" | "RFC822.HEADER" | "RFC822.TEXT") => {
                    let section = match upper {
                        "RFC822.HEADER" => Some("HEADER".to_string()),
                        "RFC822.TEXT" => Some("TEXT".to_string()),
                        _ => parse_section(lexer),
                    };
                    skip_origin(lexer);
                    lexer.expect_space()?;
                    // BODY without a section is BODYSTRUCTURE-shaped
                    if lexer.peek() == Some(b'(') {
                        skip_value(lexer);
                        continue;
                    }
                    let data = lexer.read_nstring()?;
                    items.push(FetchItem::Body { section, data });
                }
                _ => {
                    lexer.expect_space()?;
                    skip_value(lexer);
                }
            },
            token => {
                return Err(lexer.error(&format!("{token:?} inside FETCH data")));
            }
        }
    }

    Ok(items)
}

/// Parses an optional `[section]`, returning `None` for `[]` or no brackets.
fn parse_section(lexer: &mut Lexer<'_>) -> Option<String> {
    if !lexer.eat(b'[') {
        return None;
    }
    let mut section = String::new();
    while let Some(b) = lexer.advance() {
        if b == b']' {
            break;
        }
        section.push(char::from(b));
    }
    (!section.is_empty()).then_some(section)
}

/// Skips a partial-fetch `<origin>` marker.
fn skip_origin(lexer: &mut Lexer<'_>) {
    if lexer.eat(b'<') {
        while lexer.advance().is_some_and(|b| b != b'>') {}
    }
}

/// Skips one value: an atom, a string, a literal, or a balanced list.
fn skip_value(lexer: &mut Lexer<'_>) {
    let mut depth = 0usize;
    loop {
        match lexer.peek() {
            Some(b'(') => {
                depth += 1;
                lexer.advance();
            }
            Some(b')') if depth == 0 => return,
            Some(b')') => {
                depth -= 1;
                lexer.advance();
                if depth == 0 {
                    return;
                }
            }
            Some(b' ') if depth == 0 => return,
            Some(b'"' | b'{') => {
                // Strings may contain parentheses; let the lexer consume them.
                if lexer.next_token().is_err() {
                    return;
                }
                if depth == 0 {
                    return;
                }
            }
            Some(_) => {
                lexer.advance();
            }
            None => return,
        }
    }
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

    fn parse(input: &[u8]) -> Vec<FetchItem> {
        let mut lexer = Lexer::new(input);
        parse_fetch_response(&mut lexer).unwrap()
    }

    #[test]
    fn header_literal() {
        let items = parse(b"(BODY[HEADER] {22}\r\nSubject: hi\r\nFrom: a\r\n)");
        assert_eq!(
            items,
            vec![FetchItem::Body {
                section: Some("HEADER".to_string()),
                data: Some(b"Subject: hi\r\nFrom: a\r\n".to_vec()),
            }]
        );
    }

    #[test]
    fn header_nil() {
        let items = parse(b"(BODY[HEADER] NIL)");
        assert_eq!(
            items,
            vec![FetchItem::Body {
                section: Some("HEADER".to_string()),
                data: None,
            }]
        );
    }

    #[test]
    fn uid_flags_and_size() {
        let items = parse(b"(UID 812 FLAGS (\\Seen $Junk) RFC822.SIZE 4096)");
        assert_eq!(
            items,
            vec![
                FetchItem::Uid(812),
                FetchItem::Flags(vec!["\\Seen".to_string(), "$Junk".to_string()]),
                FetchItem::Rfc822Size(4096),
            ]
        );
    }

    #[test]
    fn unknown_items_are_skipped() {
        let items = parse(
            b"(INTERNALDATE \"17-Jul-1996 02:44:25 -0700\" MODSEQ (12) \
              ENVELOPE (NIL \"a (b)\" NIL NIL NIL NIL NIL NIL NIL NIL) UID 5)",
        );
        assert_eq!(items, vec![FetchItem::Uid(5)]);
    }

    #[test]
    fn rfc822_header_maps_to_header_section() {
        let items = parse(b"(RFC822.HEADER \"X: y\")");
        assert_eq!(
            items,
            vec![FetchItem::Body {
                section: Some("HEADER".to_string()),
                data: Some(b"X: y".to_vec()),
            }]
        );
    }
}
