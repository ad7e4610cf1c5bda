//! Turning one framed response into a [`Response`].

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{
    parse_atom_list, parse_capability_data, parse_list_response, parse_response_code,
    parse_search_response, read_text_until_crlf,
};

/// One server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Completion of the command with this tag.
    Tagged {
        /// Tag of the command.
        tag: Tag,
        /// `OK`, `NO` or `BAD`.
        status: Status,
        /// Bracketed code, if any.
        code: Option<ResponseCode>,
        /// Text after the code.
        text: String,
    },
    /// `* ...` data.
    Untagged(UntaggedResponse),
    /// `+ ...`: the server waits for more input.
    Continuation {
        /// Prompt text, if any.
        text: Option<String>,
    },
}

/// Stateless entry point for parsing.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one complete response, literals included.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => {
                lexer.eat(b' ');
                let text = read_text_until_crlf(&mut lexer);
                Ok(Response::Continuation {
                    text: (!text.is_empty()).then_some(text),
                })
            }
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            Token::Number(n) => Self::parse_tagged(&mut lexer, &n.to_string()),
            token => Err(Error::Parse {
                position: 0,
                message: format!("response starts with {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;
        let status = Self::parse_status(lexer)?;
        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        let untagged = match lexer.next_token()? {
            Token::Atom(keyword) => match Self::status_word(keyword) {
                Some(status) => {
                    let (code, text) = Self::parse_resp_text(lexer)?;
                    UntaggedResponse::Status { status, code, text }
                }
                None => Self::parse_keyword_data(lexer, keyword)?,
            },
            Token::Number(n) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom_string()?;
                match keyword.to_uppercase().as_str() {
                    "EXISTS" => UntaggedResponse::Exists(n),
                    "RECENT" => UntaggedResponse::Recent(n),
                    "EXPUNGE" => UntaggedResponse::Expunge(Self::seq(lexer, n)?),
                    "FETCH" => {
                        let seq = Self::seq(lexer, n)?;
                        lexer.expect_space()?;
                        let items = fetch::parse_fetch_response(lexer)?;
                        UntaggedResponse::Fetch { seq, items }
                    }
                    _ => {
                        let keyword = keyword.to_string();
                        read_text_until_crlf(lexer);
                        UntaggedResponse::Other(keyword)
                    }
                }
            }
            token => {
                return Err(lexer.error(&format!(
                    "{token:?} after untagged marker"
                )));
            }
        };

        Ok(Response::Untagged(untagged))
    }

    /// Untagged data introduced by a keyword rather than a number.
    fn parse_keyword_data(lexer: &mut Lexer<'_>, keyword: &str) -> Result<UntaggedResponse> {
        Ok(match keyword.to_ascii_uppercase().as_str() {
            "CAPABILITY" => UntaggedResponse::Capability(parse_capability_data(lexer)?),
            "FLAGS" => {
                lexer.expect_space()?;
                UntaggedResponse::Flags(parse_atom_list(lexer)?)
            }
            "LIST" => {
                lexer.expect_space()?;
                UntaggedResponse::List(parse_list_response(lexer)?)
            }
            "SEARCH" => UntaggedResponse::Search(parse_search_response(lexer)?),
            _ => {
                read_text_until_crlf(lexer);
                UntaggedResponse::Other(keyword.to_string())
            }
        })
    }

    fn seq(lexer: &Lexer<'_>, n: u32) -> Result<SeqNum> {
        SeqNum::new(n).ok_or_else(|| lexer.error("message number 0"))
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let word = lexer.read_atom_string()?;
        Self::status_word(&word).ok_or_else(|| lexer.error(&format!("unknown status word {word}")))
    }

    fn status_word(word: &str) -> Option<Status> {
        Some(match word.to_ascii_uppercase().as_str() {
            "OK" => Status::Ok,
            "NO" => Status::No,
            "BAD" => Status::Bad,
            "PREAUTH" => Status::PreAuth,
            "BYE" => Status::Bye,
            _ => return None,
        })
    }

    /// Parses `[SP] ["[" code "]" SP] text`. Some servers omit the text.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        lexer.eat(b' ');
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };
        lexer.eat(b' ');

        Ok((code, read_text_until_crlf(lexer)))
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
    use crate::types::{Capability, MailboxAttribute};

    use super::*;

    #[test]
    fn test_parse_greeting() {
        let response = ResponseParser::parse(b"* OK IMAP4rev1 ready\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Status {
                status: Status::Ok,
                code: None,
                text: "IMAP4rev1 ready".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_tagged_no_with_code() {
        let response =
            ResponseParser::parse(b"A0003 NO [NONEXISTENT] Unknown Mailbox: Foo\r\n").unwrap();
        match response {
            Response::Tagged {
                tag,
                status,
                code,
                text,
            } => {
                assert_eq!(tag.as_str(), "A0003");
                assert_eq!(status, Status::No);
                assert_eq!(code, Some(ResponseCode::NonExistent));
                assert_eq!(text, "Unknown Mailbox: Foo");
            }
            _ => panic!("Expected tagged response"),
        }
    }

    #[test]
    fn test_parse_tagged_without_text() {
        let response = ResponseParser::parse(b"A0001 OK\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Tagged { status: Status::Ok, ref text, .. } if text.is_empty()
        ));
    }

    #[test]
    fn test_parse_read_only_examine() {
        let response = ResponseParser::parse(b"A0004 OK [READ-ONLY] EXAMINE completed\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Tagged { code: Some(ResponseCode::ReadOnly), .. }
        ));
    }

    #[test]
    fn test_parse_capability() {
        let response = ResponseParser::parse(b"* CAPABILITY IMAP4rev1 SPECIAL-USE AUTH=PLAIN\r\n")
            .unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Capability(vec![
                Capability::Imap4Rev1,
                Capability::SpecialUse,
                Capability::Auth("PLAIN".to_string()),
            ]))
        );
    }

    #[test]
    fn test_parse_list_special_use() {
        let response =
            ResponseParser::parse(b"* LIST (\\HasNoChildren \\Sent) \"/\" \"Sent Items\"\r\n")
                .unwrap();
        match response {
            Response::Untagged(UntaggedResponse::List(list)) => {
                assert!(list.has_attribute(&MailboxAttribute::Sent));
                assert_eq!(list.delimiter, Some('/'));
                assert_eq!(list.mailbox.as_str(), "Sent Items");
            }
            _ => panic!("Expected LIST"),
        }
    }

    #[test]
    fn test_parse_exists_and_recent() {
        assert_eq!(
            ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Exists(23))
        );
        assert_eq!(
            ResponseParser::parse(b"* 0 RECENT\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Recent(0))
        );
    }

    #[test]
    fn test_parse_search() {
        match ResponseParser::parse(b"* SEARCH 2 3 5 8\r\n").unwrap() {
            Response::Untagged(UntaggedResponse::Search(nums)) => {
                let values: Vec<u32> = nums.iter().map(|s| s.get()).collect();
                assert_eq!(values, vec![2, 3, 5, 8]);
            }
            _ => panic!("Expected SEARCH"),
        }
    }

    #[test]
    fn test_parse_empty_search() {
        assert_eq!(
            ResponseParser::parse(b"* SEARCH\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Search(vec![]))
        );
    }

    #[test]
    fn test_parse_fetch_header() {
        let input = b"* 4 FETCH (BODY[HEADER] {12}\r\nSubject: x\r\n)\r\n";
        match ResponseParser::parse(input).unwrap() {
            Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                assert_eq!(seq.get(), 4);
                assert_eq!(
                    items,
                    vec![FetchItem::Body {
                        section: Some("HEADER".to_string()),
                        data: Some(b"Subject: x\r\n".to_vec()),
                    }]
                );
            }
            _ => panic!("Expected FETCH"),
        }
    }

    #[test]
    fn test_unknown_untagged_is_kept() {
        assert_eq!(
            ResponseParser::parse(b"* NAMESPACE ((\"\" \"/\")) NIL NIL\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Other("NAMESPACE".to_string()))
        );
        assert_eq!(
            ResponseParser::parse(b"* 3 XMODIFIED foo\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Other("XMODIFIED".to_string()))
        );
    }

    #[test]
    fn test_parse_bye() {
        assert!(matches!(
            ResponseParser::parse(b"* BYE Autologout; idle too long\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Status {
                status: Status::Bye,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_continuation() {
        assert_eq!(
            ResponseParser::parse(b"+ Ready\r\n").unwrap(),
            Response::Continuation {
                text: Some("Ready".to_string())
            }
        );
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            ResponseParser::parse(b"(oops)\r\n"),
            Err(Error::Parse { .. })
        ));
    }
}
