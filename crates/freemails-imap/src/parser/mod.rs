//! IMAP protocol parser.
//!
//! A sans-I/O parser for the server responses a read-only scan runs into.
//! Response kinds the client has no use for are kept as
//! [`UntaggedResponse::Other`] instead of failing the whole session.
//!
//! # Architecture
//!
//! - **Lexer**: tokenizes raw bytes (atoms, strings, numbers, literals)
//! - **Response Parser**: builds structured responses from tokens
//!
//! # Example
//!
//! ```
//! use freemails_imap::parser::{ResponseParser, Response, UntaggedResponse};
//!
//! let input = b"* 12 EXISTS\r\n";
//! let response = ResponseParser::parse(input).unwrap();
//!
//! assert_eq!(response, Response::Untagged(UntaggedResponse::Exists(12)));
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{FetchItem, Response, ResponseParser, UntaggedResponse};
