//! # freemails-imap
//!
//! A small async IMAP client (RFC 3501 / RFC 9051 subset) tailored to
//! read-only mailbox scanning.
//!
//! ## Features
//!
//! - **Type-state connection management**: `NotAuthenticated` → `Authenticated`
//!   → `Selected`, enforced at compile time
//! - **Read-only surface**: LOGIN, LIST, EXAMINE, SEARCH, FETCH, CLOSE,
//!   LOGOUT
//! - **TLS via rustls**: no OpenSSL dependency
//! - **Sans-I/O parser**: response parsing separated from network I/O
//!
//! ## Quick Start
//!
//! ```ignore
//! use freemails_imap::{Client, Config, SearchCriteria};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> freemails_imap::Result<()> {
//!     let config = Config::new("imap.example.com");
//!     let stream = freemails_imap::connection::connect(&config).await?;
//!     let client = Client::from_stream(stream, config.io_timeout).await?;
//!     let mut client = client.login("user@example.com", "password").await?;
//!
//!     for folder in client.list("", "*").await? {
//!         println!("{}", folder.mailbox);
//!     }
//!
//!     let (mut client, status) = client.examine("INBOX").await?;
//!     println!("{} messages", status.exists);
//!     for seq in client.search(&[SearchCriteria::All]).await? {
//!         let header = client.fetch_header(seq).await?;
//!         println!("{seq}: {} bytes of header", header.map_or(0, |h| h.len()));
//!     }
//!
//!     client.close().await?.logout().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! NotAuthenticated ── login() ──→ Authenticated ── examine() ──→ Selected
//!                                       ↑                            │
//!                                       └───────── close() ──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, SearchCriteria, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, FramedStream, ImapStream, NotAuthenticated, Security, Selected,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Capability, ListResponse, Mailbox, MailboxAttribute, MailboxStatus, ResponseCode, SeqNum,
    Status, Tag,
};
