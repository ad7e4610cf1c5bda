//! # freemails-mime
//!
//! Just enough MIME to triage a message from its header block.
//!
//! ## Features
//!
//! - **Header parsing**: unfolding, case-insensitive lookup, repeated fields
//! - **RFC 2047 decoding**: `B` and `Q` encoded-words in UTF-8, Latin-1 and
//!   ASCII, mixed freely with plain text
//! - **Lenient bytes**: 8-bit headers that are not UTF-8 are read as Latin-1
//!
//! ## Quick Start
//!
//! ```
//! use freemails_mime::Message;
//!
//! let raw = b"From: =?utf-8?Q?Ren=C3=A9?= <rene@example.com>\r\n\
//!             Subject: =?iso-8859-1?B?Q2Fm6Q==?= ce soir\r\n\
//!             \r\n";
//!
//! let message = Message::parse(raw);
//! assert_eq!(message.from(), "René <rene@example.com>");
//! assert_eq!(message.subject(), "Café ce soir");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod message;

pub mod encoding;

pub use error::{Error, Result};
pub use header::Headers;
pub use message::Message;
