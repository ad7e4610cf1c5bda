//! Parsed response data.

use crate::types::{Capability, ListResponse, ResponseCode, SeqNum, Status};

/// One `name value` pair from a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// `FLAGS (...)`, atoms as sent.
    Flags(Vec<String>),
    /// `UID n`
    Uid(u32),
    /// `RFC822.SIZE n`
    Rfc822Size(u32),
    /// `BODY[section]` and the `RFC822*` shorthands.
    Body {
        /// Text between the brackets; `None` for `BODY[]`.
        section: Option<String>,
        /// Raw bytes, `None` if the server sent NIL.
        data: Option<Vec<u8>>,
    },
}

/// A `*` line from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK`, `* NO`, `* BAD`, `* PREAUTH` or `* BYE`.
    Status {
        /// Which of the five.
        status: Status,
        /// Bracketed response code, if any.
        code: Option<ResponseCode>,
        /// Remaining human-readable text.
        text: String,
    },
    /// `* CAPABILITY ...`
    Capability(Vec<Capability>),
    /// `* LIST ...`
    List(ListResponse),
    /// `* FLAGS (...)`
    Flags(Vec<String>),
    /// `* n EXISTS`
    Exists(u32),
    /// `* n RECENT`
    Recent(u32),
    /// `* n EXPUNGE`
    Expunge(SeqNum),
    /// `* n FETCH (...)`
    Fetch {
        /// Message the data belongs to.
        seq: SeqNum,
        /// Data items in the order sent.
        items: Vec<FetchItem>,
    },
    /// `* SEARCH ...`
    Search(Vec<SeqNum>),
    /// A response this client does not interpret; holds its keyword.
    Other(String),
}
