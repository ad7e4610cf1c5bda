//! Lexical units of a server response.

/// One lexical unit. Strings are bytes since servers send 8-bit data in
/// quoted strings and literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of atom characters, borrowed from the input.
    Atom(&'a str),
    /// `"..."` with escapes resolved.
    QuotedString(Vec<u8>),
    /// `{n}\r\n` followed by `n` raw bytes.
    Literal(Vec<u8>),
    /// Decimal number that fits in 32 bits.
    Number(u32),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// A single space.
    Space,
    /// `*`, which starts untagged responses.
    Asterisk,
    /// `+`, which starts continuation requests.
    Plus,
    /// The atom `NIL`, any case.
    Nil,
    /// End of line.
    Crlf,
    /// No input left.
    Eof,
}
