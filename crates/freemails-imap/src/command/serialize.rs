//! Building command lines.

use super::types::{FetchAttribute, SearchCriteria};

/// One command line under construction. Words are separated by a single
/// space; `finish` appends CRLF.
pub struct Line {
    buf: String,
}

impl Line {
    pub fn tagged(tag: &str) -> Self {
        Self {
            buf: tag.to_string(),
        }
    }

    /// Appends a word that is already in wire form.
    pub fn word(&mut self, word: &str) -> &mut Self {
        self.buf.push(' ');
        self.buf.push_str(word);
        self
    }

    /// Appends a string as a bare atom when it can be one, else quoted.
    pub fn astring(&mut self, value: &str) -> &mut Self {
        self.buf.push(' ');
        push_astring(&mut self.buf, value);
        self
    }

    pub fn search(&mut self, criteria: &[SearchCriteria]) -> &mut Self {
        if criteria.is_empty() {
            return self.word("ALL");
        }
        for key in criteria {
            self.buf.push(' ');
            push_search_key(&mut self.buf, key);
        }
        self
    }

    pub fn fetch_items(&mut self, items: &[FetchAttribute]) -> &mut Self {
        let rendered: Vec<String> = items.iter().map(fetch_item).collect();
        match rendered.as_slice() {
            [only] => self.word(only),
            _ => self.word(&format!("({})", rendered.join(" "))),
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push_str("\r\n");
        self.buf.into_bytes()
    }
}

/// Bytes that force the quoted form: atom-specials, controls and DEL.
const fn is_atom_special(b: u8) -> bool {
    b < b' ' || b == 0x7F || matches!(b, b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b' ')
}

fn push_astring(out: &mut String, value: &str) {
    if !value.is_empty() && !value.bytes().any(is_atom_special) {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

fn fetch_item(item: &FetchAttribute) -> String {
    match item {
        FetchAttribute::Flags => "FLAGS".into(),
        FetchAttribute::Rfc822Size => "RFC822.SIZE".into(),
        FetchAttribute::Uid => "UID".into(),
        FetchAttribute::Body { section, peek } => format!(
            "{}[{}]",
            if *peek { "BODY.PEEK" } else { "BODY" },
            section.as_deref().unwrap_or_default()
        ),
    }
}

fn push_search_key(out: &mut String, key: &SearchCriteria) {
    let (name, arg) = match key {
        SearchCriteria::All => ("ALL", None),
        SearchCriteria::Unseen => ("UNSEEN", None),
        SearchCriteria::Seen => ("SEEN", None),
        SearchCriteria::Undeleted => ("UNDELETED", None),
        SearchCriteria::Since(date) => {
            out.push_str("SINCE ");
            out.push_str(date);
            return;
        }
        SearchCriteria::Before(date) => {
            out.push_str("BEFORE ");
            out.push_str(date);
            return;
        }
        SearchCriteria::From(text) => ("FROM", Some(text)),
        SearchCriteria::Subject(text) => ("SUBJECT", Some(text)),
        SearchCriteria::Not(inner) => {
            out.push_str("NOT ");
            push_search_key(out, inner);
            return;
        }
    };
    out.push_str(name);
    if let Some(text) = arg {
        out.push(' ');
        push_astring(out, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(value: &str) -> String {
        let mut out = String::new();
        push_astring(&mut out, value);
        out
    }

    #[test]
    fn atoms_stay_bare() {
        assert_eq!(quoted("INBOX"), "INBOX");
        assert_eq!(quoted("Archive/2024"), "Archive/2024");
    }

    #[test]
    fn specials_get_quoted() {
        assert_eq!(quoted(""), "\"\"");
        assert_eq!(quoted("a b"), "\"a b\"");
        assert_eq!(quoted("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(quoted("wild*"), "\"wild*\"");
        assert_eq!(quoted("50%"), "\"50%\"");
        assert_eq!(quoted("tab\there"), "\"tab\there\"");
    }

    #[test]
    fn nested_not() {
        let mut out = String::new();
        push_search_key(
            &mut out,
            &SearchCriteria::Not(Box::new(SearchCriteria::From("spam@x.org".into()))),
        );
        assert_eq!(out, "NOT FROM spam@x.org");
    }

    #[test]
    fn body_without_section() {
        let item = FetchAttribute::Body {
            section: None,
            peek: false,
        };
        assert_eq!(fetch_item(&item), "BODY[]");
    }
}
