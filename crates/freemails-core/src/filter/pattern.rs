//! Shell-style filter patterns.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Tests `candidate` against a filter pattern.
///
/// `*` matches any run of characters (including `/`), `?` exactly one, and
/// `[...]`/`[!...]` a character class. A leading `~` negates the whole
/// pattern. Matching is case-sensitive and never fails: a `[` with no
/// closing `]` is taken literally, as is a `]` outside a class.
///
/// # Examples
///
/// ```
/// use freemails_core::matches_filter;
///
/// assert!(matches_filter("bob@trusted.com", "*@trusted.com"));
/// assert!(matches_filter("bob@other.com", "~*@trusted.com"));
/// assert!(!matches_filter("report.txt", "*.csv"));
/// ```
#[must_use]
pub fn matches_filter(candidate: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('~') {
        Some(rest) => !glob_match(candidate, rest),
        None => glob_match(candidate, pattern),
    }
}

fn glob_match(candidate: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return candidate.is_empty();
    }

    Pattern::new(&escape_stray_brackets(&collapse_stars(pattern)))
        .is_ok_and(|compiled| compiled.matches_with(candidate, MATCH_OPTIONS))
}

/// `**` is special to `glob`; for filters it means the same as `*`.
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut previous_star = false;
    for c in pattern.chars() {
        if c == '*' && previous_star {
            continue;
        }
        previous_star = c == '*';
        out.push(c);
    }
    out
}

/// Escapes every bracket that is not part of a class. A `]` directly after
/// `[` or `[!` belongs to the class.
fn escape_stray_brackets(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            ']' => out.push_str("[]]"),
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'!') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    chars[i.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| i + offset)
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
    use proptest::prelude::*;

    #[test]
    fn test_negation() {
        assert!(!matches_filter("x", "~x"));
        assert!(matches_filter("y", "~x"));
    }

    #[test]
    fn test_star() {
        assert!(matches_filter("report.txt", "*.txt"));
        assert!(!matches_filter("report.txt", "*.csv"));
        assert!(matches_filter("a/b/c.txt", "*.txt"));
        assert!(matches_filter("", "*"));
    }

    #[test]
    fn test_repeated_stars() {
        assert!(matches_filter("newsletter@shop.com", "news**@*"));
        assert!(matches_filter("a/b", "***"));
    }

    #[test]
    fn test_question_mark() {
        assert!(matches_filter("v1", "v?"));
        assert!(!matches_filter("v12", "v?"));
        assert!(matches_filter("a/b", "a?b"));
    }

    #[test]
    fn test_classes() {
        assert!(matches_filter("build 7 ok", "build [0-9] ok"));
        assert!(!matches_filter("build x ok", "build [0-9] ok"));
        assert!(matches_filter("build x ok", "build [!0-9] ok"));
    }

    #[test]
    fn test_invalid_brackets_are_literal() {
        assert!(matches_filter("[ci", "[ci"));
        assert!(matches_filter("[ci] passed", "[ci*"));
        assert!(!matches_filter("c", "[ci"));
        assert!(matches_filter("a]", "a]"));
        assert!(matches_filter("[!]", "[!]"));
    }

    #[test]
    fn test_unclosed_bracket_after_class() {
        assert!(matches_filter("ax[", "[ab]x["));
        assert!(matches_filter("bx[", "[ab]x["));
        assert!(!matches_filter("[ab]x[", "[ab]x["));
    }

    #[test]
    fn test_bracket_first_in_class() {
        assert!(matches_filter("]", "[]a]"));
        assert!(matches_filter("a", "[]a]"));
        assert!(matches_filter("x", "[!]a]"));
        assert!(!matches_filter("]", "[!]a]"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches_filter("Bob@Trusted.com", "*@trusted.com"));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(matches_filter("", ""));
        assert!(!matches_filter("a", ""));
        assert!(!matches_filter("", "~"));
        assert!(matches_filter("a", "~"));
    }

    proptest! {
        #[test]
        fn prop_negation_inverts(candidate in ".{0,20}", pattern in "[a-z*?.@\\[\\]!-]{0,12}") {
            let negated = format!("~{pattern}");
            prop_assert_eq!(
                matches_filter(&candidate, &negated),
                !matches_filter(&candidate, &pattern)
            );
        }

        #[test]
        fn prop_plain_text_matches_itself(text in "[a-zA-Z0-9@. _/-]{0,30}") {
            prop_assert!(matches_filter(&text, &text));
        }

        #[test]
        fn prop_star_matches_everything(candidate in "\\PC{0,30}") {
            prop_assert!(matches_filter(&candidate, "*"));
        }
    }
}
