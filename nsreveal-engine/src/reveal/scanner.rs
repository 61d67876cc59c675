//! Token scanner
//!
//!     Finds every occurrence of the token grammar in a text span: the prefix character followed
//!     by exactly sixteen lowercase hex digits, with an ASCII word boundary on both sides. A token
//!     glued to other word characters (`yx0123456789abcdef0`) is not a token.
//!
//!     Matches come out ordered by start offset and never overlap. Text that does not contain the
//!     prefix character at all is rejected before the regex runs, which keeps the common case of
//!     scanning ordinary page text cheap.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::reveal::ids::{TOKEN_HEX_LEN, TOKEN_PREFIX};

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?-u:\b){TOKEN_PREFIX}[0-9a-f]{{{TOKEN_HEX_LEN}}}(?-u:\b)");
    Regex::new(&pattern).expect("token pattern is a valid regex")
});

/// One located token within a text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan<'a> {
    /// Byte range of the token within the scanned text.
    pub range: Range<usize>,
    pub token: &'a str,
}

impl MatchSpan<'_> {
    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }
}

/// Cheap pre-check: can `text` contain a token at all?
pub fn may_contain_token(text: &str) -> bool {
    text.contains(TOKEN_PREFIX)
}

/// Locate all tokens in `text`.
pub fn scan(text: &str) -> Vec<MatchSpan<'_>> {
    if !may_contain_token(text) {
        return Vec::new();
    }
    TOKEN_REGEX
        .find_iter(text)
        .map(|m| MatchSpan {
            range: m.range(),
            token: m.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tokens(text: &str) -> Vec<&str> {
        scan(text).into_iter().map(|m| m.token).collect()
    }

    #[test]
    fn finds_token_with_offsets() {
        let matches = scan("see xabc0000000000001 now");
        assert_eq!(
            matches,
            vec![MatchSpan {
                range: 4..21,
                token: "xabc0000000000001"
            }]
        );
    }

    #[test]
    fn finds_multiple_in_order() {
        assert_eq!(
            tokens("xabc0000000000001,x0123456789abcdef end"),
            vec!["xabc0000000000001", "x0123456789abcdef"]
        );
    }

    #[rstest]
    #[case::embedded_in_word("yx0123456789abcdef0")]
    #[case::leading_word_char("ax0123456789abcdef")]
    #[case::trailing_word_char("x0123456789abcdefz")]
    #[case::trailing_underscore("x0123456789abcdef_")]
    #[case::leading_underscore("_x0123456789abcdef")]
    #[case::too_short("x0123456789abcde")]
    #[case::too_long("x0123456789abcdef0")]
    #[case::uppercase_hex("x0123456789ABCDEF")]
    #[case::uppercase_prefix("X0123456789abcdef")]
    #[case::non_hex("x0123456789abcdeg")]
    #[case::empty("")]
    #[case::no_prefix("plain text only")]
    fn rejects(#[case] text: &str) {
        assert!(scan(text).is_empty(), "unexpected match in {text:?}");
    }

    #[rstest]
    #[case::alone("x0123456789abcdef")]
    #[case::punctuation("(x0123456789abcdef)")]
    #[case::hyphenated("ns-x0123456789abcdef-pod")]
    #[case::path("/api/x0123456789abcdef/")]
    #[case::quoted("\"x0123456789abcdef\"")]
    #[case::non_ascii_neighbours("éx0123456789abcdefé")]
    fn accepts(#[case] text: &str) {
        assert_eq!(tokens(text), vec!["x0123456789abcdef"]);
    }

    #[test]
    fn offsets_are_byte_offsets() {
        let text = "ünï x0123456789abcdef";
        let matches = scan(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].range.clone()], "x0123456789abcdef");
    }

    #[test]
    fn adjacent_tokens_need_a_separator() {
        // Two tokens back to back form one 34-character word, which is no token at all.
        assert!(scan("x0123456789abcdefx0123456789abcdef").is_empty());
        assert_eq!(scan("x0123456789abcdef x0123456789abcdef").len(), 2);
    }
}
