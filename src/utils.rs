use aho_corasick::{AhoCorasick, AhoCorasickBuilder, PatternID};
use regex::Regex;
use std::sync::LazyLock;

/// Compile-time string comparison for the pattern table assertions.
const fn const_str_equals(a: &str, b: &str) -> bool {
    let mut i = 0;
    while i < a.len() && i < b.len() {
        if a.as_bytes()[i] != b.as_bytes()[i] {
            return false;
        }
        i += 1;
    }
    i == a.len() && i == b.len()
}

/// Split a (lowercased) line the way the `aolm` strategy does.
///
/// Every character that is neither alphanumeric nor an apostrophe becomes a separator.
/// Apostrophes survive only inside words, so `don't` stays one token while `'tis` and
/// `boys'` lose their outer quote marks.
pub fn split_into_tokens_aolm(text: &str) -> Vec<&str> {
    static REGEX_SEPARATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}'’]+").unwrap());

    REGEX_SEPARATOR
        .split(text)
        .map(|s| s.trim_matches(|c| c == '\'' || c == '’'))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split on whitespace and strip punctuation from both ends of every piece.
pub fn split_into_tokens_whitespace(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split with a single multi-pattern automaton over separators and a fixed symbol table.
///
/// Symbols are matched the same way separators are, but are kept apart so that callers
/// can tell them from words while debugging. Neither ends up in the output.
pub fn split_into_tokens_symbol(text: &str) -> Vec<&str> {
    // used to determine whether a match is a separator or a symbol
    const FIRST_SYMBOL: PatternID = PatternID::new_unchecked(4);
    const PATTERNS: &[&str] = &[
        /* separators --> */ " ", "\n", "\t", "\r", /* match composite symbols first --> */
        "--", "...", /* then match single character symbols --> */ "|", ".", ",", ";", ":",
        "?", "!", "-", "_", "/", "\\", "(", ")", "[", "]", "{", "}", "*", "#", "@", "&", "=",
        "+", "%", "~", "$", "^", "<", ">", "\"", "'", "´", "`", "¸", "˛", "‘", "’", "“", "”",
        "¤", "¢", "€", "£", "¥", "§", "‖", "¦", "⟨", "⟩", "–", "—", "¯", "»", "«", "÷", "×",
        "′", "″", "‴", "¡", "¿", "©", "®", "™", "…",
    ];
    const _: () = {
        let first_symbol = PATTERNS[FIRST_SYMBOL.as_usize()];
        assert!(const_str_equals(first_symbol, "--"));
    };

    static AHO_CORASICK: LazyLock<AhoCorasick> = LazyLock::new(|| {
        let mut builder = AhoCorasickBuilder::new();
        builder.match_kind(aho_corasick::MatchKind::LeftmostFirst); /* assign priority by order in pattern slice */
        let aho_corasick = builder.build(PATTERNS).unwrap();
        tracing::debug!(
            "built aho-corasick successfully, kind: {:?}",
            aho_corasick.kind()
        );
        aho_corasick
    });

    let mut result = Vec::new();

    let mut last_end = 0;
    for m in AHO_CORASICK.find_iter(text) {
        let start = m.start();

        // text between two matches is a word
        if start > last_end {
            result.push(&text[last_end..start]);
        }

        if m.pattern() >= FIRST_SYMBOL {
            tracing::trace!(symbol = &text[start..m.end()], "dropping symbol");
        }

        last_end = m.end();
    }

    if last_end < text.len() {
        // collect remaining text (last word)
        result.push(&text[last_end..]);
    }

    result
}

pub fn to_lowercase(input: &str) -> String {
    if cfg!(feature = "optimized-str") {
        to_lowercase_opt(input)
    } else {
        // for languages that have very little unicode (so basically: english), this is probably faster
        input.to_lowercase()
    }
}

#[doc(hidden)] /* only public for benchmarking */
pub fn to_lowercase_opt(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match unicode_case_mapping::to_lowercase(c) {
            [0, 0] => result.push(c),
            [l, 0] => result.extend(char::from_u32(l)),
            [l, l2] => {
                result.extend(char::from_u32(l));
                result.extend(char::from_u32(l2));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_into_tokens_aolm() {
        let result = split_into_tokens_aolm("you don't know about me, without you have read");
        assert_eq!(
            result,
            vec!["you", "don't", "know", "about", "me", "without", "you", "have", "read"]
        );
    }

    #[test]
    fn test_split_into_tokens_aolm_outer_apostrophes() {
        let result = split_into_tokens_aolm("'tis the boys' raft--'");
        assert_eq!(result, vec!["tis", "the", "boys", "raft"]);
    }

    #[test]
    fn test_split_into_tokens_whitespace() {
        let result = split_into_tokens_whitespace("  \"well,  i  reckon!\" -- said huck ");
        assert_eq!(result, vec!["well", "i", "reckon", "said", "huck"]);
    }

    #[test]
    fn test_split_into_tokens_symbol() {
        let result = split_into_tokens_symbol("tom's (the) raft--down...river");
        assert_eq!(result, vec!["tom", "s", "the", "raft", "down", "river"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_into_tokens_aolm("").is_empty());
        assert!(split_into_tokens_whitespace(" \t ").is_empty());
        assert!(split_into_tokens_symbol("...").is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 10000,
            ..ProptestConfig::default()
        })]
        #[test]
        fn compare_to_lowercase_optimized(input in "[a-zA-Z0-9À-ÖØ-öø-ÿ ,.'!?]*") {
            prop_assert_eq!(input.to_lowercase(), to_lowercase_opt(&input));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 10000,
            ..ProptestConfig::default()
        })]
        #[test]
        fn split_tokens_are_never_empty(input in "( |\n|'|-|\\.|,|!|a|b|z|é|1|.)*") {
            for token in split_into_tokens_aolm(&input) {
                prop_assert!(!token.is_empty());
            }
            for token in split_into_tokens_whitespace(&input) {
                prop_assert!(!token.is_empty());
            }
            for token in split_into_tokens_symbol(&input) {
                prop_assert!(!token.is_empty());
            }
        }
    }
}
