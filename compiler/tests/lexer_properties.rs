//! Property-based tests for the lexer and script classifier (spec §8
//! "Lexer properties"), using `proptest` to generate inputs rather than
//! hand-picking a handful of examples.

use kapila_compiler::lexer::{Lexer, TokenKind};
use kapila_compiler::script;
use proptest::prelude::*;

/// Every Kannada digit codepoint (೦-೯), generated by offset rather than
/// spelled out, so the strategy stays in sync with the classifier.
fn kannada_digit() -> impl Strategy<Value = char> {
    (0u32..=9).prop_map(|d| char::from_u32(0x0CE6 + d).unwrap())
}

fn ascii_digit() -> impl Strategy<Value = char> {
    prop::char::range('0', '9')
}

fn mixed_digit() -> impl Strategy<Value = char> {
    prop_oneof![kannada_digit(), ascii_digit()]
}

proptest! {
    /// A run of 1-6 Kannada/ASCII digits (no `.`) always normalizes to
    /// the plain base-10 integer the same digits would spell in ASCII.
    #[test]
    fn normalize_number_matches_ascii_value(digits in prop::collection::vec(mixed_digit(), 1..6)) {
        let text: String = digits.iter().collect();
        let ascii: String = digits.iter().map(|&c| {
            script::digit_value(c).unwrap() as u8 as char
        }).map(|d| (d as u8 + b'0') as char).collect();
        let expected: i64 = ascii.parse().unwrap();
        match script::normalize_number(&text) {
            Some(script::Number::Int(n)) => prop_assert_eq!(n, expected),
            other => prop_assert!(false, "expected Int({expected}), got {other:?}"),
        }
    }

    /// Any digit run the lexer actually scans as a `Number` token (no
    /// embedded `.`) ends in exactly one `Eof` token and never an `Error`
    /// token — spec §8's no-unterminated-construct guarantee restricted
    /// to the fragment this strategy can produce.
    #[test]
    fn digit_runs_never_lex_to_an_error_token(digits in prop::collection::vec(mixed_digit(), 1..8)) {
        let text: String = digits.iter().collect();
        let tokens = Lexer::tokenize_all(&text);
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        prop_assert!(tokens.iter().all(|t| t.kind != TokenKind::Error));
    }

    /// `digit_value` agrees with `is_kannada_digit` on every codepoint in
    /// the Kannada block: a digit offset yields `Some`, anything else in
    /// the block yields `None` (spec §4.1 classifier contract).
    #[test]
    fn digit_value_agrees_with_is_kannada_digit(offset in 0u32..0x80) {
        let ch = char::from_u32(0x0C80 + offset).unwrap();
        prop_assert_eq!(script::is_kannada_digit(ch), script::digit_value(ch).is_some() && !ch.is_ascii());
    }

}

/// Hyphen is always a valid identifier-continuation character but never a
/// valid identifier start (spec §4.1) — a fixed fact, not a property over
/// generated input, so it's a plain test rather than inside `proptest!`.
#[test]
fn hyphen_never_starts_an_identifier() {
    assert!(!script::is_valid_ident_start('-'));
    assert!(script::is_valid_ident_char('-'));
}
