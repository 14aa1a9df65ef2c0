//! Bidirectional Kannada/English word aliases (spec §6). Every built-in
//! word has one or more Kannada spellings and an English spelling; the VM
//! and the C code generator both resolve through here so either spelling
//! works anywhere a word is expected.

/// Canonical (English) names of every built-in, arithmetic/comparison
/// operator tokens aside — those are handled by dedicated `TokenKind`s,
/// not by name lookup.
pub mod canon {
    pub const DUP: &str = "dup";
    pub const DROP: &str = "drop";
    pub const SWAP: &str = "swap";
    pub const OVER: &str = "over";
    pub const ROT: &str = "rot";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const NOT: &str = "not";
    pub const PRINT: &str = "print";
    pub const LENGTH: &str = "length";
    pub const NTH: &str = "nth";
    pub const APPEND: &str = "append";
    pub const FIRST: &str = "first";
    pub const REST: &str = "rest";
    pub const CONCAT: &str = "concat";
    pub const MAP: &str = "map";
    pub const FILTER: &str = "filter";
    pub const FOLD: &str = "fold";
    pub const EACH: &str = "each";
    pub const TIMES: &str = "times";
    pub const DO: &str = "do";
}

/// Resolve any Kannada or English spelling of a built-in word (or `and`/
/// `or`/`not`, which double as infix-chain keywords) to its canonical
/// English name. Returns `None` for words that aren't built-ins — the
/// caller then falls through to variables / user words.
pub fn resolve_builtin(word: &str) -> Option<&'static str> {
    use canon::*;
    Some(match word {
        "dup" | "ನಕಲು" => DUP,
        "drop" | "ಬಿಡು" => DROP,
        "swap" | "ಅದಲುಬದಲು" => SWAP,
        "over" | "ಮೇಲೆ" => OVER,
        "rot" | "ತಿರುಗಿಸು" => ROT,
        "and" | "ಮತ್ತು" => AND,
        "or" | "ಅಥವಾ" => OR,
        "not" | "ಅಲ್ಲ" => NOT,
        "print" | "ಮುದ್ರಿಸು" => PRINT,
        "length" | "ಉದ್ದ" => LENGTH,
        "nth" | "ತೆಗೆ" => NTH,
        "append" | "ಸೇರಿಸು" => APPEND,
        "first" | "ಮೊದಲ" => FIRST,
        "rest" | "ಉಳಿದ" => REST,
        "concat" | "," | "ಜೋಡಿಸು" => CONCAT,
        "map" | "ನಕ್ಷೆ" => MAP,
        "filter" | "ಸೋಸು" => FILTER,
        "fold" | "ಮಡಿಸು" => FOLD,
        "each" | "ಪ್ರತಿಯೊಂದಕ್ಕೂ" => EACH,
        "times" | "ಸಾರಿ" => TIMES,
        "do" | "ಮಾಡು" | "ಕರೆ" => DO,
        _ => return None,
    })
}

/// Resolve a Kannada/English *word* spelling of an arithmetic or
/// comparison operator (spec §6 vocabulary table) to the operator's
/// canonical ASCII symbol. Distinct from the token-level operators
/// (`+ - * / % = != < > <= >=`), which are lexed as dedicated
/// `TokenKind`s rather than `Word`s — these aliases let the same
/// operation be invoked by name in postfix position (`೫ ೩ ಕೂಡು`).
pub fn resolve_operator_word(word: &str) -> Option<&'static str> {
    Some(match word {
        "ಕೂಡು" | "ಕೂಡಿಸು" => "+",
        "ಕಳೆ" | "ಕಳೆಯಿರಿ" => "-",
        "ಗುಣಿಸು" | "ಗುಣಾಕಾರ" => "*",
        "ಭಾಗಿಸು" | "ಭಾಗಾಕಾರ" => "/",
        "ಶೇಷ" => "%",
        "ಸಮ" => "=",
        "ಸಮನಲ್ಲ" => "!=",
        "ಕಿರಿದು" => "<",
        "ಹಿರಿದು" => ">",
        "ಕಿರಿದುಸಮ" => "<=",
        "ಹಿರಿದುಸಮ" => ">=",
        _ => return None,
    })
}

/// Is `word` one of the `and`/`or` infix-chain keywords (by any spelling)?
pub fn is_and_word(word: &str) -> bool {
    matches!(word, "and" | "ಮತ್ತು")
}

pub fn is_or_word(word: &str) -> bool {
    matches!(word, "or" | "ಅಥವಾ")
}

pub fn is_not_word(word: &str) -> bool {
    matches!(word, "not" | "ಅಲ್ಲ")
}

/// Boolean literal keywords (spec §4.4, §6). `true`/`false` each have
/// several Kannada spellings.
pub fn is_true_word(word: &str) -> bool {
    matches!(word, "true" | "ನಿಜ" | "ಸರಿ" | "ಹೌದು")
}

pub fn is_false_word(word: &str) -> bool {
    matches!(word, "false" | "ಸುಳ್ಳು" | "ತಪ್ಪು" | "ಬೇಸ" | "ಇಲ್ಲ")
}

pub fn is_boolean_word(word: &str) -> bool {
    is_true_word(word) || is_false_word(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_same_canonical_name() {
        assert_eq!(resolve_builtin("dup"), resolve_builtin("ನಕಲು"));
        assert_eq!(resolve_builtin("print"), resolve_builtin("ಮುದ್ರಿಸು"));
        assert_eq!(resolve_builtin(","), Some(canon::CONCAT));
    }

    #[test]
    fn boolean_keywords_cover_all_spellings() {
        for w in ["true", "ನಿಜ", "ಸರಿ", "ಹೌದು"] {
            assert!(is_true_word(w), "{w} should be a true-spelling");
        }
        for w in ["false", "ಸುಳ್ಳು", "ತಪ್ಪು", "ಬೇಸ", "ಇಲ್ಲ"] {
            assert!(is_false_word(w), "{w} should be a false-spelling");
        }
    }

    #[test]
    fn unknown_word_is_not_a_builtin() {
        assert_eq!(resolve_builtin("ವರ್ಗ"), None);
    }

    #[test]
    fn operator_words_resolve_to_their_symbol() {
        assert_eq!(resolve_operator_word("ಕೂಡು"), Some("+"));
        assert_eq!(resolve_operator_word("ಕೂಡಿಸು"), Some("+"));
        assert_eq!(resolve_operator_word("ಕಳೆ"), Some("-"));
        assert_eq!(resolve_operator_word("ಗುಣಿಸು"), Some("*"));
        assert_eq!(resolve_operator_word("ಭಾಗಿಸು"), Some("/"));
        assert_eq!(resolve_operator_word("ಶೇಷ"), Some("%"));
        assert_eq!(resolve_operator_word("ಸಮ"), Some("="));
        assert_eq!(resolve_operator_word("ಸಮನಲ್ಲ"), Some("!="));
        assert_eq!(resolve_operator_word("ಕಿರಿದು"), Some("<"));
        assert_eq!(resolve_operator_word("ಹಿರಿದು"), Some(">"));
        assert_eq!(resolve_operator_word("ಕಿರಿದುಸಮ"), Some("<="));
        assert_eq!(resolve_operator_word("ಹಿರಿದುಸಮ"), Some(">="));
        assert_eq!(resolve_operator_word("ವರ್ಗ"), None);
    }
}
