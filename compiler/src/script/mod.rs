//! Script classifier (component A): tells Kannada letters, digits, matras,
//! halants and conjunct marks apart from ASCII, and normalizes Kannada
//! numerals to integer/float values. Pure functions over `char`, with no
//! dependency on the lexer — this is the leaf of the component graph.

/// Start of the Kannada Unicode block (U+0C80).
const KANNADA_BASE: u32 = 0x0C80;

fn offset(ch: char) -> Option<u32> {
    (ch as u32).checked_sub(KANNADA_BASE)
}

/// Independent vowels: offsets 0x05-0x14, with gaps at 0x0D and 0x11.
fn is_kannada_vowel_offset(o: u32) -> bool {
    (0x05..=0x14).contains(&o) && o != 0x0D && o != 0x11
}

/// Consonants: offsets 0x15-0x39.
fn is_kannada_consonant_offset(o: u32) -> bool {
    (0x15..=0x39).contains(&o)
}

/// Dependent vowels (matras): offsets 0x3E-0x4C, with gaps at 0x45 and 0x49.
fn is_kannada_matra_offset(o: u32) -> bool {
    (0x3E..=0x4C).contains(&o) && o != 0x45 && o != 0x49
}

/// Halant (vowel-killer, ್): offset 0x4D.
fn is_kannada_halant_offset(o: u32) -> bool {
    o == 0x4D
}

/// Anusvara (ಂ, 0x82) and visarga (ಃ, 0x83).
fn is_kannada_anusvara_visarga_offset(o: u32) -> bool {
    o == 0x82 || o == 0x83
}

/// Digits: offsets 0x66-0x6F (೦-೯).
fn is_kannada_digit_offset(o: u32) -> bool {
    (0x66..=0x6F).contains(&o)
}

/// Is `ch` any codepoint inside the Kannada Unicode block (U+0C80..U+0CFF)?
pub fn is_kannada_codepoint(ch: char) -> bool {
    matches!(ch as u32, 0x0C80..=0x0CFF)
}

/// Is `ch` a Kannada letter (independent vowel or consonant)?
pub fn is_kannada_letter(ch: char) -> bool {
    match offset(ch) {
        Some(o) => is_kannada_vowel_offset(o) || is_kannada_consonant_offset(o),
        None => false,
    }
}

/// Is `ch` a Kannada digit (೦-೯)?
pub fn is_kannada_digit(ch: char) -> bool {
    match offset(ch) {
        Some(o) => is_kannada_digit_offset(o),
        None => false,
    }
}

/// Numeric value 0-9 of a Kannada or ASCII digit, or `None`.
pub fn digit_value(ch: char) -> Option<u32> {
    if ch.is_ascii_digit() {
        return Some(ch as u32 - '0' as u32);
    }
    match offset(ch) {
        Some(o) if is_kannada_digit_offset(o) => Some(o - 0x66),
        _ => None,
    }
}

/// Can `ch` start an identifier? Kannada letters and ASCII letters/underscore
/// only — hyphen is never an identifier start.
pub fn is_valid_ident_start(ch: char) -> bool {
    is_kannada_letter(ch) || ch.is_alphabetic() || ch == '_'
}

/// Can `ch` continue an identifier once started? Adds matras, halant,
/// anusvara/visarga, digits, underscore, and hyphen (kebab-case names).
pub fn is_valid_ident_char(ch: char) -> bool {
    if is_valid_ident_start(ch) || ch.is_ascii_digit() || ch == '-' {
        return true;
    }
    match offset(ch) {
        Some(o) => {
            is_kannada_matra_offset(o)
                || is_kannada_halant_offset(o)
                || is_kannada_anusvara_visarga_offset(o)
        }
        None => false,
    }
}

/// Parsed form of a number literal: either an exact integer or a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Walk `text`, mapping each Kannada or ASCII digit to its value and a
/// single `.` to the decimal separator. Mixed Kannada/ASCII digits within
/// one number are legal (`"೧2೩"` is `123`).
pub fn normalize_number(text: &str) -> Option<Number> {
    let mut digits_before = String::new();
    let mut digits_after = String::new();
    let mut seen_dot = false;

    for ch in text.chars() {
        if ch == '.' {
            if seen_dot {
                return None;
            }
            seen_dot = true;
            continue;
        }
        let v = digit_value(ch)?;
        let c = std::char::from_digit(v, 10)?;
        if seen_dot {
            digits_after.push(c);
        } else {
            digits_before.push(c);
        }
    }

    if seen_dot {
        let combined = format!("{}.{}", digits_before, digits_after);
        combined.parse::<f64>().ok().map(Number::Float)
    } else {
        digits_before.parse::<i64>().ok().map(Number::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowel_and_consonant_offsets() {
        assert!(is_kannada_letter('ಅ')); // independent vowel, offset 0x05
        assert!(is_kannada_letter('ಕ')); // consonant, offset 0x15
        assert!(!is_kannada_letter('a'));
    }

    #[test]
    fn gaps_are_excluded() {
        // 0x0D and 0x11 fall in the vowel gap and are unassigned codepoints,
        // not letters.
        let gap1 = char::from_u32(KANNADA_BASE + 0x0D).unwrap();
        let gap2 = char::from_u32(KANNADA_BASE + 0x11).unwrap();
        assert!(!is_kannada_letter(gap1));
        assert!(!is_kannada_letter(gap2));
    }

    #[test]
    fn digit_values() {
        assert_eq!(digit_value('೦'), Some(0));
        assert_eq!(digit_value('೯'), Some(9));
        assert_eq!(digit_value('5'), Some(5));
        assert_eq!(digit_value('ಅ'), None);
    }

    #[test]
    fn ident_start_excludes_hyphen() {
        assert!(!is_valid_ident_start('-'));
        assert!(is_valid_ident_char('-'));
    }

    #[test]
    fn normalize_plain_kannada_int() {
        assert_eq!(normalize_number("೧೨೩"), Some(Number::Int(123)));
    }

    #[test]
    fn normalize_kannada_float() {
        match normalize_number("೩.೧೪") {
            Some(Number::Float(f)) => assert!((f - 3.14).abs() < 1e-9),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn normalize_mixed_digits() {
        assert_eq!(normalize_number("೧2೩"), Some(Number::Int(123)));
    }
}
