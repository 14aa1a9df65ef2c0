//! Deterministic C identifier mangling (spec §4.5): ASCII alphanumerics
//! and `_` pass through untouched, everything else (every Kannada
//! codepoint) becomes `_<hex>_`.

/// Mangle a Kapila word/variable name into a valid C identifier. Always
/// prefixed so a name that happens to already be a valid, reserved-free C
/// identifier doesn't collide with a runtime symbol of the same spelling.
pub fn mangle(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 5);
    out.push_str("kp_");
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push_str(&format!("_{:x}_", ch as u32));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_identifier_passes_through() {
        assert_eq!(mangle("square"), "kp_square");
    }

    #[test]
    fn non_ascii_becomes_hex_escapes() {
        let mangled = mangle("ವರ್ಗ");
        assert!(mangled.starts_with("kp_"));
        assert!(mangled.chars().all(|c| c.is_ascii()));
    }

    #[test]
    fn mangling_is_injective_for_distinct_inputs() {
        assert_ne!(mangle("ಕೂಡು"), mangle("ಕಳೆ"));
    }
}
