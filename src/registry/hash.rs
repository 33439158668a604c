//! Hash and prefix helpers.

/// Canonical form of a hash or prefix: whitespace-trimmed and lowercased.
pub fn canonicalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Whether `value` is a non-empty run of lowercase hex digits (`^[a-f0-9]+$`).
pub fn is_lower_hex(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Truncate a stored hash to at most `max_len` characters.
pub fn truncate(hash: &str, max_len: usize) -> String {
    hash.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("ABCD "), "abcd");
        assert_eq!(canonicalize("  \tAbCd\n"), "abcd");
        assert_eq!(canonicalize("abcd"), "abcd");
    }

    #[test]
    fn test_is_lower_hex() {
        assert!(is_lower_hex("0123456789abcdef"));
        assert!(!is_lower_hex("abcx"));
        assert!(!is_lower_hex("ABCD"));
        assert!(!is_lower_hex("ab cd"));
        assert!(!is_lower_hex("ab%"));
        assert!(!is_lower_hex(""));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef1234", 6), "abcdef");
        assert_eq!(truncate("abcd", 6), "abcd");
        assert_eq!(truncate("abcdef", 6), "abcdef");
    }
}
