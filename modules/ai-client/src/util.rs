/// Keep at most `max_chars` characters of `s` (the prefix).
///
/// Counts Unicode scalar values, not bytes, so the cut never splits a character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "Hello 世界!";
        assert_eq!(truncate_chars(text, 7), "Hello 世");
    }

    #[test]
    fn test_truncate_within_bounds() {
        assert_eq!(truncate_chars("Hello", 100), "Hello");
        assert_eq!(truncate_chars("Hello", 5), "Hello");
    }

    #[test]
    fn test_truncate_zero() {
        assert_eq!(truncate_chars("Hello", 0), "");
    }
}
