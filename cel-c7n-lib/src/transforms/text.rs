use glob::Pattern;

/// Lowercase and trim a string for normalized comparison
#[must_use]
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Match text against a shell wildcard pattern (`*`, `?`, `[...]`, `[!...]`)
///
/// Wildcards match across `/`. A pattern that is not a valid wildcard expression, such
/// as one with an unclosed `[`, is compared literally.
#[must_use]
pub fn glob(text: &str, pattern: &str) -> bool {
    Pattern::new(pattern).map_or_else(|_| text == pattern, |p| p.matches(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello World \t"), "hello world");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("ABC"), "abc");
    }

    #[test]
    fn test_glob_star_and_question() {
        assert!(glob("main.py", "*.py"));
        assert!(!glob("main.rs", "*.py"));
        assert!(glob("ab", "a?"));
        assert!(!glob("abc", "a?"));
    }

    #[test]
    fn test_glob_character_classes() {
        assert!(glob("prod-1", "prod-[0-9]"));
        assert!(!glob("prod-x", "prod-[0-9]"));
        assert!(glob("prod-x", "prod-[!0-9]"));
    }

    #[test]
    fn test_glob_star_crosses_separator() {
        assert!(glob("logs/2024/app.log", "logs/*.log"));
    }

    #[test]
    fn test_glob_invalid_pattern_is_literal() {
        assert!(glob("a[b", "a[b"));
        assert!(!glob("ab", "a[b"));
    }
}
