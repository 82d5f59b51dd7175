/// String utility functions
pub struct StringUtils;

impl StringUtils {
    /// Trimmed value, or `None` when blank.
    pub fn non_blank(s: &str) -> Option<&str> {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Case-insensitive comparison of trimmed values.
    pub fn eq_ignore_case_trimmed(a: &str, b: &str) -> bool {
        a.trim().to_lowercase() == b.trim().to_lowercase()
    }

    /// Collapse runs of whitespace, as found in rendered element text.
    pub fn collapse_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert_eq!(StringUtils::non_blank(""), None);
        assert_eq!(StringUtils::non_blank("  \t\n"), None);
        assert_eq!(StringUtils::non_blank("  19.99 "), Some("19.99"));
        assert_eq!(StringUtils::non_blank("   "), None);
    }

    #[test]
    fn test_case_insensitive_match_handles_cyrillic() {
        assert!(StringUtils::eq_ignore_case_trimmed(" Черно ", "черно"));
        assert!(StringUtils::eq_ignore_case_trimmed("Black", "black "));
        assert!(!StringUtils::eq_ignore_case_trimmed("Black", "Blue"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(StringUtils::collapse_whitespace("  Коментари \n [60] "), "Коментари [60]");
    }
}
