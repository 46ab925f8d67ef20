use regex::Regex;
use std::sync::OnceLock;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\n| - |• ").expect("valid separator pattern"))
}

fn leading_marks() -> &'static Regex {
    static LEADING: OnceLock<Regex> = OnceLock::new();
    LEADING.get_or_init(|| Regex::new(r"^[-•\s]+").expect("valid leading-marks pattern"))
}

/// Split a freeform summary into bullet items.
///
/// Fragments are separated by newlines, ` - ` or `• `. Leading dashes, bullets
/// and whitespace are stripped, empty fragments dropped, and so is any fragment
/// starting with `agent:` (case-insensitive). Input order is kept.
pub fn parse_summary_to_list(summary: &str) -> Vec<String> {
    separator()
        .split(summary)
        .map(|fragment| leading_marks().replace(fragment, "").trim().to_string())
        .filter(|item| !item.is_empty() && !item.to_lowercase().starts_with("agent:"))
        .collect()
}

/// Link text for a source URL: scheme prefix and one trailing slash removed.
pub fn display_url(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme.strip_suffix('/').unwrap_or(without_scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        assert!(parse_summary_to_list("").is_empty());
    }

    #[test]
    fn test_dash_separated() {
        assert_eq!(parse_summary_to_list("A - B - C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dash_bullets_on_lines() {
        assert_eq!(parse_summary_to_list("- item1\n- item2"), vec!["item1", "item2"]);
    }

    #[test]
    fn test_agent_prefix_dropped_case_insensitive() {
        assert_eq!(parse_summary_to_list("Agent: ignore this\n- keep"), vec!["keep"]);
        assert_eq!(parse_summary_to_list("AGENT: nope\nyes"), vec!["yes"]);
    }

    #[test]
    fn test_bullet_glyphs() {
        assert_eq!(
            parse_summary_to_list("• Strike in Paris • Election results"),
            vec!["Strike in Paris", "Election results"]
        );
    }

    #[test]
    fn test_hyphenated_words_are_not_split() {
        assert_eq!(parse_summary_to_list("a well-known fact"), vec!["a well-known fact"]);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        assert_eq!(
            parse_summary_to_list("Headlines:\r\n\r\n-  first  \r\n--- second"),
            vec!["Headlines:", "first", "second"]
        );
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        assert_eq!(parse_summary_to_list("x\ny\nx"), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_display_url() {
        assert_eq!(display_url("https://example.com/"), "example.com");
        assert_eq!(display_url("http://lemonde.fr/news"), "lemonde.fr/news");
        assert_eq!(display_url("ftp://host/"), "ftp://host");
        assert_eq!(display_url("https://a.com//"), "a.com/");
    }
}
