// src/utils/html.rs

/// Strips unsafe markup from user supplied rich text (subject descriptions,
/// question text) while keeping harmless formatting tags like `<b>` and `<p>`.
///
/// `<script>` elements are removed together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes an optional field, mapping input that is blank once cleaned to `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(|s| clean_html(s.trim()))
        .filter(|s| !s.trim().is_empty())
}

/// True when something other than whitespace is left after sanitizing.
pub fn has_visible_content(input: &str) -> bool {
    !clean_html(input).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_drops_script() {
        let cleaned = clean_html("<p>Cells</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Cells</p>");
    }

    #[test]
    fn test_clean_optional_blank_is_none() {
        assert_eq!(clean_optional(Some("   ")), None);
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some(" <b>Hi</b> ")), Some("<b>Hi</b>".to_string()));
        assert_eq!(clean_optional(Some("<script>x</script>")), None);
    }

    #[test]
    fn test_has_visible_content() {
        assert!(has_visible_content("<b>Mitosis</b>"));
        assert!(!has_visible_content("<script>x</script>"));
        assert!(!has_visible_content("  <script>alert(1)</script>  "));
    }
}
