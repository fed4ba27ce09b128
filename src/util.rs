//! Shared string helpers

/// Cut `s` to at most `max_bytes` without splitting a UTF-8 character
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// First line of `text`, shortened to `max_bytes` with a trailing "..."
pub fn one_line_preview(text: &str, max_bytes: usize) -> String {
    let first = text.trim().lines().next().unwrap_or("");
    let cut = truncate_utf8_safe(first, max_bytes);
    if cut.len() < first.len() || text.trim().lines().nth(1).is_some() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate_utf8_safe("CloudSync", 64), "CloudSync");
    }

    #[test]
    fn test_truncate_backs_off_to_char_boundary() {
        // "€" is 3 bytes
        assert_eq!(truncate_utf8_safe("€€€", 4), "€");
        assert_eq!(truncate_utf8_safe("€€€", 0), "");
    }

    #[test]
    fn test_preview_marks_cut_text() {
        assert_eq!(one_line_preview("Churn Spike", 40), "Churn Spike");
        assert_eq!(one_line_preview("Subject: Offer\n\nBody", 40), "Subject: Offer...");
        assert_eq!(one_line_preview("abcdef", 3), "abc...");
    }
}
