// Text processing utilities

/// String and text manipulation utilities
pub mod string {
    /// Take the first `max_chars` characters and always append `...`.
    ///
    /// The ellipsis is added even when nothing was cut, which is how source
    /// previews have always been shown.
    pub fn preview(text: &str, max_chars: usize) -> String {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }

    /// Collapse every run of whitespace, line breaks included, to one space
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Truncate text to a specified number of characters with ellipsis
    pub fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else if max_chars <= 3 {
            "...".to_string()
        } else {
            let head: String = text.chars().take(max_chars - 3).collect();
            format!("{}...", head)
        }
    }

    /// Wrap text to `width` columns, keeping explicit line breaks.
    ///
    /// Blank lines survive as empty strings so paragraph spacing in answers
    /// is kept.
    pub fn wrap_preserving_breaks(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for raw in text.split('\n') {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                lines.push(String::new());
                continue;
            }
            lines.extend(
                textwrap::wrap(raw, width)
                    .into_iter()
                    .map(|line| line.into_owned()),
            );
        }

        lines
    }
}
