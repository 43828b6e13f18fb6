//! Text helpers for composed markup and generated file names.

/// Escape the HTML-special characters `& < > " '`.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape a multi-line text block, turning line breaks into `<br>`.
pub fn escape_multiline(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .split('\n')
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_specials() {
        assert_eq!(
            escape_html(r#"O'Brien & <Sons> "Ltd""#),
            "O&#39;Brien &amp; &lt;Sons&gt; &quot;Ltd&quot;"
        );
    }

    #[test]
    fn test_escape_html_leaves_plain_text() {
        assert_eq!(escape_html("Grandma Betty"), "Grandma Betty");
        assert_eq!(escape_html("Café ☕"), "Café ☕");
    }

    #[test]
    fn test_escape_multiline() {
        assert_eq!(escape_multiline("a < b\r\nc"), "a &lt; b<br>c");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Project #12 Final", "doc"), "project-12-final");
        assert_eq!(sanitize_filename("  ---  ", "doc"), "doc");
        assert_eq!(sanitize_filename("a__b", "doc"), "a-b");
    }
}
