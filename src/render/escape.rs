//! Escaping and sanitizing helpers for generated markup.

/// Escape text content for an HTML body.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a value placed inside a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Validate a link target. Script and other active schemes are rejected.
pub fn sanitize_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.split_once(':') {
        // No scheme, or a colon after the first path/query/fragment delimiter.
        None => Some(escape_attr(trimmed)),
        Some((scheme, _)) if scheme.contains(&['/', '?', '#'][..]) => Some(escape_attr(trimmed)),
        Some((scheme, _)) => {
            let scheme = scheme.to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
                .then(|| escape_attr(trimmed))
        }
    }
}

/// Validate a CSS value interpolated into an inline `style`.
///
/// Only characters that appear in colors, lengths and keywords are allowed.
pub fn css_value(value: &str) -> Option<&str> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value.len() <= 64
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '.' | '%' | '-' | '(' | ')' | ',' | ' '));
    valid.then_some(value)
}

/// Validate a CSS keyword such as an alignment.
pub fn css_keyword(value: &str) -> Option<&str> {
    let value = value.trim();
    let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    valid.then_some(value)
}
