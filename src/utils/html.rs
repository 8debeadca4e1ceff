//! Small HTML text helpers shared by the render stages.

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Marker substituted for a directive or layout that could not be honoured.
///
/// An HTML comment for view-source readers, followed by a visible span so
/// the problem shows up in a preview.
pub fn inline_marker(message: &str) -> String {
    let escaped = escape_html(message);
    // No dash runs inside a comment
    let mut comment = String::with_capacity(escaped.len());
    for ch in escaped.chars() {
        if !(ch == '-' && comment.ends_with('-')) {
            comment.push(ch);
        }
    }
    format!("<!-- dompile: {comment} --><span class=\"dompile-error\">{escaped}</span>")
}

/// Position of the first ASCII case-insensitive occurrence of `needle`.
pub fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
