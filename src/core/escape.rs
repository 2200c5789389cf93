//! Escaping for values interpolated into the rendered document

/// Escape text for HTML element content and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Encode a string as a JavaScript string literal safe inside `<script>`.
///
/// JSON string syntax is valid JS. `<` is written as `\u003c` so the
/// literal can never close or open a script element.
pub fn js_string_literal(input: &str) -> String {
    serde_json::Value::String(input.to_owned())
        .to_string()
        .replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Reverse of [`escape_html`] for the entities it produces
pub fn unescape_html(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
