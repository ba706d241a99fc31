//! Text and attribute-value escaping for the HTML renderer.
//!
//! No HTML-escaping logic exists anywhere in the teacher (a GPU
//! renderer never emits markup), so this module is grounded instead on
//! the general shape of `ssr::render_recursive` in sycamore-web/leptos:
//! text nodes and attribute values are escaped independently, and
//! escaping never allocates unless the input actually contains a
//! character that needs it.

/// Escapes text destined for element content (between tags): `&`, `<`,
/// `>`. Quotes are left alone — they are only dangerous inside an
/// attribute value.
pub fn escape_text(input: &str) -> String {
    if !input.contains(['&', '<', '>']) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a value destined for a double-quoted HTML attribute: `&`,
/// `<`, `"`. The renderer always quotes attribute values with `"`, so
/// `'` does not need escaping here.
pub fn escape_attr(input: &str) -> String {
    if !input.contains(['&', '<', '"']) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escapes_angle_brackets_and_amp() {
        assert_eq!(escape_text("<b>a & b</b>"), "&lt;b&gt;a &amp; b&lt;/b&gt;");
    }

    #[test]
    fn text_leaves_quotes_alone() {
        assert_eq!(escape_text(r#"say "hi""#), r#"say "hi""#);
    }

    #[test]
    fn attr_escapes_quotes() {
        assert_eq!(escape_attr(r#"a "b" c"#), "a &quot;b&quot; c");
    }

    #[test]
    fn plain_ascii_is_not_reallocated_unnecessarily() {
        let input = "plain text";
        assert_eq!(escape_text(input), input);
    }
}
