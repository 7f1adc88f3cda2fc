//! Unified-diff highlighting, emitting the same class names highlight.js
//! uses for its `diff` language.

pub const ADDITION: &str = "hljs-addition";
pub const DELETION: &str = "hljs-deletion";
pub const META: &str = "hljs-meta";
pub const COMMENT: &str = "hljs-comment";

pub fn classify(line: &str) -> Option<&'static str> {
    if line.starts_with("@@") {
        Some(META)
    } else if ["diff ", "index ", "--- ", "+++ "]
        .iter()
        .any(|p| line.starts_with(p))
    {
        Some(COMMENT)
    } else if line.starts_with('+') {
        Some(ADDITION)
    } else if line.starts_with('-') {
        Some(DELETION)
    } else {
        None
    }
}

pub fn highlight(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match classify(line) {
            Some(class) if !line.is_empty() => {
                out.push_str("<span class=\"");
                out.push_str(class);
                out.push_str("\">");
                escape_into(line, &mut out);
                out.push_str("</span>");
            }
            _ => escape_into(line, &mut out),
        }
    }
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
