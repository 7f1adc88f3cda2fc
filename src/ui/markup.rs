//! Turns highlight markup back into styled terminal lines.

use crate::highlight::diff;
use crate::ui::theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

const OPEN_PREFIX: &str = "<span class=\"";
const CLOSE: &str = "</span>";

pub fn class_style(class: &str) -> Style {
    match class {
        diff::ADDITION => Style::default().fg(theme::ADDITION_FG),
        diff::DELETION => Style::default().fg(theme::DELETION_FG),
        diff::META => Style::default().fg(theme::META_FG),
        diff::COMMENT => Style::default().fg(theme::COMMENT_FG),
        _ => Style::default(),
    }
}

pub fn to_lines(markup: &str) -> Vec<Line<'static>> {
    markup.split('\n').map(parse_line).collect()
}

/// Raw patch text, shown until its markup arrives.
pub fn plain_lines(source: &str) -> Vec<Line<'static>> {
    source
        .split('\n')
        .map(|l| Line::from(Span::raw(l.to_string())))
        .collect()
}

fn parse_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut rest = line;
    while let Some(start) = rest.find(OPEN_PREFIX) {
        if start > 0 {
            spans.push(Span::raw(unescape(&rest[..start])));
        }
        let after = &rest[start + OPEN_PREFIX.len()..];
        let Some(class_end) = after.find("\">") else {
            break;
        };
        let class = &after[..class_end];
        let body = &after[class_end + 2..];
        let (text, tail) = match body.find(CLOSE) {
            Some(end) => (&body[..end], &body[end + CLOSE.len()..]),
            None => (body, ""),
        };
        spans.push(Span::styled(unescape(text), class_style(class)));
        rest = tail;
    }
    if !rest.is_empty() {
        spans.push(Span::raw(unescape(rest)));
    }
    Line::from(spans)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
