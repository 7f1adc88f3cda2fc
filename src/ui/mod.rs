pub mod commit_list;
pub mod diff_view;
pub mod header_bar;
pub mod input;
pub mod markup;
pub mod repository_list;
pub mod status_bar;
pub mod theme;

use unicode_width::UnicodeWidthStr;

pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "\u{2026}".to_string();
    }
    let mut result = String::new();
    let mut w = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw > max - 1 {
            break;
        }
        result.push(ch);
        w += cw;
    }
    result.push('\u{2026}');
    result
}

/// Moves `scroll` so that `selected` lies within `visible` rows.
pub fn keep_visible(selected: usize, scroll: usize, visible: usize) -> usize {
    if visible == 0 {
        return scroll;
    }
    if selected >= scroll + visible {
        selected + 1 - visible
    } else if selected < scroll {
        selected
    } else {
        scroll
    }
}
