use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const PLACEHOLDER: &str = "Enter a GitHub username and hit enter";

/// Title plus the username form.
pub struct HeaderBar<'a> {
    pub input: &'a str,
    pub focused: bool,
}

impl<'a> Widget for HeaderBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::HEADER_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let mut spans: Vec<Span<'static>> = vec![
            Span::styled(
                " octoview",
                Style::default()
                    .fg(theme::ACCENT)
                    .bg(theme::HEADER_BG)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " \u{2503} ",
                Style::default().fg(theme::SEPARATOR).bg(theme::HEADER_BG),
            ),
        ];

        if self.input.is_empty() && !self.focused {
            spans.push(Span::styled(
                PLACEHOLDER,
                Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG),
            ));
        } else {
            spans.push(Span::styled(
                self.input.to_string(),
                Style::default().bg(theme::HEADER_BG),
            ));
        }

        if self.focused {
            spans.push(Span::styled(
                "\u{258c}",
                Style::default().fg(theme::INPUT_COLOR).bg(theme::HEADER_BG),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
