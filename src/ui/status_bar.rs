use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar<'a> {
    pub route: &'a str,
    pub loading: bool,
    pub pending_highlights: usize,
    pub error: Option<&'a str>,
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::STATUS_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let sep = || {
            Span::styled(
                "\u{2502}",
                Style::default().fg(theme::BORDER_COLOR).bg(theme::STATUS_BG),
            )
        };

        let mut spans = vec![Span::styled(
            format!(" {} ", self.route),
            Style::default()
                .fg(theme::ACCENT)
                .bg(theme::STATUS_BG)
                .add_modifier(Modifier::BOLD),
        )];

        if self.loading {
            spans.push(sep());
            spans.push(Span::styled(" loading\u{2026} ", bg));
        }

        if self.pending_highlights > 0 {
            spans.push(sep());
            spans.push(Span::styled(
                format!(" highlighting: {} ", self.pending_highlights),
                bg,
            ));
        }

        if let Some(err) = self.error {
            spans.push(sep());
            spans.push(Span::styled(
                format!(" {err} "),
                Style::default().fg(theme::ERROR_FG).bg(theme::STATUS_BG),
            ));
        }

        spans.push(sep());
        spans.push(Span::styled(
            " j/k move \u{b7} enter open \u{b7} h back \u{b7} / user \u{b7} r reload \u{b7} q quit",
            Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
