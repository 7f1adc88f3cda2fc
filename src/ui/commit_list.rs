use crate::ui::{theme, truncate_with_ellipsis};
use crate::views::{format_commit_time, CommitSummary};
use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

pub struct CommitList<'a> {
    pub username: &'a str,
    pub repo: &'a str,
    pub commits: &'a [CommitSummary],
    pub selected: usize,
    pub scroll: usize,
    pub now: DateTime<Utc>,
}

impl<'a> Widget for CommitList<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        if area.height < 2 || area.width < 20 {
            return;
        }
        buf.set_line(
            area.x + 1,
            area.y,
            &Line::from(Span::styled(
                format!("Showing Recent Commits on {}/{}", self.username, self.repo),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            area.width.saturating_sub(1),
        );

        let width = area.width.saturating_sub(2) as usize;
        let rows = area.height.saturating_sub(2) as usize;
        for (row, (i, commit)) in self
            .commits
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(rows)
            .enumerate()
        {
            let y = area.y + 2 + row as u16;
            let row_style = if i == self.selected {
                Style::default().bg(theme::SELECTED_BG)
            } else {
                Style::default()
            };
            for x in area.x..area.right() {
                buf[(x, y)].set_style(row_style);
            }

            let sha: String = commit.sha.chars().take(7).collect();
            let when = commit
                .date
                .map(|d| format_commit_time(&d, self.now))
                .unwrap_or_default();
            let author = truncate_with_ellipsis(&commit.author, 16);
            let used = sha.width() + author.width() + when.width() + 4;
            let message = truncate_with_ellipsis(&commit.message, width.saturating_sub(used));

            buf.set_line(
                area.x + 1,
                y,
                &Line::from(vec![
                    Span::styled(sha, row_style.fg(theme::ACCENT)),
                    Span::styled(format!(" {author} "), row_style.add_modifier(Modifier::BOLD)),
                    Span::styled(message, row_style),
                    Span::styled(format!("  {when}"), row_style.fg(theme::DIM_TEXT)),
                ]),
                width as u16,
            );
        }
    }
}
