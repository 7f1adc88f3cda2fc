use crate::ui::{theme, truncate_with_ellipsis};
use crate::views::RepoSummary;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Two rows per repository: name and watchers, then the description.
pub const ROWS_PER_ITEM: usize = 2;

pub struct RepositoryList<'a> {
    pub username: &'a str,
    pub repos: &'a [RepoSummary],
    pub selected: usize,
    pub scroll: usize,
}

impl<'a> Widget for RepositoryList<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        if area.height < 2 || area.width < 10 {
            return;
        }
        let title = format!(
            "Showing Repositories {} Contributes To:",
            self.username
        );
        buf.set_line(
            area.x + 1,
            area.y,
            &Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
            area.width.saturating_sub(1),
        );

        let width = area.width.saturating_sub(2) as usize;
        let mut y = area.y + 2;
        for (i, repo) in self.repos.iter().enumerate().skip(self.scroll) {
            if y + 1 >= area.bottom() {
                break;
            }
            let row_style = if i == self.selected {
                Style::default().bg(theme::SELECTED_BG)
            } else {
                Style::default()
            };
            for x in area.x..area.right() {
                buf[(x, y)].set_style(row_style);
            }

            let watchers = format!("  {} Watchers", repo.watchers);
            let name = truncate_with_ellipsis(
                &repo.full_name(),
                width.saturating_sub(watchers.len()),
            );
            buf.set_line(
                area.x + 1,
                y,
                &Line::from(vec![
                    Span::styled(name, row_style.fg(theme::ACCENT).add_modifier(Modifier::BOLD)),
                    Span::styled(watchers, row_style.fg(theme::DIM_TEXT)),
                ]),
                width as u16,
            );

            let description = repo.description.as_deref().unwrap_or("");
            buf.set_line(
                area.x + 3,
                y + 1,
                &Line::from(Span::styled(
                    truncate_with_ellipsis(description, width.saturating_sub(2)),
                    Style::default().fg(theme::DIM_TEXT),
                )),
                width.saturating_sub(2) as u16,
            );
            y += ROWS_PER_ITEM as u16;
        }
    }
}
