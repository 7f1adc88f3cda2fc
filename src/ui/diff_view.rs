use crate::ui::{markup, theme};
use crate::views::FileEntry;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One file of a commit, shown raw until its markup comes back.
#[derive(Debug, Clone)]
pub struct FilePane {
    pub filename: String,
    pub lines: Vec<Line<'static>>,
    pub highlighted: bool,
}

impl FilePane {
    pub fn new(file: &FileEntry) -> Self {
        Self {
            filename: file.filename.clone(),
            lines: file
                .patch
                .as_deref()
                .map(markup::plain_lines)
                .unwrap_or_default(),
            highlighted: false,
        }
    }

    pub fn set_markup(&mut self, markup: &str) {
        self.lines = markup::to_lines(markup);
        self.highlighted = true;
    }

    /// Header row, patch rows and a blank separator.
    pub fn height(&self) -> usize {
        self.lines.len() + 2
    }
}

pub struct DiffView<'a> {
    pub username: &'a str,
    pub repo: &'a str,
    pub sha: &'a str,
    pub files: &'a [FilePane],
    pub scroll: usize,
}

impl DiffView<'_> {
    pub fn total_lines(files: &[FilePane]) -> usize {
        files.iter().map(FilePane::height).sum()
    }
}

impl<'a> Widget for DiffView<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        if area.height < 2 || area.width < 10 {
            return;
        }
        buf.set_line(
            area.x + 1,
            area.y,
            &Line::from(Span::styled(
                format!("Commit {} on {}/{}", self.sha, self.username, self.repo),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            area.width.saturating_sub(1),
        );

        let header_style = Style::default()
            .fg(theme::ACCENT)
            .bg(theme::STATUS_BG)
            .add_modifier(Modifier::BOLD);
        let rows = self.files.iter().flat_map(|file| {
            std::iter::once(Line::from(Span::styled(
                format!(" {} ", file.filename),
                header_style,
            )))
            .chain(file.lines.iter().cloned())
            .chain(std::iter::once(Line::default()))
        });

        let width = area.width.saturating_sub(2);
        let visible = area.height.saturating_sub(2) as usize;
        for (i, line) in rows.skip(self.scroll).take(visible).enumerate() {
            buf.set_line(area.x + 1, area.y + 2 + i as u16, &line, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::diff;

    #[test]
    fn pane_starts_plain_and_takes_markup() {
        let mut pane = FilePane::new(&FileEntry {
            filename: "a.js".into(),
            patch: Some("@@ -0,0 +1 @@\n+x".into()),
        });
        assert_eq!(pane.height(), 4);
        assert!(!pane.highlighted);

        pane.set_markup(&diff::highlight("@@ -0,0 +1 @@\n+x"));
        assert!(pane.highlighted);
        assert_eq!(pane.lines.len(), 2);
    }

    #[test]
    fn binary_file_has_no_lines() {
        let pane = FilePane::new(&FileEntry {
            filename: "logo.png".into(),
            patch: None,
        });
        assert!(pane.lines.is_empty());
        assert_eq!(DiffView::total_lines(&[pane]), 2);
    }
}
