use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Popup asking for the countdown length in minutes.
pub struct CountdownPrompt<'a> {
    input: &'a LineInput,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> CountdownPrompt<'a> {
    pub fn new(input: &'a LineInput, error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            input,
            error,
            theme,
        }
    }
}

impl Widget for CountdownPrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Countdown ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let (before, at, after) = self.input.render_parts();
        let cursor_style = Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg());
        let field = Line::from(vec![
            Span::styled(" Minutes: ", Style::default().fg(colors.fg())),
            Span::styled(before, Style::default().fg(colors.accent())),
            Span::styled(at.map_or(" ".to_string(), |c| c.to_string()), cursor_style),
            Span::styled(after, Style::default().fg(colors.accent())),
        ]);

        let status = match self.error {
            Some(msg) => Line::from(Span::styled(
                format!(" {msg}"),
                Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                " [Enter] start  [Esc] cancel",
                Style::default().fg(colors.text_pending()),
            )),
        };

        Paragraph::new(vec![Line::from(""), field, Line::from(""), status])
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(error: Option<&str>) -> String {
        let theme = Theme::default();
        let input = LineInput::new("3", 4);
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        CountdownPrompt::new(&input, error, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_shows_value_and_hint() {
        let text = rendered(None);
        assert!(text.contains("Minutes: 3"));
        assert!(text.contains("[Enter] start"));
    }

    #[test]
    fn test_shows_error_instead_of_hint() {
        let text = rendered(Some("not a number: x"));
        assert!(text.contains("not a number: x"));
        assert!(!text.contains("[Enter] start"));
    }
}
