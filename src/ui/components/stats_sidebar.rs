use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::evaluator::Tally;
use crate::session::timer::SpeedSample;
use crate::ui::components::chart::WpmChart;
use crate::ui::theme::Theme;

pub struct StatsSidebar<'a> {
    tally: Tally,
    wpm: u32,
    history: &'a [SpeedSample],
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(tally: Tally, wpm: u32, history: &'a [SpeedSample], theme: &'a Theme) -> Self {
        Self {
            tally,
            wpm,
            history,
            theme,
        }
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(area);

        let tally = self.tally;
        let accuracy = tally.accuracy();
        let row = |label: &'static str, value: String, color| {
            Line::from(vec![
                Span::styled(label, Style::default().fg(colors.fg())),
                Span::styled(value, Style::default().fg(color)),
            ])
        };

        let mut lines = vec![
            row("WPM:       ", format!("{}", self.wpm), colors.accent()),
            row(
                "Accuracy:  ",
                format!("{accuracy:.1}%"),
                if accuracy >= 95.0 {
                    colors.success()
                } else if accuracy >= 85.0 {
                    colors.warning()
                } else {
                    colors.error()
                },
            ),
            Line::from(""),
            row("Filled in: ", format!("{}", tally.hidden_correct), colors.text_hidden_correct()),
            row("Copied:    ", format!("{}", tally.visible_correct), colors.text_visible_correct()),
            row("Wrong:     ", format!("{}", tally.incorrect), colors.text_incorrect()),
            row("Left:      ", format!("{}", tally.untyped), colors.text_pending()),
        ];
        if tally.is_solved() && tally.typed() > 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Solved!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        if sections[1].height >= 5 {
            WpmChart::new(self.history, self.theme).render(sections[1], buf);
        }
    }
}
