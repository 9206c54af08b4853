use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::passage::{PassageCatalog, PassageId};
use crate::ui::theme::Theme;

/// Cursor over the catalog while the picker is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    pub selected: usize,
}

impl MenuState {
    pub fn new(selected: usize) -> Self {
        Self { selected }
    }

    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = len - 1;
        }
    }

    pub fn selected_id(&self) -> PassageId {
        PassageId(self.selected)
    }
}

pub struct PassageMenu<'a> {
    catalog: &'a PassageCatalog,
    state: MenuState,
    active: PassageId,
    theme: &'a Theme,
}

impl<'a> PassageMenu<'a> {
    pub fn new(catalog: &'a PassageCatalog, state: MenuState, active: PassageId, theme: &'a Theme) -> Self {
        Self {
            catalog,
            state,
            active,
            theme,
        }
    }
}

impl Widget for PassageMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Choose a passage ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        // Keep the selection in view when the catalog is taller than the popup.
        let visible = usize::from(layout[0].height);
        let skip = self.state.selected.saturating_sub(visible.saturating_sub(1));

        let lines: Vec<Line> = self
            .catalog
            .iter()
            .skip(skip)
            .take(visible)
            .map(|(id, passage)| {
                let is_selected = id.0 == self.state.selected;
                let indicator = if is_selected { ">" } else { " " };
                let marker = if id == self.active { " *" } else { "" };
                let style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(format!(" {indicator} {}", passage.title), style),
                    Span::styled(marker, Style::default().fg(colors.text_pending())),
                ])
            })
            .collect();
        Paragraph::new(lines).render(layout[0], buf);

        let footer = Line::from(Span::styled(
            format!(" [\u{2191}\u{2193}] move  [Enter] open  [Esc] back   {}", self.catalog.source()),
            Style::default().fg(colors.text_pending()),
        ));
        Paragraph::new(footer).render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wraps_both_ways() {
        let mut state = MenuState::new(0);
        state.prev(3);
        assert_eq!(state.selected, 2);
        state.next(3);
        assert_eq!(state.selected, 0);
        state.next(0);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_renders_titles() {
        let catalog = PassageCatalog::bundled().unwrap();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        PassageMenu::new(&catalog, MenuState::new(1), PassageId(0), &theme).render(area, &mut buf);
        let row: String = (0..area.width).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        let title = &catalog.get(PassageId(1)).unwrap().title;
        assert!(row.contains(&format!("> {title}")));
    }
}
