use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::passage::AnnotatedChar;
use crate::session::evaluator::{CellView, ColorClass};
use crate::ui::theme::Theme;

/// Maps a pointer location to a passage position (`0..=L`, where `L` is the
/// caret slot after the last character).
pub trait ClickResolver {
    fn resolve_click_to_position(&self, column: u16, row: u16) -> Option<usize>;
}

/// On-screen glyph for a passage or typed character.
pub fn glyph(ch: char) -> char {
    match ch {
        '\n' => '\u{21b5}', // ↵
        '\t' => '\u{2192}', // →
        c if c.is_control() => '\u{00b7}',
        c => c,
    }
}

/// Character-wrapped placement of every slot of a passage inside a text area.
/// Rendering and click resolution both go through this, so they always agree.
pub struct SurfaceMap {
    area: Rect,
    /// (row, col) per slot; the final entry is the caret slot.
    slots: Vec<(usize, u16)>,
    /// Index of the first slot on each row.
    row_starts: Vec<usize>,
    scroll: usize,
}

impl SurfaceMap {
    pub fn new(chars: &[AnnotatedChar], area: Rect, cursor: usize) -> Self {
        let width = area.width.max(1);
        let mut slots = Vec::with_capacity(chars.len() + 1);
        let mut row_starts = vec![0];
        let mut row = 0usize;
        let mut col = 0u16;

        for (i, ac) in chars.iter().enumerate() {
            if col >= width {
                row += 1;
                col = 0;
                row_starts.push(i);
            }
            slots.push((row, col));
            col += 1;
            if ac.ch == '\n' {
                row += 1;
                col = 0;
                row_starts.push(i + 1);
            }
        }
        if col >= width {
            row_starts.push(chars.len());
            row += 1;
            col = 0;
        }
        slots.push((row, col));

        let cursor_row = slots.get(cursor.min(chars.len())).map_or(0, |s| s.0);
        let visible = usize::from(area.height.max(1));
        let scroll = cursor_row.saturating_sub(visible - 1);

        Self {
            area,
            slots,
            row_starts,
            scroll,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_starts.len()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Screen coordinates of a slot, if it is scrolled into view.
    pub fn screen_position(&self, pos: usize) -> Option<(u16, u16)> {
        let &(row, col) = self.slots.get(pos)?;
        let visible_row = row.checked_sub(self.scroll)?;
        if visible_row >= usize::from(self.area.height) || col >= self.area.width {
            return None;
        }
        Some((self.area.x + col, self.area.y + visible_row as u16))
    }
}

impl ClickResolver for SurfaceMap {
    fn resolve_click_to_position(&self, column: u16, row: u16) -> Option<usize> {
        let inside = column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height;
        if !inside {
            return None;
        }

        let text_row = usize::from(row - self.area.y) + self.scroll;
        let start = *self.row_starts.get(text_row)?;
        let end = self
            .row_starts
            .get(text_row + 1)
            .map_or(self.slots.len() - 1, |next| next - 1);
        let col = usize::from(column - self.area.x);
        Some((start + col).min(end))
    }
}

pub struct TypingArea<'a> {
    title: &'a str,
    chars: &'a [AnnotatedChar],
    cells: &'a [CellView],
    cursor: usize,
    caret_at_end: bool,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(
        title: &'a str,
        chars: &'a [AnnotatedChar],
        cells: &'a [CellView],
        cursor: usize,
        caret_at_end: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            chars,
            cells,
            cursor,
            caret_at_end,
            theme,
        }
    }

    fn block(&self) -> Block<'a> {
        let colors = &self.theme.colors;
        Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()))
    }

    /// Area the text itself occupies when the widget is drawn into `area`.
    pub fn text_area(area: Rect) -> Rect {
        Block::bordered().inner(area)
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let map = SurfaceMap::new(self.chars, inner, self.cursor);

        for (pos, cell) in self.cells.iter().enumerate() {
            let Some((x, y)) = map.screen_position(pos) else {
                continue;
            };
            let mut style = Style::default().fg(colors.for_class(cell.color));
            if cell.color == ColorClass::Incorrect {
                style = style
                    .bg(colors.text_incorrect_bg())
                    .add_modifier(Modifier::UNDERLINED);
            }
            if cell.is_cursor {
                style = style.bg(colors.text_cursor_bg());
            }
            buf.set_string(x, y, glyph(cell.display).to_string(), style);
        }

        if self.caret_at_end {
            if let Some((x, y)) = map.screen_position(self.cells.len()) {
                let style = Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_cursor_bg());
                buf.set_string(x, y, " ", style);
            }
        }
    }
}
