use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};

use crate::session::timer::SpeedSample;
use crate::ui::theme::Theme;

pub struct WpmChart<'a> {
    pub samples: &'a [SpeedSample],
    pub theme: &'a Theme,
}

impl<'a> WpmChart<'a> {
    pub fn new(samples: &'a [SpeedSample], theme: &'a Theme) -> Self {
        Self { samples, theme }
    }
}

fn points(samples: &[SpeedSample]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .map(|s| (s.second as f64, f64::from(s.wpm)))
        .collect()
}

/// Axis maxima over every point, with floors so a short run still gets a readable frame.
fn bounds(data: &[(f64, f64)]) -> (f64, f64) {
    let max_x = data.iter().map(|(x, _)| *x).fold(1.0f64, f64::max);
    let max_y = data.iter().map(|(_, y)| *y).fold(10.0f64, f64::max);
    (max_x, max_y)
}

impl Widget for WpmChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" WPM Over Time ")
            .border_style(Style::default().fg(colors.border()));

        if self.samples.is_empty() {
            block.render(area, buf);
            return;
        }

        let data = points(self.samples);
        let (max_x, max_y) = bounds(&data);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors.accent()))
            .data(&data);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("s")
                    .style(Style::default().fg(colors.text_pending()))
                    .bounds([0.0, max_x]),
            )
            .y_axis(
                Axis::default()
                    .title("WPM")
                    .style(Style::default().fg(colors.text_pending()))
                    .bounds([0.0, max_y * 1.1]),
            );

        chart.render(area, buf);
    }
}
