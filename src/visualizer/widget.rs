use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Widget},
};

use super::bars::{gradient_at, layout_bars};

const EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Vertical bars for one frame of spectrum magnitudes.
pub struct SpectrumWidget<'a> {
    magnitudes: &'a [u8],
    block: Option<Block<'a>>,
}

impl<'a> SpectrumWidget<'a> {
    pub fn new(magnitudes: &'a [u8]) -> Self {
        Self {
            magnitudes,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let rows = inner.height as usize;
        let bars = layout_bars(self.magnitudes, inner.width as f64, rows as f64);

        for col in 0..inner.width {
            // Narrow bars share a column; the tallest one wins.
            let height = bars
                .iter()
                .filter(|b| b.covers(col as f64))
                .map(|b| b.height)
                .fold(0.0_f64, f64::max);
            let eighths = (height * 8.0).round() as usize;

            for row in 0..rows {
                let filled = eighths.saturating_sub(row * 8).min(8);
                if filled == 0 {
                    break;
                }
                let t = if rows > 1 {
                    row as f64 / (rows - 1) as f64
                } else {
                    0.0
                };
                let (r, g, b) = gradient_at(t);
                let x = inner.x + col;
                let y = inner.y + inner.height - 1 - row as u16;
                buf[(x, y)]
                    .set_char(EIGHTHS[filled - 1])
                    .set_fg(Color::Rgb(r, g, b));
            }
        }
    }
}
