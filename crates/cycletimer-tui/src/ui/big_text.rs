use ratatui::prelude::*;
use ratatui::widgets::Widget;

const GLYPH_HEIGHT: u16 = 5;
const CHAR_SPACING: u16 = 1;

/// Block-digit rendering of a countdown such as `24:59`.
pub struct BigText<'a> {
    text: &'a str,
    style: Style,
}

impl<'a> BigText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Width in cells needed to draw `text`.
    pub fn width(text: &str) -> u16 {
        let glyphs: u16 = text.chars().map(|ch| glyph(ch).len() as u16).sum();
        let gaps = (text.chars().count() as u16).saturating_sub(1) * CHAR_SPACING;
        glyphs + gaps
    }

    pub fn height() -> u16 {
        GLYPH_HEIGHT
    }
}

impl Widget for BigText<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut x_offset = 0;

        for ch in self.text.chars() {
            let columns = glyph(ch);
            let width = columns.len() as u16;

            if x_offset + width > area.width {
                break;
            }

            for (x, column) in columns.iter().enumerate() {
                for y in 0..GLYPH_HEIGHT.min(area.height) {
                    if column & (1 << y) == 0 {
                        continue;
                    }

                    let gx = area.left() + x_offset + x as u16;
                    let gy = area.top() + y;
                    if let Some(cell) = buf.cell_mut((gx, gy)) {
                        cell.set_style(self.style).set_symbol("█");
                    }
                }
            }

            x_offset += width + CHAR_SPACING;
        }
    }
}

/// Column bitmasks, bit 0 is the top row.
fn glyph(ch: char) -> &'static [u8] {
    match ch {
        '0' => &[0b11111, 0b10001, 0b11111],
        '1' => &[0b10010, 0b11111, 0b10000],
        '2' => &[0b11101, 0b10101, 0b10111],
        '3' => &[0b10101, 0b10101, 0b11111],
        '4' => &[0b00111, 0b00100, 0b11111],
        '5' => &[0b10111, 0b10101, 0b11101],
        '6' => &[0b11111, 0b10101, 0b11101],
        '7' => &[0b00001, 0b00001, 0b11111],
        '8' => &[0b11111, 0b10101, 0b11111],
        '9' => &[0b10111, 0b10101, 0b11111],
        ':' => &[0b01010],
        _ => &[0, 0, 0],
    }
}
