#![forbid(unsafe_code)]

//! Drawing primitives for the buffer.
//!
//! Helpers on top of [`Buffer::set`] for borders, lines, and text. All
//! operations respect the buffer's scissor stack.

use pv_core::geometry::Rect;

use crate::buffer::Buffer;
use crate::cell::{Cell, Style};

/// Characters used to draw a border around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    /// Simple box-drawing characters (U+250x).
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// Rounded corners.
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Heavy lines.
    pub const HEAVY: Self = Self {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
    };

    /// ASCII fallback.
    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
    };
}

/// Sides a light line glyph connects to.
pub mod sides {
    pub const UP: u8 = 0b0001;
    pub const DOWN: u8 = 0b0010;
    pub const LEFT: u8 = 0b0100;
    pub const RIGHT: u8 = 0b1000;
}

const LIGHT_GLYPHS: [(u8, char); 11] = [
    (sides::UP | sides::DOWN, '│'),
    (sides::LEFT | sides::RIGHT, '─'),
    (sides::DOWN | sides::RIGHT, '┌'),
    (sides::DOWN | sides::LEFT, '┐'),
    (sides::UP | sides::RIGHT, '└'),
    (sides::UP | sides::LEFT, '┘'),
    (sides::UP | sides::DOWN | sides::RIGHT, '├'),
    (sides::UP | sides::DOWN | sides::LEFT, '┤'),
    (sides::DOWN | sides::LEFT | sides::RIGHT, '┬'),
    (sides::UP | sides::LEFT | sides::RIGHT, '┴'),
    (sides::UP | sides::DOWN | sides::LEFT | sides::RIGHT, '┼'),
];

/// Light box-drawing glyph joining `mask` sides. Single sides draw as the
/// straight line through them.
pub fn line_glyph(mask: u8) -> char {
    let mask = match mask {
        sides::UP | sides::DOWN => sides::UP | sides::DOWN,
        sides::LEFT | sides::RIGHT => sides::LEFT | sides::RIGHT,
        m => m,
    };
    LIGHT_GLYPHS
        .iter()
        .find(|(m, _)| *m == mask)
        .map_or(' ', |(_, c)| *c)
}

/// Sides joined by a light line glyph, or 0 for anything else.
pub fn glyph_sides(ch: char) -> u8 {
    LIGHT_GLYPHS
        .iter()
        .find(|(_, c)| *c == ch)
        .map_or(0, |(m, _)| *m)
}

pub trait Draw {
    /// Draw a horizontal run of `cell`.
    fn draw_horizontal_line(&mut self, x: i32, y: i32, width: i32, cell: Cell);

    /// Draw a vertical run of `cell`.
    fn draw_vertical_line(&mut self, x: i32, y: i32, height: i32, cell: Cell);

    /// Print text stopping before `max_x` (exclusive). Returns the x after
    /// the last printed column.
    fn print_text_clipped(&mut self, x: i32, y: i32, text: &str, style: Style, max_x: i32) -> i32;

    /// Draw a border on the edge cells of `rect`.
    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Style);

    /// Fill the interior of `rect` then draw its border.
    fn draw_box(&mut self, rect: Rect, chars: BorderChars, border: Style, fill: Style);

    /// Merge light line glyph `sides` into the cell at (x, y).
    fn join_line(&mut self, x: i32, y: i32, sides: u8, style: Style);
}

impl Draw for Buffer {
    fn draw_horizontal_line(&mut self, x: i32, y: i32, width: i32, cell: Cell) {
        for i in 0..width {
            self.set(x.saturating_add(i), y, cell);
        }
    }

    fn draw_vertical_line(&mut self, x: i32, y: i32, height: i32, cell: Cell) {
        for i in 0..height {
            self.set(x, y.saturating_add(i), cell);
        }
    }

    fn print_text_clipped(&mut self, x: i32, y: i32, text: &str, style: Style, max_x: i32) -> i32 {
        use unicode_width::UnicodeWidthChar;

        let mut cx = x;
        for c in text.chars() {
            let width = i32::try_from(UnicodeWidthChar::width(c).unwrap_or(0)).unwrap_or(0);
            if width == 0 {
                continue;
            }
            if cx + width > max_x {
                break;
            }
            self.set(cx, y, Cell::from_char(c).with_style(style));
            cx += width;
        }
        cx
    }

    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Style) {
        if rect.is_empty() {
            return;
        }
        let cell = |c: char| Cell::from_char(c).with_style(style);
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);

        self.draw_horizontal_line(left, top, rect.width, cell(chars.horizontal));
        if rect.height > 1 {
            self.draw_horizontal_line(left, bottom, rect.width, cell(chars.horizontal));
        }
        if rect.height > 2 {
            self.draw_vertical_line(left, top + 1, rect.height - 2, cell(chars.vertical));
            if rect.width > 1 {
                self.draw_vertical_line(right, top + 1, rect.height - 2, cell(chars.vertical));
            }
        }

        // Corners last so they win over the edges.
        self.set(left, top, cell(chars.top_left));
        if rect.width > 1 {
            self.set(right, top, cell(chars.top_right));
        }
        if rect.height > 1 {
            self.set(left, bottom, cell(chars.bottom_left));
        }
        if rect.width > 1 && rect.height > 1 {
            self.set(right, bottom, cell(chars.bottom_right));
        }
    }

    fn draw_box(&mut self, rect: Rect, chars: BorderChars, border: Style, fill: Style) {
        if rect.is_empty() {
            return;
        }
        if rect.width > 2 && rect.height > 2 {
            let inner = Rect::new(rect.x + 1, rect.y + 1, rect.width - 2, rect.height - 2);
            self.fill(inner, Cell::BLANK.with_style(fill));
        }
        self.draw_border(rect, chars, border);
    }

    fn join_line(&mut self, x: i32, y: i32, sides: u8, style: Style) {
        let existing = self.get(x, y).map_or(0, |c| glyph_sides(c.ch));
        self.set(x, y, Cell::from_char(line_glyph(existing | sides)).with_style(style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_border_square() {
        let mut buf = Buffer::new(5, 3);
        buf.draw_border(buf.bounds(), BorderChars::SQUARE, Style::new());
        assert_eq!(buf.row_text(0), "┌───┐");
        assert_eq!(buf.row_text(1), "│   │");
        assert_eq!(buf.row_text(2), "└───┘");
    }

    #[test]
    fn draw_border_1x1_and_empty() {
        let mut buf = Buffer::new(3, 1);
        buf.draw_border(Rect::new(0, 0, 1, 1), BorderChars::ROUNDED, Style::new());
        buf.draw_border(Rect::new(1, 0, 0, 1), BorderChars::ROUNDED, Style::new());
        assert_eq!(buf.row_text(0), "╭  ");
    }

    #[test]
    fn border_partially_offscreen_is_clipped() {
        let mut buf = Buffer::new(4, 2);
        buf.draw_border(Rect::new(-2, -1, 5, 3), BorderChars::ASCII, Style::new());
        assert_eq!(buf.row_text(0), "  | ");
        assert_eq!(buf.row_text(1), "--+ ");
    }

    #[test]
    fn print_text_stops_at_max_x() {
        let mut buf = Buffer::new(10, 1);
        let end = buf.print_text_clipped(1, 0, "hello", Style::new(), 4);
        assert_eq!(end, 4);
        assert_eq!(buf.row_text(0), " hel      ");
    }

    #[test]
    fn print_text_keeps_wide_chars_whole() {
        let mut buf = Buffer::new(10, 1);
        let end = buf.print_text_clipped(0, 0, "a試b", Style::new(), 2);
        assert_eq!(end, 1);
        assert_eq!(buf.row_text(0), "a         ");
    }

    #[test]
    fn draw_box_fills_interior() {
        let mut buf = Buffer::new(4, 4);
        buf.fill(buf.bounds(), Cell::from_char('x'));
        buf.draw_box(buf.bounds(), BorderChars::SQUARE, Style::new(), Style::new());
        assert_eq!(buf.row_text(1), "│  │");
    }

    #[test]
    fn lines_merge_into_junctions() {
        let mut buf = Buffer::new(3, 3);
        buf.join_line(1, 1, sides::UP | sides::DOWN, Style::new());
        buf.join_line(1, 1, sides::RIGHT, Style::new());
        assert_eq!(buf.get(1, 1).map(|c| c.ch), Some('├'));
        buf.join_line(1, 1, sides::LEFT, Style::new());
        assert_eq!(buf.get(1, 1).map(|c| c.ch), Some('┼'));
        assert_eq!(line_glyph(sides::UP), '│');
        assert_eq!(glyph_sides('x'), 0);
    }
}
