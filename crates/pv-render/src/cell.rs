#![forbid(unsafe_code)]

//! Cell types: content, colors, and style flags.

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

bitflags::bitflags! {
    /// Cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// Colors and flags applied to drawn cells. `None` colors keep the
/// terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub attrs: StyleFlags,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs |= attrs;
        self
    }
}

/// One terminal cell.
///
/// A wide character occupies its own cell plus [`Cell::CONTINUATION`]
/// cells for the remaining columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// An empty cell.
    pub const BLANK: Self = Self {
        ch: ' ',
        style: Style::new(),
    };

    /// Placeholder for columns covered by a preceding wide character.
    pub const CONTINUATION: Self = Self {
        ch: '\0',
        style: Style::new(),
    };

    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            style: Style::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }

    /// Display width of the content.
    pub fn width(&self) -> usize {
        if self.is_continuation() {
            0
        } else {
            unicode_width::UnicodeWidthChar::width(self.ch).unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_builder_accumulates_flags() {
        let s = Style::new()
            .fg(Rgb(1, 2, 3))
            .attrs(StyleFlags::BOLD)
            .attrs(StyleFlags::REVERSE);
        assert_eq!(s.fg, Some(Rgb(1, 2, 3)));
        assert!(s.attrs.contains(StyleFlags::BOLD | StyleFlags::REVERSE));
        assert_eq!(s.bg, None);
    }

    #[test]
    fn widths() {
        assert_eq!(Cell::from_char('a').width(), 1);
        assert_eq!(Cell::from_char('試').width(), 2);
        assert_eq!(Cell::CONTINUATION.width(), 0);
        assert!(Cell::default().ch == ' ');
    }
}
