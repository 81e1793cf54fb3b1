#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//! Coordinates are signed so callers can draw shapes that start off-screen;
//! anything outside the bounds or the current scissor is dropped.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Width and height never change after creation
//! 3. The scissor stack always holds at least the full-buffer rect, and each
//!    push intersects with the current top

use pv_core::geometry::{Point, Rect};

use crate::cell::{Cell, Style};

/// A 2D grid of terminal cells.
///
/// # Example
///
/// ```
/// use pv_render::buffer::Buffer;
/// use pv_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// assert_eq!(buffer.row_text(0).trim_end(), "Hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissor_stack: Vec<Rect>,
}

impl Buffer {
    /// Create a blank buffer. Zero dimensions are raised to one.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            scissor_stack: vec![Rect::new(0, 0, i32::from(width), i32::from(height))],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, i32::from(self.width), i32::from(self.height))
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Set the cell at (x, y).
    ///
    /// Skips cells outside the bounds or the current scissor. A wide
    /// character is written only if all of its columns fit, and its trailing
    /// columns become continuation cells.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        let width = i32::try_from(cell.width().max(1)).unwrap_or(1);
        let scissor = self.current_scissor();
        for dx in 0..width {
            let p = Point::new(x.saturating_add(dx), y);
            if !scissor.contains(p) || self.index(p.x, p.y).is_none() {
                return;
            }
        }
        self.clear_wide_remnant(x, y);
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
        for dx in 1..width {
            if let Some(i) = self.index(x + dx, y) {
                self.cells[i] = Cell::CONTINUATION.with_style(cell.style);
            }
        }
    }

    /// Overwriting half of a wide character blanks the other half.
    fn clear_wide_remnant(&mut self, x: i32, y: i32) {
        let Some(current) = self.get(x, y).copied() else {
            return;
        };
        if current.is_continuation() {
            let mut head = x - 1;
            while let Some(c) = self.get(head, y).copied() {
                if let Some(i) = self.index(head, y) {
                    self.cells[i] = Cell::BLANK;
                }
                if !c.is_continuation() {
                    break;
                }
                head -= 1;
            }
        }
        let mut tail = x + 1;
        while let Some(c) = self.get(tail, y).copied() {
            if !c.is_continuation() {
                break;
            }
            if let Some(i) = self.index(tail, y) {
                self.cells[i] = Cell::BLANK;
            }
            tail += 1;
        }
    }

    /// Fill `rect` (clipped) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Replace only the style of every cell in `rect` (clipped).
    pub fn restyle(&mut self, rect: Rect, style: Style) {
        let scissor = self.current_scissor();
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if scissor.contains(Point::new(x, y))
                    && let Some(cell) = self.get_mut(x, y)
                {
                    cell.style = style;
                }
            }
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells of row `y`. Empty when out of range.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = usize::from(y) * usize::from(self.width);
        &self.cells[start..start + usize::from(self.width)]
    }

    /// Row `y` as plain text, skipping continuation cells.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }

    /// Push a clipping region; the effective region is the intersection with
    /// the current one.
    pub fn push_scissor(&mut self, rect: Rect) {
        let current = self.current_scissor();
        let x = current.x.max(rect.x);
        let y = current.y.max(rect.y);
        let right = current.right().min(rect.right());
        let bottom = current.bottom().min(rect.bottom());
        self.scissor_stack
            .push(Rect::new(x, y, (right - x).max(0), (bottom - y).max(0)));
    }

    /// Pop a clipping region. The base region is never popped.
    pub fn pop_scissor(&mut self) {
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        }
    }

    #[inline]
    pub fn current_scissor(&self) -> Rect {
        self.scissor_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.bounds())
    }

    #[inline]
    pub fn scissor_depth(&self) -> usize {
        self.scissor_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_raised() {
        let b = Buffer::new(0, 0);
        assert_eq!((b.width(), b.height()), (1, 1));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut b = Buffer::new(3, 2);
        b.set(-1, 0, Cell::from_char('x'));
        b.set(3, 0, Cell::from_char('x'));
        b.set(0, 2, Cell::from_char('x'));
        assert!(b.cells().iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn scissor_clips_and_nests() {
        let mut b = Buffer::new(5, 1);
        b.push_scissor(Rect::new(1, 0, 3, 1));
        b.push_scissor(Rect::new(2, 0, 10, 1));
        assert_eq!(b.current_scissor(), Rect::new(2, 0, 2, 1));
        b.fill(b.bounds(), Cell::from_char('#'));
        assert_eq!(b.row_text(0), "  ## ");
        b.pop_scissor();
        b.pop_scissor();
        b.pop_scissor();
        assert_eq!(b.scissor_depth(), 1);
    }

    #[test]
    fn wide_chars_write_atomically() {
        let mut b = Buffer::new(3, 1);
        b.set(2, 0, Cell::from_char('試'));
        assert_eq!(b.row_text(0), "   ");
        b.set(1, 0, Cell::from_char('試'));
        assert!(b.get(2, 0).expect("cell").is_continuation());
        b.set(2, 0, Cell::from_char('a'));
        assert_eq!(b.row_text(0), "  a");
    }

    #[test]
    fn restyle_keeps_content() {
        let mut b = Buffer::new(2, 1);
        b.set(0, 0, Cell::from_char('a'));
        let style = Style::new().attrs(crate::cell::StyleFlags::REVERSE);
        b.restyle(b.bounds(), style);
        assert_eq!(b.get(0, 0).expect("cell").ch, 'a');
        assert_eq!(b.get(1, 0).expect("cell").style, style);
    }
}
