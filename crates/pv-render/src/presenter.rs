#![forbid(unsafe_code)]

//! Presenter: writes buffers to a terminal.
//!
//! Tracks the previously presented buffer and emits only the cells that
//! changed, grouped into runs so each run costs one cursor move. Style
//! changes are emitted only when the style differs from the last one
//! written. A size change (or [`Presenter::invalidate`]) forces a full
//! repaint.

use std::io::{self, BufWriter, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::queue;

use crate::buffer::Buffer;
use crate::cell::{Rgb, Style, StyleFlags};

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// Contiguous changed cells on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    pub y: u16,
    pub x0: u16,
    pub x1: u16,
}

/// Runs of cells that differ between `old` and `new` (same size assumed).
pub fn diff_runs(old: &Buffer, new: &Buffer) -> Vec<ChangeRun> {
    let mut runs = Vec::new();
    for y in 0..new.height() {
        let (a, b) = (old.row(y), new.row(y));
        let mut x = 0usize;
        while x < b.len() {
            if a.get(x) == b.get(x) {
                x += 1;
                continue;
            }
            let start = x;
            while x < b.len() && a.get(x) != b.get(x) {
                x += 1;
            }
            runs.push(ChangeRun {
                y,
                x0: u16::try_from(start).unwrap_or(u16::MAX),
                x1: u16::try_from(x - 1).unwrap_or(u16::MAX),
            });
        }
    }
    runs
}

/// Diffing terminal writer.
pub struct Presenter<W: Write> {
    out: BufWriter<W>,
    previous: Option<Buffer>,
    current_style: Option<Style>,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            current_style: None,
        }
    }

    /// Force the next present to repaint everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Write `buffer`, emitting only what changed since the last call.
    pub fn present(&mut self, buffer: &Buffer) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        let runs = match &self.previous {
            Some(prev) if prev.width() == buffer.width() && prev.height() == buffer.height() => {
                diff_runs(prev, buffer)
            }
            _ => {
                queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
                self.current_style = None;
                (0..buffer.height())
                    .map(|y| ChangeRun {
                        y,
                        x0: 0,
                        x1: buffer.width() - 1,
                    })
                    .collect()
            }
        };
        pv_core::trace!(runs = runs.len(), "present");

        for run in runs {
            let row = buffer.row(run.y);
            let mut cursor_valid = false;
            for x in run.x0..=run.x1 {
                let Some(cell) = row.get(usize::from(x)) else {
                    break;
                };
                if cell.is_continuation() {
                    cursor_valid = false;
                    continue;
                }
                if !cursor_valid {
                    queue!(self.out, MoveTo(x, run.y))?;
                    cursor_valid = true;
                }
                self.apply_style(cell.style)?;
                queue!(self.out, Print(cell.ch))?;
                if cell.width() > 1 {
                    cursor_valid = false;
                }
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset), EndSynchronizedUpdate)?;
        self.current_style = None;
        self.out.flush()?;
        self.previous = Some(buffer.clone());
        Ok(())
    }

    fn apply_style(&mut self, style: Style) -> io::Result<()> {
        if self.current_style == Some(style) {
            return Ok(());
        }
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(color(style.fg)),
            SetBackgroundColor(color(style.bg))
        )?;
        for (flag, attr) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ] {
            if style.attrs.contains(flag) {
                queue!(self.out, SetAttribute(attr))?;
            }
        }
        self.current_style = Some(style);
        Ok(())
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

fn color(c: Option<Rgb>) -> Color {
    match c {
        Some(Rgb(r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn diff_groups_adjacent_changes() {
        let old = Buffer::new(6, 2);
        let mut new = old.clone();
        new.set(1, 0, Cell::from_char('a'));
        new.set(2, 0, Cell::from_char('b'));
        new.set(5, 0, Cell::from_char('c'));
        new.set(0, 1, Cell::from_char('d'));
        assert_eq!(
            diff_runs(&old, &new),
            vec![
                ChangeRun { y: 0, x0: 1, x1: 2 },
                ChangeRun { y: 0, x0: 5, x1: 5 },
                ChangeRun { y: 1, x0: 0, x1: 0 },
            ]
        );
        assert!(diff_runs(&new, &new).is_empty());
    }

    #[test]
    fn second_present_writes_only_changes() {
        let mut buf = Buffer::new(4, 1);
        buf.set(0, 0, Cell::from_char('x'));
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&buf).expect("first");
        buf.set(3, 0, Cell::from_char('y'));
        presenter.present(&buf).expect("second");
        let bytes = presenter.into_inner().expect("inner");
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches('x').count(), 1);
        assert_eq!(text.matches('y').count(), 1);
    }
}
