#![forbid(unsafe_code)]

//! The terminal surface capability.
//!
//! The shell engine never talks to a terminal directly. It draws through a
//! [`Surface`]: a grid of character cells addressed by `(row, col)`, a blocking
//! key source, and a lifecycle hook for teardown. [`TerminalSession`] is the
//! crossterm-backed implementation; tests use an in-memory one.
//!
//! # Contract
//!
//! - Coordinates are 0-indexed; row 0 is the top line.
//! - `write_at` never wraps. Text running past the last column is clipped.
//! - Writes may be buffered until [`Surface::refresh`].
//! - A surface is single-threaded: it is only ever touched from the thread
//!   driving the shell loop.
//!
//! [`TerminalSession`]: crate::terminal_session::TerminalSession

use std::io;

use crate::event::KeyEvent;

/// A cell coordinate on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Row, 0 = top.
    pub row: u16,
    /// Column, 0 = left.
    pub col: u16,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl From<(u16, u16)> for Position {
    fn from((row, col): (u16, u16)) -> Self {
        Self { row, col }
    }
}

/// Character-cell terminal capability consumed by the shell engine.
pub trait Surface {
    /// Current size as `(rows, cols)`.
    fn dimensions(&self) -> (u16, u16);

    /// Write `text` starting at `(row, col)`, clipped at the right edge.
    ///
    /// Writes to rows outside the surface are ignored.
    fn write_at(&mut self, row: u16, col: u16, text: &str) -> io::Result<()>;

    /// Blank the whole surface.
    fn clear(&mut self) -> io::Result<()>;

    /// Flush pending writes to the display.
    fn refresh(&mut self) -> io::Result<()>;

    /// Block until the next key event arrives.
    fn read_key(&mut self) -> io::Result<KeyEvent>;

    /// Where the cursor currently sits.
    fn cursor_position(&self) -> Position;

    /// Park the cursor at `(row, col)`.
    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()>;

    /// Restore the terminal to its pre-session state.
    ///
    /// Must be idempotent: the shell may tear down both on quit and again
    /// when dropped.
    fn teardown(&mut self) -> io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn dimensions(&self) -> (u16, u16) {
        (**self).dimensions()
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        (**self).write_at(row, col, text)
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }

    fn refresh(&mut self) -> io::Result<()> {
        (**self).refresh()
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        (**self).read_key()
    }

    fn cursor_position(&self) -> Position {
        (**self).cursor_position()
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        (**self).move_cursor(row, col)
    }

    fn teardown(&mut self) -> io::Result<()> {
        (**self).teardown()
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn dimensions(&self) -> (u16, u16) {
        (**self).dimensions()
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        (**self).write_at(row, col, text)
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }

    fn refresh(&mut self) -> io::Result<()> {
        (**self).refresh()
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        (**self).read_key()
    }

    fn cursor_position(&self) -> Position {
        (**self).cursor_position()
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        (**self).move_cursor(row, col)
    }

    fn teardown(&mut self) -> io::Result<()> {
        (**self).teardown()
    }
}

/// Clip `text` so that it fits in the columns left of `cols` when written at
/// `col`. Returns the longest prefix whose display width fits.
#[must_use]
pub fn clip_to_columns(text: &str, col: u16, cols: u16) -> &str {
    use unicode_width::UnicodeWidthChar;

    let room = usize::from(cols.saturating_sub(col));
    let mut used = 0usize;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > room {
            return &text[..idx];
        }
        used += w;
    }
    text
}
