#![forbid(unsafe_code)]

//! In-memory surface for testing shell applications.
//!
//! `VirtualSurface` keeps a character grid, a queue of scripted key events,
//! and counters for every lifecycle call, so tests can drive a shell without
//! a real terminal and inspect exactly what it painted.
//!
//! # Invariants
//!
//! 1. **Grid always fully populated**: `grid.len() == rows * cols`. Every cell
//!    starts as a space.
//!
//! 2. **Writes never wrap**: text past the last column is clipped, writes to
//!    rows outside the grid are dropped.
//!
//! 3. **Key reads never block**: once the scripted queue is empty,
//!    `read_key` fails with [`std::io::ErrorKind::UnexpectedEof`] so a test
//!    that under-feeds input ends instead of hanging.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Key queue exhausted | Test fed too few keys | `read_key` returns `UnexpectedEof` |
//! | Out-of-range write | Row beyond the grid | Silently ignored |

use std::collections::VecDeque;
use std::io;

use candela_core::event::{KeyCode, KeyEvent};
use candela_core::surface::{Position, Surface, clip_to_columns};

/// In-memory [`Surface`] with a scripted key queue.
#[derive(Debug, Clone)]
pub struct VirtualSurface {
    rows: u16,
    cols: u16,
    grid: Vec<char>,
    keys: VecDeque<KeyEvent>,
    cursor: Position,
    key_reads: usize,
    clears: usize,
    refreshes: usize,
    teardowns: usize,
}

impl VirtualSurface {
    /// Create a blank surface of `rows` x `cols` cells.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is 0.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        assert!(rows > 0 && cols > 0, "surface dimensions must be > 0");
        Self {
            rows,
            cols,
            grid: vec![' '; usize::from(rows) * usize::from(cols)],
            keys: VecDeque::new(),
            cursor: Position::default(),
            key_reads: 0,
            clears: 0,
            refreshes: 0,
            teardowns: 0,
        }
    }

    /// Queue key events (builder).
    #[must_use]
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Queue one key event.
    pub fn push_key(&mut self, key: impl Into<KeyEvent>) {
        self.keys.push_back(key.into());
    }

    /// Queue the keystrokes for `text` followed by Enter.
    pub fn push_line(&mut self, text: &str) {
        self.keys.extend(line(text));
    }

    /// Resize the surface, blanking its contents.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        assert!(rows > 0 && cols > 0, "surface dimensions must be > 0");
        self.rows = rows;
        self.cols = cols;
        self.grid = vec![' '; usize::from(rows) * usize::from(cols)];
        self.cursor = Position::default();
    }

    // ── Inspection ──────────────────────────────────────────────────

    /// Get the character at `(row, col)`. Returns `None` if out of bounds.
    #[must_use]
    pub fn char_at(&self, row: u16, col: u16) -> Option<char> {
        (row < self.rows && col < self.cols).then(|| self.grid[self.idx(row, col)])
    }

    /// Get the text content of a row (trailing spaces trimmed).
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = self.idx(row, 0);
        let end = start + usize::from(self.cols);
        let s: String = self.grid[start..end].iter().collect();
        s.trim_end().to_string()
    }

    /// Get all visible text (rows separated by newlines).
    #[must_use]
    pub fn screen_text(&self) -> String {
        (0..self.rows)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Find the first row whose text contains `needle`.
    #[must_use]
    pub fn find_row(&self, needle: &str) -> Option<u16> {
        (0..self.rows).find(|&row| self.row_text(row).contains(needle))
    }

    /// Number of `read_key` calls served so far (successful or not).
    #[must_use]
    pub const fn key_reads(&self) -> usize {
        self.key_reads
    }

    /// Keys still waiting in the queue.
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    /// Number of `clear` calls.
    #[must_use]
    pub const fn clears(&self) -> usize {
        self.clears
    }

    /// Number of `refresh` calls.
    #[must_use]
    pub const fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Whether `teardown` has been called at least once.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.teardowns > 0
    }

    fn idx(&self, row: u16, col: u16) -> usize {
        usize::from(row) * usize::from(self.cols) + usize::from(col)
    }
}

impl Surface for VirtualSurface {
    fn dimensions(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        if row >= self.rows || col >= self.cols {
            return Ok(());
        }
        let clipped = clip_to_columns(text, col, self.cols);
        let mut c = col;
        for ch in clipped.chars() {
            if c >= self.cols {
                break;
            }
            let idx = self.idx(row, c);
            self.grid[idx] = ch;
            c += 1;
        }
        self.cursor = Position::new(row, c);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        self.grid.fill(' ');
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.key_reads += 1;
        self.keys.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "virtual surface key queue exhausted",
            )
        })
    }

    fn cursor_position(&self) -> Position {
        self.cursor
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        self.cursor = Position::new(
            row.min(self.rows.saturating_sub(1)),
            col.min(self.cols.saturating_sub(1)),
        );
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        self.teardowns += 1;
        Ok(())
    }
}

/// Key events for typing `text` (one `Char` event per character).
#[must_use]
pub fn keys(text: &str) -> Vec<KeyEvent> {
    text.chars().map(|c| KeyEvent::new(KeyCode::Char(c))).collect()
}

/// Key events for typing `text` and pressing Enter.
#[must_use]
pub fn line(text: &str) -> Vec<KeyEvent> {
    let mut events = keys(text);
    events.push(KeyEvent::new(KeyCode::Enter));
    events
}
