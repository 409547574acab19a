#![forbid(unsafe_code)]

//! Bounded output history.
//!
//! Each entry is one screen row. The first row of a line typed by the user is
//! tagged as a command and renders behind the prompt. Typed lines are also
//! kept whole, newest last, for input-line history.

use std::collections::VecDeque;

/// One row of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub is_command: bool,
}

/// FIFO ring of output rows.
#[derive(Debug, Clone)]
pub struct Backbuffer {
    entries: VecDeque<Entry>,
    commands: VecDeque<String>,
    capacity: usize,
}

impl Backbuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            commands: VecDeque::new(),
            capacity,
        }
    }

    /// Append a row, evicting the oldest when full.
    pub fn push(&mut self, text: impl Into<String>, is_command: bool) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Entry {
            text: text.into(),
            is_command,
        });
    }

    /// Remember a typed line for history, evicting the oldest when full.
    pub fn record_command(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.commands.len() >= self.capacity {
            self.commands.pop_front();
        }
        self.commands.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rows, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Typed lines, newest first.
    pub fn history(&self) -> Vec<String> {
        self.commands.iter().rev().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut buf = Backbuffer::new(3);
        for i in 0..5 {
            buf.push(format!("line {i}"), false);
        }
        assert_eq!(buf.len(), 3);
        let texts: Vec<_> = buf.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn default_cap_is_respected() {
        let mut buf = Backbuffer::new(200);
        for i in 0..450 {
            buf.push(i.to_string(), i % 2 == 0);
            assert!(buf.len() <= 200);
        }
        assert_eq!(buf.iter().next().map(|e| e.text.as_str()), Some("250"));
    }

    #[test]
    fn history_is_commands_newest_first() {
        let mut buf = Backbuffer::new(10);
        buf.record_command("first");
        buf.push("output", false);
        buf.record_command("second");
        assert_eq!(buf.history(), vec!["second", "first"]);
    }

    #[test]
    fn history_is_bounded_like_rows() {
        let mut buf = Backbuffer::new(2);
        for line in ["a", "b", "c"] {
            buf.record_command(line);
        }
        assert_eq!(buf.history(), vec!["c", "b"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut buf = Backbuffer::new(0);
        buf.push("x", false);
        assert!(buf.is_empty());
    }
}
