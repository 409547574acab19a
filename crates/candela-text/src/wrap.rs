#![forbid(unsafe_code)]

//! Soft wrapping for shell output.
//!
//! Output written to the shell is split into one backbuffer entry per screen
//! row. Lines that already fit are kept verbatim (leading indentation
//! included); longer lines are wrapped at word boundaries, and words that are
//! wider than the row on their own are broken at grapheme boundaries.
//!
//! # Example
//! ```
//! use candela_text::wrap::soft_wrap;
//!
//! let rows = soft_wrap("hello world foo bar", 11);
//! assert_eq!(rows, vec!["hello world", "foo bar"]);
//!
//! let rows = soft_wrap("  indented\nsecond", 40);
//! assert_eq!(rows, vec!["  indented", "second"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Split `text` on newlines and wrap every line wider than `width`.
///
/// Each returned string is one screen row. Blank lines are preserved as empty
/// rows; a line made only of whitespace that is too wide collapses to nothing.
/// A `width` of zero disables wrapping.
#[must_use]
pub fn soft_wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if width == 0 || line.width() <= width {
            rows.push(line.to_string());
        } else {
            rows.extend(wrap_words(line, width));
        }
    }
    rows
}

/// Wrap a single line (no embedded newlines) at word boundaries.
///
/// Whitespace at a break is dropped. Leading whitespace of the first row is
/// kept when a word follows it on that row. Words wider than `width` are
/// broken into `width`-sized pieces.
#[must_use]
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    let mut pending_space = String::new();

    for chunk in split_runs(text) {
        if chunk.chars().all(char::is_whitespace) {
            pending_space.push_str(chunk);
            continue;
        }

        let chunk_width = chunk.width();
        let space_width = pending_space.width();

        if current_width + space_width + chunk_width <= width {
            current.push_str(&pending_space);
            current.push_str(chunk);
            current_width += space_width + chunk_width;
            pending_space.clear();
            continue;
        }

        pending_space.clear();
        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if chunk_width <= width {
            current.push_str(chunk);
            current_width = chunk_width;
        } else {
            break_long_word(chunk, width, &mut rows, &mut current, &mut current_width);
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Break a word wider than `width` into grapheme-aligned pieces.
///
/// Every full piece is emitted; the remainder stays in `current` so the next
/// word may join it.
fn break_long_word(
    word: &str,
    width: usize,
    rows: &mut Vec<String>,
    current: &mut String,
    current_width: &mut usize,
) {
    for grapheme in word.graphemes(true) {
        let w = grapheme.width();
        if *current_width + w > width && !current.is_empty() {
            rows.push(std::mem::take(current));
            *current_width = 0;
        }
        current.push_str(grapheme);
        *current_width += w;
    }
}

/// Split text into alternating whitespace / non-whitespace runs.
fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    let mut in_ws: Option<bool> = None;

    for (idx, grapheme) in text.grapheme_indices(true) {
        let is_ws = grapheme.chars().all(char::is_whitespace);
        match in_ws {
            Some(prev) if prev != is_ws => {
                runs.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_ws = Some(is_ws);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

/// Truncate text to fit within `max_width` cells.
///
/// Respects grapheme boundaries.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for grapheme in text.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }

    result
}

/// Calculate the display width of text in cells.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}
