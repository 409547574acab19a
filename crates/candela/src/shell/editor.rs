#![forbid(unsafe_code)]

//! Single-line input editor.
//!
//! Keeps the buffer, a grapheme-indexed cursor, a horizontal scroll offset,
//! and the position in command history. Key handling is pure: the editor
//! reports what the shell should do ([`EditAction`]) and never touches the
//! surface itself.

use candela_core::event::{KeyCode, KeyEvent};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// What a key press asks of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Buffer or cursor changed; redraw the input line.
    Changed,
    /// Enter was pressed; the buffer was taken and the editor reset.
    Submit(String),
    /// Tab: run completion.
    Complete,
    /// Up: recall an older command.
    HistoryOlder,
    /// Down: recall a newer command.
    HistoryNewer,
    /// Escape or the quit key.
    Abort,
    /// Nothing to do.
    Ignored,
}

/// Editable input line.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    value: String,
    /// Cursor position (grapheme index).
    cursor: usize,
    /// Scroll offset (visual cells) for horizontal scrolling.
    scroll_cells: usize,
    /// Index into newest-first history of the recalled entry.
    history_index: Option<usize>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.value
    }

    /// Cursor position as a grapheme index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    /// Replace the buffer and put the cursor at its end.
    pub fn set_buffer(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.grapheme_count();
    }

    /// Take the buffer, resetting the editor.
    pub fn take(&mut self) -> String {
        let value = std::mem::take(&mut self.value);
        *self = Self::default();
        value
    }

    /// Clear the buffer and history position.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Interpret one key.
    pub fn handle_key(&mut self, key: &KeyEvent, quit_key: KeyCode) -> EditAction {
        if !key.is_actionable() {
            return EditAction::Ignored;
        }
        if key.code == quit_key || key.code == KeyCode::Escape {
            return EditAction::Abort;
        }
        match key.code {
            KeyCode::Enter => EditAction::Submit(self.take()),
            KeyCode::Tab => EditAction::Complete,
            KeyCode::Up => EditAction::HistoryOlder,
            KeyCode::Down => EditAction::HistoryNewer,
            KeyCode::Backspace | KeyCode::Delete => {
                self.delete_char_back();
                EditAction::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                EditAction::Changed
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.grapheme_count());
                EditAction::Changed
            }
            KeyCode::Home => {
                self.cursor = 0;
                EditAction::Changed
            }
            KeyCode::End => {
                self.cursor = self.grapheme_count();
                EditAction::Changed
            }
            _ => match key.printable() {
                Some(c) => {
                    self.insert_char(c);
                    EditAction::Changed
                }
                None => EditAction::Ignored,
            },
        }
    }

    // --- History ---

    /// Step to an older entry of `history` (newest first). Clamps at the
    /// oldest. Returns `false` when there is no history.
    pub fn history_older(&mut self, history: &[String]) -> bool {
        let Some(last) = history.len().checked_sub(1) else {
            return false;
        };
        let index = self.history_index.map_or(0, |i| (i + 1).min(last));
        self.recall(history, index)
    }

    /// Step to a newer entry. Clamps at the newest; a no-op before any
    /// older step.
    pub fn history_newer(&mut self, history: &[String]) -> bool {
        let Some(current) = self.history_index else {
            return false;
        };
        if history.is_empty() {
            return false;
        }
        let index = current.saturating_sub(1).min(history.len() - 1);
        self.recall(history, index)
    }

    fn recall(&mut self, history: &[String], index: usize) -> bool {
        self.history_index = Some(index);
        self.set_buffer(history[index].clone());
        true
    }

    // --- Completion ---

    /// Put `choice` in place of the word being typed, or append it when the
    /// buffer is empty or ends in whitespace. The cursor moves to the end.
    pub fn apply_completion(&mut self, choice: &str) {
        let keep = self
            .value
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + self.value[i..].chars().next().map_or(1, char::len_utf8));
        self.value.truncate(keep);
        self.value.push_str(choice);
        self.cursor = self.grapheme_count();
    }

    // --- Viewport ---

    /// Visible slice of the buffer for a viewport `width` cells wide, and the
    /// cursor's cell offset within it. Scrolls so the cursor stays visible.
    pub fn view(&mut self, width: usize) -> (String, usize) {
        let width = width.max(1);
        let scroll = self.effective_scroll(width);
        self.scroll_cells = scroll;

        let mut visible = String::new();
        let mut pos = 0usize;
        for g in self.value.graphemes(true) {
            let w = g.width();
            if pos >= scroll && pos + w <= scroll + width {
                visible.push_str(g);
            }
            pos += w;
            if pos >= scroll + width {
                break;
            }
        }
        (visible, self.cursor_visual_pos() - scroll)
    }

    // --- Editing operations ---

    fn insert_char(&mut self, c: char) {
        let byte_offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert(byte_offset, c);
        self.cursor += 1;
    }

    fn delete_char_back(&mut self) {
        if self.cursor > 0 {
            let byte_start = self.grapheme_byte_offset(self.cursor - 1);
            let byte_end = self.grapheme_byte_offset(self.cursor);
            self.value.drain(byte_start..byte_end);
            self.cursor -= 1;
        }
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn cursor_visual_pos(&self) -> usize {
        self.value
            .graphemes(true)
            .take(self.cursor)
            .map(UnicodeWidthStr::width)
            .sum()
    }

    fn effective_scroll(&self, viewport_width: usize) -> usize {
        let cursor_visual = self.cursor_visual_pos();
        let mut scroll = self.scroll_cells;
        if cursor_visual < scroll {
            scroll = cursor_visual;
        }
        if cursor_visual >= scroll + viewport_width {
            scroll = cursor_visual - viewport_width + 1;
        }
        scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut LineEditor, code: KeyCode) -> EditAction {
        editor.handle_key(&KeyEvent::new(code), KeyCode::Escape)
    }

    fn type_text(editor: &mut LineEditor, text: &str) {
        for c in text.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    fn history() -> Vec<String> {
        vec!["newest".into(), "middle".into(), "oldest".into()]
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, "hllo");
        press(&mut ed, KeyCode::Home);
        press(&mut ed, KeyCode::Right);
        type_text(&mut ed, "e");
        assert_eq!(ed.buffer(), "hello");
        assert_eq!(ed.cursor(), 2);
    }

    #[test]
    fn cursor_is_clamped() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, "ab");
        for _ in 0..5 {
            press(&mut ed, KeyCode::Right);
        }
        assert_eq!(ed.cursor(), 2);
        for _ in 0..5 {
            press(&mut ed, KeyCode::Left);
        }
        assert_eq!(ed.cursor(), 0);
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.buffer(), "ab");
    }

    #[test]
    fn backspace_and_delete_remove_left_of_cursor() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, "abc");
        press(&mut ed, KeyCode::Left);
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.buffer(), "ac");
        press(&mut ed, KeyCode::Delete);
        assert_eq!(ed.buffer(), "c");
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn enter_submits_and_resets() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, "go");
        assert_eq!(
            press(&mut ed, KeyCode::Enter),
            EditAction::Submit("go".into())
        );
        assert_eq!(ed.buffer(), "");
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn escape_and_quit_key_abort() {
        let mut ed = LineEditor::new();
        assert_eq!(press(&mut ed, KeyCode::Escape), EditAction::Abort);
        let f10 = KeyEvent::new(KeyCode::F(10));
        assert_eq!(ed.handle_key(&f10, KeyCode::F(10)), EditAction::Abort);
    }

    #[test]
    fn control_chords_are_ignored() {
        use candela_core::event::Modifiers;
        let mut ed = LineEditor::new();
        let ctrl_a = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL);
        assert_eq!(ed.handle_key(&ctrl_a, KeyCode::Escape), EditAction::Ignored);
        assert_eq!(ed.buffer(), "");
    }

    #[test]
    fn history_walks_and_clamps() {
        let hist = history();
        let mut ed = LineEditor::new();
        assert!(!ed.history_newer(&hist));

        assert!(ed.history_older(&hist));
        assert_eq!(ed.buffer(), "newest");
        ed.history_older(&hist);
        ed.history_older(&hist);
        ed.history_older(&hist);
        assert_eq!(ed.buffer(), "oldest");
        assert_eq!(ed.history_index(), Some(2));

        ed.history_newer(&hist);
        assert_eq!(ed.buffer(), "middle");
        ed.history_newer(&hist);
        ed.history_newer(&hist);
        assert_eq!(ed.buffer(), "newest");
        assert_eq!(ed.history_index(), Some(0));
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, "keep");
        assert!(!ed.history_older(&[]));
        assert_eq!(ed.buffer(), "keep");
    }

    #[test]
    fn completion_replaces_current_word() {
        let mut ed = LineEditor::new();
        ed.set_buffer("cat -f al");
        ed.apply_completion("alpha.txt");
        assert_eq!(ed.buffer(), "cat -f alpha.txt");
        assert_eq!(ed.cursor(), 16);

        ed.set_buffer("sa");
        ed.apply_completion("sayhello");
        assert_eq!(ed.buffer(), "sayhello");
    }

    #[test]
    fn completion_appends_after_whitespace() {
        let mut ed = LineEditor::new();
        ed.set_buffer("cat ");
        ed.apply_completion("file");
        assert_eq!(ed.buffer(), "cat file");
    }

    #[test]
    fn view_scrolls_to_keep_cursor_visible() {
        let mut ed = LineEditor::new();
        ed.set_buffer("abcdefghij");
        let (visible, cursor) = ed.view(5);
        assert_eq!(visible, "ghij");
        assert_eq!(cursor, 4);

        press(&mut ed, KeyCode::Home);
        let (visible, cursor) = ed.view(5);
        assert_eq!(visible, "abcde");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn view_fits_short_buffer() {
        let mut ed = LineEditor::new();
        ed.set_buffer("hi");
        assert_eq!(ed.view(10), ("hi".to_string(), 2));
    }
}
