#![forbid(unsafe_code)]

//! Canonical key types.
//!
//! The shell only consumes keyboard input, so this module keeps the key side
//! of the terminal event stream: a [`KeyCode`], held [`Modifiers`], and the
//! press/repeat/release [`KeyEventKind`]. Crossterm events are mapped into
//! these types by [`KeyEvent::from_crossterm`].

use bitflags::bitflags;
use crossterm::event as cte;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Whether this event should be acted upon by a line editor.
    ///
    /// Release events only arrive when the kitty protocol is active and are
    /// never treated as input.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    /// The printable ASCII character carried by this event, if any.
    ///
    /// Ctrl/Alt chords never produce printable input.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.ctrl() && !self.alt() && (' '..='~').contains(&c) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Convert a Crossterm key event into a Candela [`KeyEvent`].
    ///
    /// Returns `None` for keys Candela has no code for (media keys, modifier
    /// key presses, etc.).
    #[must_use]
    pub fn from_crossterm(event: cte::KeyEvent) -> Option<Self> {
        let code = map_key_code(event.code)?;
        Some(Self {
            code,
            modifiers: map_modifiers(event.modifiers),
            kind: map_key_kind(event.kind),
        })
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),

    /// Null character (Ctrl+Space or Ctrl+@).
    Null,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

fn map_key_kind(kind: cte::KeyEventKind) -> KeyEventKind {
    match kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    }
}

fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Null => Some(KeyCode::Null),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn printable_covers_ascii_range_only() {
        assert_eq!(KeyEvent::new(KeyCode::Char('a')).printable(), Some('a'));
        assert_eq!(KeyEvent::new(KeyCode::Char(' ')).printable(), Some(' '));
        assert_eq!(KeyEvent::new(KeyCode::Char('~')).printable(), Some('~'));
        assert_eq!(KeyEvent::new(KeyCode::Char('é')).printable(), None);
        assert_eq!(KeyEvent::new(KeyCode::Enter).printable(), None);
    }

    #[test]
    fn ctrl_chord_is_not_printable() {
        let event = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(event.ctrl());
        assert_eq!(event.printable(), None);
    }

    #[test]
    fn release_is_not_actionable() {
        let press = KeyEvent::new(KeyCode::Enter);
        let release = press.with_kind(KeyEventKind::Release);
        assert!(press.is_actionable());
        assert!(!release.is_actionable());
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn map_modifiers_super_variants() {
        for m in [
            cte::KeyModifiers::SUPER,
            cte::KeyModifiers::HYPER,
            cte::KeyModifiers::META,
        ] {
            assert!(map_modifiers(m).contains(Modifiers::SUPER));
        }
    }

    #[test]
    fn map_key_event_char() {
        let ct = cte::KeyEvent::new(cte::KeyCode::Char('x'), cte::KeyModifiers::SHIFT);
        let mapped = KeyEvent::from_crossterm(ct).expect("mapped");
        assert_eq!(mapped.code, KeyCode::Char('x'));
        assert!(mapped.modifiers.contains(Modifiers::SHIFT));
        assert_eq!(mapped.kind, KeyEventKind::Press);
    }

    #[test]
    fn map_key_event_escape_and_function() {
        let esc = cte::KeyEvent::new(cte::KeyCode::Esc, cte::KeyModifiers::NONE);
        assert_eq!(
            KeyEvent::from_crossterm(esc).map(|k| k.code),
            Some(KeyCode::Escape)
        );
        let f1 = cte::KeyEvent::new(cte::KeyCode::F(1), cte::KeyModifiers::NONE);
        assert_eq!(
            KeyEvent::from_crossterm(f1).map(|k| k.code),
            Some(KeyCode::F(1))
        );
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        let caps = cte::KeyEvent::new(cte::KeyCode::CapsLock, cte::KeyModifiers::NONE);
        assert!(KeyEvent::from_crossterm(caps).is_none());
    }
}
