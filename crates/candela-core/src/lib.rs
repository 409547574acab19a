#![forbid(unsafe_code)]

//! Core: the terminal surface capability, key events, and the crossterm
//! session that implements it.

pub mod event;
pub mod surface;
pub mod terminal_session;

pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use surface::{Position, Surface};
pub use terminal_session::{SessionOptions, TerminalSession};
