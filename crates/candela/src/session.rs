#![forbid(unsafe_code)]

//! What a running command can do to its shell.
//!
//! Executors receive a `&mut dyn Session` on the shell's own thread. Code
//! running elsewhere (a deferred task, a timer thread) uses a cloneable
//! [`ShellHandle`] instead; its requests are queued and applied by the shell
//! before it reads the next line and after every key press.

use std::path::Path;
use std::sync::mpsc;

use candela_core::surface::Position;

use crate::menu::Menu;

/// The shell as seen by a running command.
pub trait Session {
    /// Append text to the output.
    fn put(&mut self, text: &str);

    /// Place a sticker, or replace the sticker showing `text` with
    /// `replacement` at the same position.
    fn sticker(&mut self, text: &str, replacement: Option<&str>, position: Option<Position>);

    /// Remove every sticker showing `text`. Takes effect at the next redraw.
    fn remove_sticker(&mut self, text: &str);

    /// Replace the pending script with the lines of `path`.
    fn run_script(&mut self, path: &Path);

    /// Name of the active menu.
    fn active_menu_name(&self) -> &str;

    /// Switch the active menu.
    fn set_active_menu(&mut self, name: &str);

    /// A registered menu, for adding or removing commands mid-session.
    fn menu_mut(&mut self, name: &str) -> Option<&mut Menu>;

    /// Show or hide the help panel.
    fn set_help_visible(&mut self, visible: bool);

    /// A handle for talking to the shell from other threads.
    fn handle(&self) -> ShellHandle;
}

/// A request queued through a [`ShellHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    Put(String),
    Sticker {
        text: String,
        replacement: Option<String>,
        position: Option<Position>,
    },
    RemoveSticker(String),
    Redraw,
}

/// Cloneable, thread-safe sender of [`ShellRequest`]s.
///
/// Every method returns `false` once the shell is gone.
#[derive(Debug, Clone)]
pub struct ShellHandle {
    tx: mpsc::Sender<ShellRequest>,
}

impl ShellHandle {
    pub(crate) fn new(tx: mpsc::Sender<ShellRequest>) -> Self {
        Self { tx }
    }

    pub fn send(&self, request: ShellRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    pub fn put(&self, text: impl Into<String>) -> bool {
        self.send(ShellRequest::Put(text.into()))
    }

    pub fn sticker(
        &self,
        text: impl Into<String>,
        replacement: Option<String>,
        position: Option<Position>,
    ) -> bool {
        self.send(ShellRequest::Sticker {
            text: text.into(),
            replacement,
            position,
        })
    }

    pub fn remove_sticker(&self, text: impl Into<String>) -> bool {
        self.send(ShellRequest::RemoveSticker(text.into()))
    }

    pub fn redraw(&self) -> bool {
        self.send(ShellRequest::Redraw)
    }
}
