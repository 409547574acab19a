#![forbid(unsafe_code)]

//! Crossterm-backed terminal session.
//!
//! [`TerminalSession`] is the production [`Surface`]: it enters raw mode on
//! construction, optionally switches to the alternate screen, and restores the
//! terminal on [`Surface::teardown`] or drop, whichever comes first.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Every mode change is tracked** - raw mode and alternate screen each
//!    have a flag, so teardown only undoes what was actually done.
//!
//! 2. **Teardown is idempotent** - the shell tears down on quit and the
//!    session is dropped afterwards; the second pass is a no-op.
//!
//! 3. **Panic safety** - a process-wide panic hook restores the terminal
//!    before the default hook prints the panic message.
//!
//! 4. **Signals** - on unix, SIGINT/SIGTERM restore the terminal and exit
//!    with `128 + signal`.
//!
//! # Cleanup Order
//!
//! 1. Show cursor
//! 2. Leave alternate screen (if enabled)
//! 3. Exit raw mode
//! 4. Flush stdout
//!
//! # Usage
//!
//! ```no_run
//! use candela_core::surface::Surface;
//! use candela_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let mut session = TerminalSession::new(SessionOptions {
//!     alternate_screen: true,
//! })?;
//! let (rows, _cols) = session.dimensions();
//! session.write_at(rows - 1, 0, "> ")?;
//! session.refresh()?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Stdout, Write};
use std::sync::OnceLock;

use crossterm::{cursor, queue, style, terminal};

use crate::event::KeyEvent;
use crate::surface::{Position, Surface, clip_to_columns};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Terminal session configuration options.
///
/// All options default to `false`: the minimal session is raw mode on the
/// primary screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Enable the alternate screen buffer (`CSI ? 1049 h`).
    ///
    /// The shell repaints the whole window on every redraw, so full-screen
    /// consoles usually want this; the original scrollback is restored on
    /// exit.
    pub alternate_screen: bool,
}

/// A terminal session that owns raw mode and implements [`Surface`].
///
/// # Contract
///
/// - **Exclusive ownership**: only one `TerminalSession` should exist at a
///   time.
/// - **Size tracking**: the size is re-read on every [`Surface::clear`] and
///   whenever a resize event is observed while waiting for a key.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    out: Stdout,
    rows: u16,
    cols: u16,
    cursor: Position,
    raw_enabled: bool,
    alternate_screen_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and optionally the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the terminal size
    /// cannot be read.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        // Built before anything else can fail so `Drop` restores the terminal.
        let mut session = Self {
            options: options.clone(),
            out: io::stdout(),
            rows: 0,
            cols: 0,
            cursor: Position::default(),
            raw_enabled: true,
            alternate_screen_enabled: false,
            #[cfg(unix)]
            signal_guard: None,
        };
        let (cols, rows) = terminal::size()?;
        session.rows = rows;
        session.cols = cols;
        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }

        if options.alternate_screen {
            crossterm::execute!(session.out, terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen enabled");
        }

        Ok(session)
    }

    /// Create a minimal session (raw mode only).
    pub fn minimal() -> io::Result<Self> {
        Self::new(SessionOptions::default())
    }

    /// Get the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether the session still holds the terminal.
    pub fn is_active(&self) -> bool {
        self.raw_enabled
    }

    fn sync_size(&mut self) {
        if let Ok((cols, rows)) = terminal::size() {
            self.rows = rows;
            self.cols = cols;
        }
    }

    /// Cleanup helper (shared between drop and explicit teardown).
    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        if !self.raw_enabled && !self.alternate_screen_enabled {
            return;
        }

        let _ = crossterm::execute!(self.out, cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(self.out, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        if self.raw_enabled {
            let _ = terminal::disable_raw_mode();
            self.raw_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("terminal raw mode disabled");
        }

        let _ = self.out.flush();
    }
}

impl Surface for TerminalSession {
    fn dimensions(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        if row >= self.rows || col >= self.cols {
            return Ok(());
        }
        let clipped = clip_to_columns(text, col, self.cols);
        queue!(self.out, cursor::MoveTo(col, row), style::Print(clipped))?;
        let advanced = unicode_width::UnicodeWidthStr::width(clipped);
        self.cursor = Position::new(
            row,
            col.saturating_add(u16::try_from(advanced).unwrap_or(u16::MAX)),
        );
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.sync_size();
        queue!(self.out, terminal::Clear(terminal::ClearType::All))
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if let Some(event) = KeyEvent::from_crossterm(key) {
                        return Ok(event);
                    }
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(cols, rows, "terminal resized");
                    self.rows = rows;
                    self.cols = cols;
                }
                _ => {}
            }
        }
    }

    fn cursor_position(&self) -> Position {
        self.cursor
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        let row = row.min(self.rows.saturating_sub(1));
        let col = col.min(self.cols.saturating_sub(1));
        queue!(self.out, cursor::MoveTo(col, row))?;
        self.cursor = Position::new(row, col);
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        self.cleanup();
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, cursor::Show);
    let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_options_default_is_minimal() {
        let opts = SessionOptions::default();
        assert!(!opts.alternate_screen);
    }

    #[test]
    fn failed_open_leaves_raw_mode_off() {
        use std::io::IsTerminal;
        // Only meaningful without a terminal: opening must fail and leave
        // nothing behind.
        if io::stdin().is_terminal() || io::stdout().is_terminal() {
            return;
        }
        if let Ok(session) = TerminalSession::minimal() {
            drop(session);
        }
        assert!(!terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    // Entering raw mode inside the test runner would corrupt its output, so
    // the Surface behavior is covered through the in-memory surface in
    // candela-harness instead.
}
