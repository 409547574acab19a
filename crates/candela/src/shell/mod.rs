#![forbid(unsafe_code)]

//! The shell engine.
//!
//! A [`Shell`] owns a [`Surface`], a set of [`Menu`]s, and the screen state:
//! output backbuffer, header, help panel, stickers, and the input line. Its
//! loop reads one line at a time (script first, then the keyboard), resolves
//! it against the active menu, and runs the matched command.
//!
//! # Screen layout
//!
//! ```text
//! row 0          header block        help panel (menu title, options)
//! ...                                                    stickers
//! ...            output, newest row lowest
//! rows-1         prompt + input line
//! ```
//!
//! # Outcome handling
//!
//! | Outcome | Effect |
//! |---------|--------|
//! | `Valid` | follow the command's target menu, if any |
//! | `Invalid` | show "Invalid command" |
//! | `Back` | follow the command's target menu |
//! | `Quit` | leave the loop and tear the surface down |
//! | `Fail` | nothing; the target menu is not followed |

pub mod backbuffer;
pub mod editor;
pub mod layout;
pub mod script;
pub mod stickers;

use std::io;
use std::path::Path;
use std::sync::mpsc;

use candela_core::event::KeyCode;
use candela_core::surface::{Position, Surface};
use candela_core::terminal_session::TerminalSession;
use candela_text::{display_width, soft_wrap};

use crate::command::{Outcome, ParseError, ValidationResult, tokenize};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::menu::Menu;
use crate::session::{Session, ShellHandle, ShellRequest};

use backbuffer::Backbuffer;
use editor::{EditAction, LineEditor};
use layout::HeaderMetrics;
use script::Script;
use stickers::{Sticker, StickerBoard};

const NO_COMMANDS: &str = "No commands found. Maybe you forgot to add menus or set the active menu?";

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The line had no tokens.
    Blank,
    /// No command in the active menu matched the first token.
    Unmatched,
    /// The command could not parse the line.
    ParseFailed(ParseError),
    /// The validator rejected the arguments.
    Rejected(String),
    /// The command ran.
    Ran(Outcome),
}

/// Menu-driven command shell over a [`Surface`].
pub struct Shell<S: Surface> {
    surface: S,
    config: ShellConfig,
    menus: Vec<Menu>,
    active_menu: String,
    header: String,
    prompt: String,
    show_help: bool,
    backbuffer: Backbuffer,
    stickers: StickerBoard,
    editor: LineEditor,
    script: Option<Script>,
    requests: mpsc::Receiver<ShellRequest>,
    sender: mpsc::Sender<ShellRequest>,
    pending_io: Option<io::Error>,
    last_size: (u16, u16),
}

impl Shell<TerminalSession> {
    /// Open a terminal session with `config.session` and build a shell on it.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Io`] if the terminal cannot enter raw mode.
    pub fn terminal(config: ShellConfig) -> Result<Self, ShellError> {
        let session = TerminalSession::new(config.session.clone())?;
        Ok(Self::new(session, config))
    }
}

impl<S: Surface> Shell<S> {
    /// Build a shell. The script named by `config.script` is loaded now; a
    /// missing file means no script.
    pub fn new(surface: S, config: ShellConfig) -> Self {
        let (sender, requests) = mpsc::channel();
        let last_size = surface.dimensions();
        let mut shell = Self {
            surface,
            menus: Vec::new(),
            active_menu: String::new(),
            header: String::new(),
            prompt: config.prompt.clone(),
            show_help: config.show_help,
            backbuffer: Backbuffer::new(config.scrollback),
            stickers: StickerBoard::new(),
            editor: LineEditor::new(),
            script: None,
            requests,
            sender,
            pending_io: None,
            last_size,
            config,
        };
        if let Some(path) = shell.config.script.clone() {
            shell.load_script(&path);
        }
        shell
    }

    // ── Menus ───────────────────────────────────────────────────────

    /// Register a menu (builder). See [`Shell::add_menu`].
    #[must_use]
    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.add_menu(menu);
        self
    }

    /// Register a menu, replacing any menu with the same name. The first
    /// menu registered becomes active if none is set.
    pub fn add_menu(&mut self, menu: Menu) {
        if self.active_menu.is_empty() {
            self.active_menu = menu.name().to_string();
        }
        match self.menus.iter_mut().find(|m| m.name() == menu.name()) {
            Some(existing) => *existing = menu,
            None => self.menus.push(menu),
        }
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn menu(&self, name: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.name() == name)
    }

    pub fn menu_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|m| m.name() == name)
    }

    pub fn active_menu_name(&self) -> &str {
        &self.active_menu
    }

    /// Switch the active menu. The name is checked when the next line is
    /// dispatched.
    pub fn set_active_menu(&mut self, name: &str) {
        if self.active_menu != name {
            tracing::debug!(from = %self.active_menu, to = name, "menu transition");
            self.active_menu = name.to_string();
        }
    }

    /// The active menu.
    ///
    /// # Errors
    ///
    /// [`ShellError::UnknownMenu`] when no registered menu has the active name.
    pub fn current_menu(&self) -> Result<&Menu, ShellError> {
        self.menu(&self.active_menu)
            .ok_or_else(|| ShellError::UnknownMenu {
                name: self.active_menu.clone(),
            })
    }

    // ── Screen state ────────────────────────────────────────────────

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn help_visible(&self) -> bool {
        self.show_help
    }

    pub fn set_help_visible(&mut self, visible: bool) {
        self.show_help = visible;
    }

    pub fn backbuffer(&self) -> &Backbuffer {
        &self.backbuffer
    }

    pub fn stickers(&self) -> impl Iterator<Item = &Sticker> {
        self.stickers.iter()
    }

    /// Current contents of the input line.
    pub fn input(&self) -> &str {
        self.editor.buffer()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// A handle for queuing output and sticker changes from other threads.
    pub fn handle(&self) -> ShellHandle {
        ShellHandle::new(self.sender.clone())
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Append text to the output and redraw. Long lines are wrapped; each
    /// row becomes its own entry.
    ///
    /// # Errors
    ///
    /// Any surface error from the redraw.
    pub fn put(&mut self, text: &str) -> io::Result<()> {
        self.push_output(text, false);
        self.redraw()
    }

    /// Place a sticker, or swap the sticker showing `text` for `replacement`
    /// in place, then redraw.
    ///
    /// # Errors
    ///
    /// Any surface error from the redraw.
    pub fn sticker(
        &mut self,
        text: &str,
        replacement: Option<&str>,
        position: Option<Position>,
    ) -> io::Result<()> {
        self.place_sticker(text, replacement, position);
        self.redraw()
    }

    /// Remove every sticker showing `text`. The screen keeps it until the
    /// next redraw. Returns how many were removed.
    pub fn remove_sticker(&mut self, text: &str) -> usize {
        self.stickers.remove(text)
    }

    /// Queue the lines of `path` as the script, replacing any pending lines.
    pub fn run_script(&mut self, path: impl AsRef<Path>) {
        self.load_script(path.as_ref());
    }

    /// Script lines not yet run.
    pub fn script_remaining(&self) -> usize {
        self.script.as_ref().map_or(0, Script::remaining)
    }

    fn push_output(&mut self, text: &str, is_command: bool) {
        if text.is_empty() {
            return;
        }
        let (_, cols) = self.surface.dimensions();
        let width = usize::from(cols.saturating_sub(self.config.wrap_margin));
        for (i, row) in soft_wrap(text, width).into_iter().enumerate() {
            self.backbuffer.push(row, is_command && i == 0);
        }
    }

    fn place_sticker(&mut self, text: &str, replacement: Option<&str>, position: Option<Position>) {
        let fallback = self.default_sticker_position();
        self.stickers.place(text, replacement, position, fallback);
    }

    fn default_sticker_position(&self) -> Position {
        let (rows, cols) = self.surface.dimensions();
        let header = HeaderMetrics::measure(&self.header);
        let first_row = if header.fits(rows, cols, &self.config) {
            self.config.sticker_top_row.max(header.height.saturating_add(1))
        } else {
            self.config.sticker_top_row
        };
        let row = self
            .stickers
            .lowest_row()
            .map_or(first_row, |lowest| lowest.saturating_add(1));
        Position::new(row, cols.saturating_sub(self.config.sticker_right_inset))
    }

    fn load_script(&mut self, path: &Path) {
        match Script::load(path) {
            Ok(script) => {
                tracing::debug!(path = %path.display(), lines = script.remaining(), "script loaded");
                self.script = Some(script);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "script unreadable, ignoring it");
                self.script = None;
            }
        }
    }

    /// Apply queued handle requests. Returns whether anything arrived.
    fn drain_requests(&mut self) -> bool {
        let mut any = false;
        while let Ok(request) = self.requests.try_recv() {
            any = true;
            match request {
                ShellRequest::Put(text) => self.push_output(&text, false),
                ShellRequest::Sticker {
                    text,
                    replacement,
                    position,
                } => self.place_sticker(&text, replacement.as_deref(), position),
                ShellRequest::RemoveSticker(text) => {
                    self.stickers.remove(&text);
                }
                ShellRequest::Redraw => {}
            }
        }
        any
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Repaint everything: output, header and help (when they fit),
    /// stickers, then the input line with the cursor parked in it.
    ///
    /// # Errors
    ///
    /// Any surface error.
    pub fn redraw(&mut self) -> io::Result<()> {
        self.surface.clear()?;
        let (rows, cols) = self.surface.dimensions();
        self.last_size = (rows, cols);

        self.paint_backbuffer(rows)?;
        let header = HeaderMetrics::measure(&self.header);
        if header.fits(rows, cols, &self.config) {
            self.paint_header(header)?;
            if self.show_help {
                self.paint_help(header, cols)?;
            }
        }
        self.paint_stickers(cols)?;
        self.paint_input_line()?;
        self.surface.refresh()
    }

    fn paint_backbuffer(&mut self, rows: u16) -> io::Result<()> {
        let mut row = rows.saturating_sub(2);
        for entry in self.backbuffer.iter().rev() {
            if row == 0 {
                break;
            }
            if entry.is_command {
                let line = format!("{}{}", self.prompt, entry.text);
                self.surface.write_at(row, 0, &line)?;
            } else {
                self.surface.write_at(row, 0, &entry.text)?;
            }
            row -= 1;
        }
        Ok(())
    }

    fn paint_header(&mut self, header: HeaderMetrics) -> io::Result<()> {
        let width = usize::from(header.width) + usize::from(self.config.header_right_margin);
        let mut row = 0u16;
        for line in self.header.split('\n') {
            let pad = width.saturating_sub(display_width(line));
            self.surface
                .write_at(row, 0, &format!("{line}{}", " ".repeat(pad)))?;
            row = row.saturating_add(1);
        }
        self.surface.write_at(row, 0, &" ".repeat(width))
    }

    fn paint_help(&mut self, header: HeaderMetrics, cols: u16) -> io::Result<()> {
        let Some(menu) = self.menu(&self.active_menu) else {
            return Ok(());
        };
        let lines = layout::help_lines(menu.title(), &menu.options(), self.config.help_rule_width);
        let col = layout::help_column(&lines, header, cols, &self.config);
        for (row, line) in (0u16..).zip(&lines) {
            self.surface.write_at(row, col, &format!("{line}{}", " ".repeat(15)))?;
        }
        Ok(())
    }

    fn paint_stickers(&mut self, cols: u16) -> io::Result<()> {
        let placed: Vec<(u16, u16, String)> = self
            .stickers
            .iter()
            .map(|s| {
                let (col, text) = s.fit(cols);
                (s.position.row, col, text)
            })
            .collect();
        for (row, col, text) in placed {
            self.surface.write_at(row, col, &text)?;
        }
        Ok(())
    }

    fn paint_input_line(&mut self) -> io::Result<()> {
        let (rows, cols) = self.surface.dimensions();
        let row = rows.saturating_sub(1);
        let prompt_width = display_width(&self.prompt);
        let room = usize::from(cols).saturating_sub(prompt_width + 1);
        let (visible, cursor) = self.editor.view(room);

        self.surface.write_at(row, 0, &" ".repeat(usize::from(cols)))?;
        self.surface
            .write_at(row, 0, &format!("{}{visible}", self.prompt))?;
        let cursor_col = u16::try_from(prompt_width + cursor).unwrap_or(u16::MAX);
        self.surface.move_cursor(row, cursor_col)
    }

    // ── Loop ────────────────────────────────────────────────────────

    /// Run until a command returns [`Outcome::Quit`], then tear the surface
    /// down and hand the shell back.
    ///
    /// # Errors
    ///
    /// [`ShellError::UnknownMenu`] for an active menu that does not exist,
    /// [`ShellError::Io`] for surface failures, [`ShellError::Aborted`] when
    /// the quit key is pressed and the shell does not exit the process. The
    /// surface is torn down in every case.
    pub fn run(mut self) -> Result<Self, ShellError> {
        tracing::info!(menu = %self.active_menu, "shell started");
        let result = self.run_until_quit();
        let ended = self.end();
        result?;
        ended?;
        tracing::info!("shell finished");
        Ok(self)
    }

    fn run_until_quit(&mut self) -> Result<(), ShellError> {
        loop {
            if self.drain_requests() {
                self.redraw()?;
            }
            let line = self.next_line()?;
            if self.dispatch(&line)? == Dispatch::Ran(Outcome::Quit) {
                return Ok(());
            }
        }
    }

    /// Tear the surface down. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Any surface error.
    pub fn end(&mut self) -> io::Result<()> {
        self.surface.teardown()
    }

    /// Next input line: the script's next line (echoed behind the prompt)
    /// or, once the script is exhausted, a line read from the keyboard.
    ///
    /// # Errors
    ///
    /// Surface failures and aborts from the interactive editor.
    pub fn next_line(&mut self) -> Result<String, ShellError> {
        if let Some(line) = self.script.as_mut().and_then(Script::next_line) {
            let echo = format!("{}{line}", self.prompt);
            self.push_output(&echo, false);
            self.redraw()?;
            return Ok(line);
        }
        self.script = None;
        self.read_line()
    }

    /// Run one input line against the active menu.
    ///
    /// # Errors
    ///
    /// [`ShellError::UnknownMenu`] when menus exist but none has the active
    /// name; [`ShellError::Io`] for surface failures, including ones hit by
    /// the command itself.
    pub fn dispatch(&mut self, line: &str) -> Result<Dispatch, ShellError> {
        let tokens = tokenize(line);
        let Some(&word) = tokens.first() else {
            self.redraw()?;
            return Ok(Dispatch::Blank);
        };
        let span = tracing::debug_span!("dispatch", command = word);
        let _guard = span.enter();

        let found = if self.menus.is_empty() {
            None
        } else {
            let menu = self.current_menu()?;
            (!menu.is_empty()).then(|| menu.find(word).cloned())
        };
        let command = match found {
            Some(Some(command)) => command,
            Some(None) => {
                tracing::debug!("no matching command");
                self.put("Invalid command")?;
                return Ok(Dispatch::Unmatched);
            }
            None => {
                self.push_output("Invalid command", false);
                self.push_output(NO_COMMANDS, false);
                let hint = format!("Hint: press {} to quit", key_label(self.config.quit_key));
                self.put(&hint)?;
                return Ok(Dispatch::Unmatched);
            }
        };

        let args = match command.parse(&tokens) {
            Ok(args) => args,
            Err(error) => {
                tracing::debug!(%error, "invocation rejected");
                self.put(&error.to_string())?;
                return Ok(Dispatch::ParseFailed(error));
            }
        };
        if let ValidationResult::Invalid(message) = command.validate(&args) {
            tracing::debug!(%message, "validation failed");
            self.put(&message)?;
            return Ok(Dispatch::Rejected(message));
        }

        let outcome = command.execute(self, &args);
        if let Some(error) = self.pending_io.take() {
            return Err(error.into());
        }
        tracing::debug!(?outcome, "command finished");

        match outcome {
            Outcome::Valid | Outcome::Back => {
                if let Some(target) = command.menu_target() {
                    self.set_active_menu(target);
                }
                self.redraw()?;
            }
            Outcome::Invalid => self.put("Invalid command")?,
            Outcome::Fail => self.redraw()?,
            Outcome::Quit => {}
        }
        Ok(Dispatch::Ran(outcome))
    }

    // ── Interactive input ───────────────────────────────────────────

    fn read_line(&mut self) -> Result<String, ShellError> {
        self.editor.reset();
        self.redraw()?;
        loop {
            let key = self.surface.read_key()?;
            let mut full_redraw = self.drain_requests();
            if self.surface.dimensions() != self.last_size {
                full_redraw = true;
            }

            match self.editor.handle_key(&key, self.config.quit_key) {
                EditAction::Submit(line) => {
                    self.push_output(&line, true);
                    if !line.is_empty() {
                        self.backbuffer.record_command(line.clone());
                    }
                    self.redraw()?;
                    return Ok(line);
                }
                EditAction::Abort => return Err(self.abort()),
                EditAction::Complete => full_redraw |= self.complete(),
                EditAction::HistoryOlder => {
                    let history = self.backbuffer.history();
                    self.editor.history_older(&history);
                }
                EditAction::HistoryNewer => {
                    let history = self.backbuffer.history();
                    self.editor.history_newer(&history);
                }
                EditAction::Changed | EditAction::Ignored => {}
            }

            if full_redraw {
                self.redraw()?;
            } else {
                self.paint_input_line()?;
                self.surface.refresh()?;
            }
        }
    }

    fn abort(&mut self) -> ShellError {
        tracing::info!("input aborted by quit key");
        if let Err(error) = self.surface.teardown() {
            return ShellError::Io(error);
        }
        if self.config.exit_on_abort {
            std::process::exit(0);
        }
        ShellError::Aborted
    }

    /// Complete the input line. Returns `true` when candidates were printed.
    fn complete(&mut self) -> bool {
        match self.completion_candidates().as_slice() {
            [] => false,
            [only] => {
                let only = only.clone();
                self.editor.apply_completion(&only);
                false
            }
            many => {
                let listing = many.join("    ");
                self.push_output(&listing, false);
                true
            }
        }
    }

    /// Completion candidates for the current input line.
    ///
    /// A single word (no space yet) completes against command names and
    /// aliases of the active menu. Later words are mapped to the argument
    /// being typed and completed by that command's hook.
    pub fn completion_candidates(&self) -> Vec<String> {
        let Ok(menu) = self.current_menu() else {
            return Vec::new();
        };
        let buffer = self.editor.buffer();
        let words: Vec<&str> = buffer.split_whitespace().collect();

        if words.len() <= 1 && !buffer.contains(char::is_whitespace) {
            let prefix = words.first().copied().unwrap_or("");
            let mut names: Vec<String> = Vec::new();
            for command in menu.commands() {
                let all = std::iter::once(command.name()).chain(command.aliases().iter().map(String::as_str));
                for name in all {
                    if name.starts_with(prefix) && !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
            }
            return names;
        }

        let Some(command) = words.first().and_then(|w| menu.find(w)) else {
            return Vec::new();
        };
        let new_word = buffer.ends_with(char::is_whitespace);
        let fragment = if new_word {
            ""
        } else {
            words.last().copied().unwrap_or("")
        };
        command
            .completion_target(&words, new_word)
            .and_then(|argument| command.completions(&argument, fragment))
            .unwrap_or_default()
    }

    fn redraw_in_command(&mut self) {
        if let Err(error) = self.redraw() {
            tracing::warn!(%error, "redraw failed while a command was running");
            if self.pending_io.is_none() {
                self.pending_io = Some(error);
            }
        }
    }
}

impl<S: Surface> Session for Shell<S> {
    fn put(&mut self, text: &str) {
        self.push_output(text, false);
        self.redraw_in_command();
    }

    fn sticker(&mut self, text: &str, replacement: Option<&str>, position: Option<Position>) {
        self.place_sticker(text, replacement, position);
        self.redraw_in_command();
    }

    fn remove_sticker(&mut self, text: &str) {
        self.stickers.remove(text);
    }

    fn run_script(&mut self, path: &Path) {
        self.load_script(path);
    }

    fn active_menu_name(&self) -> &str {
        &self.active_menu
    }

    fn set_active_menu(&mut self, name: &str) {
        Shell::set_active_menu(self, name);
    }

    fn menu_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|m| m.name() == name)
    }

    fn set_help_visible(&mut self, visible: bool) {
        self.show_help = visible;
    }

    fn handle(&self) -> ShellHandle {
        ShellHandle::new(self.sender.clone())
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Escape => "Esc".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use candela_core::event::KeyEvent;
    use candela_harness::{VirtualSurface, line};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    fn config() -> ShellConfig {
        ShellConfig::default().without_exit_on_abort()
    }

    fn shell(rows: u16, cols: u16) -> Shell<VirtualSurface> {
        Shell::new(VirtualSurface::new(rows, cols), config())
    }

    fn counting(count: &Arc<AtomicUsize>, outcome: Outcome) -> impl Fn(&mut dyn Session, &crate::command::Arguments) -> Outcome + Send + Sync + 'static {
        let count = Arc::clone(count);
        move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    }

    #[test]
    fn blank_line_is_a_no_op() {
        let mut sh = shell(24, 80).with_menu(Menu::new("main"));
        assert_eq!(sh.dispatch("   ").unwrap(), Dispatch::Blank);
        assert!(sh.backbuffer().is_empty());
    }

    #[test]
    fn unmatched_command_reports_invalid() {
        let mut sh = shell(24, 80).with_menu(
            Menu::new("main").with_command(Command::new("known", "k").unwrap()),
        );
        assert_eq!(sh.dispatch("unknown").unwrap(), Dispatch::Unmatched);
        let last = sh.backbuffer().iter().last().unwrap();
        assert_eq!(last.text, "Invalid command");
    }

    #[test]
    fn empty_menu_adds_hints() {
        let mut sh = shell(24, 80).with_menu(Menu::new("main"));
        sh.dispatch("anything").unwrap();
        let texts: Vec<_> = sh.backbuffer().iter().map(|e| e.text.clone()).collect();
        assert_eq!(
            texts,
            vec![
                "Invalid command".to_string(),
                NO_COMMANDS.to_string(),
                "Hint: press Esc to quit".to_string(),
            ]
        );
    }

    #[test]
    fn no_menus_at_all_adds_hints() {
        let mut sh = shell(24, 80);
        assert_eq!(sh.dispatch("x").unwrap(), Dispatch::Unmatched);
        assert_eq!(sh.backbuffer().len(), 3);
    }

    #[test]
    fn unknown_active_menu_is_fatal() {
        let mut sh = shell(24, 80).with_menu(Menu::new("main"));
        sh.set_active_menu("missing");
        assert!(matches!(
            sh.dispatch("x"),
            Err(ShellError::UnknownMenu { name }) if name == "missing"
        ));
    }

    #[test]
    fn parse_and_validation_failures_are_shown() {
        let cmd = Command::new("named my_arg <-f filename>", "n").unwrap();
        let mut sh = shell(24, 80).with_menu(Menu::new("main").with_command(cmd));

        let result = sh.dispatch("named hi -f").unwrap();
        assert!(matches!(result, Dispatch::ParseFailed(ParseError::MissingValue { .. })));

        let result = sh.dispatch("named hi").unwrap();
        assert_eq!(
            result,
            Dispatch::Rejected("Missing arguments: filename (-f)".into())
        );
        assert_eq!(
            sh.backbuffer().iter().last().map(|e| e.text.as_str()),
            Some("Missing arguments: filename (-f)")
        );
    }

    #[test]
    fn valid_follows_target_and_fail_does_not() {
        let runs = Arc::new(AtomicUsize::new(0));
        let go = Command::new("go", "go").unwrap().target_menu("other").on_run(counting(&runs, Outcome::Valid));
        let fail = Command::new("fail", "fail").unwrap().target_menu("other").on_run(counting(&runs, Outcome::Fail));
        let mut sh = shell(24, 80)
            .with_menu(Menu::new("main").with_command(fail).with_command(go))
            .with_menu(Menu::new("other"));

        assert_eq!(sh.dispatch("fail").unwrap(), Dispatch::Ran(Outcome::Fail));
        assert_eq!(sh.active_menu_name(), "main");
        assert_eq!(sh.dispatch("go").unwrap(), Dispatch::Ran(Outcome::Valid));
        assert_eq!(sh.active_menu_name(), "other");
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalid_outcome_shows_message_without_transition() {
        let cmd = Command::new("nope", "n")
            .unwrap()
            .target_menu("other")
            .on_run(|_, _| Outcome::Invalid);
        let mut sh = shell(24, 80)
            .with_menu(Menu::new("main").with_command(cmd))
            .with_menu(Menu::new("other"));
        sh.dispatch("nope").unwrap();
        assert_eq!(sh.active_menu_name(), "main");
        assert_eq!(
            sh.backbuffer().iter().last().map(|e| e.text.as_str()),
            Some("Invalid command")
        );
    }

    #[test]
    fn commands_can_edit_menus_mid_session() {
        let adder = Command::new("grow", "adds a command").unwrap().on_run(|session, _| {
            if let Some(menu) = session.menu_mut("main") {
                menu.push(Command::new("fresh", "new").unwrap());
            }
            Outcome::Valid
        });
        let mut sh = shell(24, 80).with_menu(Menu::new("main").with_command(adder));
        assert_eq!(sh.dispatch("fresh").unwrap(), Dispatch::Unmatched);
        sh.dispatch("grow").unwrap();
        assert_eq!(sh.dispatch("fresh").unwrap(), Dispatch::Ran(Outcome::Valid));
    }

    #[test]
    fn output_renders_newest_lowest() {
        let mut sh = shell(10, 40);
        sh.put("first").unwrap();
        sh.put("second").unwrap();
        let surface = sh.surface();
        assert_eq!(surface.row_text(8), "second");
        assert_eq!(surface.row_text(7), "first");
        assert_eq!(surface.row_text(9), ">");
    }

    #[test]
    fn output_stops_before_row_zero() {
        let mut sh = shell(4, 40);
        for i in 0..10 {
            sh.put(&format!("line {i}")).unwrap();
        }
        let surface = sh.surface();
        assert_eq!(surface.row_text(0), "");
        assert_eq!(surface.row_text(1), "line 8");
        assert_eq!(surface.row_text(2), "line 9");
    }

    #[test]
    fn long_output_is_wrapped_before_storage() {
        let mut sh = shell(10, 14);
        sh.put("alpha beta gamma delta").unwrap();
        let texts: Vec<_> = sh.backbuffer().iter().map(|e| e.text.clone()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn header_and_help_need_room() {
        let menu = Menu::new("main")
            .with_title("Main Menu")
            .with_command(Command::new("go", "Go somewhere").unwrap());

        let mut small = shell(24, 80).with_menu(menu.clone());
        small.set_header("My App");
        small.redraw().unwrap();
        assert!(small.surface().find_row("My App").is_none());
        assert!(small.surface().find_row("Main Menu").is_none());

        let mut big = shell(50, 200).with_menu(menu);
        big.set_header("My App");
        big.redraw().unwrap();
        assert_eq!(big.surface().find_row("My App"), Some(0));
        assert_eq!(big.surface().find_row("Main Menu"), Some(2));
        assert_eq!(big.surface().char_at(2, 57), Some('M'));
        assert!(big.surface().find_row("--------------------").is_some());

        big.set_help_visible(false);
        big.redraw().unwrap();
        assert!(big.surface().find_row("Main Menu").is_none());
    }

    #[test]
    fn stickers_stack_and_replace_in_place() {
        let mut sh = shell(24, 80);
        sh.sticker("one", None, None).unwrap();
        sh.sticker("two", None, None).unwrap();
        let positions: Vec<_> = sh.stickers().map(|s| s.position).collect();
        assert_eq!(positions, vec![Position::new(3, 60), Position::new(4, 60)]);

        sh.sticker("one", Some("uno"), None).unwrap();
        let uno = sh.stickers().find(|s| s.text == "uno").unwrap();
        assert_eq!(uno.position, Position::new(3, 60));
        assert_eq!(sh.surface().char_at(3, 60), Some('u'));
    }

    #[test]
    fn stickers_start_below_visible_header() {
        let mut sh = shell(60, 200);
        sh.set_header("a\nb\nc\nd\ne");
        sh.sticker("s", None, None).unwrap();
        assert_eq!(sh.stickers().next().unwrap().position.row, 6);
    }

    #[test]
    fn removed_sticker_stays_until_redraw() {
        let mut sh = shell(24, 80);
        sh.sticker("flash", None, Some(Position::new(5, 5))).unwrap();
        assert_eq!(sh.remove_sticker("flash"), 1);
        assert_eq!(sh.surface().find_row("flash"), Some(5));
        sh.redraw().unwrap();
        assert!(sh.surface().find_row("flash").is_none());
    }

    #[test]
    fn handle_requests_apply_before_next_line() {
        let mut sh = Shell::new(
            VirtualSurface::new(24, 80).with_keys(line("quit")),
            config(),
        )
        .with_menu(Menu::new("main").with_command(crate::command::builtins::quit("Test")));
        let handle = sh.handle();
        handle.put("from afar");
        handle.sticker("badge", None, Some(Position::new(2, 2)));
        let sh = sh.run().unwrap();
        assert!(sh.backbuffer().iter().any(|e| e.text == "from afar"));
        assert!(sh.stickers().any(|s| s.text == "badge"));
    }

    #[test]
    fn typed_line_is_tagged_as_command() {
        let surface = VirtualSurface::new(24, 80).with_keys(line("hello"));
        let mut sh = Shell::new(surface, config());
        assert_eq!(sh.next_line().unwrap(), "hello");
        let entry = sh.backbuffer().iter().last().unwrap();
        assert!(entry.is_command);
        assert_eq!(sh.surface().row_text(22), "> hello");
    }

    #[test]
    fn wrapped_command_is_recalled_whole() {
        let mut keys = line("echo aaaa bbbb cccc");
        keys.extend([KeyEvent::new(KeyCode::Up), KeyEvent::new(KeyCode::Enter)]);
        let mut sh = Shell::new(VirtualSurface::new(24, 14).with_keys(keys), config());

        assert_eq!(sh.next_line().unwrap(), "echo aaaa bbbb cccc");
        let tags: Vec<_> = sh.backbuffer().iter().map(|e| e.is_command).collect();
        assert_eq!(tags, vec![true, false]);
        assert_eq!(sh.next_line().unwrap(), "echo aaaa bbbb cccc");
    }

    #[test]
    fn escape_aborts_and_tears_down() {
        let surface = VirtualSurface::new(24, 80).with_keys([KeyEvent::new(KeyCode::Escape)]);
        let mut sh = Shell::new(surface, config());
        assert!(matches!(sh.next_line(), Err(ShellError::Aborted)));
        assert!(sh.surface().is_torn_down());
    }

    #[test]
    fn completion_candidates_for_names_and_hooks() {
        let cat = Command::new("cat <-f filename>", "show a file")
            .unwrap()
            .complete_with("filename", |_: &str| {
                vec!["alpha.txt".to_string(), "beta.txt".to_string()]
            });
        let menu = Menu::new("main")
            .with_command(cat)
            .with_command(Command::new("cd dir", "c").unwrap().alias("chdir"));
        let mut sh = shell(24, 80).with_menu(menu);

        sh.editor.set_buffer("c");
        assert_eq!(sh.completion_candidates(), vec!["cat", "cd", "chdir"]);
        sh.editor.set_buffer("ch");
        assert_eq!(sh.completion_candidates(), vec!["chdir"]);
        sh.editor.set_buffer("cat -f a");
        assert_eq!(sh.completion_candidates(), vec!["alpha.txt"]);
        sh.editor.set_buffer("cat -f ");
        assert_eq!(sh.completion_candidates(), vec!["alpha.txt", "beta.txt"]);
        sh.editor.set_buffer("cd x");
        assert!(sh.completion_candidates().is_empty());
    }

    #[traced_test]
    #[test]
    fn menu_transitions_are_logged() {
        let back = crate::command::builtins::back("main");
        let mut sh = shell(24, 80)
            .with_menu(Menu::new("main"))
            .with_menu(Menu::new("sub").with_command(back));
        sh.set_active_menu("sub");
        sh.dispatch("back").unwrap();
        assert_eq!(sh.active_menu_name(), "main");
        assert!(logs_contain("menu transition"));
    }
}
