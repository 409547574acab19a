#![forbid(unsafe_code)]

//! Shell configuration.

use std::path::PathBuf;

use candela_core::event::KeyCode;
use candela_core::terminal_session::SessionOptions;

/// Configuration for a [`Shell`](crate::shell::Shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Text drawn before the input line.
    pub prompt: String,
    /// Script whose lines are run before interactive input. A missing file
    /// means no script.
    pub script: Option<PathBuf>,
    /// Maximum number of output rows kept.
    pub scrollback: usize,
    /// Columns left free at the right edge when wrapping output.
    pub wrap_margin: u16,
    /// Gap between the header block and the help panel.
    pub header_right_margin: u16,
    /// Columns needed beyond the header width to show header and help.
    pub help_min_extra_cols: u16,
    /// Rows needed beyond the header height to show header and help.
    pub help_min_extra_rows: u16,
    /// Width of the rule under the help title.
    pub help_rule_width: usize,
    /// Whether the help panel starts visible.
    pub show_help: bool,
    /// Row of the first default-placed sticker when no header is shown.
    pub sticker_top_row: u16,
    /// Default stickers sit this many columns left of the right edge.
    pub sticker_right_inset: u16,
    /// Key that aborts the shell from the input line.
    pub quit_key: KeyCode,
    /// Exit the process on abort instead of returning
    /// [`ShellError::Aborted`](crate::error::ShellError::Aborted).
    pub exit_on_abort: bool,
    /// Terminal session options used by [`Shell::terminal`](crate::shell::Shell::terminal).
    pub session: SessionOptions,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            script: None,
            scrollback: 200,
            wrap_margin: 3,
            header_right_margin: 50,
            help_min_extra_cols: 80,
            help_min_extra_rows: 40,
            help_rule_width: 20,
            show_help: true,
            sticker_top_row: 3,
            sticker_right_inset: 20,
            quit_key: KeyCode::Escape,
            exit_on_abort: true,
            session: SessionOptions {
                alternate_screen: true,
            },
        }
    }
}

impl ShellConfig {
    /// Set the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Run the lines of `path` before reading interactive input.
    #[must_use]
    pub fn with_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = Some(path.into());
        self
    }

    /// Set the scrollback capacity.
    #[must_use]
    pub fn with_scrollback(mut self, rows: usize) -> Self {
        self.scrollback = rows;
        self
    }

    /// Set the wrap margin.
    #[must_use]
    pub fn with_wrap_margin(mut self, cols: u16) -> Self {
        self.wrap_margin = cols;
        self
    }

    /// Set the space needed around the header for the help panel.
    #[must_use]
    pub fn with_help_thresholds(mut self, extra_cols: u16, extra_rows: u16) -> Self {
        self.help_min_extra_cols = extra_cols;
        self.help_min_extra_rows = extra_rows;
        self
    }

    /// Start with the help panel shown or hidden.
    #[must_use]
    pub fn with_help(mut self, visible: bool) -> Self {
        self.show_help = visible;
        self
    }

    /// Set where default-placed stickers go.
    #[must_use]
    pub fn with_sticker_defaults(mut self, top_row: u16, right_inset: u16) -> Self {
        self.sticker_top_row = top_row;
        self.sticker_right_inset = right_inset;
        self
    }

    /// Set the abort key.
    #[must_use]
    pub fn with_quit_key(mut self, key: KeyCode) -> Self {
        self.quit_key = key;
        self
    }

    /// Return [`ShellError::Aborted`](crate::error::ShellError::Aborted) on
    /// abort instead of exiting the process.
    #[must_use]
    pub fn without_exit_on_abort(mut self) -> Self {
        self.exit_on_abort = false;
        self
    }

    /// Set the terminal session options.
    #[must_use]
    pub fn with_session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }
}
