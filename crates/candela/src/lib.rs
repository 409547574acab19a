#![forbid(unsafe_code)]

//! Candela: menu-driven command shells for the terminal.
//!
//! An application declares [`Command`]s with a small definition grammar,
//! groups them into [`Menu`]s, and hands them to a [`Shell`] that reads
//! lines (from a script, then the keyboard), runs the matching command, and
//! moves between menus according to each command's [`Outcome`].
//!
//! ```no_run
//! use candela::prelude::*;
//!
//! fn main() -> Result<(), ShellError> {
//!     let hello = Command::new("sayhello name", "Say hello")?.on_run(|session, args| {
//!         session.put(&format!("Hello, {}!", args.positional(0).unwrap_or("friend")));
//!         Outcome::Valid
//!     });
//!     let main_menu = Menu::new("main")
//!         .with_title("Main menu")
//!         .with_command(hello)
//!         .with_command(builtins::quit("Demo"));
//!
//!     let mut shell = Shell::terminal(ShellConfig::default())?.with_menu(main_menu);
//!     shell.set_header("Demo shell");
//!     shell.run()?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod defer;
pub mod error;
pub mod menu;
pub mod session;
pub mod shell;

pub use candela_core::{KeyCode, KeyEvent, Position, SessionOptions, Surface, TerminalSession};
pub use command::{
    Arguments, Command, CommandDefinition, Completer, DefaultValidator, DefinitionError, Executor,
    Outcome, ParseError, ReturnOutcome, ValidationResult, Validator, builtins,
};
pub use config::ShellConfig;
pub use defer::{CancelToken, Deferred, defer};
pub use error::ShellError;
pub use menu::Menu;
pub use session::{Session, ShellHandle, ShellRequest};
pub use shell::{Dispatch, Shell};

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::command::builtins;
    pub use crate::{
        Arguments, Command, Dispatch, Menu, Outcome, Position, Session, Shell, ShellConfig,
        ShellError, ValidationResult, defer,
    };
}
