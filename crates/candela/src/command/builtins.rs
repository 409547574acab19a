#![forbid(unsafe_code)]

//! Stock commands most shells want.

use std::path::Path;

use super::{Command, CommandDefinition, Outcome};

/// `quit`: ends the session.
pub fn quit(app_name: &str) -> Command {
    Command::from_definition(
        CommandDefinition::literal("quit", &[]),
        format!("Quit {app_name}"),
    )
    .on_run(|_, _| Outcome::Quit)
}

/// `back`: returns to `menu`.
pub fn back(menu: &str) -> Command {
    Command::from_definition(
        CommandDefinition::literal("back", &[]),
        format!("Back to the {menu} menu"),
    )
    .target_menu(menu)
    .on_run(|_, _| Outcome::Back)
}

/// `run scriptfile`: loads a script file and runs it before reading more
/// interactive input.
pub fn run_script() -> Command {
    Command::from_definition(
        CommandDefinition::literal("run", &["scriptfile"]),
        "Run a script file",
    )
    .on_run(|session, args| match args.positional(0) {
        Some(path) => {
            session.run_script(Path::new(path));
            Outcome::Valid
        }
        None => Outcome::Fail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_describes_the_app() {
        let cmd = quit("Demo");
        assert_eq!(cmd.name(), "quit");
        assert_eq!(cmd.description(), "Quit Demo");
    }

    #[test]
    fn back_targets_its_menu() {
        let cmd = back("main");
        assert_eq!(cmd.menu_target(), Some("main"));
        assert_eq!(cmd.description(), "Back to the main menu");
    }

    #[test]
    fn run_requires_a_script_path() {
        let cmd = run_script();
        assert_eq!(cmd.definition().to_string(), "run scriptfile");
        let args = cmd.parse(&["run"]).unwrap();
        assert!(!cmd.validate(&args).is_valid());
    }
}
