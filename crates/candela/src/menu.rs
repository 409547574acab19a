#![forbid(unsafe_code)]

//! Menus: named, ordered groups of commands.
//!
//! A shell has one active menu at a time; input is matched only against its
//! commands. Commands are shared as `Arc<Command>` so the same command can be
//! listed in several menus.

use std::sync::Arc;

use crate::command::Command;

/// A named command registry.
#[derive(Debug, Clone)]
pub struct Menu {
    name: String,
    title: String,
    commands: Vec<Arc<Command>>,
}

impl Menu {
    /// Create an empty menu. The title defaults to the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            commands: Vec::new(),
        }
    }

    /// Set the title (builder).
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a command (builder).
    #[must_use]
    pub fn with_command(mut self, command: impl Into<Arc<Command>>) -> Self {
        self.push(command);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Append a command.
    pub fn push(&mut self, command: impl Into<Arc<Command>>) {
        self.commands.push(command.into());
    }

    /// Remove every command named `name`, returning the first one removed.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Command>> {
        let first = self.commands.iter().position(|c| c.name() == name)?;
        let removed = self.commands.remove(first);
        self.commands.retain(|c| c.name() != name);
        Some(removed)
    }

    /// The first command whose name or alias is `token`.
    pub fn find(&self, token: &str) -> Option<&Arc<Command>> {
        self.commands.iter().find(|c| c.matches(token))
    }

    /// Help text: every command's rendering followed by a newline.
    pub fn options(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            out.push_str(&command.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(def: &str) -> Command {
        Command::new(def, format!("{def} help")).unwrap()
    }

    #[test]
    fn title_defaults_to_name() {
        let menu = Menu::new("main");
        assert_eq!(menu.title(), "main");
        assert_eq!(menu.with_title("Main Menu").title(), "Main Menu");
    }

    #[test]
    fn find_matches_name_and_alias_first_wins() {
        let first = cmd("go").alias("g");
        let second = Command::new("g", "shadowed").unwrap();
        let menu = Menu::new("m").with_command(first).with_command(second);
        assert_eq!(menu.find("g").map(|c| c.name()), Some("go"));
        assert_eq!(menu.find("go").map(|c| c.name()), Some("go"));
        assert!(menu.find("x").is_none());
    }

    #[test]
    fn remove_drops_all_with_name() {
        let mut menu = Menu::new("m")
            .with_command(cmd("a"))
            .with_command(cmd("b"))
            .with_command(cmd("a"));
        assert!(menu.remove("a").is_some());
        assert_eq!(menu.len(), 1);
        assert!(menu.remove("a").is_none());
    }

    #[test]
    fn options_lists_every_command() {
        let menu = Menu::new("m")
            .with_command(cmd("a"))
            .with_command(cmd("b x").alias("bb"));
        assert_eq!(menu.options(), "a\n    a help\nb x\n    b x help\n    Aliases: bb\n");
    }

    #[test]
    fn shared_commands() {
        let quit = Arc::new(cmd("quit"));
        let a = Menu::new("a").with_command(Arc::clone(&quit));
        let b = Menu::new("b").with_command(quit);
        assert!(Arc::ptr_eq(&a.commands()[0], &b.commands()[0]));
    }
}
