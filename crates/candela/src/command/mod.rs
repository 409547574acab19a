#![forbid(unsafe_code)]

//! Commands: a definition plus the strategies that validate, run, and
//! complete it.
//!
//! A [`Command`] is built from a definition string and a description, then
//! customized with builder methods:
//!
//! ```
//! use candela::command::{Command, Outcome};
//!
//! let greet = Command::new("sayhello name", "Say hello to someone")?
//!     .alias("hi")
//!     .on_run(|session, args| {
//!         session.put(&format!("Hello, {}!", args.positional(0).unwrap_or("you")));
//!         Outcome::Valid
//!     });
//! assert!(greet.matches("hi"));
//! # Ok::<(), candela::command::DefinitionError>(())
//! ```

pub mod builtins;
pub mod definition;
pub mod invocation;
pub mod validate;

use std::collections::HashMap;
use std::fmt;

pub use definition::{CommandDefinition, DefinitionError, DefinitionErrorKind, NamedSlot};
pub use invocation::{Arguments, ParseError, parse_invocation, tokenize};
pub use validate::{DefaultValidator, ValidationResult, Validator};

use crate::session::Session;

/// Result signal of running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Success; follow the command's target menu if it has one.
    Valid,
    /// The command refused the input; "Invalid command" is shown.
    Invalid,
    /// End the session.
    Quit,
    /// Return to the command's target menu.
    Back,
    /// The command failed; no menu transition happens.
    Fail,
}

/// The action a command performs.
///
/// Closures `Fn(&mut dyn Session, &Arguments) -> Outcome` implement this trait.
pub trait Executor: Send + Sync {
    fn execute(&self, session: &mut dyn Session, args: &Arguments) -> Outcome;
}

impl<F> Executor for F
where
    F: Fn(&mut dyn Session, &Arguments) -> Outcome + Send + Sync,
{
    fn execute(&self, session: &mut dyn Session, args: &Arguments) -> Outcome {
        self(session, args)
    }
}

/// Executor that does nothing and reports a fixed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnOutcome(pub Outcome);

impl Default for ReturnOutcome {
    fn default() -> Self {
        Self(Outcome::Valid)
    }
}

impl Executor for ReturnOutcome {
    fn execute(&self, _session: &mut dyn Session, _args: &Arguments) -> Outcome {
        self.0
    }
}

/// Tab-completion hook for one argument.
///
/// Receives the fragment being completed and returns candidates. The shell
/// keeps only candidates that start with the fragment.
pub trait Completer: Send + Sync {
    fn complete(&self, fragment: &str) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, fragment: &str) -> Vec<String> {
        self(fragment)
    }
}

/// A runnable command.
pub struct Command {
    definition: CommandDefinition,
    description: String,
    aliases: Vec<String>,
    validator: Box<dyn Validator>,
    executor: Box<dyn Executor>,
    target_menu: Option<String>,
    completers: HashMap<String, Box<dyn Completer>>,
    strict_flags: bool,
}

impl Command {
    /// Build a command from a definition string and a description.
    ///
    /// The command starts with [`DefaultValidator`] and an executor that
    /// returns [`Outcome::Valid`].
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if `definition` is malformed.
    pub fn new(definition: &str, description: impl Into<String>) -> Result<Self, DefinitionError> {
        Ok(Self::from_definition(
            CommandDefinition::parse(definition)?,
            description,
        ))
    }

    /// Build a command from an already parsed definition.
    pub fn from_definition(definition: CommandDefinition, description: impl Into<String>) -> Self {
        Self {
            definition,
            description: description.into(),
            aliases: Vec::new(),
            validator: Box::new(DefaultValidator),
            executor: Box::new(ReturnOutcome::default()),
            target_menu: None,
            completers: HashMap::new(),
            strict_flags: false,
        }
    }

    /// Add an alias (builder). Aliases equal to the name or to an existing
    /// alias are ignored.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if alias != self.name() && !self.aliases.contains(&alias) && !alias.is_empty() {
            self.aliases.push(alias);
        }
        self
    }

    /// Replace the validator (builder).
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the validator with a closure (builder).
    #[must_use]
    pub fn on_validate<F>(self, f: F) -> Self
    where
        F: Fn(&CommandDefinition, &Arguments) -> ValidationResult + Send + Sync + 'static,
    {
        self.validator(f)
    }

    /// Replace the executor (builder).
    #[must_use]
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Replace the executor with a closure (builder).
    #[must_use]
    pub fn on_run<F>(self, f: F) -> Self
    where
        F: Fn(&mut dyn Session, &Arguments) -> Outcome + Send + Sync + 'static,
    {
        self.executor(f)
    }

    /// Menu to switch to after a [`Outcome::Valid`] or [`Outcome::Back`] run
    /// (builder).
    #[must_use]
    pub fn target_menu(mut self, menu: impl Into<String>) -> Self {
        self.target_menu = Some(menu.into());
        self
    }

    /// Register a completion hook for the argument called `argument` (a
    /// positional slot name or a flag hint) (builder).
    #[must_use]
    pub fn complete_with(mut self, argument: impl Into<String>, hook: impl Completer + 'static) -> Self {
        self.completers.insert(argument.into(), Box::new(hook));
        self
    }

    /// Reject flags the definition does not declare (builder).
    #[must_use]
    pub fn strict_flags(mut self) -> Self {
        self.strict_flags = true;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn menu_target(&self) -> Option<&str> {
        self.target_menu.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict_flags
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.name() == token || self.aliases.iter().any(|a| a == token)
    }

    // ── Pipeline ────────────────────────────────────────────────────

    /// Parse the tokens of an input line (`tokens[0]` is the command word).
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] from [`parse_invocation`], plus
    /// [`ParseError::UnknownFlag`] for undeclared flags when the command is
    /// strict.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Arguments, ParseError> {
        let args = parse_invocation(tokens)?;
        if self.strict_flags {
            if let Some(flag) = args
                .named_map()
                .keys()
                .find(|flag| self.definition.slot(flag).is_none())
            {
                return Err(ParseError::UnknownFlag { flag: flag.clone() });
            }
        }
        Ok(args)
    }

    /// Run the configured validator.
    pub fn validate(&self, args: &Arguments) -> ValidationResult {
        self.validator.validate(&self.definition, args)
    }

    /// Run the configured executor.
    pub fn execute(&self, session: &mut dyn Session, args: &Arguments) -> Outcome {
        self.executor.execute(session, args)
    }

    // ── Completion ──────────────────────────────────────────────────

    /// Name of the argument being typed.
    ///
    /// `words` are the words already on the line, command word included.
    /// With `new_word` the user is starting a fresh word after them;
    /// otherwise the last word is the one under completion. A word following
    /// an open flag maps to that flag's hint (or the bare flag name when
    /// undeclared); any other word maps to the positional slot at its index.
    pub fn completion_target(&self, words: &[&str], new_word: bool) -> Option<String> {
        let current = if new_word {
            words.len()
        } else {
            words.len().checked_sub(1)?
        };
        if current == 0 {
            return None;
        }
        if !new_word && words[current].contains('-') {
            return None;
        }

        let mut open: Option<&str> = None;
        let mut positional = 0usize;
        for word in &words[1..current] {
            if word.contains('-') {
                open = Some(word.trim_matches('-'));
            } else if open.take().is_none() {
                positional += 1;
            }
        }

        match open {
            Some(flag) => Some(
                self.definition
                    .slot(flag)
                    .map_or_else(|| flag.to_string(), |slot| slot.hint.clone()),
            ),
            None => self.definition.positionals().get(positional).cloned(),
        }
    }

    /// Ask the hook registered for `argument`, keeping candidates that
    /// start with `fragment`. `None` when no hook is registered.
    pub fn completions(&self, argument: &str, fragment: &str) -> Option<Vec<String>> {
        let hook = self.completers.get(argument)?;
        Some(
            hook.complete(fragment)
                .into_iter()
                .filter(|candidate| candidate.starts_with(fragment))
                .collect(),
        )
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("definition", &self.definition)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("target_menu", &self.target_menu)
            .field("completers", &self.completers.keys().collect::<Vec<_>>())
            .field("strict_flags", &self.strict_flags)
            .finish_non_exhaustive()
    }
}

/// Help rendering: the definition, the indented description, and the aliases
/// line when there are any.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n    {}", self.definition, self.description)?;
        if !self.aliases.is_empty() {
            write!(f, "\n    Aliases: {}", self.aliases.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> Command {
        Command::new("named my_arg <-f filename> [-g othername]", "Named args").unwrap()
    }

    #[test]
    fn new_rejects_bad_definition() {
        assert!(Command::new("cmd <-f", "broken").is_err());
    }

    #[test]
    fn aliases_are_deduplicated() {
        let cmd = Command::new("quit", "Quit")
            .unwrap()
            .alias("q")
            .alias("q")
            .alias("quit");
        assert_eq!(cmd.aliases(), ["q"]);
        assert!(cmd.matches("quit"));
        assert!(cmd.matches("q"));
        assert!(!cmd.matches("qu"));
    }

    #[test]
    fn display_includes_aliases() {
        let cmd = Command::new("quit", "Quit the app").unwrap().alias("q").alias("exit");
        assert_eq!(cmd.to_string(), "quit\n    Quit the app\n    Aliases: q,exit");
        let bare = Command::new("back", "Go back").unwrap();
        assert_eq!(bare.to_string(), "back\n    Go back");
    }

    #[test]
    fn parse_is_permissive_by_default() {
        let args = named().parse(&["named", "hi", "-x", "1"]).unwrap();
        assert_eq!(args.named("x"), Some("1"));
    }

    #[test]
    fn strict_rejects_undeclared_flags() {
        let cmd = named().strict_flags();
        assert_eq!(
            cmd.parse(&["named", "hi", "-x", "1"]).unwrap_err(),
            ParseError::UnknownFlag { flag: "x".into() }
        );
        assert!(cmd.parse(&["named", "hi", "-f", "a"]).is_ok());
    }

    #[test]
    fn named_example_validates() {
        let cmd = named();
        let args = cmd.parse(&["named", "hi", "-f", "a.txt"]).unwrap();
        assert_eq!(args.positionals(), ["hi"]);
        assert_eq!(args.named("f"), Some("a.txt"));
        assert!(cmd.validate(&args).is_valid());

        let args = cmd.parse(&["named", "hi"]).unwrap();
        let verdict = cmd.validate(&args);
        assert!(verdict.message().is_some_and(|m| m.contains("-f")));
    }

    #[test]
    fn completion_target_maps_words_to_arguments() {
        let cmd = named();
        assert_eq!(cmd.completion_target(&["named"], true).as_deref(), Some("my_arg"));
        assert_eq!(cmd.completion_target(&["named", "h"], false).as_deref(), Some("my_arg"));
        assert_eq!(
            cmd.completion_target(&["named", "hi", "-f"], true).as_deref(),
            Some("filename")
        );
        assert_eq!(
            cmd.completion_target(&["named", "hi", "-g", "fi"], false).as_deref(),
            Some("othername")
        );
        assert_eq!(cmd.completion_target(&["named", "hi"], true), None);
        assert_eq!(cmd.completion_target(&["named", "hi", "-"], false), None);
        assert_eq!(cmd.completion_target(&["named"], false), None);
    }

    #[test]
    fn completions_filter_by_prefix() {
        let cmd = named().complete_with("filename", |_: &str| {
            vec!["alpha.txt".to_string(), "beta.txt".to_string(), "alps".to_string()]
        });
        assert_eq!(
            cmd.completions("filename", "al"),
            Some(vec!["alpha.txt".to_string(), "alps".to_string()])
        );
        assert_eq!(cmd.completions("othername", "al"), None);
    }

    #[test]
    fn return_outcome_defaults_to_valid() {
        assert_eq!(ReturnOutcome::default(), ReturnOutcome(Outcome::Valid));
    }
}
