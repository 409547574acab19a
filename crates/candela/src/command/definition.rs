#![forbid(unsafe_code)]

//! Command definition grammar.
//!
//! A definition names a command and declares the arguments it takes:
//!
//! ```text
//! definition ::= name positional* (required | optional)*
//! required   ::= "<" "-" flag SPACE hint ">"
//! optional   ::= "[" "-" flag SPACE hint "]"
//! ```
//!
//! Bare words after the name are positional slots (always required). A
//! bracketed slot declares a single-character flag and a human-readable hint;
//! angle brackets make it required, square brackets optional.
//!
//! Definitions are parsed once, when a command is built, so every error here
//! is a configuration error.
//!
//! # Example
//! ```
//! use candela::command::CommandDefinition;
//!
//! let def: CommandDefinition = "named my_arg <-f filename> [-g othername]".parse()?;
//! assert_eq!(def.name(), "named");
//! assert_eq!(def.positionals(), ["my_arg"]);
//! assert_eq!(def.required_flags().count(), 1);
//! assert_eq!(def.to_string(), "named my_arg <-f filename> [-g othername]");
//! # Ok::<(), candela::command::DefinitionError>(())
//! ```

use std::fmt;
use std::str::FromStr;

const BRACKETS: [char; 4] = ['<', '>', '[', ']'];

/// One declared named argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSlot {
    /// The single-character flag (`f` for `-f`).
    pub flag: char,
    /// Hint shown in help; also the key completion hooks are registered under.
    pub hint: String,
    /// `true` for `<...>` slots.
    pub required: bool,
}

impl fmt::Display for NamedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "<-{} {}>", self.flag, self.hint)
        } else {
            write!(f, "[-{} {}]", self.flag, self.hint)
        }
    }
}

/// A parsed command definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    name: String,
    positionals: Vec<String>,
    named: Vec<NamedSlot>,
}

impl CommandDefinition {
    /// Parse a definition string.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for an empty definition, unbalanced or
    /// nested brackets, malformed or duplicate flags, and slots without a hint.
    pub fn parse(definition: &str) -> Result<Self, DefinitionError> {
        DefinitionParser::new(definition).parse()
    }

    /// Build a definition from a name and positional slots only.
    pub(crate) fn literal(name: &str, positionals: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            positionals: positionals.iter().map(|p| (*p).to_string()).collect(),
            named: Vec::new(),
        }
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional slot names in declaration order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Named slots in declaration order.
    pub fn named(&self) -> &[NamedSlot] {
        &self.named
    }

    /// Look up a named slot by flag text (`"f"`). Multi-character text never
    /// matches.
    pub fn slot(&self, flag: &str) -> Option<&NamedSlot> {
        let mut chars = flag.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        self.named.iter().find(|slot| slot.flag == c)
    }

    /// Required named slots.
    pub fn required_flags(&self) -> impl Iterator<Item = &NamedSlot> {
        self.named.iter().filter(|slot| slot.required)
    }

    /// Minimum number of arguments a valid invocation supplies: every
    /// positional plus every required flag.
    pub fn required_count(&self) -> usize {
        self.positionals.len() + self.required_flags().count()
    }
}

impl FromStr for CommandDefinition {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical rendering: name, positionals, then named slots in declaration
/// order, single-space separated. Re-parsing it yields an equal definition.
impl fmt::Display for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for positional in &self.positionals {
            write!(f, " {positional}")?;
        }
        for slot in &self.named {
            write!(f, " {slot}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Required,
    Optional,
}

impl Bracket {
    fn open(self) -> char {
        match self {
            Self::Required => '<',
            Self::Optional => '[',
        }
    }

    fn from_open(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Required),
            '[' => Some(Self::Optional),
            _ => None,
        }
    }

    fn from_close(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Required),
            ']' => Some(Self::Optional),
            _ => None,
        }
    }
}

struct OpenSlot<'a> {
    bracket: Bracket,
    flag: char,
    hint: Vec<&'a str>,
}

struct DefinitionParser<'a> {
    source: &'a str,
    positionals: Vec<String>,
    named: Vec<NamedSlot>,
    open: Option<OpenSlot<'a>>,
}

impl<'a> DefinitionParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            positionals: Vec::new(),
            named: Vec::new(),
            open: None,
        }
    }

    fn error(&self, kind: DefinitionErrorKind) -> DefinitionError {
        DefinitionError {
            definition: self.source.to_string(),
            kind,
        }
    }

    fn parse(mut self) -> Result<CommandDefinition, DefinitionError> {
        let mut tokens = self.source.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| self.error(DefinitionErrorKind::Empty))?;
        if name.contains(BRACKETS) {
            return Err(self.error(DefinitionErrorKind::StrayBracket(name.to_string())));
        }

        for token in tokens {
            self.token(token)?;
        }

        if let Some(open) = &self.open {
            return Err(self.error(DefinitionErrorKind::Unterminated(open.bracket.open())));
        }

        Ok(CommandDefinition {
            name: name.to_string(),
            positionals: self.positionals,
            named: self.named,
        })
    }

    fn token(&mut self, token: &'a str) -> Result<(), DefinitionError> {
        if !token.contains(BRACKETS) {
            match &mut self.open {
                Some(open) => open.hint.push(token),
                None => self.positionals.push(token.to_string()),
            }
            return Ok(());
        }

        let first = token.chars().next().unwrap_or_default();
        let last = token.chars().last().unwrap_or_default();

        if let Some(bracket) = Bracket::from_open(first) {
            if self.open.is_some() {
                return Err(self.error(DefinitionErrorKind::UnexpectedOpen(first)));
            }
            let closes_here = token.len() > 1 && Bracket::from_close(last).is_some();
            let body = if closes_here {
                &token[1..token.len() - 1]
            } else {
                &token[1..]
            };
            let flag = self.flag(body)?;
            if closes_here {
                // `<-f>`: a slot must carry a hint.
                return Err(self.error(DefinitionErrorKind::MissingHint(flag)));
            }
            self.open = Some(OpenSlot {
                bracket,
                flag,
                hint: Vec::new(),
            });
            return Ok(());
        }

        if let Some(bracket) = Bracket::from_close(last) {
            let piece = &token[..token.len() - 1];
            if piece.contains(BRACKETS) {
                return Err(self.error(DefinitionErrorKind::StrayBracket(token.to_string())));
            }
            let Some(mut open) = self.open.take() else {
                return Err(self.error(DefinitionErrorKind::UnexpectedClose(last)));
            };
            if open.bracket != bracket {
                return Err(self.error(DefinitionErrorKind::UnexpectedClose(last)));
            }
            if !piece.is_empty() {
                open.hint.push(piece);
            }
            if open.hint.is_empty() {
                return Err(self.error(DefinitionErrorKind::MissingHint(open.flag)));
            }
            self.named.push(NamedSlot {
                flag: open.flag,
                hint: open.hint.join(" "),
                required: open.bracket == Bracket::Required,
            });
            return Ok(());
        }

        Err(self.error(DefinitionErrorKind::StrayBracket(token.to_string())))
    }

    /// Validate `-x` and return `x`.
    fn flag(&self, body: &str) -> Result<char, DefinitionError> {
        let bad = || self.error(DefinitionErrorKind::BadFlag(body.to_string()));
        let Some(stripped) = body.strip_prefix('-') else {
            return Err(bad());
        };
        let stripped = stripped.trim_start_matches('-');
        let mut chars = stripped.chars();
        let (Some(flag), None) = (chars.next(), chars.next()) else {
            return Err(bad());
        };
        if BRACKETS.contains(&flag) {
            return Err(bad());
        }
        if self.named.iter().any(|slot| slot.flag == flag) {
            return Err(self.error(DefinitionErrorKind::DuplicateFlag(flag)));
        }
        Ok(flag)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// What went wrong while parsing a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionErrorKind {
    /// The definition has no name.
    Empty,
    /// An opening bracket while another slot is still open.
    UnexpectedOpen(char),
    /// A closing bracket with no matching opener.
    UnexpectedClose(char),
    /// The definition ended inside a slot.
    Unterminated(char),
    /// A slot flag that is not `-` followed by exactly one character.
    BadFlag(String),
    /// The same flag declared twice.
    DuplicateFlag(char),
    /// A slot with no hint text.
    MissingHint(char),
    /// A bracket character in the middle of a token.
    StrayBracket(String),
}

/// Error type for malformed command definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionError {
    /// The definition string that failed.
    pub definition: String,
    /// The failure.
    pub kind: DefinitionErrorKind,
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid command definition {:?}: ", self.definition)?;
        match &self.kind {
            DefinitionErrorKind::Empty => write!(f, "missing command name"),
            DefinitionErrorKind::UnexpectedOpen(c) => write!(f, "encountered unexpected '{c}'"),
            DefinitionErrorKind::UnexpectedClose(c) => write!(f, "encountered unexpected '{c}'"),
            DefinitionErrorKind::Unterminated(c) => {
                write!(f, "unexpected end of definition, '{c}' is never closed")
            }
            DefinitionErrorKind::BadFlag(text) => {
                write!(f, "flag {text:?} must be '-' followed by one character")
            }
            DefinitionErrorKind::DuplicateFlag(c) => write!(f, "flag -{c} declared twice"),
            DefinitionErrorKind::MissingHint(c) => write!(f, "flag -{c} has no hint"),
            DefinitionErrorKind::StrayBracket(token) => {
                write!(f, "misplaced bracket in {token:?}")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}
