#![forbid(unsafe_code)]

//! Invocation parsing: turning an input line into [`Arguments`].
//!
//! The line is split on whitespace. The first token is the command word and is
//! skipped; every later token is either a positional value or part of a
//! `-flag value` pair. Any token containing `-` opens a flag, and the token
//! after it is the flag's value. Values never start a new flag, so a value
//! cannot contain `-`.

use std::collections::BTreeMap;
use std::fmt;

/// Split an input line into whitespace-separated tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parsed arguments of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    positionals: Vec<String>,
    named: BTreeMap<String, String>,
}

impl Arguments {
    /// Positional values in input order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// The positional value at `index`.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// The value given for `-flag`.
    pub fn named(&self, flag: &str) -> Option<&str> {
        self.named.get(flag).map(String::as_str)
    }

    /// All flag/value pairs, ordered by flag.
    pub fn named_map(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// Whether `-flag` was given.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.named.contains_key(flag)
    }

    /// Total supplied arguments (positionals plus flags).
    pub fn len(&self) -> usize {
        self.positionals.len() + self.named.len()
    }

    /// Whether no argument was supplied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse the tokens of an input line. `tokens[0]` is the command word.
///
/// A repeated flag keeps its last value.
///
/// # Errors
///
/// [`ParseError::UnexpectedFlag`] when a flag appears while another is still
/// waiting for its value, [`ParseError::MissingValue`] when the line ends on a
/// flag.
pub fn parse_invocation<S: AsRef<str>>(tokens: &[S]) -> Result<Arguments, ParseError> {
    let mut args = Arguments::default();
    let mut open: Option<String> = None;

    for token in tokens.iter().skip(1).map(AsRef::as_ref) {
        if token.contains('-') {
            if let Some(flag) = open {
                return Err(ParseError::UnexpectedFlag {
                    pending: flag,
                    token: token.to_string(),
                });
            }
            open = Some(token.trim_matches('-').to_string());
        } else if let Some(flag) = open.take() {
            args.named.insert(flag, token.to_string());
        } else {
            args.positionals.push(token.to_string());
        }
    }

    match open {
        Some(flag) => Err(ParseError::MissingValue { flag }),
        None => Ok(args),
    }
}

/// Error type for malformed invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A flag token arrived while `pending` still had no value.
    UnexpectedFlag { pending: String, token: String },
    /// The input ended while `flag` still had no value.
    MissingValue { flag: String },
    /// The command only accepts its declared flags.
    UnknownFlag { flag: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedFlag { pending, token } => write!(
                f,
                "Unexpected '-' in command input: {token} follows -{pending}, which needs a value"
            ),
            Self::MissingValue { flag } => {
                write!(f, "Unexpected end of command input: -{flag} needs a value")
            }
            Self::UnknownFlag { flag } => write!(f, "Unknown flag -{flag}"),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Arguments, ParseError> {
        parse_invocation(&tokenize(line))
    }

    #[test]
    fn command_word_is_skipped() {
        let args = parse("sayhello").unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn positionals_and_flags() {
        let args = parse("named arg1 -f file1 -g file2").unwrap();
        assert_eq!(args.positionals(), ["arg1"]);
        assert_eq!(args.named("f"), Some("file1"));
        assert_eq!(args.named("g"), Some("file2"));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn positionals_may_follow_flags() {
        let args = parse("cmd -f x tail").unwrap();
        assert_eq!(args.positionals(), ["tail"]);
        assert_eq!(args.named("f"), Some("x"));
    }

    #[test]
    fn dashes_are_trimmed_from_flag_names() {
        let args = parse("cmd --f x").unwrap();
        assert_eq!(args.named("f"), Some("x"));
    }

    #[test]
    fn repeated_flag_keeps_last_value() {
        let args = parse("cmd -f a -f b").unwrap();
        assert_eq!(args.named("f"), Some("b"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn any_token_with_a_dash_opens_a_flag() {
        assert_eq!(
            parse("cmd a-b").unwrap_err(),
            ParseError::MissingValue { flag: "a-b".into() }
        );
    }

    #[test]
    fn flag_after_flag_fails() {
        assert_eq!(
            parse("cmd -f -g x").unwrap_err(),
            ParseError::UnexpectedFlag {
                pending: "f".into(),
                token: "-g".into()
            }
        );
    }

    #[test]
    fn trailing_flag_fails() {
        let err = parse("cmd x -f").unwrap_err();
        assert_eq!(err, ParseError::MissingValue { flag: "f".into() });
        assert!(err.to_string().starts_with("Unexpected end of command input"));
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  a \t b  "), vec!["a", "b"]);
        assert!(tokenize("   ").is_empty());
    }
}
