#![forbid(unsafe_code)]

//! Argument validation strategies.

use super::definition::CommandDefinition;
use super::invocation::Arguments;

/// Verdict of a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The arguments are acceptable.
    Valid,
    /// The arguments are rejected; the message is shown to the user.
    Invalid(String),
}

impl ValidationResult {
    /// Whether the verdict is [`ValidationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The rejection message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

/// Decides whether parsed arguments satisfy a command's definition.
///
/// Closures `Fn(&CommandDefinition, &Arguments) -> ValidationResult` implement
/// this trait, so a custom validator can wrap [`DefaultValidator`]:
///
/// ```
/// use candela::command::{CommandDefinition, DefaultValidator, ValidationResult, Validator};
///
/// let only_short = |def: &CommandDefinition, args: &candela::command::Arguments| {
///     match DefaultValidator.validate(def, args) {
///         ValidationResult::Valid if args.positional(0).is_some_and(|a| a.len() > 8) => {
///             ValidationResult::Invalid("Name too long".into())
///         }
///         verdict => verdict,
///     }
/// };
/// # let _ = only_short;
/// ```
pub trait Validator: Send + Sync {
    fn validate(&self, definition: &CommandDefinition, args: &Arguments) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&CommandDefinition, &Arguments) -> ValidationResult + Send + Sync,
{
    fn validate(&self, definition: &CommandDefinition, args: &Arguments) -> ValidationResult {
        self(definition, args)
    }
}

/// Requires every positional slot and every required flag.
///
/// The arguments pass when at least `positionals + required flags` values were
/// supplied and each required flag appears among them. A short count lists
/// the slots still unfilled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultValidator;

impl Validator for DefaultValidator {
    fn validate(&self, definition: &CommandDefinition, args: &Arguments) -> ValidationResult {
        if args.len() < definition.required_count() {
            let mut missing: Vec<String> = definition
                .positionals()
                .iter()
                .skip(args.positionals().len())
                .cloned()
                .collect();
            missing.extend(
                definition
                    .required_flags()
                    .filter(|slot| !args.has_flag(&slot.flag.to_string()))
                    .map(|slot| format!("{} (-{})", slot.hint, slot.flag)),
            );
            if missing.is_empty() {
                return ValidationResult::Invalid("Missing arguments".to_string());
            }
            return ValidationResult::Invalid(format!("Missing arguments: {}", missing.join(", ")));
        }
        for slot in definition.required_flags() {
            if !args.has_flag(&slot.flag.to_string()) {
                return ValidationResult::Invalid(format!(
                    "Missing argument {} (-{})",
                    slot.hint, slot.flag
                ));
            }
        }
        ValidationResult::Valid
    }
}
