//! Error taxonomy and parse-failure response policies.
//!
//! Errors fall into three families with different propagation rules:
//!
//! - [`ConfigError`] — registration-time mistakes by the CLI author
//!   (duplicate flags, invalid names, short-name collisions). These are
//!   returned directly from registration calls and are never routed through
//!   an [`ErrorPolicy`]; a misconfigured flag set is never safe to run.
//! - [`ParseError`] — user-input-driven failures found while consuming
//!   tokens. These go through the owning command's [`ErrorPolicy`].
//! - [`RunError`] — the `execute` surface: a parse failure, a missing main
//!   action, or a main action that reported an error.

use thiserror::Error;

/// How a command responds to a parse failure.
///
/// The policy is applied by a single gate ([`Command::handle`]) after every
/// dispatcher failure and is inherited by children at creation time.
///
/// [`Command::handle`]: crate::Command::handle
///
/// # Examples
///
/// ```
/// use cmdtree_core::ErrorPolicy;
///
/// assert_eq!(ErrorPolicy::default(), ErrorPolicy::ContinueOnError);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Emit the error message and return the error to the caller. Scanning
    /// resumes at the next token; the first error wins.
    #[default]
    ContinueOnError,
    /// Emit the error message, then terminate the process with status
    /// [`EXIT_USAGE`](crate::EXIT_USAGE).
    ExitOnError,
    /// Panic with the error message.
    PanicOnError,
    /// Emit the error message only; the error is not propagated.
    LogOnError,
}

/// Registration-time configuration errors.
///
/// These indicate a programming mistake in the flag/command declarations,
/// not bad user input, and always abort construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Flag name begins with `-` or contains `=`.
    #[error("invalid flag name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A flag with this name already exists on the command.
    #[error("{command}: flag redefined: {name}")]
    DuplicateFlag {
        /// The owning command's name.
        command: String,
        /// The duplicated flag name.
        name: String,
    },
    /// Two short-eligible flags share a first character.
    #[error("short name collision between {new:?} and {existing:?} flags")]
    ShortCollision {
        /// The flag being registered.
        new: String,
        /// The already-registered flag it collides with.
        existing: String,
    },
    /// An alias is already taken by a sibling's name or alias.
    #[error("the following aliases are taken: {taken:?}")]
    AliasTaken {
        /// The rejected aliases.
        taken: Vec<String>,
    },
    /// Alias registration named a child that does not exist.
    #[error("no such child command: {name}")]
    UnknownChild {
        /// The missing child name.
        name: String,
    },
}

/// Text-to-value coercion failures.
///
/// Returned by [`FlagValue::set`](crate::FlagValue::set); the dispatcher
/// wraps them in [`ParseError::InvalidValue`] together with the flag name
/// and offending literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The text is not syntactically valid for the value's type.
    #[error("parse error")]
    Parse,
    /// The text is well-formed but outside the representable range.
    #[error("value out of range")]
    Range,
}

/// Token-consumption failures, routed through the command's [`ErrorPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token named a flag the command does not define.
    #[error("unknown flag: {name}")]
    UnknownFlag {
        /// The unresolved name as typed (dashes stripped).
        name: String,
    },
    /// A non-boolean flag was given without a value.
    #[error("missing value for non-boolean flag: {name}")]
    MissingValue {
        /// The flag that needed a value.
        name: String,
    },
    /// A boolean flag was given a value, or a non-boolean short flag
    /// appeared before the end of its cluster.
    #[error("unexpected value for boolean flag: {name}")]
    UnexpectedBoolValue {
        /// The offending flag name.
        name: String,
    },
    /// A value failed to coerce into the flag's type.
    #[error("invalid value {literal:?} for flag {name}: {source}")]
    InvalidValue {
        /// The flag whose value failed.
        name: String,
        /// The offending literal text.
        literal: String,
        /// Whether the failure was syntactic or a range overflow.
        source: ValueError,
    },
}

/// Failures surfaced by [`Command::execute`](crate::Command::execute).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Argument parsing failed before the main action could run.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The command has no main action bound.
    #[error("attempted to execute command {command:?} with no main action")]
    NoMain {
        /// The command that was executed.
        command: String,
    },
    /// The main action ran and reported an error.
    #[error("{command}: {message}")]
    Main {
        /// The command whose action failed.
        command: String,
        /// The action's error message.
        message: String,
    },
}
