//! Flag descriptors and the per-command flag registry.
//!
//! A [`FlagRegistry`] maps flag names to [`Flag`] descriptors for one
//! command. It enforces the naming invariants at registration time (no
//! leading dash, no embedded `=`, no duplicates, pairwise-distinct first
//! characters among short-eligible flags) and resolves short and long
//! references during dispatch.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ConfigError, ParseError, ValueError};
use crate::value::FlagValue;

/// One registered flag: its metadata and owned value box.
#[derive(Debug)]
pub struct Flag {
    /// Name as it appears on the command line (no dashes).
    pub name: String,
    /// Human description for usage text.
    pub description: String,
    /// The default value rendered as text at registration time.
    pub default_text: String,
    /// Whether the flag may be referenced by its first character in a
    /// clustered short token.
    pub short: bool,
    /// The typed value box.
    pub value: FlagValue,
}

impl Flag {
    /// One usage line: `-v, --verbose\tdesc [default: x]` for
    /// short-eligible flags, `--name\tdesc [default: x]` otherwise.
    pub fn usage_line(&self) -> String {
        let forms = if self.short {
            let initial = self.name.chars().next().unwrap_or('?');
            format!("-{initial}, --{}", self.name)
        } else {
            format!("--{}", self.name)
        };
        format!("{forms}\t{} [default: {}]", self.description, self.default_text)
    }

    /// Extracts a back-quoted placeholder from the description.
    ///
    /// Given ``"a `name` to show"`` this returns `("name", "a name to
    /// show")`. Without back quotes the placeholder is the value kind's
    /// name, or the empty string for booleans.
    pub fn unquote_description(&self) -> (String, String) {
        if let Some(open) = self.description.find('`') {
            if let Some(len) = self.description[open + 1..].find('`') {
                let name = self.description[open + 1..open + 1 + len].to_string();
                let usage = format!(
                    "{}{}{}",
                    &self.description[..open],
                    name,
                    &self.description[open + len + 2..]
                );
                return (name, usage);
            }
        }
        (self.value.kind().to_string(), self.description.clone())
    }

    /// Whether the registered default renders the same as the value kind's
    /// zero value. Function flags always count as zero-defaulted.
    pub fn default_is_zero(&self) -> bool {
        match self.value.zeroed() {
            Some(zero) => zero.render() == self.default_text,
            None => true,
        }
    }
}

/// The formal and actual flag sets of one command.
///
/// `formal` is every registered flag; `actual` is the subset set during the
/// most recent parse. `actual ⊆ formal` always holds because only
/// successfully applied formal names are marked.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagRegistry, FlagValue};
///
/// let mut flags = FlagRegistry::new("demo", "help");
/// flags.register("verbose", "chatty output", FlagValue::Bool(false), true).unwrap();
///
/// assert_eq!(flags.accepts("verbose"), Some("verbose"));
/// assert_eq!(flags.accepts("v"), Some("verbose"));
/// assert_eq!(flags.accepts("x"), None);
/// ```
#[derive(Debug)]
pub struct FlagRegistry {
    command: String,
    help_name: String,
    formal: BTreeMap<String, Flag>,
    actual: BTreeSet<String>,
}

impl FlagRegistry {
    /// Creates an empty registry for the named command. `help_name` is the
    /// designated help flag, whose short-eligibility yields to later
    /// registrations instead of colliding.
    pub fn new(command: &str, help_name: &str) -> Self {
        FlagRegistry {
            command: command.to_string(),
            help_name: help_name.to_string(),
            formal: BTreeMap::new(),
            actual: BTreeSet::new(),
        }
    }

    /// The designated help flag name.
    pub fn help_name(&self) -> &str {
        &self.help_name
    }

    pub(crate) fn set_help_name(&mut self, name: &str) {
        self.help_name = name.to_string();
    }

    pub(crate) fn set_command_name(&mut self, name: &str) {
        self.command = name.to_string();
    }

    /// Registers a flag, rendering and remembering its default.
    ///
    /// Fails with a [`ConfigError`] when the name starts with `-`, contains
    /// `=`, duplicates an existing flag, or (for short-eligible flags)
    /// shares a first character with another short-eligible flag. The one
    /// exception: when the colliding flag is the designated help flag, the
    /// help flag's short-eligibility is silently revoked in favor of the
    /// new flag.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        value: FlagValue,
        short: bool,
    ) -> Result<(), ConfigError> {
        if name.starts_with('-') {
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
                reason: "begins with -",
            });
        }
        if name.contains('=') {
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
                reason: "contains =",
            });
        }
        if self.formal.contains_key(name) {
            return Err(ConfigError::DuplicateFlag {
                command: self.command.clone(),
                name: name.to_string(),
            });
        }
        if short {
            let initial = name.chars().next();
            let colliding: Vec<String> = self
                .formal
                .values()
                .filter(|other| other.short && other.name.chars().next() == initial)
                .map(|other| other.name.clone())
                .collect();
            for other in colliding {
                if other == self.help_name {
                    // the help flag yields its abbreviation
                    if let Some(help) = self.formal.get_mut(&other) {
                        help.short = false;
                    }
                } else {
                    return Err(ConfigError::ShortCollision {
                        new: name.to_string(),
                        existing: other,
                    });
                }
            }
        }

        let default_text = value.render();
        self.formal.insert(
            name.to_string(),
            Flag {
                name: name.to_string(),
                description: description.to_string(),
                default_text,
                short,
                value,
            },
        );
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Flag> {
        self.actual.remove(name);
        self.formal.remove(name)
    }

    /// Resolves a candidate token to a formal flag name: an exact match, or
    /// a single character matching the first character of a short-eligible
    /// flag's name.
    pub fn accepts(&self, candidate: &str) -> Option<&str> {
        if let Some((name, _)) = self.formal.get_key_value(candidate) {
            return Some(name.as_str());
        }
        let mut chars = candidate.chars();
        let initial = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.formal
            .values()
            .find(|flag| flag.short && flag.name.chars().next() == Some(initial))
            .map(|flag| flag.name.as_str())
    }

    /// The named flag, if registered.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.formal.get(name)
    }

    /// Mutable access to the named flag.
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.formal.get_mut(name)
    }

    /// Applies `text` to the named flag's value box and marks the flag set
    /// on success. The name must already be resolved (exact).
    pub(crate) fn apply(&mut self, name: &str, text: &str) -> Result<(), ValueError> {
        let flag = self.formal.get_mut(name).ok_or(ValueError::Parse)?;
        flag.value.set(text)?;
        self.mark_set(name);
        Ok(())
    }

    /// Sets the named flag from text, resolving the exact name only.
    ///
    /// This is the programmatic counterpart of a command-line assignment.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), ParseError> {
        if !self.formal.contains_key(name) {
            return Err(ParseError::UnknownFlag {
                name: name.to_string(),
            });
        }
        self.apply(name, text).map_err(|source| ParseError::InvalidValue {
            name: name.to_string(),
            literal: text.to_string(),
            source,
        })
    }

    /// Idempotently records that the named flag was set. Unknown names are
    /// ignored, preserving `actual ⊆ formal`.
    pub fn mark_set(&mut self, name: &str) {
        if self.formal.contains_key(name) {
            self.actual.insert(name.to_string());
        }
    }

    /// Whether the named flag was set during the most recent parse.
    pub fn was_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    /// Number of flags set during the most recent parse.
    pub fn n_set(&self) -> usize {
        self.actual.len()
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.formal.len()
    }

    /// Whether the registry has no flags.
    pub fn is_empty(&self) -> bool {
        self.formal.is_empty()
    }

    /// Visits every registered flag in lexicographic name order.
    pub fn visit_all(&self, mut visit: impl FnMut(&Flag)) {
        for flag in self.formal.values() {
            visit(flag);
        }
    }

    /// Visits the flags set during the most recent parse, in lexicographic
    /// name order.
    pub fn visit_set(&self, mut visit: impl FnMut(&Flag)) {
        for name in &self.actual {
            if let Some(flag) = self.formal.get(name) {
                visit(flag);
            }
        }
    }

    /// The short→long map for the token expander: first character to full
    /// name, for every short-eligible flag.
    pub fn short_names(&self) -> BTreeMap<char, String> {
        self.formal
            .values()
            .filter(|flag| flag.short)
            .filter_map(|flag| {
                flag.name
                    .chars()
                    .next()
                    .map(|initial| (initial, flag.name.clone()))
            })
            .collect()
    }
}
