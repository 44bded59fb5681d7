//! Command trees: flag registration, token dispatch, and subcommand descent.
//!
//! A [`Command`] is a node in a tree. It exclusively owns its
//! [`FlagRegistry`] and its ordered child commands; parsing walks the
//! expanded token stream one decision at a time, mutating flag value boxes
//! and recording which flags were seen, and recurses into a child when the
//! leading token names one.

use std::collections::VecDeque;
use std::fmt;
use std::io::{IsTerminal, Write};
use std::process;

use crate::error::{ConfigError, ErrorPolicy, ParseError, RunError};
use crate::expand::expand_tokens;
use crate::flag::{Flag, FlagRegistry};
use crate::value::{FlagCallback, FlagValue};
use crate::Duration;

/// Separator between parent and child names in qualified display names.
pub const NAME_SEP: &str = " ";

/// Name of the automatically registered help flag.
pub const DEFAULT_HELP_FLAG: &str = "help";

/// Process exit status for a parse failure under
/// [`ErrorPolicy::ExitOnError`].
pub const EXIT_USAGE: i32 = 2;

/// Process exit status after printing help. Deliberately 1, not 0.
pub const EXIT_HELP: i32 = 1;

const DEFAULT_FORMAT: &str = "{} [options] [args...]";

/// A command's main action, run by [`Command::execute`] after a successful
/// parse. An error message returned here surfaces as [`RunError::Main`].
pub type MainAction = Box<dyn FnMut(&Command) -> Result<(), String> + Send>;

/// Replacement usage-text producer, installed with
/// [`Command::set_usage`].
pub type UsageFn = Box<dyn Fn(&Command) -> String + Send>;

/// A named set of flags, positional arguments, and child commands.
///
/// Flags must be registered before the first [`parse`](Command::parse)
/// call. Children inherit the error policy, project URL, and help-flag name
/// at creation time.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, ErrorPolicy};
///
/// let mut cmd = Command::new("greet", ErrorPolicy::ContinueOnError);
/// cmd.flag_bool("verbose", false, "chatty output", true).unwrap();
/// cmd.flag_int("count", 1, "how many times", true).unwrap();
///
/// cmd.parse(["-vc", "3", "world"]).unwrap();
/// assert_eq!(cmd.lookup("verbose").unwrap().value.as_bool(), Some(true));
/// assert_eq!(cmd.lookup("count").unwrap().value.as_isize(), Some(3));
/// assert_eq!(cmd.args(), ["world"]);
/// ```
pub struct Command {
    name: String,
    qualified: String,
    aliases: Vec<String>,
    flags: FlagRegistry,
    children: Vec<Command>,
    args: Vec<String>,
    parsed: bool,
    policy: ErrorPolicy,
    /// Usage header template; `{}` is replaced with the qualified name.
    pub format: String,
    /// Project URL shown at the bottom of usage text. Defaults from the
    /// `REPO_HOST` and `DEVELOPER` environment variables.
    pub url: String,
    main: Option<MainAction>,
    usage: Option<UsageFn>,
    output: Option<Box<dyn Write + Send>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Creates a root command with the given error policy.
    ///
    /// A boolean `help` flag is registered automatically (short-eligible,
    /// yielding its abbreviation to later flags) unless the command itself
    /// is named `help`.
    pub fn new(name: &str, policy: ErrorPolicy) -> Self {
        Self::with_help_flag(name, policy, DEFAULT_HELP_FLAG, env_url(name))
    }

    fn with_help_flag(name: &str, policy: ErrorPolicy, help_name: &str, url: String) -> Self {
        let mut cmd = Command {
            name: name.to_string(),
            qualified: name.to_string(),
            aliases: Vec::new(),
            flags: FlagRegistry::new(name, help_name),
            children: Vec::new(),
            args: Vec::new(),
            parsed: false,
            policy,
            format: DEFAULT_FORMAT.to_string(),
            url,
            main: None,
            usage: None,
            output: None,
        };
        if name != help_name {
            // an empty registry cannot reject a dash-free, equals-free name
            let _ = cmd
                .flags
                .register(help_name, "print this message", FlagValue::Bool(false), true);
        }
        cmd
    }

    /// Appends a child command and returns a mutable reference to it.
    ///
    /// The child inherits this command's error policy, URL, and help-flag
    /// name; its qualified display name is `parent child`.
    pub fn add_child(&mut self, name: &str) -> &mut Command {
        let mut child = Command::with_help_flag(
            name,
            self.policy,
            &self.flags.help_name().to_string(),
            self.url.clone(),
        );
        child.qualified = format!("{}{NAME_SEP}{name}", self.qualified);
        self.children.push(child);
        self.children
            .last_mut()
            .unwrap_or_else(|| unreachable!("child was just pushed"))
    }

    /// Registers aliases for the named child.
    ///
    /// Rejects aliases already taken by any sibling's name or alias set;
    /// uniqueness among siblings is what makes alias-based subcommand
    /// selection unambiguous.
    pub fn add_alias(&mut self, child: &str, aliases: &[&str]) -> Result<(), ConfigError> {
        let taken: Vec<String> = aliases
            .iter()
            .filter(|alias| {
                self.children.iter().any(|c| {
                    c.name == **alias || c.aliases.iter().any(|existing| existing == *alias)
                })
            })
            .map(|alias| alias.to_string())
            .collect();
        if !taken.is_empty() {
            return Err(ConfigError::AliasTaken { taken });
        }
        let child = self
            .children
            .iter_mut()
            .find(|c| c.name == child)
            .ok_or_else(|| ConfigError::UnknownChild {
                name: child.to_string(),
            })?;
        child
            .aliases
            .extend(aliases.iter().map(|alias| alias.to_string()));
        Ok(())
    }

    /// Resets the command's name and error policy.
    pub fn init(&mut self, name: &str, policy: ErrorPolicy) {
        self.name = name.to_string();
        self.qualified = name.to_string();
        self.flags.set_command_name(name);
        self.policy = policy;
    }

    // ------------------------------------------------------------------
    // Flag registration
    // ------------------------------------------------------------------

    /// Registers a flag backed by an arbitrary value box.
    pub fn flag_var(
        &mut self,
        name: &str,
        description: &str,
        value: FlagValue,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flags.register(name, description, value, short)
    }

    /// Registers a boolean flag.
    pub fn flag_bool(
        &mut self,
        name: &str,
        default: bool,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Bool(default), short)
    }

    /// Registers a word-sized signed integer flag.
    pub fn flag_int(
        &mut self,
        name: &str,
        default: isize,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Int(default), short)
    }

    /// Registers a 64-bit signed integer flag.
    pub fn flag_int64(
        &mut self,
        name: &str,
        default: i64,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Int64(default), short)
    }

    /// Registers a word-sized unsigned integer flag.
    pub fn flag_uint(
        &mut self,
        name: &str,
        default: usize,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Uint(default), short)
    }

    /// Registers a 64-bit unsigned integer flag.
    pub fn flag_uint64(
        &mut self,
        name: &str,
        default: u64,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Uint64(default), short)
    }

    /// Registers a string flag.
    pub fn flag_str(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Str(default.to_string()), short)
    }

    /// Registers a floating-point flag.
    pub fn flag_float(
        &mut self,
        name: &str,
        default: f64,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Float(default), short)
    }

    /// Registers a duration flag.
    pub fn flag_duration(
        &mut self,
        name: &str,
        default: Duration,
        description: &str,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Duration(default), short)
    }

    /// Registers a function flag: `callback` runs with the flag's textual
    /// value each time the flag is seen.
    pub fn flag_func(
        &mut self,
        name: &str,
        description: &str,
        callback: FlagCallback,
        short: bool,
    ) -> Result<(), ConfigError> {
        self.flag_var(name, description, FlagValue::Func(callback), short)
    }

    /// Replaces the designated help flag with one of the given name.
    pub fn set_help_flag(&mut self, name: &str, short: bool) -> Result<(), ConfigError> {
        let old = self.flags.help_name().to_string();
        self.flags.remove(&old);
        self.flags.set_help_name(name);
        self.flags
            .register(name, "print this message", FlagValue::Bool(false), short)
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    /// Parses the process arguments (skipping the program name).
    pub fn parse_from_env(&mut self) -> Result<(), ParseError> {
        let raw: Vec<String> = std::env::args().skip(1).collect();
        self.parse(raw)
    }

    /// Parses an explicit argument list.
    ///
    /// The raw arguments are first rewritten by the token expander, then
    /// consumed one decision at a time. If the first token names a child
    /// command (by name or alias), every remaining token is handed to that
    /// child's own `parse`, recursively. Failures are routed through the
    /// command's [`ErrorPolicy`]; under
    /// [`ContinueOnError`](ErrorPolicy::ContinueOnError) scanning resumes
    /// at the next token and the first error is returned.
    ///
    /// The command is marked parsed once this completes, regardless of
    /// outcome. Re-parsing does not reset flag state recorded by an earlier
    /// run; callers that re-parse are responsible for starting from a fresh
    /// command if that matters.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = args.into_iter().map(Into::into).collect();
        let result = self.parse_tokens(raw);
        self.parsed = true;
        result
    }

    /// Parses the process arguments, leaving error disposition entirely to
    /// the command's policy.
    pub fn must_parse(&mut self) {
        let result = self.parse_from_env();
        // under ContinueOnError the message is already emitted; nothing
        // further to do with the returned value here
        let _ = result;
    }

    fn parse_tokens(&mut self, raw: Vec<String>) -> Result<(), ParseError> {
        let tokens = expand_tokens(&self.flags.short_names(), &raw);
        tracing::debug!(command = %self.qualified, count = tokens.len(), "dispatching tokens");
        self.args.clear();

        if let Some(first) = tokens.first() {
            if let Some(index) = self.child_index(first) {
                tracing::debug!(
                    parent = %self.qualified,
                    child = %self.children[index].name,
                    "descending into subcommand"
                );
                let rest: Vec<String> = tokens[1..].to_vec();
                return self.children[index].parse(rest);
            }
        }

        let mut queue: VecDeque<String> = tokens.into();
        let mut first_err: Option<ParseError> = None;
        while let Some(token) = queue.pop_front() {
            let step = self.dispatch_one(token, &mut queue);
            if let Some(err) = self.handle(step) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // One decision of the dispatcher. `rest` is the not-yet-consumed tail
    // of the token stream; trailing-value consumption pulls from it.
    fn dispatch_one(
        &mut self,
        token: String,
        rest: &mut VecDeque<String>,
    ) -> Result<(), ParseError> {
        if token == "--" {
            // explicit end of flags
            self.args.extend(rest.drain(..));
            return Ok(());
        }

        if let Some((raw_name, value)) = token.split_once('=') {
            let name = raw_name
                .strip_prefix("--")
                .or_else(|| raw_name.strip_prefix('-'))
                .unwrap_or(raw_name);
            let resolved = match self.flags.accepts(name) {
                Some(resolved) => resolved.to_string(),
                None => {
                    return Err(ParseError::UnknownFlag {
                        name: name.to_string(),
                    });
                }
            };
            if self.is_boolean(&resolved) {
                return Err(ParseError::UnexpectedBoolValue {
                    name: name.to_string(),
                });
            }
            return self.apply(&resolved, name, value);
        }

        if let Some(name) = token.strip_prefix("--") {
            let resolved = match self.flags.accepts(name) {
                Some(resolved) => resolved.to_string(),
                None => {
                    return Err(ParseError::UnknownFlag {
                        name: name.to_string(),
                    });
                }
            };
            if self.is_boolean(&resolved) {
                return self.apply(&resolved, name, "true");
            }
            // a value-less long flag is only legal for booleans
            return Err(ParseError::MissingValue {
                name: name.to_string(),
            });
        }

        if token.len() > 1 {
            if let Some(cluster) = token.strip_prefix('-') {
                let chars: Vec<char> = cluster.chars().collect();
                let last = chars.len() - 1;
                for (position, c) in chars.iter().enumerate() {
                    let candidate = c.to_string();
                    let resolved = match self.flags.accepts(&candidate) {
                        Some(resolved) => resolved.to_string(),
                        None => return Err(ParseError::UnknownFlag { name: candidate }),
                    };
                    if self.is_boolean(&resolved) {
                        self.apply(&resolved, &candidate, "true")?;
                    } else if position == last {
                        let Some(value) = rest.pop_front() else {
                            return Err(ParseError::MissingValue { name: candidate });
                        };
                        return self.apply(&resolved, &candidate, &value);
                    } else {
                        // a non-boolean short flag must end its cluster
                        return Err(ParseError::UnexpectedBoolValue { name: candidate });
                    }
                }
                return Ok(());
            }
        }

        // positional argument (including bare "-")
        self.args.push(token);
        Ok(())
    }

    fn is_boolean(&self, resolved: &str) -> bool {
        self.flags
            .lookup(resolved)
            .is_some_and(|flag| flag.value.is_boolean())
    }

    fn apply(&mut self, resolved: &str, typed: &str, text: &str) -> Result<(), ParseError> {
        self.flags
            .apply(resolved, text)
            .map_err(|source| ParseError::InvalidValue {
                name: typed.to_string(),
                literal: text.to_string(),
                source,
            })
    }

    fn child_index(&self, token: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.name == token || c.aliases.iter().any(|alias| alias == token))
    }

    /// Applies the command's error policy to a parse result.
    ///
    /// A no-op for `Ok`. Under
    /// [`ContinueOnError`](ErrorPolicy::ContinueOnError) the message is
    /// emitted and the error handed back; under
    /// [`LogOnError`](ErrorPolicy::LogOnError) it is emitted and dropped;
    /// the other policies do not return.
    pub fn handle(&mut self, result: Result<(), ParseError>) -> Option<ParseError> {
        let err = match result {
            Ok(()) => return None,
            Err(err) => err,
        };
        match self.policy {
            ErrorPolicy::ContinueOnError => {
                self.emit(&err.to_string());
                Some(err)
            }
            ErrorPolicy::ExitOnError => {
                self.emit(&err.to_string());
                process::exit(EXIT_USAGE);
            }
            ErrorPolicy::PanicOnError => panic!("{err}"),
            ErrorPolicy::LogOnError => {
                self.emit(&err.to_string());
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Installs the main action run by [`execute`](Command::execute).
    pub fn set_main(
        &mut self,
        action: impl FnMut(&Command) -> Result<(), String> + Send + 'static,
    ) {
        self.main = Some(Box::new(action));
    }

    /// Parses `args` and runs the command's main action.
    ///
    /// Returns [`RunError::NoMain`] when no action is bound.
    pub fn execute<I, S>(&mut self, args: I) -> Result<(), RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse(args)?;
        let Some(mut action) = self.main.take() else {
            return Err(RunError::NoMain {
                command: self.name.clone(),
            });
        };
        let result = action(self).map_err(|message| RunError::Main {
            command: self.name.clone(),
            message,
        });
        self.main = Some(action);
        result
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// The command's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The space-joined path from the root to this command.
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// Aliases registered for this command.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether `parse` has completed on this command.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// The command's error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// The flag registry.
    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    /// Looks up a formal flag by exact name.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.lookup(name)
    }

    /// Sets the named flag from text, resolving the exact name only.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.flags.set(name, value)
    }

    /// Whether the named flag was set during the most recent parse.
    pub fn visited(&self, name: &str) -> bool {
        self.flags.was_set(name)
    }

    /// Number of flags set during the most recent parse.
    pub fn n_flags(&self) -> usize {
        self.flags.n_set()
    }

    /// The residual positional arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The `i`th positional argument, if present.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    /// A restartable iterator over the positional arguments.
    pub fn args_iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.args.iter().map(String::as_str)
    }

    /// Number of positional arguments remaining after flag processing.
    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    /// Whether any flag or positional argument was supplied.
    pub fn invoked(&self) -> bool {
        self.n_args() + self.n_flags() > 0
    }

    /// Visits every formal flag in lexicographic order.
    pub fn visit_all(&self, visit: impl FnMut(&Flag)) {
        self.flags.visit_all(visit);
    }

    /// Visits the flags set during the most recent parse, in lexicographic
    /// order.
    pub fn visit_set(&self, visit: impl FnMut(&Flag)) {
        self.flags.visit_set(visit);
    }

    /// The child commands, in declaration order.
    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Every child name followed by its aliases, in declaration order.
    pub fn child_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for child in &self.children {
            names.push(child.name.as_str());
            names.extend(child.aliases.iter().map(String::as_str));
        }
        names
    }

    /// The named child command, matched by name or alias.
    pub fn child(&self, name: &str) -> Option<&Command> {
        self.child_index(name).map(|index| &self.children[index])
    }

    /// Mutable access to the named child, matched by name or alias.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.child_index(name)
            .map(move |index| &mut self.children[index])
    }

    // ------------------------------------------------------------------
    // Output and help gating
    // ------------------------------------------------------------------

    /// Redirects usage and error messages; stderr is the default.
    pub fn set_output(&mut self, output: impl Write + Send + 'static) {
        self.output = Some(Box::new(output));
    }

    pub(crate) fn emit(&mut self, message: &str) {
        match &mut self.output {
            Some(writer) => {
                let _ = writeln!(writer, "{message}");
            }
            None => eprintln!("{message}"),
        }
    }

    /// Installs a replacement usage-text producer.
    pub fn set_usage(&mut self, usage: impl Fn(&Command) -> String + Send + 'static) {
        self.usage = Some(Box::new(usage));
    }

    /// The usage text: the installed producer, or the default layout.
    pub fn usage_text(&self) -> String {
        match &self.usage {
            Some(producer) => producer(self),
            None => self.default_usage(),
        }
    }

    /// Whether input is being piped to the process. A point read, used to
    /// decide whether an argument-less invocation should be treated as a
    /// request for help.
    pub fn receiving(&self) -> bool {
        !std::io::stdin().is_terminal()
    }

    /// Whether the user explicitly asked for help: the command was parsed
    /// and its help flag was set. False when no help flag is defined.
    pub fn help_needed(&self) -> bool {
        let help = self.flags.help_name();
        self.parsed && self.flags.lookup(help).is_some() && self.flags.was_set(help)
    }

    /// Whether help should be inferred: the help flag was set, or nothing
    /// at all was supplied and no input is piped in.
    pub fn help_worthy(&self) -> bool {
        self.parsed
            && (self.help_needed()
                || (self.n_flags() == 0 && self.n_args() == 0 && !self.receiving()))
    }

    /// Either explicit or inferred help request.
    pub fn help_wanted(&self) -> bool {
        self.help_needed() || self.help_worthy()
    }

    /// Writes `message` to stderr (newline-terminated) and exits.
    pub fn exit(&self, message: &str, code: i32) -> ! {
        if !message.is_empty() {
            if message.ends_with('\n') {
                eprint!("{message}");
            } else {
                eprintln!("{message}");
            }
        }
        process::exit(code)
    }

    /// Prints the usage text and exits with status [`EXIT_HELP`].
    pub fn print_help(&self) -> ! {
        self.exit(&self.usage_text(), EXIT_HELP)
    }

    /// Prints help and exits when `condition` holds.
    pub fn help_if(&self, condition: bool) {
        if condition {
            self.print_help();
        }
    }

    /// Writes `message` to stderr when `condition` does not hold.
    pub fn warn_unless(&self, condition: bool, message: &str) {
        if !condition && !message.is_empty() {
            if message.ends_with('\n') {
                eprint!("{message}");
            } else {
                eprintln!("{message}");
            }
        }
    }
}

/// Derives a default project URL from the `REPO_HOST` and `DEVELOPER`
/// environment variables. Cosmetic only; unset variables simply shorten
/// the result.
pub fn env_url(name: &str) -> String {
    let host = std::env::var("REPO_HOST").unwrap_or_default();
    let developer = std::env::var("DEVELOPER").unwrap_or_default();
    let mut url = String::new();
    for segment in [host.as_str(), developer.as_str(), name] {
        let trimmed = if url.is_empty() {
            segment.trim_end_matches('/')
        } else {
            segment.trim_matches('/')
        };
        if trimmed.is_empty() {
            continue;
        }
        if !url.is_empty() {
            url.push('/');
        }
        url.push_str(trimmed);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueError;

    fn command() -> Command {
        Command::new("demo", ErrorPolicy::ContinueOnError)
    }

    #[test]
    fn test_long_assignment_sets_and_marks() {
        let mut cmd = command();
        cmd.flag_int("count", 5, "how many", false).unwrap();

        cmd.parse(["--count=10"]).unwrap();
        assert_eq!(cmd.lookup("count").unwrap().value.as_isize(), Some(10));
        assert!(cmd.visited("count"));
        assert!(cmd.parsed());
    }

    #[test]
    fn test_unsupplied_flag_is_not_actual() {
        let mut cmd = command();
        cmd.flag_int("count", 5, "how many", false).unwrap();

        cmd.parse(Vec::<String>::new()).unwrap();
        assert!(!cmd.visited("count"));
        assert_eq!(cmd.lookup("count").unwrap().value.as_isize(), Some(5));
    }

    #[test]
    fn test_boolean_cluster() {
        let mut cmd = command();
        cmd.flag_bool("all", false, "", true).unwrap();
        cmd.flag_bool("brief", false, "", true).unwrap();

        cmd.parse(["-ab"]).unwrap();
        assert_eq!(cmd.lookup("all").unwrap().value.as_bool(), Some(true));
        assert_eq!(cmd.lookup("brief").unwrap().value.as_bool(), Some(true));
        assert_eq!(cmd.n_args(), 0);
    }

    #[test]
    fn test_cluster_trailing_value_binds_to_final_flag() {
        let mut cmd = command();
        cmd.flag_bool("all", false, "", true).unwrap();
        cmd.flag_int("num", 0, "", true).unwrap();

        cmd.parse(["-an", "5"]).unwrap();
        assert_eq!(cmd.lookup("all").unwrap().value.as_bool(), Some(true));
        assert_eq!(cmd.lookup("num").unwrap().value.as_isize(), Some(5));
        assert_eq!(cmd.n_args(), 0);
    }

    #[test]
    fn test_bad_value_reports_and_preserves() {
        let mut cmd = command();
        cmd.set_output(Vec::new());
        cmd.flag_int("count", 5, "", false).unwrap();

        let err = cmd.parse(["--count=abc"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                name: "count".into(),
                literal: "abc".into(),
                source: ValueError::Parse,
            }
        );
        assert_eq!(cmd.lookup("count").unwrap().value.as_isize(), Some(5));
        assert!(cmd.parsed());
    }

    #[test]
    fn test_terminator_keeps_flag_shaped_positionals() {
        let mut cmd = command();
        cmd.flag_bool("all", false, "", true).unwrap();

        cmd.parse(["--", "-notaflag"]).unwrap();
        assert_eq!(cmd.args(), ["-notaflag"]);
        assert_eq!(cmd.lookup("all").unwrap().value.as_bool(), Some(false));
    }

    #[test]
    fn test_bare_dash_is_positional() {
        let mut cmd = command();
        cmd.parse(["-"]).unwrap();
        assert_eq!(cmd.args(), ["-"]);
    }

    #[test]
    fn test_positional_collection_continues_past_free_tokens() {
        let mut cmd = command();
        cmd.flag_bool("all", false, "", true).unwrap();

        cmd.parse(["input.txt", "--all", "output.txt"]).unwrap();
        assert_eq!(cmd.args(), ["input.txt", "output.txt"]);
        assert_eq!(cmd.lookup("all").unwrap().value.as_bool(), Some(true));
    }

    #[test]
    fn test_boolean_rejects_assignment_form() {
        let mut cmd = command();
        cmd.set_output(Vec::new());
        cmd.flag_bool("all", false, "", true).unwrap();

        let err = cmd.parse(["--all=true"]).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedBoolValue { name: "all".into() });
    }

    #[test]
    fn test_long_non_boolean_without_value_is_missing() {
        let mut cmd = command();
        cmd.set_output(Vec::new());
        cmd.flag_int("num", 0, "", false).unwrap();

        let err = cmd.parse(["--num"]).unwrap_err();
        assert_eq!(err, ParseError::MissingValue { name: "num".into() });
    }

    #[test]
    fn test_non_boolean_mid_cluster_is_rejected() {
        let mut cmd = command();
        cmd.set_output(Vec::new());
        cmd.flag_int("num", 0, "", true).unwrap();
        cmd.flag_bool("verbose", false, "", true).unwrap();

        // expander attaches "x" to the last option, so "n" mid-cluster
        // arrives at the dispatcher as a lone "--num" token
        let err = cmd.parse(["-nv", "x"]).unwrap_err();
        assert!(matches!(err, ParseError::MissingValue { .. } | ParseError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_flag_is_reported() {
        let mut cmd = command();
        cmd.set_output(Vec::new());

        let err = cmd.parse(["--nope"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownFlag { name: "nope".into() });
    }

    #[test]
    fn test_continue_policy_returns_first_error_and_keeps_going() {
        let mut cmd = command();
        cmd.set_output(Vec::new());
        cmd.flag_bool("all", false, "", true).unwrap();

        let err = cmd.parse(["--nope", "--all", "--also-nope"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownFlag { name: "nope".into() });
        // scanning resumed: --all was still applied
        assert_eq!(cmd.lookup("all").unwrap().value.as_bool(), Some(true));
    }

    #[test]
    fn test_log_policy_swallows_errors() {
        let mut cmd = Command::new("demo", ErrorPolicy::LogOnError);
        cmd.set_output(Vec::new());

        cmd.parse(["--nope"]).unwrap();
        assert!(cmd.parsed());
    }

    #[test]
    #[should_panic(expected = "unknown flag: nope")]
    fn test_panic_policy_panics() {
        let mut cmd = Command::new("demo", ErrorPolicy::PanicOnError);
        let _ = cmd.parse(["--nope"]);
    }

    #[test]
    fn test_child_dispatch_by_name() {
        let mut root = command();
        {
            let build = root.add_child("build");
            build.flag_bool("verbose", false, "", true).unwrap();
        }
        root.add_child("test");

        root.parse(["build", "--verbose"]).unwrap();
        assert_eq!(root.n_args(), 0);
        let build = root.child("build").unwrap();
        assert!(build.parsed());
        assert_eq!(build.lookup("verbose").unwrap().value.as_bool(), Some(true));
        assert!(!root.child("test").unwrap().parsed());
    }

    #[test]
    fn test_child_dispatch_by_alias() {
        let mut root = command();
        root.add_child("build");
        root.add_alias("build", &["b"]).unwrap();

        root.parse(["b", "artifact"]).unwrap();
        let build = root.child("build").unwrap();
        assert_eq!(build.args(), ["artifact"]);
    }

    #[test]
    fn test_nested_child_dispatch() {
        let mut root = command();
        {
            let remote = root.add_child("remote");
            let add = remote.add_child("add");
            add.flag_str("url", "", "", true).unwrap();
        }

        root.parse(["remote", "add", "--url=https://example.com"]).unwrap();
        let add = root.child("remote").unwrap().child("add").unwrap();
        assert_eq!(
            add.lookup("url").unwrap().value.as_str(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_alias_uniqueness_enforced() {
        let mut root = command();
        root.add_child("build");
        root.add_child("bench");
        root.add_alias("build", &["b"]).unwrap();

        let err = root.add_alias("bench", &["b"]).unwrap_err();
        assert_eq!(err, ConfigError::AliasTaken { taken: vec!["b".into()] });
        let err = root.add_alias("build", &["bench"]).unwrap_err();
        assert_eq!(err, ConfigError::AliasTaken { taken: vec!["bench".into()] });
    }

    #[test]
    fn test_child_inherits_policy_and_help() {
        let mut root = Command::new("demo", ErrorPolicy::LogOnError);
        root.set_help_flag("assist", true).unwrap();
        let child = root.add_child("sub");
        assert_eq!(child.error_policy(), ErrorPolicy::LogOnError);
        assert!(child.lookup("assist").is_some());
        assert!(child.lookup("help").is_none());
    }

    #[test]
    fn test_help_command_has_no_help_flag() {
        let mut root = command();
        let help = root.add_child("help");
        assert!(help.flags().is_empty());
    }

    #[test]
    fn test_execute_runs_main() {
        let mut cmd = command();
        cmd.flag_int("count", 1, "", false).unwrap();
        cmd.set_main(|cmd| {
            if cmd.lookup("count").unwrap().value.as_isize() == Some(0) {
                Err("count must be positive".into())
            } else {
                Ok(())
            }
        });

        cmd.execute(["--count=3"]).unwrap();
        let err = cmd.execute(["--count=0"]).unwrap_err();
        assert!(matches!(err, RunError::Main { .. }));
    }

    #[test]
    fn test_execute_without_main_is_usage_error() {
        let mut cmd = command();
        let err = cmd.execute(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, RunError::NoMain { command: "demo".into() });
    }

    #[test]
    fn test_programmatic_set() {
        let mut cmd = command();
        cmd.flag_str("mode", "fast", "", false).unwrap();
        cmd.set("mode", "careful").unwrap();
        assert_eq!(cmd.lookup("mode").unwrap().value.as_str(), Some("careful"));
        assert!(cmd.visited("mode"));
        assert!(cmd.set("missing", "x").is_err());
    }

    #[test]
    fn test_func_flag_sees_each_value() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut cmd = command();
        cmd.flag_func(
            "tag",
            "collect tags",
            Box::new(move |text| {
                sink.lock().unwrap().push(text.to_string());
                Ok(())
            }),
            true,
        )
        .unwrap();

        cmd.parse(["--tag=one", "--tag=two"]).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_env_url_joins_segments() {
        // exercised without touching process env: empty segments drop out
        assert!(env_url("tool").ends_with("tool"));
    }

    #[test]
    fn test_invoked_counts_flags_and_args() {
        let mut cmd = command();
        cmd.flag_bool("all", false, "", true).unwrap();
        assert!(!cmd.invoked());
        cmd.parse(["--all", "thing"]).unwrap();
        assert!(cmd.invoked());
        assert_eq!(cmd.arg(0), Some("thing"));
        assert_eq!(cmd.arg(5), None);
        assert_eq!(cmd.args_iter().collect::<Vec<_>>(), vec!["thing"]);
    }
}
