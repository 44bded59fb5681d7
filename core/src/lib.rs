//! Typed flag parsing and subcommand dispatch for command trees.
//!
//! This crate models a CLI as a tree of commands, each owning its flags:
//!
//! - [`Command`] — a node in the tree: flag registry, positional arguments,
//!   child commands, and an optional main action.
//! - [`FlagValue`] — the typed value box behind one flag (bool, sized and
//!   64-bit integers, string, float, duration, callback).
//! - [`FlagRegistry`] / [`Flag`] — per-command flag table with short/long
//!   name resolution.
//! - [`ErrorPolicy`] — how a command responds to a parse failure (continue,
//!   exit, panic, or log).
//! - [`HelpDoc`] / [`HelpNode`] — a serializable help tree built from the
//!   command tree.
//!
//! Parsing first rewrites clustered short flags into canonical long-form
//! tokens ([`expand_tokens`]), then consumes the stream one decision at a
//! time, descending into a child command when the leading token names one.
//!
//! # Accepted argument forms
//!
//! ```text
//! -f            boolean flag only
//! --flag        boolean flag only
//! -f=x --flag=x
//! -abc          cluster of boolean short flags
//! -abc val      cluster ending in a non-boolean short flag; val binds to c
//! --            end of flags; remaining tokens are positional
//! -             a literal positional argument
//! ```
//!
//! One or two leading dashes are interchangeable in the `=`-joined form.
//! Boolean flags accept exactly the literals
//! `1 0 t f T F true false TRUE FALSE True False`; integer flags accept an
//! optional sign and the `0x`, `0o`, `0b` prefixes; duration flags accept a
//! signed sequence of magnitude/unit pairs such as `1h30m` or `-2.5s`.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::{Command, ErrorPolicy};
//!
//! let mut cli = Command::new("bckp", ErrorPolicy::ContinueOnError);
//! cli.flag_bool("verbose", false, "chatty output", true)?;
//! {
//!     let put = cli.add_child("put");
//!     put.flag_str("nest", "", "directory to archive `into`", true)?;
//!     put.flag_bool("zip", false, "compress the archive", true)?;
//! }
//! cli.add_alias("put", &["store"])?;
//!
//! cli.parse(["store", "--nest=backups", "-z", "notes.txt"])?;
//!
//! let put = cli.child("put").unwrap();
//! assert_eq!(put.lookup("nest").unwrap().value.as_str(), Some("backups"));
//! assert_eq!(put.lookup("zip").unwrap().value.as_bool(), Some(true));
//! assert_eq!(put.args(), ["notes.txt"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod command;
mod duration;
mod error;
mod expand;
mod flag;
mod help;
mod value;

pub use command::{
    Command, DEFAULT_HELP_FLAG, EXIT_HELP, EXIT_USAGE, MainAction, NAME_SEP, UsageFn, env_url,
};
pub use duration::{Duration, parse_duration};
pub use error::{ConfigError, ErrorPolicy, ParseError, RunError, ValueError};
pub use expand::expand_tokens;
pub use flag::{Flag, FlagRegistry};
pub use help::{HelpDoc, HelpNode};
pub use value::{FlagCallback, FlagValue};
