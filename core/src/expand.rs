//! Pre-pass token rewriting for clustered short flags.
//!
//! Before dispatch, the raw argument list is rewritten so that every
//! resolvable short reference becomes a canonical `--long` token:
//!
//! - `-x=v` becomes `--<long>=v` when `x` maps to a long name;
//! - `-abc` splits into one token per character, each rewritten to its
//!   long form when it resolves;
//! - a cluster of length > 1 followed by another argument captures that
//!   argument as `=value` on the LAST expanded token, which is how
//!   `-abc val` binds `val` to `c`.
//!
//! The pass is purely a rewrite: unresolved characters are kept as short
//! tokens and no unknown-flag validation happens here (the dispatcher does
//! that).

use std::collections::BTreeMap;

/// Rewrites `raw` using the registry's short→long map.
///
/// Tokens that are not single-dash short regions (`--…`, bare `-`, `--`,
/// and anything without a leading dash) pass through unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use cmdtree_core::expand_tokens;
///
/// let shorts = BTreeMap::from([('a', "all".to_string()), ('n', "num".to_string())]);
/// let raw = vec!["-an".to_string(), "5".to_string(), "rest".to_string()];
/// assert_eq!(expand_tokens(&shorts, &raw), vec!["--all", "--num=5", "rest"]);
/// ```
pub fn expand_tokens(shorts: &BTreeMap<char, String>, raw: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(raw.len());

    let mut index = 0;
    while index < raw.len() {
        let arg = &raw[index];
        let bytes = arg.as_bytes();
        if bytes.len() > 1 && bytes[0] == b'-' && bytes[1] != b'-' {
            if let Some((head, value)) = arg[1..].split_once('=') {
                // short option with joined value
                let resolved = single_char(head).and_then(|c| shorts.get(&c));
                match resolved {
                    Some(long) => {
                        tracing::trace!(from = %arg, to = %long, "rewrote joined short option");
                        expanded.push(format!("--{long}={value}"));
                    }
                    None => expanded.push(arg.clone()),
                }
            } else {
                // cluster of short options
                let cluster: Vec<char> = arg[1..].chars().collect();
                for c in &cluster {
                    match shorts.get(c) {
                        Some(long) => expanded.push(format!("--{long}")),
                        None => expanded.push(format!("-{c}")),
                    }
                }
                // a trailing argument becomes the last option's value
                if cluster.len() > 1 && index + 1 < raw.len() {
                    if let Some(last) = expanded.last_mut() {
                        last.push('=');
                        last.push_str(&raw[index + 1]);
                        index += 1;
                    }
                }
            }
        } else {
            expanded.push(arg.clone());
        }
        index += 1;
    }

    expanded
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
