//! Tokenization of text commands.

use log::debug;

/// A prefixed message split into its keyword and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// First token without the prefix
    pub keyword: String,
    /// Remaining tokens
    pub args: Vec<String>,
}

/// Splits `raw` into an [`Invocation`] if it starts with `prefix`.
///
/// Runs of spaces are collapsed before splitting, so `"!foo   bar  baz"`
/// gives the keyword `foo` and the arguments `["bar", "baz"]`.
///
/// # Returns
///
/// `None` when `raw` does not start with `prefix`.
///
/// # Examples
///
/// ```
/// # use switchboard::commands::parse_invocation;
/// let invocation = parse_invocation("!", "!foo   bar  baz").unwrap();
/// assert_eq!(invocation.keyword, "foo");
/// assert_eq!(invocation.args, vec!["bar", "baz"]);
///
/// assert!(parse_invocation("!", "hello").is_none());
/// ```
pub fn parse_invocation(prefix: &str, raw: &str) -> Option<Invocation> {
    if !raw.starts_with(prefix) {
        return None;
    }

    let mut tokens = raw.split(' ').filter(|token| !token.is_empty());
    // A prefix containing spaces never ends up in the first token
    let keyword = tokens.next()?.strip_prefix(prefix)?.to_owned();
    let args = tokens.map(str::to_owned).collect();

    let invocation = Invocation { keyword, args };
    debug!("parsed invocation {:?}", invocation);

    Some(invocation)
}
