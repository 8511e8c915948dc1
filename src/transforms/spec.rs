//! Transform call syntax: `name` or `name(arg, ...)`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)\s*(?:\((.*)\))?$").unwrap()
});

/// One entry of a transform chain as written in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl TransformSpec {
    /// Parse `trim`, `attr()`, `attr(foo, "data-bar")`.
    ///
    /// Arguments are split on commas outside quotes and trimmed; one pair of
    /// matching quotes around an argument is removed. Returns `None` for
    /// anything that is not a well-formed call.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CALL_RE.captures(text.trim())?;
        let name = caps.get(1)?.as_str().to_string();

        let args = match caps.get(2) {
            None => vec![],
            Some(inner) if inner.as_str().trim().is_empty() => vec![],
            Some(inner) => split_args(inner.as_str())?
                .into_iter()
                .map(parse_arg)
                .collect::<Option<Vec<_>>>()?,
        };

        Some(Self { name, args })
    }
}

/// Split on commas, except inside a quoted argument. An argument is quoted
/// when its first non-blank character is `"` or `'`.
fn split_args(inner: &str) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut at_arg_start = true;
    let mut quote: Option<char> = None;

    for (i, c) in inner.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == ',' => {
                pieces.push(&inner[start..i]);
                start = i + 1;
                at_arg_start = true;
            }
            None if at_arg_start && (c == '"' || c == '\'') => {
                quote = Some(c);
                at_arg_start = false;
            }
            None if !c.is_whitespace() => at_arg_start = false,
            None => {}
        }
    }
    if quote.is_some() {
        return None;
    }
    pieces.push(&inner[start..]);
    Some(pieces)
}

fn parse_arg(raw: &str) -> Option<String> {
    let arg = raw.trim();
    let quoted = ['"', '\'']
        .iter()
        .find(|q| arg.starts_with(**q))
        .map(|q| arg[1..].strip_suffix(*q));

    let value = match quoted {
        Some(Some(inner)) => inner,
        // opening quote closed before the end of the argument, e.g. `"a"b`
        Some(None) => return None,
        None if arg.contains(['(', ')']) => return None,
        None => arg,
    };
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

impl fmt::Display for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.join(", "))
        }
    }
}
