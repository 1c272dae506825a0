//! Template expansion over a binding map.
//!
//! Expansion walks `{name}` placeholders left to right. Bound but incomplete
//! variables are expanded on an explicit frame stack rather than through
//! recursive calls; the names of the frames on that stack are exactly the
//! variables currently in progress, which is what circularity errors report.

use std::collections::HashMap;
use std::mem;

use tracing::{trace, warn};

use super::error::BindingError;
use super::value::Value;

struct Frame {
    /// Variable being expanded; `None` for a free-standing template.
    name: Option<String>,
    source: String,
    cursor: usize,
    out: String,
}

impl Frame {
    fn new(name: Option<String>, source: String) -> Self {
        let out = String::with_capacity(source.len());
        Self {
            name,
            source,
            cursor: 0,
            out,
        }
    }
}

/// Expand `template`, evaluating and memoising every variable it reaches.
///
/// When `root` names a variable, `template` must be that variable's current
/// lexical form; the expanded value is written back under `root` as well.
pub(crate) fn expand(
    vars: &mut HashMap<String, Value>,
    root: Option<&str>,
    template: &str,
) -> Result<String, BindingError> {
    let mut suspended: Vec<Frame> = Vec::new();
    let mut current = Frame::new(root.map(str::to_owned), template.to_owned());

    loop {
        let Some((open, close)) = next_placeholder(&current.source, current.cursor) else {
            current.out.push_str(&current.source[current.cursor..]);
            let lexical = finish(vars, current);
            match suspended.pop() {
                Some(mut parent) => {
                    parent.out.push_str(&lexical);
                    current = parent;
                    continue;
                }
                None => return Ok(lexical),
            }
        };

        current
            .out
            .push_str(&current.source[current.cursor..open]);
        let name = current.source[open + 1..close].to_owned();
        current.cursor = close + 1;

        if in_progress(&suspended, &current, &name) {
            let mut chain: Vec<String> = suspended
                .iter()
                .chain(std::iter::once(&current))
                .filter_map(|frame| frame.name.clone())
                .collect();
            chain.push(name);
            return Err(BindingError::circular(chain));
        }

        match vars.get(&name) {
            None => {
                warn!(variable = %name, "variable has no value, not substituted");
                current.out.push('{');
                current.out.push_str(&name);
                current.out.push('}');
            }
            Some(value) if value.is_complete() => current.out.push_str(value.value_string()),
            Some(value) => {
                let nested = Frame::new(Some(name), value.value_string().to_owned());
                suspended.push(mem::replace(&mut current, nested));
            }
        }
    }
}

fn finish(vars: &mut HashMap<String, Value>, frame: Frame) -> String {
    let Frame {
        name, source, out, ..
    } = frame;

    if out == source {
        return out;
    }

    if let Some(name) = name {
        if let Some(original) = vars.get(&name) {
            let expanded = original.with_value_string(out.as_str());
            trace!(variable = %name, complete = expanded.is_complete(), "memoised expanded binding");
            vars.insert(name, expanded);
        }
    }

    out
}

fn in_progress(suspended: &[Frame], current: &Frame, name: &str) -> bool {
    suspended
        .iter()
        .chain(std::iter::once(current))
        .any(|frame| frame.name.as_deref() == Some(name))
}

/// Locate the next `{identifier}` at or after `from`, as byte offsets of the
/// braces. A `{` not followed by identifier characters and a `}` is literal.
pub(crate) fn next_placeholder(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut search = from;
    while let Some(offset) = text[search..].find('{') {
        let start = search + offset + 1;
        let rest = &text[start..];
        let len = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        if len > 0 && rest[len..].starts_with('}') {
            return Some((start - 1, start + len));
        }
        search = start;
    }
    None
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}
