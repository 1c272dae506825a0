use tracing::trace;

use super::escape::{self, BOUNDARY};
use super::prefixes::PrefixTable;

const PREFIXED: &str = "pre_";
const UNKNOWN: &str = "unknown_";

/// Decode a shortname back to the URI it stands for.
///
/// Returns `None` when `token` is not a shortname under `prefixes`; callers
/// usually treat such tokens as literals.
pub fn decode(prefixes: &PrefixTable, token: &str) -> Option<String> {
    if let Some(escaped) = token.strip_prefix(UNKNOWN) {
        return escape::unescape(escaped);
    }

    if let Some(rest) = token.strip_prefix(PREFIXED) {
        let (prefix, escaped) = rest.split_once('_')?;
        let namespace = prefixes.namespace(prefix)?;
        let local = escape::unescape(escaped)?;
        return Some(format!("{namespace}{local}"));
    }

    let (prefix, local) = token.split_once('_').unwrap_or(("", token));
    let namespace = prefixes.namespace(prefix)?;
    Some(format!("{namespace}{local}"))
}

/// Encode `uri` as a shortname. Total: URIs outside every registered
/// namespace fall back to the `unknown_` shape.
pub fn encode(prefixes: &PrefixTable, uri: &str) -> String {
    if let Some((prefix, namespace)) = prefixes.longest_match(uri) {
        let local = &uri[namespace.len()..];
        if is_plain_local(local) {
            return format!("{prefix}_{local}");
        }
        return format!("{PREFIXED}{prefix}_{}", escape::escape(local));
    }

    let split = namespace_end(uri);
    trace!(uri, "no registered namespace, escaping whole uri");
    format!(
        "{UNKNOWN}{}{BOUNDARY}{}",
        escape::escape(&uri[..split]),
        escape::escape(&uri[split..])
    )
}

/// Local names that can be carried verbatim after `<prefix>_`.
fn is_plain_local(local: &str) -> bool {
    local.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Byte offset where the namespace part of `uri` ends: just after its last
/// `/`, `#` or `:`, or zero when it has none.
fn namespace_end(uri: &str) -> usize {
    uri.rfind(['/', '#', ':']).map_or(0, |index| index + 1)
}
