//! Shortname transcoding.
//!
//! A shortname is a compact, reversible token for a resource URI, suitable
//! for query parameters. Three shapes exist:
//!
//! - `<prefix>_<local>`: a registered namespace plus a local name carried
//!   verbatim;
//! - `pre_<prefix>_<escaped local>`: the same, when the local name needs
//!   escaping;
//! - `unknown_<escaped uri>`: any URI outside the registered namespaces.
//!
//! The codec is a pair of pure functions over an immutable [`PrefixTable`].

mod escape;
mod prefixes;
mod transcoding;

pub use escape::{escape, unescape};
pub use prefixes::{PrefixError, PrefixTable, is_usable_prefix};
pub use transcoding::{decode, encode};

impl PrefixTable {
    /// Shorthand for [`encode`] with this table.
    pub fn encode(&self, uri: &str) -> String {
        encode(self, uri)
    }

    /// Shorthand for [`decode`] with this table.
    pub fn decode(&self, token: &str) -> Option<String> {
        decode(self, token)
    }
}
