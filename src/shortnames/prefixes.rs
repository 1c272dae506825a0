//! Namespace prefix tables.

use std::collections::BTreeMap;

use thiserror::Error;

/// Markers that open the escaped token shapes; they can never be used as
/// plain prefixes.
pub(crate) const RESERVED_PREFIXES: [&str; 2] = ["pre", "unknown"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("namespace for prefix `{prefix}` must not be empty")]
    EmptyNamespace { prefix: String },
}

/// Maps prefix tokens (`rdf`) to namespace base URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    namespaces: BTreeMap<String, String>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prefix` for `namespace`, replacing any earlier mapping.
    pub fn insert(
        &mut self,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<&mut Self, PrefixError> {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(PrefixError::EmptyNamespace { prefix });
        }
        self.namespaces.insert(prefix, namespace);
        Ok(self)
    }

    /// Build a table from prefix/namespace pairs.
    pub fn from_pairs<I, P, N>(pairs: I) -> Result<Self, PrefixError>
    where
        I: IntoIterator<Item = (P, N)>,
        P: Into<String>,
        N: Into<String>,
    {
        let mut table = Self::new();
        for (prefix, namespace) in pairs {
            table.insert(prefix, namespace)?;
        }
        Ok(table)
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str()))
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// The usable prefix whose namespace is the longest leading match of `uri`.
    ///
    /// Ties go to the alphabetically first prefix.
    pub fn longest_match(&self, uri: &str) -> Option<(&str, &str)> {
        let mut best: Option<(&str, &str)> = None;
        for (prefix, namespace) in self.iter() {
            if !is_usable_prefix(prefix) || !uri.starts_with(namespace) {
                continue;
            }
            if best.is_none_or(|(_, current)| namespace.len() > current.len()) {
                best = Some((prefix, namespace));
            }
        }
        best
    }
}

/// A prefix can appear in a shortname when it cannot be confused with the
/// token separator or the reserved shape markers.
pub fn is_usable_prefix(prefix: &str) -> bool {
    !prefix.contains('_') && !RESERVED_PREFIXES.contains(&prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_namespace_wins() {
        let table = PrefixTable::from_pairs([
            ("ex", "http://example.org/"),
            ("exv", "http://example.org/vocab/"),
        ])
        .expect("table");

        assert_eq!(
            table.longest_match("http://example.org/vocab/term"),
            Some(("exv", "http://example.org/vocab/"))
        );
        assert_eq!(
            table.longest_match("http://example.org/thing"),
            Some(("ex", "http://example.org/"))
        );
        assert_eq!(table.longest_match("urn:x"), None);
    }

    #[test]
    fn reserved_and_underscored_prefixes_are_skipped() {
        let table = PrefixTable::from_pairs([
            ("pre", "http://a.example/"),
            ("my_ns", "http://b.example/"),
        ])
        .expect("table");

        assert!(!is_usable_prefix("unknown"));
        assert_eq!(table.longest_match("http://a.example/x"), None);
        assert_eq!(table.longest_match("http://b.example/x"), None);
        assert_eq!(table.namespace("pre"), Some("http://a.example/"));
    }

    #[test]
    fn empty_namespace_is_rejected() {
        let err = PrefixTable::from_pairs([("e", "")]).unwrap_err();
        assert_eq!(
            err,
            PrefixError::EmptyNamespace {
                prefix: "e".to_string()
            }
        );
    }
}
