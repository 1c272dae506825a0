//! Cache key fingerprints.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::bindings::QueryParams;

/// A normalised representation of a query or request, used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint query text: whitespace runs collapse to one space and the
    /// ends are trimmed, so layout differences do not split the cache.
    pub fn of_query(query: &str) -> Self {
        Self(query.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Fingerprint an endpoint request by its name and parameters.
    ///
    /// Parameters are encoded in name order, so the order in which a caller
    /// supplied them does not matter.
    pub fn of_request(endpoint: &str, params: &QueryParams) -> Self {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, values) in params.iter() {
            for value in values {
                serializer.append_pair(name, value);
            }
        }
        Self(format!("{endpoint}?{}", serializer.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short stable digest for log fields.
    pub fn digest(&self) -> u64 {
        hash_value(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_layout_is_normalised() {
        let a = Fingerprint::of_query("SELECT ?item\n  WHERE { ?item a ?type }");
        let b = Fingerprint::of_query("  SELECT ?item WHERE {\t?item a ?type }  ");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "SELECT ?item WHERE { ?item a ?type }");
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn request_fingerprint_ignores_parameter_order() {
        let first = QueryParams::parse("b=2&a=1");
        let second = QueryParams::parse("a=1&b=2");
        assert_eq!(
            Fingerprint::of_request("items", &first),
            Fingerprint::of_request("items", &second)
        );
        assert_eq!(
            Fingerprint::of_request("items", &first).as_str(),
            "items?a=1&b=2"
        );
    }

    #[test]
    fn request_fingerprint_distinguishes_endpoints_and_values() {
        let params = QueryParams::parse("a=1");
        assert_ne!(
            Fingerprint::of_request("items", &params),
            Fingerprint::of_request("things", &params)
        );
        assert_ne!(
            Fingerprint::of_request("items", &params),
            Fingerprint::of_request("items", &QueryParams::parse("a=2"))
        );
    }

    #[test]
    fn encoding_keeps_separators_unambiguous() {
        let tricky = QueryParams::parse("a=1%262");
        let split = QueryParams::parse("a=1&2");
        assert_ne!(
            Fingerprint::of_request("items", &tricky),
            Fingerprint::of_request("items", &split)
        );
    }
}
