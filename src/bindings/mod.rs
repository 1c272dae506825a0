//! Variable bindings and template resolution.
//!
//! A [`Bindings`] store maps variable names to [`Value`]s. Values may refer to
//! other variables with `{name}` placeholders; reading a variable expands
//! those placeholders and memoises the expanded value back into the store.
//!
//! Stores are per evaluation context. Long-lived defaults loaded from
//! configuration are never mutated: callers take a [`Bindings::copy`] (or
//! build a request overlay with [`Bindings::create_context`]) and resolve
//! against that.

mod error;
mod expand;
mod params;
mod resolver;
mod value;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use url::Url;

pub use error::{BindingError, ResolveError};
pub use params::QueryParams;
pub use resolver::{BaseUriResolver, NoBaseUri, SharedResolver, UrlResolver};
pub use value::{RESOURCE_DATATYPE, Value, ValueTag};

/// A mutable map from variable name to value, with the subset of names that
/// were supplied by the caller recorded as parameter names.
#[derive(Debug, Clone)]
pub struct Bindings {
    vars: HashMap<String, Value>,
    parameter_names: HashSet<String>,
    resolver: SharedResolver,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindings {
    /// An empty store whose resolver always fails.
    pub fn new() -> Self {
        Self::with_resolver(resolver::always_fails())
    }

    pub fn with_resolver(resolver: SharedResolver) -> Self {
        Self {
            vars: HashMap::new(),
            parameter_names: HashSet::new(),
            resolver,
        }
    }

    /// Build a store of plain values from name/lexical-form pairs.
    pub fn uplift<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bindings = Self::new();
        for (name, lexical) in pairs {
            bindings.put(name, Value::plain(lexical));
        }
        bindings
    }

    /// An independent snapshot: values are copied, the resolver is shared.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// `defaults` overlaid with this store's bindings; this store wins on
    /// collisions. Parameter names from both stores are kept.
    pub fn copy_with_defaults(&self, defaults: &Bindings) -> Self {
        let mut result = defaults.copy();
        result
            .parameter_names
            .extend(self.parameter_names.iter().cloned());
        result.put_all(self);
        result
    }

    /// Bind `name`, discarding any previous binding.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Copy every binding of `other` into this store, overwriting on collision.
    pub fn put_all(&mut self, other: &Bindings) -> &mut Self {
        self.vars
            .extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn add_parameter_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.parameter_names.insert(name.into());
        self
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Bound variable names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn parameter_names(&self) -> &HashSet<String> {
        &self.parameter_names
    }

    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameter_names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The fully expanded value of `name`, or `None` when unbound.
    ///
    /// Expanding an incomplete value stores the expanded form back under
    /// `name`. Unbound placeholders are left in place.
    pub fn get(&mut self, name: &str) -> Result<Option<Value>, BindingError> {
        let template = match self.vars.get(name) {
            None => return Ok(None),
            Some(value) if value.is_complete() => return Ok(Some(value.clone())),
            Some(value) => value.value_string().to_owned(),
        };
        expand::expand(&mut self.vars, Some(name), &template)?;
        Ok(self.vars.get(name).cloned())
    }

    /// The lexical form of the expanded value of `name`.
    pub fn get_value_string(&mut self, name: &str) -> Result<Option<String>, BindingError> {
        Ok(self
            .get(name)?
            .map(|value| value.value_string().to_owned()))
    }

    /// The lexical form of `name`, or `if_absent` when it is unbound.
    pub fn get_as_string(&mut self, name: &str, if_absent: &str) -> Result<String, BindingError> {
        Ok(self
            .get_value_string(name)?
            .unwrap_or_else(|| if_absent.to_owned()))
    }

    /// Replace every `{name}` in `template` with the expanded value of `name`.
    pub fn expand_variables(&mut self, template: &str) -> Result<String, BindingError> {
        expand::expand(&mut self.vars, None, template)
    }

    /// The absolute URL for a partial resource path.
    pub fn path_as_url(&self, path: &str) -> Result<Url, ResolveError> {
        self.resolver.as_resource_url(path)
    }

    /// Expand `template` and resolve the result to an absolute resource URL.
    pub fn resolve_resource(&mut self, template: &str) -> Result<Url, BindingError> {
        let path = self.expand_variables(template)?;
        Ok(self.path_as_url(&path)?)
    }
}

/// Free-function form of [`Bindings::expand_variables`].
pub fn expand_variables(bindings: &mut Bindings, template: &str) -> Result<String, BindingError> {
    bindings.expand_variables(template)
}

impl PartialEq for Bindings {
    /// Same key sets and the same *evaluated* value per key. Evaluation runs on
    /// private copies, so neither side is memoised by the comparison.
    fn eq(&self, other: &Self) -> bool {
        if self.vars.len() != other.vars.len()
            || !self.vars.keys().all(|key| other.vars.contains_key(key))
        {
            return false;
        }

        let mut left = self.copy();
        let mut right = other.copy();
        self.vars
            .keys()
            .all(|key| match (left.get(key), right.get(key)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            })
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sorted: BTreeMap<&str, &Value> =
            self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        write!(f, "<variables {{")?;
        for (index, (name, value)) in sorted.into_iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}>")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn get_expands_and_memoises() {
        let mut store = Bindings::new();
        store.put("x", "a{y}c").put("y", "b");

        assert_eq!(store.expand_variables("{x}").expect("expands"), "abc");
        let x = store.get("x").expect("ok").expect("bound");
        assert!(x.is_complete());
        assert_eq!(x.value_string(), "abc");
    }

    #[test]
    fn unbound_variable_is_absent() {
        let mut store = Bindings::new();
        assert_eq!(store.get("nope").expect("ok"), None);
        assert_eq!(store.get_as_string("nope", "fallback").expect("ok"), "fallback");
    }

    #[test]
    fn mutual_reference_is_circular() {
        let mut store = Bindings::new();
        store.put("n1", "<{n2}>").put("n2", "<{n1}>");

        let err = store.get("n1").unwrap_err();
        assert_eq!(
            err,
            BindingError::circular(vec!["n1".into(), "n2".into(), "n1".into()])
        );
    }

    #[test]
    fn copy_is_independent() {
        let mut original = Bindings::new();
        original.put("a", "1");
        let mut copy = original.copy();
        copy.put("a", "2").put("b", "3");

        assert_eq!(original.get_value_string("a").expect("ok").as_deref(), Some("1"));
        assert!(!original.has_variable("b"));
        assert_eq!(copy.get_value_string("a").expect("ok").as_deref(), Some("2"));
    }

    #[test]
    fn copy_with_defaults_prefers_own_bindings() {
        let mut defaults = Bindings::new();
        defaults.put("a", "default-a").put("b", "default-b");
        defaults.add_parameter_name("b");

        let mut own = Bindings::new();
        own.put("a", "own-a");
        own.add_parameter_name("a");

        let mut merged = own.copy_with_defaults(&defaults);
        assert_eq!(merged.get_value_string("a").expect("ok").as_deref(), Some("own-a"));
        assert_eq!(merged.get_value_string("b").expect("ok").as_deref(), Some("default-b"));
        assert!(merged.is_parameter("a"));
        assert!(merged.is_parameter("b"));
    }

    #[test]
    fn equality_compares_evaluated_values() {
        let mut left = Bindings::new();
        left.put("x", "{y}{z}").put("y", "a").put("z", "b");
        let mut right = Bindings::new();
        right.put("x", "a{z}").put("y", "a").put("z", "b");

        assert_eq!(left, right);

        right.put("z", "c");
        assert_ne!(left, right);
    }

    #[test]
    fn equality_leaves_operands_unexpanded() {
        let mut left = Bindings::new();
        left.put("x", "{y}").put("y", "1");
        let right = left.copy();

        assert_eq!(left, right);
        assert!(!left.vars["x"].is_complete());
    }

    #[test]
    fn circular_stores_are_never_equal() {
        let mut store = Bindings::new();
        store.put("a", "{a}");
        assert_ne!(store, store.copy());
    }

    #[test]
    fn display_is_sorted() {
        let store = Bindings::uplift([("b", "2"), ("a", "1")]);
        assert_eq!(store.to_string(), "<variables {a=\"1\", b=\"2\"}>");
    }

    #[test]
    fn resolve_resource_uses_injected_resolver() {
        let resolver = BaseUriResolver::parse("http://example.org/").expect("base");
        let mut store = Bindings::with_resolver(Arc::new(resolver));
        store.put("id", "42");

        let url = store.resolve_resource("items/{id}").expect("resolves");
        assert_eq!(url.as_str(), "http://example.org/items/42");
    }

    #[test]
    fn resolve_resource_without_base_is_configuration_error() {
        let mut store = Bindings::new();
        let err = store.resolve_resource("items/1").unwrap_err();
        assert_eq!(
            err,
            BindingError::Resolve(ResolveError::no_base_uri("items/1"))
        );
    }
}
