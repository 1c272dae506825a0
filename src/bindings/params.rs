//! Caller-supplied query parameters and the request overlay built from them.

use std::collections::BTreeMap;

use tracing::debug;

use super::Bindings;
use super::error::BindingError;
use super::value::Value;

/// Query parameters as supplied by a caller: each name maps to the set of
/// distinct raw values given for it, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes()).collect()
    }

    /// Record `value` for `name`; repeating an identical value is a no-op.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        let values = self.entries.entry(name.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
        self
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The single value for `name`, rejecting conflicting values.
    pub fn get_one(&self, name: &str) -> Result<Option<&str>, BindingError> {
        match self.get_all(name) {
            [] => Ok(None),
            [single] => Ok(Some(single.as_str())),
            many => Err(BindingError::multiple_values(name, many.to_vec())),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.add(name, value);
        }
        params
    }
}

impl Bindings {
    /// Overlay caller query parameters on `base`.
    ///
    /// Every parameter name becomes a parameter-name member of the result.
    /// A parameter with a prior binding keeps that binding's tag; one without
    /// becomes a plain value. Conflicting values for one name are rejected.
    pub fn create_context(base: &Bindings, params: &QueryParams) -> Result<Bindings, BindingError> {
        let mut context = base.copy();
        context.parameter_names = params.names().map(str::to_owned).collect();

        for (name, values) in params.iter() {
            let raw = match values {
                [] => continue,
                [single] => single.as_str(),
                many => return Err(BindingError::multiple_values(name, many.to_vec())),
            };
            let basis = context.get(name)?.unwrap_or_else(|| Value::plain(""));
            context.put(name, basis.with_value_string(raw));
        }

        debug!(
            parameters = context.parameter_names.len(),
            variables = context.len(),
            "built request binding context"
        );
        Ok(context)
    }
}
