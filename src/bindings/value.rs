//! Lexical values bound to variables.

use std::fmt;

use super::expand::next_placeholder;

/// Datatype URI used to mark bindings whose values are resource identifiers.
pub const RESOURCE_DATATYPE: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

/// Annotation carried alongside a lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// A datatype URI, e.g. `xsd:integer`.
    Datatype(String),
    /// A language code, e.g. `en`.
    Language(String),
}

/// An immutable lexical datum with an optional type or language tag.
///
/// A value is *complete* once its lexical form no longer contains any
/// `{name}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    lexical: String,
    tag: Option<ValueTag>,
    complete: bool,
}

impl Value {
    /// A plain value with no tag.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self::with_tag(lexical, None)
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::with_tag(lexical, Some(ValueTag::Datatype(datatype.into())))
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self::with_tag(lexical, Some(ValueTag::Language(language.into())))
    }

    /// A value whose lexical form names a resource.
    pub fn resource(lexical: impl Into<String>) -> Self {
        Self::typed(lexical, RESOURCE_DATATYPE)
    }

    fn with_tag(lexical: impl Into<String>, tag: Option<ValueTag>) -> Self {
        let lexical = lexical.into();
        let complete = !has_placeholder(&lexical);
        Self {
            lexical,
            tag,
            complete,
        }
    }

    /// Derive a value with a new lexical form and the same tag.
    pub fn with_value_string(&self, lexical: impl Into<String>) -> Self {
        Self::with_tag(lexical, self.tag.clone())
    }

    pub fn value_string(&self) -> &str {
        &self.lexical
    }

    pub fn tag(&self) -> Option<&ValueTag> {
        self.tag.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_resource(&self) -> bool {
        matches!(&self.tag, Some(ValueTag::Datatype(dt)) if dt == RESOURCE_DATATYPE)
    }
}

impl From<&str> for Value {
    fn from(lexical: &str) -> Self {
        Value::plain(lexical)
    }
}

impl From<String> for Value {
    fn from(lexical: String) -> Self {
        Value::plain(lexical)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            None => write!(f, "{:?}", self.lexical),
            Some(ValueTag::Datatype(dt)) => write!(f, "{:?}^^{dt}", self.lexical),
            Some(ValueTag::Language(lang)) => write!(f, "{:?}@{lang}", self.lexical),
        }
    }
}

/// True when `text` holds a `{name}` placeholder that expansion would try to
/// resolve.
pub(crate) fn has_placeholder(text: &str) -> bool {
    next_placeholder(text, 0).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_tracks_placeholders() {
        assert!(Value::plain("abc").is_complete());
        assert!(!Value::plain("a{b}c").is_complete());
        assert!(Value::plain("a{bc").is_complete());
        assert!(Value::plain("a}b{").is_complete());
        assert!(Value::plain("{ ?s ?p ?o }").is_complete());
        assert!(!Value::plain("{ ?s a {type} }").is_complete());
    }

    #[test]
    fn with_value_string_preserves_tag() {
        let original = Value::lang("{greeting}", "en");
        let derived = original.with_value_string("hello");

        assert_eq!(derived.value_string(), "hello");
        assert_eq!(derived.tag(), Some(&ValueTag::Language("en".to_string())));
        assert!(derived.is_complete());
        assert!(!original.is_complete());
    }

    #[test]
    fn resource_values_are_recognised() {
        assert!(Value::resource("http://example.org/a").is_resource());
        assert!(!Value::typed("1", "http://www.w3.org/2001/XMLSchema#integer").is_resource());
        assert!(!Value::plain("x").is_resource());
    }

    #[test]
    fn display_includes_tag() {
        assert_eq!(Value::plain("x").to_string(), "\"x\"");
        assert_eq!(Value::lang("chat", "fr").to_string(), "\"chat\"@fr");
    }
}
