use thiserror::Error;

/// Failures raised while resolving a binding store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A variable refers back to itself, directly or through other variables.
    #[error("circularity involving: {}", chain.join(" -> "))]
    Circular { chain: Vec<String> },
    /// The caller supplied more than one distinct value for one parameter.
    #[error("multiple values for parameter `{name}`: {}", values.join(", "))]
    MultipleValues { name: String, values: Vec<String> },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl BindingError {
    pub fn circular(chain: Vec<String>) -> Self {
        Self::Circular { chain }
    }

    pub fn multiple_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::MultipleValues {
            name: name.into(),
            values,
        }
    }

    /// True when the failure is the caller's fault rather than the configuration's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MultipleValues { .. })
    }
}

/// Failures turning a partial path into an absolute resource URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no base URI configured, cannot resolve `{path}`")]
    NoBaseUri { path: String },
    #[error("`{path}` does not resolve to a valid URL: {reason}")]
    InvalidUrl { path: String, reason: String },
}

impl ResolveError {
    pub fn no_base_uri(path: impl Into<String>) -> Self {
        Self::NoBaseUri { path: path.into() }
    }

    pub fn invalid_url(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
