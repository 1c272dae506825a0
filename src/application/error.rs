use thiserror::Error;

use crate::bindings::BindingError;

use super::source::DataSourceError;

/// Broad classes of endpoint failure, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed.
    Request,
    /// Variable expansion hit a circular reference.
    Resolution,
    /// The deployment is misconfigured.
    Configuration,
    /// The data source failed.
    Upstream,
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("invalid value `{value}` for parameter `{name}`: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
    #[error("unknown endpoint `{name}`")]
    UnknownEndpoint { name: String },
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

impl EndpointError {
    pub fn bad_request(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_endpoint(name: impl Into<String>) -> Self {
        Self::UnknownEndpoint { name: name.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EndpointError::Binding(err) if err.is_client_error() => ErrorKind::Request,
            EndpointError::Binding(BindingError::Resolve(_)) => ErrorKind::Configuration,
            EndpointError::Binding(_) => ErrorKind::Resolution,
            EndpointError::InvalidParameter { .. } | EndpointError::UnknownEndpoint { .. } => {
                ErrorKind::Request
            }
            EndpointError::DataSource(_) => ErrorKind::Upstream,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::ResolveError;

    #[test]
    fn errors_are_classified() {
        let multiple = EndpointError::from(BindingError::multiple_values(
            "q",
            vec!["a".into(), "b".into()],
        ));
        assert_eq!(multiple.kind(), ErrorKind::Request);
        assert!(multiple.is_client_error());

        let circular = EndpointError::from(BindingError::circular(vec!["x".into(), "x".into()]));
        assert_eq!(circular.kind(), ErrorKind::Resolution);
        assert!(!circular.is_client_error());

        let unresolved = EndpointError::from(BindingError::from(ResolveError::no_base_uri("p")));
        assert_eq!(unresolved.kind(), ErrorKind::Configuration);

        let upstream = EndpointError::from(DataSourceError::new("test", "down"));
        assert_eq!(upstream.kind(), ErrorKind::Upstream);

        assert!(EndpointError::bad_request("_page", "x", "not a number").is_client_error());
    }

    #[test]
    fn messages_carry_the_chain() {
        let err = EndpointError::from(BindingError::circular(vec![
            "a".into(),
            "b".into(),
            "a".into(),
        ]));
        assert_eq!(err.to_string(), "circularity involving: a -> b -> a");
    }
}
