//! URL resolution capability injected into binding stores.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::error::ResolveError;

/// Maps partial resource paths onto absolute URLs.
pub trait UrlResolver: Send + Sync + fmt::Debug {
    fn as_resource_url(&self, path: &str) -> Result<Url, ResolveError>;
}

/// Resolver used when no base URI is configured; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseUri;

impl UrlResolver for NoBaseUri {
    fn as_resource_url(&self, path: &str) -> Result<Url, ResolveError> {
        Err(ResolveError::no_base_uri(path))
    }
}

/// Resolves partial paths against a configured base URI.
#[derive(Debug, Clone)]
pub struct BaseUriResolver {
    base: Url,
}

impl BaseUriResolver {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self, ResolveError> {
        let base =
            Url::parse(base).map_err(|err| ResolveError::invalid_url(base, err.to_string()))?;
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl UrlResolver for BaseUriResolver {
    fn as_resource_url(&self, path: &str) -> Result<Url, ResolveError> {
        self.base
            .join(path)
            .map_err(|err| ResolveError::invalid_url(path, err.to_string()))
    }
}

/// Shared handle to a resolver; copies of a store share the same instance.
pub type SharedResolver = Arc<dyn UrlResolver>;

pub(crate) fn always_fails() -> SharedResolver {
    Arc::new(NoBaseUri)
}
