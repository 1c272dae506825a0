//! The data-source seam the endpoint flow executes queries through.

use thiserror::Error;

use crate::domain::results::Description;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("data source `{origin}` failed: {message}")]
pub struct DataSourceError {
    pub origin: String,
    pub message: String,
}

impl DataSourceError {
    pub fn new(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// A backing store that can run selection queries and describe resources.
pub trait DataSource: Send + Sync {
    /// Run `query` and return the identifiers it selects, in order.
    fn select(&self, query: &str) -> Result<Vec<String>, DataSourceError>;

    /// Describe each of `uris`. Resources the source knows nothing about may
    /// be omitted from the result.
    fn describe(&self, uris: &[String]) -> Result<Vec<Description>, DataSourceError>;
}
