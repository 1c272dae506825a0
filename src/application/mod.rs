//! Endpoint services built on the resolution core.

pub mod api;
pub mod endpoint;
pub mod error;
pub mod source;

pub use api::Api;
pub use endpoint::{ApiContext, Endpoint, EndpointSpec};
pub use error::{EndpointError, ErrorKind};
pub use source::{DataSource, DataSourceError};
