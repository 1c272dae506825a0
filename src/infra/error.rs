use thiserror::Error;

use crate::bindings::BindingError;
use crate::config::LoadError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {0}")]
    Configuration(#[from] LoadError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("`{token}` is not a shortname under the configured prefixes")]
    NotAShortname { token: String },
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn not_a_shortname(token: impl Into<String>) -> Self {
        Self::NotAShortname {
            token: token.into(),
        }
    }
}
