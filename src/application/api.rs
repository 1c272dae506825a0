use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::bindings::QueryParams;
use crate::cache::CacheController;
use crate::config::Settings;
use crate::domain::results::ResultSet;

use super::endpoint::{ApiContext, Endpoint, EndpointSpec};
use super::error::EndpointError;
use super::source::DataSource;

/// The endpoints of one API, addressed by name.
#[derive(Clone)]
pub struct Api {
    context: ApiContext,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Api {
    pub fn new(context: ApiContext, specs: impl IntoIterator<Item = EndpointSpec>) -> Self {
        let endpoints = specs
            .into_iter()
            .map(|spec| (spec.name.clone(), Endpoint::new(spec, context.clone())))
            .collect();
        Self { context, endpoints }
    }

    /// Wire the configured variables, prefixes, cache and endpoints to
    /// `source`.
    pub fn from_settings(settings: &Settings, source: Arc<dyn DataSource>) -> Self {
        let cache = settings
            .cache
            .enabled
            .then(|| Arc::new(CacheController::new(settings.cache.policy)));
        info!(
            endpoints = settings.api.endpoints.len(),
            prefixes = settings.api.prefixes.len(),
            cache_policy = %settings.cache.policy,
            cache_enabled = settings.cache.enabled,
            "Building API"
        );

        let context = ApiContext {
            defaults: Arc::new(settings.api.variables.copy()),
            prefixes: Arc::new(settings.api.prefixes.clone()),
            cache,
            source,
        };
        Self::new(context, settings.api.endpoints.iter().cloned())
    }

    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    pub fn cache(&self) -> Option<&CacheController> {
        self.context.cache.as_deref()
    }

    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    pub fn call(&self, name: &str, params: &QueryParams) -> Result<Arc<ResultSet>, EndpointError> {
        self.endpoint(name)
            .ok_or_else(|| EndpointError::unknown_endpoint(name))?
            .call(params)
    }
}
