//! Endpoint request flow.
//!
//! An endpoint turns caller query parameters into a page of described,
//! shortname-encoded resources:
//!
//! 1. return the cached result set for an identical request, if any;
//! 2. overlay the parameters on the configured variable defaults;
//! 3. rewrite shortname values of resource-typed parameters to full URIs;
//! 4. expand the selection template and run it, unless the selection for
//!    that query is cached;
//! 5. cut the requested page, describe it and cache the result set.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bindings::{Bindings, QueryParams};
use crate::cache::{CacheController, Fingerprint};
use crate::domain::results::{Description, ResultItem, ResultSet, Selection};
use crate::shortnames::PrefixTable;

use super::error::EndpointError;
use super::source::DataSource;

pub const PAGE_PARAM: &str = "_page";
pub const PAGE_SIZE_PARAM: &str = "_pageSize";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 200;

/// Static description of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    /// Query template; `{name}` placeholders are filled from the request
    /// bindings.
    pub select_template: String,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl EndpointSpec {
    pub fn new(name: impl Into<String>, select_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            select_template: select_template.into(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }
}

/// Collaborators shared by every endpoint of one API.
#[derive(Clone)]
pub struct ApiContext {
    /// Configured variables. Never mutated; each request works on a copy.
    pub defaults: Arc<Bindings>,
    pub prefixes: Arc<PrefixTable>,
    /// `None` disables caching entirely.
    pub cache: Option<Arc<CacheController>>,
    pub source: Arc<dyn DataSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageRequest {
    page: usize,
    page_size: usize,
}

#[derive(Clone)]
pub struct Endpoint {
    spec: EndpointSpec,
    context: ApiContext,
}

impl Endpoint {
    pub fn new(spec: EndpointSpec, context: ApiContext) -> Self {
        Self { spec, context }
    }

    pub fn spec(&self) -> &EndpointSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Answer one request.
    pub fn call(&self, params: &QueryParams) -> Result<Arc<ResultSet>, EndpointError> {
        let request_key = Fingerprint::of_request(&self.spec.name, params);
        if let Some(cached) = self.cache().and_then(|cache| cache.get_result_set(&request_key)) {
            debug!(endpoint = %self.spec.name, "Serving cached result set");
            return Ok(cached);
        }

        let paging = self.page_request(params)?;
        let mut bindings = self.request_bindings(params)?;
        let query = bindings.expand_variables(&self.spec.select_template)?;
        let selection = self.selection(&query)?;

        let start = paging.page.saturating_mul(paging.page_size);
        let page: Vec<String> = selection
            .iter()
            .skip(start)
            .take(paging.page_size)
            .cloned()
            .collect();
        let descriptions = if page.is_empty() {
            Vec::new()
        } else {
            self.context.source.describe(&page)?
        };

        let result_set = Arc::new(ResultSet {
            endpoint: self.spec.name.clone(),
            query,
            page: paging.page,
            page_size: paging.page_size,
            total: selection.len(),
            items: self.items(page, descriptions),
        });

        info!(
            endpoint = %self.spec.name,
            page = paging.page,
            page_size = paging.page_size,
            total = result_set.total,
            items = result_set.items.len(),
            "Endpoint request answered"
        );

        if let Some(cache) = self.cache() {
            cache.cache_result_set(request_key, Arc::clone(&result_set));
        }
        Ok(result_set)
    }

    fn cache(&self) -> Option<&CacheController> {
        self.context.cache.as_deref()
    }

    fn page_request(&self, params: &QueryParams) -> Result<PageRequest, EndpointError> {
        let page = numeric_param(params, PAGE_PARAM)?.unwrap_or(0);
        let page_size = match numeric_param(params, PAGE_SIZE_PARAM)? {
            Some(0) => {
                return Err(EndpointError::bad_request(
                    PAGE_SIZE_PARAM,
                    "0",
                    "must be positive",
                ));
            }
            Some(size) => size.min(self.spec.max_page_size),
            None => self.spec.default_page_size,
        };
        Ok(PageRequest { page, page_size })
    }

    /// Request bindings with shortname values of resource-typed parameters
    /// replaced by the URIs they stand for.
    fn request_bindings(&self, params: &QueryParams) -> Result<Bindings, EndpointError> {
        let mut bindings = Bindings::create_context(&self.context.defaults, params)?;

        for name in params.names() {
            let Some(value) = bindings.get(name)? else {
                continue;
            };
            if !value.is_resource() {
                continue;
            }
            if let Some(uri) = self.context.prefixes.decode(value.value_string()) {
                debug!(
                    parameter = name,
                    shortname = value.value_string(),
                    %uri,
                    "Decoded shortname parameter"
                );
                bindings.put(name, value.with_value_string(uri));
            }
        }

        Ok(bindings)
    }

    fn selection(&self, query: &str) -> Result<Selection, EndpointError> {
        let key = Fingerprint::of_query(query);
        if let Some(cached) = self.cache().and_then(|cache| cache.get_selection(&key)) {
            return Ok(cached);
        }

        let selection: Selection = self.context.source.select(query)?.into();
        debug!(
            endpoint = %self.spec.name,
            selected = selection.len(),
            "Selection query executed"
        );
        if let Some(cache) = self.cache() {
            cache.cache_selection(key, Arc::clone(&selection));
        }
        Ok(selection)
    }

    fn items(&self, page: Vec<String>, descriptions: Vec<Description>) -> Vec<ResultItem> {
        let mut by_uri: HashMap<String, Description> = descriptions
            .into_iter()
            .map(|description| (description.uri.clone(), description))
            .collect();

        page.into_iter()
            .map(|uri| {
                let properties = by_uri
                    .remove(&uri)
                    .map(|description| description.properties)
                    .unwrap_or_default();
                ResultItem {
                    shortname: self.context.prefixes.encode(&uri),
                    uri,
                    properties,
                }
            })
            .collect()
    }
}

fn numeric_param(params: &QueryParams, name: &str) -> Result<Option<usize>, EndpointError> {
    let Some(raw) = params.get_one(name)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|err| EndpointError::bad_request(name, raw, err.to_string()))
}
