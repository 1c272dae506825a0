//! Selections and materialised result sets.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

/// Ordered resource identifiers matching a query, before pagination.
pub type Selection = Arc<[String]>;

/// Property values for one resource, as returned by a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Description {
    pub uri: String,
    pub properties: BTreeMap<String, Vec<String>>,
}

impl Description {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .entry(property.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// One item of a result page: its description plus its shortname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub uri: String,
    pub shortname: String,
    pub properties: BTreeMap<String, Vec<String>>,
}

/// A fully materialised page of results for one endpoint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub endpoint: String,
    pub query: String,
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
    /// Size of the whole selection the page was cut from.
    pub total: usize,
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn is_last_page(&self) -> bool {
        (self.page + 1).saturating_mul(self.page_size) >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: usize, page_size: usize, total: usize) -> ResultSet {
        ResultSet {
            endpoint: "items".into(),
            query: "q".into(),
            page,
            page_size,
            total,
            items: Vec::new(),
        }
    }

    #[test]
    fn last_page_detection() {
        assert!(page(0, 10, 10).is_last_page());
        assert!(!page(0, 10, 11).is_last_page());
        assert!(page(1, 10, 11).is_last_page());
        assert!(page(3, 10, 0).is_last_page());
    }

    #[test]
    fn description_accumulates_values() {
        let description = Description::new("http://example.org/a")
            .with_property("label", "A")
            .with_property("label", "Aye");
        assert_eq!(description.properties["label"], vec!["A", "Aye"]);
    }
}
