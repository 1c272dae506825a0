//! Request-resolution core of a Linked-Data API server.
//!
//! - [`bindings`]: variables, `{name}` template expansion and request overlays;
//! - [`shortnames`]: reversible compact tokens for resource URIs;
//! - [`cache`]: policy-bounded selection and result-set caches;
//! - [`application`]: the endpoint request flow tying them to a data source.

pub mod application;
pub mod bindings;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod shortnames;
