//! Domain types shared by the cache and the endpoint layer.

pub mod results;
