//! Sitedeck - admin client for a small content-managed site
//!
//! This library provides the pieces behind the Sitedeck dashboard: the REST
//! backend client, the per-resource content cache, the page tree model, the
//! content editors and the edit wizard that sequences them.

pub mod backend;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod editors;
pub mod models;
pub mod tree;
pub mod wizard;
