//! # Catalog Module
//!
//! Route definitions and how they are collected.
//!
//! A route definition is a small YAML or JSON document living in the action
//! directory:
//!
//! ```yaml
//! name: article
//! matches:
//!   preg_article: '/^\/article\/(\d+)$/'
//!   get_preview: preview
//! match_all: false
//! matchDecodeUri: true
//! ```
//!
//! The first three characters of each `matches` key select the spec kind
//! (`pre`, `hpr`, `get`, `pos`, `def`). Unknown kinds are kept as no-op specs.
//!
//! [`CatalogLoader`] scans the directory in file-name order and can persist
//! the result through the [`cache`] module. [`CatalogBuilder`] builds the same
//! [`Catalog`] from an explicit registration list.

mod build;
pub mod cache;
mod load;
mod types;

pub use build::{build_route, classify_match, parse_route, CatalogBuilder};
pub use load::CatalogLoader;
pub use types::{Catalog, MatchSpec, RouteConfig};
