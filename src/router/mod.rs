//! # Router Module
//!
//! Selects the route for an incoming request by walking the catalog in
//! priority order.
//!
//! ## Matching rules
//!
//! Each route carries an ordered list of specs and a mode:
//!
//! - **OR** (default): specs are evaluated in order and the first success
//!   selects the route immediately. Later specs are not evaluated.
//! - **AND** (`match_all: true`): every spec is evaluated and the route is
//!   selected only when the number of successes equals the number of declared
//!   specs. `Default` and unrecognised specs never succeed, so an AND route
//!   declaring one can never be selected this way.
//!
//! A `Default` spec marks its route as the fallback, used only when no route
//! matched. When several routes declare one, the last evaluated wins.
//!
//! ## Extracted arguments
//!
//! Path and host regexes yield their capture groups; query and form presence
//! specs yield the whole query or form list. See [`RouteArgs`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use http::Method;
//! use sifrouter::catalog::{Catalog, MatchSpec, RouteConfig};
//! use sifrouter::request::RequestContext;
//! use sifrouter::router::Router;
//!
//! let catalog = Catalog::from_configs([
//!     RouteConfig::new("article").with_match(MatchSpec::PathRegex(r"#^/article/(?P<id>\d+)$#".into())),
//! ]);
//! let router = Router::new(Arc::new(catalog));
//! let request = RequestContext::builder(Method::GET, "/article/42").build();
//! let m = router.route(&request).expect("route");
//! assert_eq!(m.action_name, "article");
//! assert_eq!(m.args.get("id"), Some("42"));
//! ```

mod core;
pub mod pattern;

pub use core::{
    last_value, MatchKind, ParamVec, RouteArgs, RouteMatch, Router, SpecEvaluation,
    MAX_INLINE_PARAMS,
};
