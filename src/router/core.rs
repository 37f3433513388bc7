//! Router core - evaluates one request against the catalog.
//!
//! Patterns are compiled once in [`Router::new`]; per-request work is the
//! ordered walk over routes and their specs.

use super::pattern;
use crate::catalog::{Catalog, MatchSpec, RouteConfig};
use crate::error::DispatchError;
use crate::request::RequestContext;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of extracted parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered name/value pairs: regex captures or a whole query/form list.
///
/// Names are `Arc<str>` so capture names coming from the compiled tables are
/// shared rather than copied.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Last value stored under `name` ("last write wins").
#[must_use]
pub fn last_value<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Data extracted by the matching specs, handed to `logic`, `view` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteArgs {
    /// OR mode: the extraction of the last evaluated spec.
    Single(ParamVec),
    /// AND mode: one extraction per spec, keyed by the running match count at
    /// the time the spec was evaluated.
    PerMatch(BTreeMap<usize, ParamVec>),
}

impl Default for RouteArgs {
    fn default() -> Self {
        RouteArgs::Single(ParamVec::new())
    }
}

impl RouteArgs {
    /// Look up a value by name. For AND-mode args the last extraction that
    /// defines `name` wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            RouteArgs::Single(params) => last_value(params, name),
            RouteArgs::PerMatch(map) => map.values().rev().find_map(|p| last_value(p, name)),
        }
    }

    /// Extraction recorded under match count `n` (AND mode only).
    #[must_use]
    pub fn for_match(&self, n: usize) -> Option<&ParamVec> {
        match self {
            RouteArgs::Single(_) => None,
            RouteArgs::PerMatch(map) => map.get(&n),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RouteArgs::Single(params) => params.is_empty(),
            RouteArgs::PerMatch(map) => map.values().all(|p| p.is_empty()),
        }
    }
}

/// How a route was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A route's specs were satisfied.
    Matched,
    /// Nothing matched; the last route declaring a `Default` spec was chosen.
    Fallback,
}

/// Result of routing one request.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Action to run first.
    pub action_name: String,
    /// Config of the matched route. `None` for fallbacks.
    pub config: Option<Arc<RouteConfig>>,
    pub args: RouteArgs,
    pub kind: MatchKind,
}

/// One spec evaluation, reported to the observer of
/// [`Router::route_observed`].
#[derive(Debug, Clone, Copy)]
pub struct SpecEvaluation<'a> {
    pub route: &'a str,
    pub index: usize,
    pub spec: &'a MatchSpec,
    pub matched: bool,
}

#[derive(Debug, Clone)]
enum CompiledSpec {
    /// `None` when the pattern failed to compile; such a spec never matches.
    Path(Option<Regex>),
    Host(Option<Regex>),
    Query(String),
    Form(String),
    Default,
    Unrecognized,
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    config: Arc<RouteConfig>,
    specs: Vec<CompiledSpec>,
}

/// Selects the route for a request, in catalog order.
#[derive(Debug, Clone)]
pub struct Router {
    catalog: Arc<Catalog>,
    routes: Vec<CompiledRoute>,
}

fn compile_regex(route: &str, pattern_src: &str) -> Option<Regex> {
    match pattern::compile(pattern_src) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(
                route = %route,
                pattern = %pattern_src,
                error = %e,
                "Pattern does not compile, spec will never match"
            );
            None
        }
    }
}

fn compile_spec(route: &str, spec: &MatchSpec) -> CompiledSpec {
    match spec {
        MatchSpec::PathRegex(p) => CompiledSpec::Path(compile_regex(route, p)),
        MatchSpec::HostRegex(p) => CompiledSpec::Host(compile_regex(route, p)),
        MatchSpec::QueryParamPresence(k) => CompiledSpec::Query(k.clone()),
        MatchSpec::FormParamPresence(k) => CompiledSpec::Form(k.clone()),
        MatchSpec::Default => CompiledSpec::Default,
        MatchSpec::Unrecognized(_) => CompiledSpec::Unrecognized,
    }
}

/// Run `re` against `subject` and lay the captures out as `0`, `1`, ... with
/// each named group's name placed before its index. Groups that did not take
/// part are empty strings, except trailing ones which are left out.
fn regex_extract(re: Option<&Regex>, subject: &str) -> (bool, ParamVec) {
    let mut params = ParamVec::new();
    let Some(caps) = re.and_then(|re| re.captures(subject)) else {
        return (false, params);
    };
    let last = (0..caps.len()).rev().find(|&i| caps.get(i).is_some()).unwrap_or(0);
    let names = re.map(|re| re.capture_names()).into_iter().flatten();
    for (i, name) in names.enumerate().take(last + 1) {
        let value = caps.get(i).map_or("", |m| m.as_str());
        if let Some(name) = name {
            params.push((Arc::from(name), value.to_string()));
        }
        params.push((Arc::from(i.to_string()), value.to_string()));
    }
    (true, params)
}

fn presence(params: &ParamVec, key: &str) -> (bool, ParamVec) {
    if params.iter().any(|(k, _)| k.as_ref() == key) {
        (true, params.clone())
    } else {
        (false, ParamVec::new())
    }
}

impl Router {
    /// Compile every route of `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let routes: Vec<CompiledRoute> = catalog
            .iter()
            .map(|config| CompiledRoute {
                specs: config
                    .matches
                    .iter()
                    .map(|spec| compile_spec(&config.name, spec))
                    .collect(),
                config: Arc::clone(config),
            })
            .collect();

        info!(
            routes_count = routes.len(),
            routes_summary = ?catalog.names().take(10).collect::<Vec<_>>(),
            "Routing table loaded"
        );

        Self { catalog, routes }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Select the route for `request`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::RouteNotFound`] when no route matches and no route
    /// declared a `Default` spec.
    pub fn route(&self, request: &RequestContext) -> Result<RouteMatch, DispatchError> {
        self.route_observed(request, |_| {})
    }

    /// Like [`route`](Self::route), reporting every spec evaluation to
    /// `observer` in the order it happens.
    pub fn route_observed<F>(
        &self,
        request: &RequestContext,
        mut observer: F,
    ) -> Result<RouteMatch, DispatchError>
    where
        F: FnMut(SpecEvaluation<'_>),
    {
        let started = Instant::now();
        let mut fallback: Option<&Arc<RouteConfig>> = None;

        for route in &self.routes {
            let config = &route.config;
            if route.specs.is_empty() {
                continue;
            }

            let and_mode = config.match_all;
            let mut match_count = 0usize;
            let mut per_match: BTreeMap<usize, ParamVec> = BTreeMap::new();

            for (index, (spec, compiled)) in config.matches.iter().zip(&route.specs).enumerate() {
                let (matched, new_args) = match compiled {
                    CompiledSpec::Path(re) => {
                        let subject = if config.decode_uri_for_match {
                            request.decoded_path()
                        } else {
                            request.raw_path()
                        };
                        regex_extract(re.as_ref(), subject)
                    }
                    CompiledSpec::Host(re) => regex_extract(re.as_ref(), request.host()),
                    CompiledSpec::Query(key) => presence(request.query_params(), key),
                    CompiledSpec::Form(key) => presence(request.form_params(), key),
                    CompiledSpec::Default => {
                        fallback = Some(config);
                        (false, ParamVec::new())
                    }
                    CompiledSpec::Unrecognized => (false, ParamVec::new()),
                };

                if matched {
                    match_count += 1;
                }
                debug!(
                    route = %config.name,
                    spec_index = index,
                    spec_kind = spec.kind(),
                    matched,
                    "Spec evaluated"
                );
                observer(SpecEvaluation {
                    route: &config.name,
                    index,
                    spec,
                    matched,
                });

                if and_mode {
                    per_match.insert(match_count, new_args);
                } else if match_count > 0 {
                    // OR args are overwritten by every spec, so the spec that
                    // short-circuits is the one whose extraction survives.
                    return Ok(self.matched(config, RouteArgs::Single(new_args), request, started));
                }
            }

            if and_mode && match_count == route.specs.len() {
                return Ok(self.matched(config, RouteArgs::PerMatch(per_match), request, started));
            }
        }

        if let Some(config) = fallback {
            info!(
                method = %request.method(),
                path = %request.raw_path(),
                action = %config.name,
                "No route matched, using fallback"
            );
            return Ok(RouteMatch {
                action_name: config.name.clone(),
                config: None,
                args: RouteArgs::default(),
                kind: MatchKind::Fallback,
            });
        }

        warn!(
            method = %request.method(),
            path = %request.raw_path(),
            host = %request.host(),
            duration_us = started.elapsed().as_micros(),
            "No route matched"
        );
        Err(DispatchError::RouteNotFound {
            method: request.method().to_string(),
            path: request.raw_path().to_string(),
        })
    }

    fn matched(
        &self,
        config: &Arc<RouteConfig>,
        args: RouteArgs,
        request: &RequestContext,
        started: Instant,
    ) -> RouteMatch {
        let elapsed = started.elapsed();
        if elapsed > Duration::from_millis(1) {
            warn!(
                path = %request.raw_path(),
                action = %config.name,
                duration_us = elapsed.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %request.method(),
                path = %request.raw_path(),
                action = %config.name,
                mode = if config.match_all { "and" } else { "or" },
                duration_us = elapsed.as_micros(),
                "Route matched"
            );
        }
        RouteMatch {
            action_name: config.name.clone(),
            config: Some(Arc::clone(config)),
            args,
            kind: MatchKind::Matched,
        }
    }
}
