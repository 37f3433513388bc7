use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single predicate attached to a route, evaluated against a request.
///
/// The declaration order inside a [`RouteConfig`] is the evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MatchSpec {
    /// PCRE-style regex applied to the request path (raw or decoded).
    PathRegex(String),
    /// PCRE-style regex applied to the `Host` header.
    HostRegex(String),
    /// Succeeds when the query string carries the given key.
    QueryParamPresence(String),
    /// Succeeds when the form body carries the given key.
    FormParamPresence(String),
    /// Registers the route as the fallback; never counts as a match.
    Default,
    /// A declared kind nobody understands. Evaluates as a no-op but still
    /// counts toward the number of declared specs.
    Unrecognized(String),
}

impl MatchSpec {
    /// Short label used in logs and traces.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MatchSpec::PathRegex(_) => "path_regex",
            MatchSpec::HostRegex(_) => "host_regex",
            MatchSpec::QueryParamPresence(_) => "query_param",
            MatchSpec::FormParamPresence(_) => "form_param",
            MatchSpec::Default => "default",
            MatchSpec::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for MatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSpec::PathRegex(p) | MatchSpec::HostRegex(p) => write!(f, "{} {}", self.kind(), p),
            MatchSpec::QueryParamPresence(k) | MatchSpec::FormParamPresence(k) => {
                write!(f, "{} {}", self.kind(), k)
            }
            MatchSpec::Default => write!(f, "default"),
            MatchSpec::Unrecognized(kind) => write!(f, "unrecognized ({kind})"),
        }
    }
}

/// A route definition: the routing key, its match rules and the matching mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Unique, non-empty name. Doubles as the action identifier.
    pub name: String,
    /// Match rules in declaration order.
    #[serde(default)]
    pub matches: Vec<MatchSpec>,
    /// `true` requires every spec to succeed (AND); otherwise the first success wins (OR).
    #[serde(default)]
    pub match_all: bool,
    /// Apply path regexes to the URL-decoded path instead of the raw one.
    #[serde(default)]
    pub decode_uri_for_match: bool,
}

impl RouteConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matches: Vec::new(),
            match_all: false,
            decode_uri_for_match: false,
        }
    }

    #[must_use]
    pub fn with_match(mut self, spec: MatchSpec) -> Self {
        self.matches.push(spec);
        self
    }

    #[must_use]
    pub fn match_all(mut self, yes: bool) -> Self {
        self.match_all = yes;
        self
    }

    #[must_use]
    pub fn decode_uri(mut self, yes: bool) -> Self {
        self.decode_uri_for_match = yes;
        self
    }
}

/// Ordered, name-keyed collection of route definitions.
///
/// Iteration order is registration order, which is also matching priority.
/// Registering a name twice replaces the earlier config but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    routes: Vec<Arc<RouteConfig>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from configs in priority order.
    pub fn from_configs<I>(configs: I) -> Self
    where
        I: IntoIterator<Item = RouteConfig>,
    {
        let mut catalog = Self::new();
        for config in configs {
            catalog.insert(config);
        }
        catalog
    }

    pub(crate) fn insert(&mut self, config: RouteConfig) {
        match self.index.get(&config.name) {
            Some(&pos) => self.routes[pos] = Arc::new(config),
            None => {
                self.index.insert(config.name.clone(), self.routes.len());
                self.routes.push(Arc::new(config));
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RouteConfig>> {
        self.index.get(name).map(|&pos| &self.routes[pos])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteConfig>> {
        self.routes.iter()
    }

    /// Route names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.routes.len() == other.routes.len()
            && self.routes.iter().zip(&other.routes).all(|(a, b)| a == b)
    }
}

impl Eq for Catalog {}
