use super::types::{Catalog, MatchSpec, RouteConfig};
use serde_yaml::Value;
use tracing::{debug, warn};

/// Classify a match key by its three-character prefix.
///
/// Keys are free-form past the prefix so a definition can declare several
/// specs of one kind (`preg1`, `preg2`, `get_id`, ...).
#[must_use]
pub fn classify_match(key: &str, data: Option<String>) -> MatchSpec {
    let prefix: String = key.chars().take(3).collect();
    match (prefix.as_str(), data) {
        ("pre", Some(pattern)) => MatchSpec::PathRegex(pattern),
        ("hpr", Some(pattern)) => MatchSpec::HostRegex(pattern),
        ("get", Some(name)) => MatchSpec::QueryParamPresence(name),
        ("pos", Some(name)) => MatchSpec::FormParamPresence(name),
        ("def", _) => MatchSpec::Default,
        _ => MatchSpec::Unrecognized(key.to_string()),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_literal_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn build_matches(value: Option<&Value>) -> Vec<MatchSpec> {
    match value {
        Some(Value::Mapping(map)) => map
            .iter()
            .map(|(k, v)| match scalar_to_string(k) {
                Some(key) => classify_match(&key, scalar_to_string(v)),
                None => MatchSpec::Unrecognized(format!("{k:?}")),
            })
            .collect(),
        // A plain list has positional keys, none of which carry a known prefix.
        Some(Value::Sequence(items)) => (0..items.len())
            .map(|i| MatchSpec::Unrecognized(i.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Turn one parsed route-definition document into a [`RouteConfig`].
///
/// Returns `None` when the document is not a mapping or lacks a non-empty
/// scalar `name`. Number and bool names are stringified like match values.
/// Such documents are dropped from the catalog, not reported.
#[must_use]
pub fn build_route(doc: &Value) -> Option<RouteConfig> {
    let map = doc.as_mapping()?;
    let name = map
        .get("name")
        .and_then(scalar_to_string)
        .filter(|n| !n.is_empty())?;

    Some(RouteConfig {
        matches: build_matches(map.get("matches")),
        match_all: is_literal_true(map.get("match_all")),
        decode_uri_for_match: is_literal_true(map.get("matchDecodeUri")),
        name,
    })
}

/// Parse a YAML or JSON route-definition document.
pub fn parse_route(content: &str) -> Option<RouteConfig> {
    match serde_yaml::from_str::<Value>(content) {
        Ok(doc) => build_route(&doc),
        Err(e) => {
            debug!(error = %e, "Route definition is not valid YAML/JSON");
            None
        }
    }
}

/// Builds a [`Catalog`] from an explicit, ordered registration list.
///
/// Registration order is matching priority.
///
/// ```
/// use sifrouter::catalog::{CatalogBuilder, MatchSpec, RouteConfig};
///
/// let catalog = CatalogBuilder::new()
///     .register(RouteConfig::new("home").with_match(MatchSpec::PathRegex("#^/$#".into())))
///     .register(RouteConfig::new("not_found").with_match(MatchSpec::Default))
///     .build();
/// assert_eq!(catalog.names().collect::<Vec<_>>(), ["home", "not_found"]);
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, config: RouteConfig) -> Self {
        self.push(config);
        self
    }

    /// Register a raw definition document; invalid ones are skipped.
    #[must_use]
    pub fn register_definition(mut self, doc: &Value) -> Self {
        if let Some(config) = build_route(doc) {
            self.push(config);
        } else {
            debug!("Skipping route definition without a usable name");
        }
        self
    }

    pub(crate) fn push(&mut self, config: RouteConfig) {
        if config.name.is_empty() {
            warn!("Ignoring route config with an empty name");
            return;
        }
        if self.catalog.contains(&config.name) {
            debug!(route = %config.name, "Route redefined, replacing in place");
        }
        self.catalog.insert(config);
    }

    #[must_use]
    pub fn build(self) -> Catalog {
        self.catalog
    }
}
