//! Tests for route selection
//!
//! # Test Coverage
//!
//! - OR mode short-circuit (proved with an evaluation observer)
//! - AND mode, including the `Default`-in-AND quirk
//! - Fallback selection and its empty arguments
//! - Host, query and form presence specs
//! - Catalog priority order
//! - Match decisions surviving a cache round-trip

mod common;

use common::requests::{get, get_on, post};
use sifrouter::catalog::cache::{decode, encode};
use sifrouter::catalog::{parse_route, Catalog, CatalogBuilder, MatchSpec, RouteConfig};
use sifrouter::error::DispatchError;
use sifrouter::router::{MatchKind, RouteArgs, Router};
use std::sync::Arc;

fn router(configs: Vec<RouteConfig>) -> Router {
    Router::new(Arc::new(Catalog::from_configs(configs)))
}

fn path(p: &str) -> MatchSpec {
    MatchSpec::PathRegex(p.to_string())
}

#[test]
fn test_default_only_catalog_matches_everything() {
    let r = router(vec![RouteConfig::new("home").with_match(MatchSpec::Default)]);
    for uri in ["/", "/a/b/c", "/x?y=z"] {
        let m = r.route(&get(uri)).unwrap();
        assert_eq!(m.action_name, "home");
        assert_eq!(m.kind, MatchKind::Fallback);
        assert!(m.config.is_none());
        assert!(m.args.is_empty());
    }
}

#[test]
fn test_or_mode_short_circuits() {
    let r = router(vec![RouteConfig::new("a")
        .with_match(path("#^/one$#"))
        .with_match(path("#^/(one)$#"))]);

    let mut evaluated = Vec::new();
    let m = r
        .route_observed(&get("/one"), |eval| {
            evaluated.push((eval.route.to_string(), eval.index, eval.matched))
        })
        .unwrap();

    assert_eq!(m.action_name, "a");
    assert_eq!(m.kind, MatchKind::Matched);
    assert_eq!(evaluated, vec![("a".to_string(), 0, true)]);
    // First spec has no groups, so only the whole match comes back.
    assert_eq!(m.args.get("0"), Some("/one"));
    assert_eq!(m.args.get("1"), None);
}

#[test]
fn test_or_mode_args_from_matching_spec() {
    let r = router(vec![RouteConfig::new("a")
        .with_match(path("#^/nope/(\\d+)$#"))
        .with_match(path("#^/yes/(\\d+)$#"))]);
    let m = r.route(&get("/yes/5")).unwrap();
    assert_eq!(m.args.get("1"), Some("5"));
}

#[test]
fn test_and_mode_requires_every_spec() {
    let r = router(vec![
        RouteConfig::new("both")
            .with_match(path("#^/search$#"))
            .with_match(MatchSpec::QueryParamPresence("q".into()))
            .match_all(true),
        RouteConfig::new("home").with_match(MatchSpec::Default),
    ]);

    let m = r.route(&get("/search?q=rust")).unwrap();
    assert_eq!(m.action_name, "both");
    assert_eq!(m.kind, MatchKind::Matched);
    match &m.args {
        RouteArgs::PerMatch(per_match) => {
            assert_eq!(per_match.len(), 2);
            // Keyed by the running count after each success.
            assert_eq!(m.args.for_match(1).unwrap()[0].1, "/search");
            assert!(m.args.for_match(2).unwrap().iter().any(|(k, v)| &**k == "q" && v == "rust"));
        }
        RouteArgs::Single(_) => panic!("expected per-match args"),
    }

    assert_eq!(r.route(&get("/search")).unwrap().action_name, "home");
    assert_eq!(r.route(&get("/other?q=rust")).unwrap().action_name, "home");
}

#[test]
fn test_and_mode_evaluates_every_spec() {
    let r = router(vec![RouteConfig::new("and")
        .with_match(path("#^/nope$#"))
        .with_match(path("#^/x$#"))
        .with_match(MatchSpec::QueryParamPresence("q".into()))
        .match_all(true)]);
    let mut count = 0;
    let result = r.route_observed(&get("/x"), |_| count += 1);
    assert!(result.is_err());
    assert_eq!(count, 3);
}

#[test]
fn test_and_mode_with_default_never_matches() {
    let r = router(vec![
        RouteConfig::new("quirk")
            .with_match(path("#^/#"))
            .with_match(MatchSpec::Default)
            .match_all(true),
        RouteConfig::new("later").with_match(path("#^/later$#")),
    ]);

    // Every satisfiable spec holds, but the Default spec keeps the count short.
    let m = r.route(&get("/anything")).unwrap();
    assert_eq!(m.action_name, "quirk");
    assert_eq!(m.kind, MatchKind::Fallback);

    assert_eq!(r.route(&get("/later")).unwrap().action_name, "later");
}

#[test]
fn test_unrecognized_spec_blocks_and_mode() {
    let r = router(vec![RouteConfig::new("and")
        .with_match(path("#^/#"))
        .with_match(MatchSpec::Unrecognized("zzz".into()))
        .match_all(true)]);
    assert!(matches!(
        r.route(&get("/")),
        Err(DispatchError::RouteNotFound { .. })
    ));
}

#[test]
fn test_last_default_wins() {
    let r = router(vec![
        RouteConfig::new("first_default").with_match(MatchSpec::Default),
        RouteConfig::new("article").with_match(path("#^/article$#")),
        RouteConfig::new("second_default").with_match(MatchSpec::Default),
    ]);
    assert_eq!(r.route(&get("/none")).unwrap().action_name, "second_default");
    assert_eq!(r.route(&get("/article")).unwrap().action_name, "article");
}

#[test]
fn test_not_found_without_default() {
    let r = router(vec![RouteConfig::new("a").with_match(path("#^/a$#"))]);
    match r.route(&get("/b?x=1")) {
        Err(DispatchError::RouteNotFound { method, path }) => {
            assert_eq!(method, "GET");
            assert_eq!(path, "/b");
        }
        other => panic!("expected RouteNotFound, got {other:?}"),
    }
}

#[test]
fn test_priority_is_catalog_order() {
    let r = router(vec![
        RouteConfig::new("specific").with_match(path("#^/news/today$#")),
        RouteConfig::new("general").with_match(path("#^/news/#")),
    ]);
    assert_eq!(r.route(&get("/news/today")).unwrap().action_name, "specific");
    assert_eq!(r.route(&get("/news/old")).unwrap().action_name, "general");
}

#[test]
fn test_host_regex() {
    let r = router(vec![
        RouteConfig::new("mobile")
            .with_match(MatchSpec::HostRegex(r"/^m\.(?P<site>[a-z]+)\./".into())),
        RouteConfig::new("desktop").with_match(MatchSpec::Default),
    ]);
    let m = r.route(&get_on("m.example.com", "/")).unwrap();
    assert_eq!(m.action_name, "mobile");
    assert_eq!(m.args.get("site"), Some("example"));
    assert_eq!(r.route(&get("/")).unwrap().action_name, "desktop");
}

#[test]
fn test_form_presence_returns_whole_form() {
    let r = router(vec![
        RouteConfig::new("login").with_match(MatchSpec::FormParamPresence("user".into())),
        RouteConfig::new("home").with_match(MatchSpec::Default),
    ]);
    let m = r
        .route(&post("/", &[("user", "alice"), ("pass", "secret")]))
        .unwrap();
    assert_eq!(m.action_name, "login");
    assert_eq!(m.args.get("user"), Some("alice"));
    assert_eq!(m.args.get("pass"), Some("secret"));

    // A query parameter of the same name does not satisfy a form spec.
    assert_eq!(r.route(&get("/?user=alice")).unwrap().action_name, "home");
}

#[test]
fn test_match_decisions_survive_cache_round_trip() {
    let definitions = [
        "name: article\nmatches:\n  preg: '/^\\/article\\/(\\d+)$/'\nmatchDecodeUri: true\n",
        "name: search\nmatches:\n  pre_path: '#^/search#'\n  get_q: q\nmatch_all: true\n",
        "name: mobile\nmatches:\n  hpr: '/^m\\./i'\n",
        "name: login\nmatches:\n  post_user: user\n",
        "name: home\nmatches:\n  default: ~\n",
    ];
    let catalog = definitions
        .iter()
        .filter_map(|d| parse_route(d))
        .fold(CatalogBuilder::new(), CatalogBuilder::register)
        .build();
    assert_eq!(catalog.len(), 5);

    let restored = decode(&encode(&catalog).unwrap()).unwrap();
    assert_eq!(restored, catalog);

    let before = Router::new(Arc::new(catalog));
    let after = Router::new(Arc::new(restored));
    let battery = [
        get("/article/42"),
        get("/article/abc"),
        get("/search?q=x"),
        get("/search"),
        get_on("M.example.com", "/"),
        post("/", &[("user", "bob")]),
        get("/elsewhere"),
    ];
    for request in &battery {
        let a = before.route(request).unwrap();
        let b = after.route(request).unwrap();
        assert_eq!(a.action_name, b.action_name, "{}", request.raw_path());
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.args, b.args);
    }
}
