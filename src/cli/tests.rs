//! Unit tests for CLI commands

use crate::catalog::{Catalog, MatchSpec, RouteConfig};
use crate::cli::{render_match, render_routes, CacheCommand, Cli, Commands, TraceEntry};
use crate::request::RequestContext;
use crate::router::Router;
use clap::Parser;
use http::Method;
use std::sync::Arc;

fn catalog() -> Catalog {
    Catalog::from_configs([
        RouteConfig::new("article")
            .with_match(MatchSpec::PathRegex(r"#^/article/(?P<id>\d+)$#".into()))
            .decode_uri(true),
        RouteConfig::new("bare"),
        RouteConfig::new("home").with_match(MatchSpec::Default),
    ])
}

#[test]
fn test_match_command_parses_form_pairs() {
    let cli = Cli::try_parse_from([
        "sifrouter",
        "match",
        "--uri",
        "/login",
        "--method",
        "post",
        "--form",
        "user=alice",
        "--form",
        "note=a=b",
    ])
    .unwrap();

    match cli.command {
        Commands::Match {
            uri, method, form, ..
        } => {
            assert_eq!(uri, "/login");
            assert_eq!(method, Method::POST);
            assert_eq!(
                form,
                vec![
                    ("user".to_string(), "alice".to_string()),
                    ("note".to_string(), "a=b".to_string()),
                ]
            );
        }
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_form_without_equals_rejected() {
    let cli = Cli::try_parse_from(["sifrouter", "match", "--uri", "/", "--form", "novalue"]);
    assert!(cli.is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "sifrouter",
        "cache",
        "clear",
        "--actions",
        "./action",
        "--no-cache",
    ])
    .unwrap();
    assert!(cli.no_cache);
    assert_eq!(cli.actions.unwrap().to_string_lossy(), "./action");
    assert!(matches!(
        cli.command,
        Commands::Cache {
            command: CacheCommand::Clear
        }
    ));
}

#[test]
fn test_render_routes_lists_priority_order() {
    let out = render_routes(&catalog());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "  0  article  [any, decoded]");
    assert!(lines[1].contains("path_regex"));
    assert_eq!(lines[2], "  1  bare  [any]");
    assert!(lines[3].contains("never selected"));
    assert_eq!(lines[4], "  2  home  [any]");
}

#[test]
fn test_render_match_with_trace() {
    let router = Router::new(Arc::new(catalog()));
    let request = RequestContext::builder(Method::GET, "/article/7").build();
    let mut trace = Vec::new();
    let result = router.route_observed(&request, |eval| trace.push(TraceEntry::from(eval)));
    let out = render_match(&result, &trace);
    assert!(out.contains("+ article[0]"));
    assert!(out.contains("action: article (matched)"));
    assert!(out.contains("id = \"7\""));
}

#[test]
fn test_render_match_fallback() {
    let router = Router::new(Arc::new(catalog()));
    let request = RequestContext::builder(Method::GET, "/nowhere").build();
    let mut trace = Vec::new();
    let result = router.route_observed(&request, |eval| trace.push(TraceEntry::from(eval)));
    let out = render_match(&result, &trace);
    assert!(out.contains("- article[0]"));
    assert!(out.contains("action: home (fallback)"));
    assert!(out.contains("args: none"));
}

#[test]
fn test_render_match_per_match_args_and_not_found() {
    let router = Router::new(Arc::new(Catalog::from_configs([RouteConfig::new("search")
        .with_match(MatchSpec::PathRegex("#^/search$#".into()))
        .with_match(MatchSpec::QueryParamPresence("q".into()))
        .match_all(true)])));

    let request = RequestContext::builder(Method::GET, "/search?q=rust").build();
    let mut trace = Vec::new();
    let result = router.route_observed(&request, |eval| trace.push(TraceEntry::from(eval)));
    let out = render_match(&result, &trace);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "trace:",
            "  + search[0] path_regex #^/search$#",
            "  + search[1] query_param q",
            "action: search (matched)",
            "args:",
            "  match #1",
            "    0 = \"/search\"",
            "  match #2",
            "    q = \"rust\"",
        ]
    );

    let request = RequestContext::builder(Method::GET, "/elsewhere").build();
    let result = router.route(&request);
    let out = render_match(&result, &[]);
    assert!(out.starts_with("trace:\nno route: "));
    assert!(out.ends_with('\n'));
}
