use crate::catalog::cache::{clear_cache, write_cache};
use crate::catalog::Catalog;
use crate::error::DispatchError;
use crate::logging::{init_logging, LogConfig};
use crate::request::RequestContext;
use crate::router::{MatchKind, RouteArgs, RouteMatch, Router, SpecEvaluation};
use crate::runtime_config::EngineConfig;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line interface for the sifrouter dispatch engine
#[derive(Debug, Parser)]
#[command(name = "sifrouter", version, about = "Inspect and maintain a sifrouter action directory")]
pub struct Cli {
    /// YAML engine configuration file
    #[arg(long, global = true, env = "SIF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Action directory (overrides the config file and SIF_ACTION_DIR)
    #[arg(long, global = true)]
    pub actions: Option<PathBuf>,

    /// Bypass the catalog cache
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    /// Pretty debug logging on stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List routes in matching priority order
    Routes,
    /// Show which route a request would select
    Match {
        /// Request URI, path plus optional query string
        #[arg(short, long)]
        uri: String,

        /// Host header
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Request method
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// Form field, repeatable
        #[arg(short, long = "form", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        form: Vec<(String, String)>,
    },
    /// Manage the catalog cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheCommand {
    /// Rescan the action directory and rewrite the cache
    Rebuild,
    /// Remove the cache artifact
    Clear,
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes()).map_err(|e| e.to_string())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

/// The catalog as a human-readable listing.
#[must_use]
pub fn render_routes(catalog: &Catalog) -> String {
    let mut out = String::new();
    for (priority, route) in catalog.iter().enumerate() {
        let mode = if route.match_all { "all" } else { "any" };
        out.push_str(&format!("{priority:>3}  {}  [{mode}", route.name));
        if route.decode_uri_for_match {
            out.push_str(", decoded");
        }
        out.push_str("]\n");
        if route.matches.is_empty() {
            out.push_str("       (no matches, never selected)\n");
        }
        for spec in &route.matches {
            out.push_str(&format!("       {spec}\n"));
        }
    }
    out
}

fn render_args(out: &mut String, args: &RouteArgs) {
    match args {
        RouteArgs::Single(params) => {
            for (k, v) in params {
                out.push_str(&format!("  {k} = {v:?}\n"));
            }
        }
        RouteArgs::PerMatch(per_match) => {
            for (n, params) in per_match {
                out.push_str(&format!("  match #{n}\n"));
                for (k, v) in params {
                    out.push_str(&format!("    {k} = {v:?}\n"));
                }
            }
        }
    }
}

/// One line of the `match` evaluation trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub route: String,
    pub index: usize,
    pub spec: String,
    pub matched: bool,
}

impl From<SpecEvaluation<'_>> for TraceEntry {
    fn from(eval: SpecEvaluation<'_>) -> Self {
        Self {
            route: eval.route.to_string(),
            index: eval.index,
            spec: eval.spec.to_string(),
            matched: eval.matched,
        }
    }
}

/// A routing decision plus its evaluation trace, as printed by `match`.
#[must_use]
pub fn render_match(result: &Result<RouteMatch, DispatchError>, trace: &[TraceEntry]) -> String {
    let mut out = String::new();
    out.push_str("trace:\n");
    for entry in trace {
        let mark = if entry.matched { "+" } else { "-" };
        out.push_str(&format!(
            "  {mark} {}[{}] {}\n",
            entry.route, entry.index, entry.spec
        ));
    }
    match result {
        Ok(m) => {
            let kind = match m.kind {
                MatchKind::Matched => "matched",
                MatchKind::Fallback => "fallback",
            };
            out.push_str(&format!("action: {} ({kind})\n", m.action_name));
            if m.args.is_empty() {
                out.push_str("args: none\n");
            } else {
                out.push_str("args:\n");
                render_args(&mut out, &m.args);
            }
        }
        Err(e) => out.push_str(&format!("no route: {e}\n")),
    }
    out
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.actions {
        config.action_dir = dir.clone();
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }
    Ok(config)
}

fn load_catalog(config: &EngineConfig) -> Result<Catalog> {
    config
        .loader()
        .load()
        .with_context(|| format!("Failed to load routes from {}", config.action_dir.display()))
}

/// Execute a parsed command line.
pub fn run_cli(cli: Cli) -> Result<()> {
    let log_config = if cli.verbose {
        LogConfig::default_dev()
    } else {
        let mut config = LogConfig::from_env();
        if std::env::var_os("SIF_LOG_LEVEL").is_none() {
            config.log_level = "warn".to_string();
        }
        config
    };
    let _guard = init_logging(&log_config)?;

    let config = engine_config(&cli)?;

    match cli.command {
        Commands::Routes => {
            let catalog = load_catalog(&config)?;
            print!("{}", render_routes(&catalog));
        }
        Commands::Match {
            uri,
            host,
            method,
            form,
        } => {
            let catalog = load_catalog(&config)?;
            let router = Router::new(Arc::new(catalog));
            let request = form
                .iter()
                .fold(
                    RequestContext::builder(method, &uri).host(host),
                    |builder, (k, v)| builder.form_param(k, v.as_str()),
                )
                .build();

            let mut trace = Vec::new();
            let result = router.route_observed(&request, |eval| trace.push(TraceEntry::from(eval)));
            print!("{}", render_match(&result, &trace));
            if result.is_err() {
                bail!("No route selected for {uri}");
            }
        }
        Commands::Cache { command } => {
            let Some(path) = config.cache_path() else {
                bail!("Catalog cache is disabled");
            };
            match command {
                CacheCommand::Rebuild => {
                    let catalog = config.loader().discover().with_context(|| {
                        format!("Failed to scan {}", config.action_dir.display())
                    })?;
                    write_cache(&path, &catalog)?;
                    println!("wrote {} routes to {}", catalog.len(), path.display());
                }
                CacheCommand::Clear => {
                    let removed = clear_cache(&path)
                        .with_context(|| format!("Failed to remove {}", path.display()))?;
                    if removed {
                        println!("removed {}", path.display());
                    } else {
                        println!("no cache at {}", path.display());
                    }
                }
            }
        }
    }
    Ok(())
}
