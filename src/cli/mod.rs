//! # CLI Module
//!
//! Operator tooling for a deployment's action directory.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the catalog in matching priority order:
//!
//! ```bash
//! sifrouter --actions ./action routes
//! ```
//!
//! ### `match`
//!
//! Evaluate a request without running any action. Prints the selected route,
//! whether it was a real match or the fallback, the extracted arguments and
//! every spec evaluation in order:
//!
//! ```bash
//! sifrouter match --uri '/article/42?preview=1' --host www.example.com
//! sifrouter match --method POST --uri /login --form user=alice
//! ```
//!
//! ### `cache`
//!
//! ```bash
//! sifrouter cache rebuild   # rescan the action directory and rewrite the cache
//! sifrouter cache clear     # remove the cache artifact
//! ```
//!
//! ## Global Options
//!
//! - `--config <FILE>` - YAML engine config, layered under `SIF_*` variables
//! - `--actions <DIR>` - override the action directory
//! - `--no-cache` - neither read nor write the cache
//! - `--verbose` - pretty debug logging

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    render_match, render_routes, run_cli, CacheCommand, Cli, Commands, TraceEntry,
};
