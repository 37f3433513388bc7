//! # Dispatcher Module
//!
//! Runs a matched request through its chain of actions.
//!
//! ## Chain semantics
//!
//! The route selected by the [`Router`](crate::router::Router) names the first
//! action. Each step of the chain gets a fresh action instance with the chain
//! state injected, then:
//!
//! - `init` always runs
//! - `start` runs only on the first step of the request
//! - `logic` receives the match arguments
//!
//! A non-empty action name returned from `start` or `logic` moves the chain to
//! that action. The step that requests nothing is terminal: its `view` and
//! `stop` run and the request ends.
//!
//! Shared user data is carried from each step to the next. When the target
//! action has its own route config it replaces the current one; otherwise the
//! previous config stays in force.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use http::Method;
//! use sifrouter::action::{Action, ActionContext, Next};
//! use sifrouter::catalog::{Catalog, MatchSpec, RouteConfig};
//! use sifrouter::dispatcher::Dispatcher;
//! use sifrouter::registry::ActionRegistry;
//! use sifrouter::request::RequestContext;
//! use sifrouter::router::RouteArgs;
//!
//! #[derive(Default)]
//! struct Login;
//! impl Action for Login {
//!     fn logic(&mut self, _ctx: &mut ActionContext<'_>, _args: &RouteArgs) -> anyhow::Result<Next> {
//!         Ok(Some("home".to_string()))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Home;
//! impl Action for Home {}
//!
//! let catalog = Catalog::from_configs([
//!     RouteConfig::new("login").with_match(MatchSpec::PathRegex("#^/login$#".into())),
//!     RouteConfig::new("home").with_match(MatchSpec::Default),
//! ]);
//! let mut registry = ActionRegistry::new();
//! registry.register_default::<Login>("login");
//! registry.register_default::<Home>("home");
//!
//! let dispatcher = Dispatcher::from_catalog(Arc::new(catalog), Arc::new(registry));
//! let outcome = dispatcher
//!     .dispatch(&RequestContext::builder(Method::POST, "/login").build())
//!     .expect("dispatch");
//! assert_eq!(outcome.chain, ["login", "home"]);
//! assert_eq!(outcome.terminal(), "home");
//! ```

mod core;

pub use core::{DispatchOutcome, Dispatcher, DEFAULT_MAX_CHAIN_LEN};
