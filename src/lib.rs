//! # sifrouter
//!
//! **sifrouter** is a front-controller dispatch engine. Each deployment keeps
//! an action directory holding one small route definition per action; the
//! engine turns an incoming request into an ordered chain of actions and runs
//! their lifecycle hooks.
//!
//! ## Architecture
//!
//! - **[`catalog`]** - Route definitions, directory discovery and the on-disk cache
//! - **[`router`]** - Priority-ordered route selection with OR/AND modes and a fallback
//! - **[`registry`]** - Name-keyed action factories
//! - **[`action`]** - The action lifecycle trait and the state injected into it
//! - **[`dispatcher`]** - The per-request chain state machine
//! - **[`request`]** - Normalized request context (path, host, query, form)
//! - **[`runtime_config`]** - Layered engine settings (defaults, YAML, `SIF_*`)
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `sifrouter` operator tool
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host application
//!     participant Dispatcher
//!     participant Router
//!     participant Registry as ActionRegistry
//!     participant Action
//!
//!     Host->>Dispatcher: dispatch(RequestContext)
//!     Dispatcher->>Router: route(request)
//!     Router->>Router: Evaluate specs in catalog order
//!
//!     alt Nothing matched and no Default route
//!         Router-->>Host: RouteNotFound (404)
//!     end
//!
//!     Router-->>Dispatcher: RouteMatch (action, config, args)
//!
//!     loop Until an action requests nothing
//!         Dispatcher->>Registry: resolve(action)
//!         alt Not registered
//!             Registry-->>Host: ActionResolution (500)
//!         end
//!         Dispatcher->>Action: init
//!         opt First step of the request
//!             Dispatcher->>Action: start
//!         end
//!         Dispatcher->>Action: logic(args)
//!         Action-->>Dispatcher: next action name, or none
//!     end
//!
//!     Dispatcher->>Action: view, stop
//!     Dispatcher-->>Host: DispatchOutcome (chain, user data)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use http::Method;
//! use sifrouter::action::{Action, ActionContext};
//! use sifrouter::dispatcher::Dispatcher;
//! use sifrouter::registry::ActionRegistry;
//! use sifrouter::request::RequestContext;
//! use sifrouter::router::RouteArgs;
//! use sifrouter::runtime_config::EngineConfig;
//!
//! #[derive(Default)]
//! struct Article;
//!
//! impl Action for Article {
//!     fn view(&mut self, ctx: &mut ActionContext<'_>, args: &RouteArgs) -> anyhow::Result<()> {
//!         println!("article {} for {}", args.get("id").unwrap_or("?"), ctx.request().host());
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut registry = ActionRegistry::new();
//!     registry.register_default::<Article>("article");
//!
//!     let dispatcher = Dispatcher::bootstrap(&EngineConfig::from_env(), Arc::new(registry))?;
//!     let request = RequestContext::builder(Method::GET, "/article/42")
//!         .host("www.example.com")
//!         .build();
//!     let outcome = dispatcher.dispatch(&request)?;
//!     println!("chain: {:?}", outcome.chain);
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! - `SIF_ACTION_DIR`, `SIF_CACHE_DIR`, `SIF_CACHE_ENABLE`, `SIF_MAX_CHAIN_LEN` - see [`runtime_config`]
//! - `SIF_LOG_LEVEL`, `SIF_LOG_FORMAT`, `SIF_LOG_FILE` - see [`logging`]

pub mod action;
pub mod catalog;
pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod request;
pub mod router;
pub mod runtime_config;

pub use action::{Action, ActionContext, Next, UserData};
pub use catalog::{Catalog, CatalogBuilder, CatalogLoader, MatchSpec, RouteConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ConfigurationError, DispatchError, Hook};
pub use registry::ActionRegistry;
pub use request::RequestContext;
pub use router::{MatchKind, RouteArgs, RouteMatch, Router};
pub use runtime_config::EngineConfig;
