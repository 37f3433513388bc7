//! Dispatcher core - the per-request chain state machine.

use crate::action::{ActionContext, Next, UserData};
use crate::catalog::{Catalog, RouteConfig};
use crate::error::{ConfigurationError, DispatchError, Hook};
use crate::registry::ActionRegistry;
use crate::request::RequestContext;
use crate::router::{RouteArgs, RouteMatch, Router};
use crate::runtime_config::EngineConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

/// Default upper bound on the number of actions in one chain.
pub const DEFAULT_MAX_CHAIN_LEN: usize = 64;

/// What a completed dispatch did.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Every action visited, in order. The last one is the terminal action.
    pub chain: Vec<String>,
    /// Shared user data as left by the terminal action.
    pub user_data: UserData,
}

impl DispatchOutcome {
    /// The action whose `view` and `stop` ran.
    #[must_use]
    pub fn terminal(&self) -> &str {
        self.chain.last().map_or("", String::as_str)
    }
}

/// Position inside one chain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    AwaitingStart,
    AwaitingLogic,
    Terminal,
}

/// Request-wide state, created at match time and dropped with the request.
#[derive(Debug)]
struct DispatchState {
    current_action: String,
    chain: Vec<String>,
    start_fired: bool,
    shared_user_data: Option<UserData>,
    config: Option<Arc<RouteConfig>>,
    args: RouteArgs,
}

impl DispatchState {
    fn new(matched: RouteMatch) -> Self {
        Self {
            chain: vec![matched.action_name.clone()],
            current_action: matched.action_name,
            start_fired: false,
            shared_user_data: None,
            config: matched.config,
            args: matched.args,
        }
    }
}

fn transition(next: Next) -> Option<String> {
    next.filter(|name| !name.is_empty())
}

fn check<T>(action: &str, hook: Hook, result: anyhow::Result<T>) -> Result<T, DispatchError> {
    result.map_err(|source| {
        error!(action = %action, hook = %hook, error = %source, "Action hook failed");
        DispatchError::Hook {
            action: action.to_string(),
            hook,
            source,
        }
    })
}

/// Runs matched requests through their action chains.
///
/// Holds only immutable data, so one instance can be shared behind an `Arc`
/// by every request of a process.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    registry: Arc<ActionRegistry>,
    max_chain_len: usize,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router, registry: Arc<ActionRegistry>) -> Self {
        let missing = registry.missing_actions(router.catalog());
        if !missing.is_empty() {
            warn!(
                missing = ?missing,
                "Routes without a registered action will fail when dispatched"
            );
        }
        Self {
            router,
            registry,
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
        }
    }

    #[must_use]
    pub fn from_catalog(catalog: Arc<Catalog>, registry: Arc<ActionRegistry>) -> Self {
        Self::new(Router::new(catalog), registry)
    }

    /// Load the catalog described by `config` (through the cache when
    /// enabled) and build a dispatcher over it.
    pub fn bootstrap(
        config: &EngineConfig,
        registry: Arc<ActionRegistry>,
    ) -> Result<Self, ConfigurationError> {
        let catalog = config.loader().load()?;
        Ok(Self::from_catalog(Arc::new(catalog), registry)
            .with_max_chain_len(config.max_chain_len))
    }

    #[must_use]
    pub fn with_max_chain_len(mut self, max_chain_len: usize) -> Self {
        self.max_chain_len = max_chain_len.max(1);
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Match `request` and run the resulting chain.
    pub fn dispatch(&self, request: &RequestContext) -> Result<DispatchOutcome, DispatchError> {
        let span = info_span!(
            "dispatch",
            request_id = %request.request_id(),
            method = %request.method(),
            path = %request.raw_path()
        );
        let _enter = span.enter();

        let matched = self.router.route(request)?;
        self.run(matched, request)
    }

    /// Run the action chain starting at `matched`.
    ///
    /// Each step builds a fresh action, injects the chain state and calls
    /// `init`, then `start` (first step only), then `logic`. A non-empty name
    /// returned from `start` or `logic` ends the step and starts the next one
    /// with that action. A step that requests nothing runs `view` and `stop`
    /// and ends the request.
    pub fn run(
        &self,
        matched: RouteMatch,
        request: &RequestContext,
    ) -> Result<DispatchOutcome, DispatchError> {
        let started = Instant::now();
        let mut state = DispatchState::new(matched);

        loop {
            let factory = self.registry.resolve(&state.current_action)?;
            let mut action = factory();
            let name = state.current_action.clone();
            let mut ctx = ActionContext::new(
                name.clone(),
                state.chain.clone(),
                state.config.clone(),
                state.shared_user_data.take().unwrap_or_default(),
                request,
            );

            let mut phase = Phase::Init;
            let next = loop {
                debug!(action = %name, phase = ?phase, "Action step");
                phase = match phase {
                    Phase::Init => {
                        check(&name, Hook::Init, action.init(&mut ctx))?;
                        if state.start_fired {
                            Phase::AwaitingLogic
                        } else {
                            Phase::AwaitingStart
                        }
                    }
                    Phase::AwaitingStart => {
                        let result = check(&name, Hook::Start, action.start(&mut ctx))?;
                        state.start_fired = true;
                        match transition(result) {
                            Some(next) => break Some((Hook::Start, next)),
                            None => Phase::AwaitingLogic,
                        }
                    }
                    Phase::AwaitingLogic => {
                        let result =
                            check(&name, Hook::Logic, action.logic(&mut ctx, &state.args))?;
                        match transition(result) {
                            Some(next) => break Some((Hook::Logic, next)),
                            None => Phase::Terminal,
                        }
                    }
                    Phase::Terminal => {
                        check(&name, Hook::View, action.view(&mut ctx, &state.args))?;
                        check(&name, Hook::Stop, action.stop(&mut ctx, &state.args))?;
                        break None;
                    }
                };
            };

            let Some((hook, next)) = next else {
                info!(
                    chain = ?state.chain,
                    terminal = %name,
                    duration_us = started.elapsed().as_micros(),
                    "Dispatch complete"
                );
                return Ok(DispatchOutcome {
                    chain: state.chain,
                    user_data: ctx.into_user_data(),
                });
            };

            debug!(from = %name, to = %next, hook = %hook, "Chaining to next action");
            state.chain.push(next.clone());
            if state.chain.len() > self.max_chain_len {
                return Err(DispatchError::ChainTooLong {
                    limit: self.max_chain_len,
                    last: next,
                });
            }
            if let Some(config) = self.router.catalog().get(&next) {
                state.config = Some(Arc::clone(config));
            }
            state.shared_user_data = Some(ctx.into_user_data());
            state.current_action = next;
        }
    }
}
