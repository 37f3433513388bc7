//! The action lifecycle contract.
//!
//! An action is created fresh for every step of a chain. The dispatcher calls
//! its hooks in this order:
//!
//! 1. `init` on every step.
//! 2. `start` once per request, on the first step only. Returning a name
//!    chains to that action immediately.
//! 3. `logic` with the match arguments. Returning a name chains to that action.
//! 4. `view` then `stop`, only on the action that ends the chain.
//!
//! Every hook has a no-op default. Returning `None` or an empty name means
//! "no transition".

use crate::catalog::RouteConfig;
use crate::request::RequestContext;
use crate::router::RouteArgs;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Values shared between the actions of one chain.
pub type UserData = HashMap<String, Value>;

/// Name of the action to chain to, if any.
pub type Next = Option<String>;

/// State injected into an action before `init`.
#[derive(Debug)]
pub struct ActionContext<'r> {
    name: String,
    chain: Vec<String>,
    config: Option<Arc<RouteConfig>>,
    user_data: UserData,
    request: &'r RequestContext,
}

impl<'r> ActionContext<'r> {
    pub(crate) fn new(
        name: String,
        chain: Vec<String>,
        config: Option<Arc<RouteConfig>>,
        user_data: UserData,
        request: &'r RequestContext,
    ) -> Self {
        Self {
            name,
            chain,
            config,
            user_data,
            request,
        }
    }

    /// Name of the running action.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Actions visited so far, including this one.
    #[must_use]
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Config of the route this action runs under. Absent when the request
    /// reached it through a fallback and no chained route supplied one.
    #[must_use]
    pub fn config(&self) -> Option<&RouteConfig> {
        self.config.as_deref()
    }

    #[must_use]
    pub fn request(&self) -> &'r RequestContext {
        self.request
    }

    #[must_use]
    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }

    /// Read a shared value.
    #[must_use]
    pub fn user_var(&self, name: &str) -> Option<&Value> {
        self.user_data.get(name)
    }

    /// Set a shared value; it travels to every action chained after this one.
    pub fn set_user_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.user_data.insert(name.into(), value.into());
    }

    pub(crate) fn into_user_data(self) -> UserData {
        self.user_data
    }
}

/// A unit of request handling.
///
/// Hooks that fail abort the whole request with
/// [`DispatchError::Hook`](crate::error::DispatchError::Hook).
pub trait Action {
    fn init(&mut self, _ctx: &mut ActionContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once per request, before the first `logic`. Meant for global
    /// concerns such as authentication.
    fn start(&mut self, _ctx: &mut ActionContext<'_>) -> anyhow::Result<Next> {
        Ok(None)
    }

    fn logic(&mut self, _ctx: &mut ActionContext<'_>, _args: &RouteArgs) -> anyhow::Result<Next> {
        Ok(None)
    }

    fn view(&mut self, _ctx: &mut ActionContext<'_>, _args: &RouteArgs) -> anyhow::Result<()> {
        Ok(())
    }

    /// Teardown for the terminal action, e.g. closing connections.
    fn stop(&mut self, _ctx: &mut ActionContext<'_>, _args: &RouteArgs) -> anyhow::Result<()> {
        Ok(())
    }
}
