//! Name-keyed factories for [`Action`] implementations.
//!
//! Populated once at startup; resolving a name is a map lookup.
//!
//! ```
//! use sifrouter::action::Action;
//! use sifrouter::registry::ActionRegistry;
//!
//! #[derive(Default)]
//! struct Home;
//! impl Action for Home {}
//!
//! let mut registry = ActionRegistry::new();
//! registry.register_default::<Home>("home");
//! assert!(registry.resolve("home").is_ok());
//! assert!(registry.resolve("missing").is_err());
//! ```

use crate::action::Action;
use crate::catalog::Catalog;
use crate::error::DispatchError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Constructor for one action type.
pub type ActionFactory = Arc<dyn Fn() -> Box<dyn Action> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier registration.
    pub fn register<F, A>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> A + Send + Sync + 'static,
        A: Action + 'static,
    {
        let boxed: ActionFactory = Arc::new(move || Box::new(factory()) as Box<dyn Action>);
        if self.factories.insert(name.to_string(), boxed).is_some() {
            warn!(action = %name, "Replaced existing action registration");
        } else {
            info!(
                action = %name,
                total_actions = self.factories.len(),
                "Action registered"
            );
        }
    }

    /// Register an action type constructed through [`Default`].
    pub fn register_default<A>(&mut self, name: &str)
    where
        A: Action + Default + 'static,
    {
        self.register(name, A::default);
    }

    /// Look up the factory for `name`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::ActionResolution`] when nothing is registered.
    pub fn resolve(&self, name: &str) -> Result<&ActionFactory, DispatchError> {
        self.factories
            .get(name)
            .ok_or_else(|| DispatchError::ActionResolution(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Catalog routes with no registered action, in catalog order.
    #[must_use]
    pub fn missing_actions(&self, catalog: &Catalog) -> Vec<String> {
        catalog
            .names()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }
}
