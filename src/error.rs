//! Error taxonomy for catalog loading and request dispatch.
//!
//! Every error here is fatal for the request that raised it. The engine never
//! retries and never substitutes a default action on its own; translating an
//! error into a response is the host's job, helped by
//! [`DispatchError::status_code`].

use http::StatusCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The action directory is unusable.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("action directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("action directory cannot be listed: {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no actions found in {}", .0.display())]
    Empty(PathBuf),
}

/// Lifecycle hook identifiers, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Start,
    Logic,
    View,
    Stop,
}

impl Hook {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Hook::Init => "init",
            Hook::Start => "start",
            Hook::Logic => "logic",
            Hook::View => "view",
            Hook::Stop => "stop",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a single dispatch aborts.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("no actions matched {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("action `{0}` has no registered implementation")]
    ActionResolution(String),

    #[error("action `{action}` failed in {hook}")]
    Hook {
        action: String,
        hook: Hook,
        #[source]
        source: anyhow::Error,
    },

    #[error("action chain exceeded {limit} steps (last: `{last}`)")]
    ChainTooLong { limit: usize, last: String },
}

impl DispatchError {
    /// Response status a host should send for this failure.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::ActionResolution(_)
            | DispatchError::Hook { .. }
            | DispatchError::ChainTooLong { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
