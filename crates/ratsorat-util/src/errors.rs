use std::error::Error as StdError;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for module resolution.
///
/// A settled error is cloned out to every caller waiting on the same module.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ResolveError {
    /// A module (transitively) requested itself.
    #[error("dependency cycle: {}", .path.join(" -> "))]
    #[diagnostic(help("break the cycle by removing one of the dependency requests"))]
    Cycle { path: Vec<String> },

    /// Error raised by a resolution function, passed through untouched.
    #[error(transparent)]
    Failed(Arc<dyn StdError + Send + Sync + 'static>),

    /// Plain error message raised by a resolution function.
    #[error("{message}")]
    Message { message: String },

    /// The module table kept growing past the configured number of passes.
    #[error("module table did not reach a fixed point after {limit} passes")]
    #[diagnostic(help("raise `max-passes` or stop adding modules during resolution"))]
    PassLimit { limit: usize },

    /// Resolver configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ResolveError {
    /// Wrap any error raised by a resolution function.
    pub fn other<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failed(Arc::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    /// The module names forming the cycle, ending with the repeated name.
    pub fn cycle_path(&self) -> Option<&[String]> {
        match self {
            Self::Cycle { path } => Some(path),
            _ => None,
        }
    }
}

/// Convenience alias used by every resolution future.
pub type ResolveResult<T> = Result<T, ResolveError>;
