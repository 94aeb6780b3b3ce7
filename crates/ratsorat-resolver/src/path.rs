//! The chain of module names a resolution is currently nested in.

use std::fmt;
use std::sync::Arc;

use ratsorat_util::errors::ResolveError;

/// Ordered list of modules from the outermost request to the module being
/// resolved. Each nested request gets its own extended copy, so concurrent
/// top-level resolutions never see each other's paths.
#[derive(Debug, Clone, Default)]
pub struct ResolutionPath {
    names: Arc<[String]>,
}

impl ResolutionPath {
    /// The empty path a top-level request starts from.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path with `name` appended.
    pub fn enter(&self, name: &str) -> Self {
        let names: Vec<String> = self
            .names
            .iter()
            .cloned()
            .chain(std::iter::once(name.to_string()))
            .collect();
        Self {
            names: names.into(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The module currently being resolved.
    pub fn current(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cycle error for a request that leads back onto this path through `tail`.
    ///
    /// `tail` ends with the name that is already on the path.
    pub fn cycle_through<I>(&self, tail: I) -> ResolveError
    where
        I: IntoIterator<Item = String>,
    {
        ResolveError::Cycle {
            path: self.names.iter().cloned().chain(tail).collect(),
        }
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(" -> "))
    }
}
