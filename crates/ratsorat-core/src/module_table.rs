//! The table of named modules and their seed values.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, growable mapping from module name to seed value.
///
/// Cloning a `ModuleTable` yields another handle to the same table, so a
/// resolution function holding a clone can register modules that the bulk
/// resolver picks up on its next pass.
#[derive(Debug)]
pub struct ModuleTable<S> {
    entries: Arc<RwLock<BTreeMap<String, S>>>,
}

impl<S> ModuleTable<S> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Insert or replace a module's seed. Returns the previous seed, if any.
    pub fn insert(&self, name: impl Into<String>, seed: S) -> Option<S> {
        self.write().insert(name.into(), seed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Current module names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, S>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, S>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Clone> ModuleTable<S> {
    /// Seed value for `name`, or `None` if no such module is registered.
    pub fn get(&self, name: &str) -> Option<S> {
        self.read().get(name).cloned()
    }
}

impl<S> Clone for ModuleTable<S> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<S> Default for ModuleTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, K: Into<String>> FromIterator<(K, S)> for ModuleTable<S> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let entries = iter.into_iter().map(|(k, s)| (k.into(), s)).collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}
