//! Compiled resolvers: memoized, cycle-safe resolution of named modules.
//!
//! [`compile`] binds a [`ModuleTable`] to a resolution function. The result
//! resolves each module at most once, shares in-flight resolutions between
//! every caller asking for the same name, and fails with a cycle error
//! instead of recursing forever when modules request each other.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use ratsorat_core::config::ResolverConfig;
use ratsorat_core::module_table::ModuleTable;
use ratsorat_util::errors::ResolveResult;

use crate::graph::DependencyGraph;
use crate::path::ResolutionPath;

type Resolution<V> = BoxFuture<'static, ResolveResult<V>>;

/// Logic computing a module's value from its seed.
///
/// Implemented for every `Fn(Dependencies, Option<S>, A) -> impl Future`
/// closure, so most callers pass a closure to [`compile`].
pub trait ModuleResolver<S, A, V>: Send + Sync + 'static {
    fn resolve(&self, deps: Dependencies<S, A, V>, seed: Option<S>, arg: A) -> Resolution<V>;
}

impl<S, A, V, F, Fut> ModuleResolver<S, A, V> for F
where
    F: Fn(Dependencies<S, A, V>, Option<S>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult<V>> + Send + 'static,
{
    fn resolve(&self, deps: Dependencies<S, A, V>, seed: Option<S>, arg: A) -> Resolution<V> {
        self(deps, seed, arg).boxed()
    }
}

/// Bind `modules` to `resolver` with the default [`ResolverConfig`].
pub fn compile<S, A, V, F, Fut>(modules: ModuleTable<S>, resolver: F) -> CompiledResolver<S, A, V>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    F: Fn(Dependencies<S, A, V>, Option<S>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult<V>> + Send + 'static,
{
    compile_with_config(modules, ResolverConfig::default(), resolver)
}

pub fn compile_with_config<S, A, V, F, Fut>(
    modules: ModuleTable<S>,
    config: ResolverConfig,
    resolver: F,
) -> CompiledResolver<S, A, V>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    F: Fn(Dependencies<S, A, V>, Option<S>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult<V>> + Send + 'static,
{
    CompiledResolver::new(modules, config, resolver)
}

/// Memo tables shared by every resolution of one compiled resolver.
struct State<V> {
    results: BTreeMap<String, V>,
    /// In-flight or failed resolutions. Successful ones move to `results`.
    pending: HashMap<String, Shared<Resolution<V>>>,
    /// Names each in-flight module is currently awaiting.
    waiting: HashMap<String, HashSet<String>>,
}

impl<V> State<V> {
    /// Follow waits-for edges from `start` until one reaches a module on
    /// `path`. Returns the chain from `start` to that module, both included.
    fn wait_chain(&self, start: &str, path: &ResolutionPath) -> Option<Vec<String>> {
        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<&str> = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.waiting.get(current).into_iter().flatten() {
                let next = next.as_str();
                if !seen.insert(next) {
                    continue;
                }
                parents.insert(next, current);
                if path.contains(next) {
                    let mut chain = vec![next.to_string()];
                    let mut cursor = next;
                    while let Some(&parent) = parents.get(cursor) {
                        chain.push(parent.to_string());
                        cursor = parent;
                    }
                    chain.reverse();
                    return Some(chain);
                }
                queue.push_back(next);
            }
        }
        None
    }
}

struct Inner<S, A, V> {
    modules: ModuleTable<S>,
    resolver: Box<dyn ModuleResolver<S, A, V>>,
    config: ResolverConfig,
    state: Mutex<State<V>>,
    graph: Mutex<DependencyGraph>,
}

impl<S, A, V> Inner<S, A, V> {
    fn lock_state(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_graph(&self) -> MutexGuard<'_, DependencyGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A module table bound to a resolution function.
///
/// Cloning is cheap and every clone shares the same memo tables.
pub struct CompiledResolver<S, A, V> {
    inner: Arc<Inner<S, A, V>>,
}

impl<S, A, V> Clone for CompiledResolver<S, A, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A, V> CompiledResolver<S, A, V>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new<R>(modules: ModuleTable<S>, config: ResolverConfig, resolver: R) -> Self
    where
        R: ModuleResolver<S, A, V>,
    {
        Self {
            inner: Arc::new(Inner {
                modules,
                resolver: Box::new(resolver),
                config,
                state: Mutex::new(State {
                    results: BTreeMap::new(),
                    pending: HashMap::new(),
                    waiting: HashMap::new(),
                }),
                graph: Mutex::new(DependencyGraph::new()),
            }),
        }
    }

    /// Resolve module `name`, passing `arg` to its resolution function.
    ///
    /// A module that already resolved returns its cached value and `arg` is
    /// ignored. A module whose resolution failed keeps returning that error.
    pub fn resolve(&self, name: &str, arg: A) -> BoxFuture<'static, ResolveResult<V>> {
        let mut state = self.inner.lock_state();
        self.run(&mut state, name, arg, &ResolutionPath::root())
    }

    /// Look up or start the resolution of `name` nested under `parent`.
    ///
    /// The pending entry is inserted before the resolution function is first
    /// polled, so the caller must hold the state lock across the call.
    fn run(
        &self,
        state: &mut State<V>,
        name: &str,
        arg: A,
        parent: &ResolutionPath,
    ) -> Resolution<V> {
        if let Some(value) = state.results.get(name) {
            tracing::trace!(module = name, "using cached result");
            return future::ready(Ok(value.clone())).boxed();
        }
        if let Some(pending) = state.pending.get(name) {
            tracing::trace!(module = name, "joining in-flight resolution");
            return pending.clone().boxed();
        }

        let resolution = self
            .clone()
            .start(name.to_string(), arg, parent.enter(name))
            .boxed()
            .shared();
        state.pending.insert(name.to_string(), resolution.clone());
        resolution.boxed()
    }

    async fn start(self, name: String, arg: A, path: ResolutionPath) -> ResolveResult<V> {
        self.inner.lock_graph().add_module(&name);
        let seed = self.inner.modules.get(&name);
        if seed.is_none() {
            tracing::debug!(module = %name, "module is not in the table");
        }
        tracing::debug!(module = %name, path = %path, "resolving module");

        let deps = Dependencies {
            compiled: self.clone(),
            path,
        };
        let result = self.inner.resolver.resolve(deps, seed, arg).await;
        self.settle(&name, &result);
        result
    }

    fn settle(&self, name: &str, result: &ResolveResult<V>) {
        let mut state = self.inner.lock_state();
        state.waiting.remove(name);
        match result {
            Ok(value) => {
                state.results.insert(name.to_string(), value.clone());
                state.pending.remove(name);
            }
            Err(err) => tracing::debug!(module = name, "resolution failed: {err}"),
        }
    }

    /// Handle `requester`'s request for `name` while `path` is active.
    fn request(
        &self,
        requester: &str,
        name: &str,
        arg: A,
        path: &ResolutionPath,
    ) -> ResolveResult<Resolution<V>> {
        if path.contains(name) {
            let err = path.cycle_through([name.to_string()]);
            tracing::debug!("{err}");
            return Err(err);
        }

        let mut state = self.inner.lock_state();
        // `name` may be in flight under another top-level resolution that is
        // itself waiting on this path; awaiting it would never complete.
        if !state.results.contains_key(name) && state.pending.contains_key(name) {
            if let Some(chain) = state.wait_chain(name, path) {
                let err = path.cycle_through(chain);
                tracing::debug!("{err}");
                return Err(err);
            }
        }
        state
            .waiting
            .entry(requester.to_string())
            .or_default()
            .insert(name.to_string());
        let resolution = self.run(&mut state, name, arg, path);
        drop(state);

        self.inner.lock_graph().add_dependency(requester, name);
        Ok(resolution)
    }

    fn release(&self, requester: &str, name: &str) {
        let mut state = self.inner.lock_state();
        if let Some(awaited) = state.waiting.get_mut(requester) {
            awaited.remove(name);
            if awaited.is_empty() {
                state.waiting.remove(requester);
            }
        }
    }

    /// Resolve every module in the table, including ones added meanwhile.
    ///
    /// See [`crate::resolve_all::resolve_all`].
    pub async fn resolve_all(&self, arg: A) -> ResolveResult<BTreeMap<String, V>>
    where
        A: Clone,
    {
        crate::resolve_all::resolve_all(self, arg).await
    }

    /// Snapshot of every value resolved so far.
    pub fn results(&self) -> BTreeMap<String, V> {
        self.inner.lock_state().results.clone()
    }

    pub fn result(&self, name: &str) -> Option<V> {
        self.inner.lock_state().results.get(name).cloned()
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.inner.lock_state().results.contains_key(name)
    }

    pub fn modules(&self) -> &ModuleTable<S> {
        &self.inner.modules
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    /// Snapshot of the dependency requests recorded so far.
    pub fn graph(&self) -> DependencyGraph {
        self.inner.lock_graph().clone()
    }
}

/// Handle a resolution function uses to request other modules.
///
/// Every `Dependencies` carries the path of the resolution it was created
/// for, which is what cycle detection checks against.
pub struct Dependencies<S, A, V> {
    compiled: CompiledResolver<S, A, V>,
    path: ResolutionPath,
}

impl<S, A, V> Dependencies<S, A, V>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Resolve module `name` on behalf of the module being resolved.
    ///
    /// Fails with [`ResolveError::Cycle`](ratsorat_util::errors::ResolveError::Cycle)
    /// if `name` is, directly or through other in-flight resolutions, waiting
    /// on the requesting module.
    pub async fn resolve(&self, name: &str, arg: A) -> ResolveResult<V> {
        let requester = self.path.current().unwrap_or_default();
        let resolution = self.compiled.request(requester, name, arg, &self.path)?;
        let result = resolution.await;
        self.compiled.release(requester, name);
        result
    }

    /// Path from the outermost request to the module being resolved.
    pub fn path(&self) -> &ResolutionPath {
        &self.path
    }

    /// The module table being resolved, for registering new modules.
    pub fn modules(&self) -> &ModuleTable<S> {
        self.compiled.modules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting_on(edges: &[(&str, &str)]) -> State<()> {
        let mut waiting: HashMap<String, HashSet<String>> = HashMap::new();
        for (from, to) in edges {
            waiting
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string());
        }
        State {
            results: BTreeMap::new(),
            pending: HashMap::new(),
            waiting,
        }
    }

    #[test]
    fn wait_chain_reaches_active_path() {
        let state = waiting_on(&[("a", "b"), ("b", "c"), ("b", "z")]);
        let path = ResolutionPath::root().enter("x").enter("c");
        let chain = state.wait_chain("a", &path).unwrap();
        assert_eq!(chain, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(
            path.cycle_through(chain).to_string(),
            "dependency cycle: x -> c -> a -> b -> c"
        );
    }

    #[test]
    fn wait_chain_ignores_unrelated_waits() {
        let state = waiting_on(&[("a", "b"), ("b", "a")]);
        let path = ResolutionPath::root().enter("c");
        assert!(state.wait_chain("a", &path).is_none());
    }
}
