//! Bulk resolution of every module in a table.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use ratsorat_util::errors::{ResolveError, ResolveResult};
use tokio::sync::Semaphore;

use crate::resolver::CompiledResolver;

/// Resolve every module of `compiled`'s table, passing `arg` to each
/// top-level request, and return all results.
///
/// The table is re-read before every pass, so modules registered by a
/// resolution function are picked up by the following pass. Resolutions
/// within a pass run concurrently; the next pass starts once all of them
/// settled. Stops at the first pass that finds nothing left to resolve.
///
/// The first failing resolution aborts the pass and is returned. Values
/// resolved before the failure stay available through
/// [`CompiledResolver::results`].
pub async fn resolve_all<S, A, V>(
    compiled: &CompiledResolver<S, A, V>,
    arg: A,
) -> ResolveResult<BTreeMap<String, V>>
where
    S: Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    let config = compiled.config();
    config.validate()?;
    let limiter = config
        .max_concurrency
        .map(|permits| Arc::new(Semaphore::new(permits)));

    let mut passes = 0usize;
    loop {
        let unresolved: Vec<String> = compiled
            .modules()
            .names()
            .into_iter()
            .filter(|name| !compiled.is_resolved(name))
            .collect();
        if unresolved.is_empty() {
            break;
        }
        if passes == config.max_passes {
            tracing::warn!(
                "{} modules still unresolved after {passes} passes",
                unresolved.len()
            );
            return Err(ResolveError::PassLimit {
                limit: config.max_passes,
            });
        }
        passes += 1;
        tracing::debug!(pass = passes, modules = unresolved.len(), "starting resolution pass");

        let batch = unresolved.into_iter().map(|name| {
            let resolution = compiled.resolve(&name, arg.clone());
            let limiter = limiter.clone();
            async move {
                let _permit = match &limiter {
                    Some(sem) => Some(
                        sem.acquire()
                            .await
                            .map_err(|e| ResolveError::msg(format!("resolution limiter: {e}")))?,
                    ),
                    None => None,
                };
                resolution.await
            }
        });
        try_join_all(batch).await?;
    }

    let results = compiled.results();
    tracing::info!(passes, modules = results.len(), "all modules resolved");
    Ok(results)
}
