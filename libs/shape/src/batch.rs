//! Concurrent lookups whose results come back in input order.

use std::future::Future;

use futures::future::try_join_all;

/// Run `f` over every item concurrently and collect the results in input
/// order.
///
/// Fails with the first error any call reports; the other in-flight futures
/// are dropped at that point. Dropping the returned future cancels every
/// lookup that hasn't finished.
///
/// # Errors
/// Returns the first error produced by `f`.
pub async fn map_concurrently<I, F, Fut, T, E>(items: I, f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    try_join_all(items.into_iter().map(f)).await
}

/// [`map_concurrently`] for lookups that may come back empty.
///
/// `None` results are removed once every call has completed; the survivors
/// keep their relative order.
///
/// # Errors
/// Returns the first error produced by `f`.
pub async fn map_concurrently_compact<I, F, Fut, T, E>(items: I, f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let results = map_concurrently(items, f).await?;
    Ok(results.into_iter().flatten().collect())
}
