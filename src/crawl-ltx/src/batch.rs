//! Concurrent batch processing utilities.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Processes items concurrently, at most `concurrency` at a time, and returns
/// one result per item in the order the items were given.
///
/// Completion order does not matter: a slow first item is still the first result.
///
/// # Examples
///
/// ```no_run
/// # use crawl_ltx::batch::process_ordered;
/// # async fn example() {
/// let urls = vec!["url1", "url2", "url3"];
/// let results = process_ordered(
///     urls,
///     |url, index| async move { format!("{}: {}", index, url) },
///     5,
/// )
/// .await;
/// assert_eq!(results[0], "0: url1");
/// # }
/// ```
pub async fn process_ordered<T, F, Fut, R>(items: Vec<T>, processor: F, concurrency: usize) -> Vec<R>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = R>,
{
    stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| processor(item, index))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
