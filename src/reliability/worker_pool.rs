//! Bounded cooperative executor.
//!
//! Admits at most `max_concurrent` tasks at once. A submitted task blocks
//! at admission until a slot frees up. Built over `tokio::sync::Semaphore`
//! the same way the reference backend leans on `tokio`/`dashmap` for
//! bounded concurrent access rather than a hand-rolled thread pool.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::EnrichmentError;

#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))) }
    }

    /// Run a single task, waiting for an admission slot first.
    ///
    /// Returns `Err(EnrichmentError::Cancelled)` if `cancel` fires while
    /// waiting for admission, without ever invoking `task`.
    pub async fn submit<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        task: F,
    ) -> Result<T, EnrichmentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EnrichmentError>>,
    {
        let _permit = tokio::select! {
            permit = self.semaphore.acquire() => permit.expect("semaphore never closed"),
            _ = cancel.cancelled() => return Err(EnrichmentError::Cancelled),
        };

        task().await
    }

    /// Submit a batch of independent tasks and collect their results in
    /// input order. One failing task does not prevent its siblings from
    /// running.
    pub async fn run_all<I, F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        items: I,
        task: F,
    ) -> Vec<Result<T, EnrichmentError>>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, EnrichmentError>> + Send,
        T: Send,
        F: Clone,
    {
        let futures = items.into_iter().map(|item| {
            let pool = self.clone();
            let cancel = cancel.clone();
            let task = task.clone();
            async move { pool.submit(&cancel, || task(item)).await }
        });

        futures::future::join_all(futures).await
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn admits_at_most_max_concurrent() {
        let pool = WorkerPool::new(2);
        let cancel = CancellationToken::new();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let results = pool
            .run_all(&cancel, 0..10, {
                let in_flight = in_flight.clone();
                let max_seen = max_seen.clone();
                move |_| {
                    let in_flight = in_flight.clone();
                    let max_seen = max_seen.clone();
                    async move {
                        let cur = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(cur, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, EnrichmentError>(())
                    }
                }
            })
            .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn cancellation_unblocks_waiters() {
        let pool = WorkerPool::new(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pool.submit(&cancel, || async { Ok::<_, EnrichmentError>(()) }).await;
        assert!(matches!(result, Err(EnrichmentError::Cancelled)));
    }

    #[tokio::test]
    async fn one_failure_does_not_block_siblings() {
        let pool = WorkerPool::new(4);
        let cancel = CancellationToken::new();

        let results = pool
            .run_all(&cancel, 0..5, |i| async move {
                if i == 2 {
                    Err(EnrichmentError::other("boom"))
                } else {
                    Ok(i)
                }
            })
            .await;

        let ok_count = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok_count, 4);
    }
}
