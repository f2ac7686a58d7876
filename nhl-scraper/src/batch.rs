//! Bounded-concurrency fan-out over identifiers.

use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::error::ScrapeError;

/// Per-identifier results of a batch. Both lists keep input order.
#[derive(Debug)]
pub struct BatchOutcome<K, T> {
    pub ok: Vec<(K, T)>,
    pub failed: Vec<(K, ScrapeError)>,
}

impl<K, T> BatchOutcome<K, T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.ok.iter().map(|(_, v)| v)
    }
}

/// Run `f` for every id with at most `concurrency` calls in flight. A failed
/// id is logged and collected; it never aborts the rest.
pub async fn run_batch<K, T, F, Fut>(ids: Vec<K>, concurrency: usize, f: F) -> BatchOutcome<K, T>
where
    K: Clone + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let total = ids.len();
    let mut results: Vec<(usize, K, Result<T, ScrapeError>)> = stream::iter(
        ids.into_iter().enumerate(),
    )
    .map(|(idx, id)| {
        let fut = f(id.clone());
        async move { (idx, id, fut.await) }
    })
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;
    results.sort_by_key(|(idx, _, _)| *idx);

    let mut outcome = BatchOutcome {
        ok: Vec::with_capacity(total),
        failed: Vec::new(),
    };
    for (_, id, result) in results {
        match result {
            Ok(value) => outcome.ok.push((id, value)),
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "scrape.batch.item_failed");
                outcome.failed.push((id, err));
            }
        }
    }
    tracing::debug!(
        total,
        ok = outcome.ok.len(),
        failed = outcome.failed.len(),
        "scrape.batch.done"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn failures_are_collected_and_order_kept() {
        let ids: Vec<u32> = (1..=6).collect();
        let outcome = run_batch(ids, 3, |id| async move {
            // later ids finish first
            tokio::time::sleep(Duration::from_millis(u64::from(10 * (7 - id)))).await;
            if id % 3 == 0 {
                Err(ScrapeError::NotFound { url: format!("game/{id}") })
            } else {
                Ok(id * 10)
            }
        })
        .await;

        let ok: Vec<u32> = outcome.ok.iter().map(|(id, _)| *id).collect();
        assert_eq!(ok, vec![1, 2, 4, 5]);
        assert_eq!(outcome.values().copied().collect::<Vec<_>>(), vec![10, 20, 40, 50]);
        let failed: Vec<u32> = outcome.failed.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![3, 6]);
        assert!(outcome.failed[0].1.is_not_found());
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn in_flight_calls_never_exceed_the_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let outcome = run_batch((0..12).collect::<Vec<u32>>(), 4, |_| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ScrapeError>(())
            }
        })
        .await;
        assert_eq!(outcome.ok.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }
}
