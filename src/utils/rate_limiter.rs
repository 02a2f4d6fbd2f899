//! Serial request queue with a minimum dispatch interval
//!
//! Guarantees:
//! - FIFO: tasks start in submission order (tokio's `Mutex` is fair)
//! - exactly one task in flight at a time
//! - consecutive dispatch *starts* are at least `min_interval` apart, so a
//!   slow upstream call does not shorten the gap before the next one
//! - a failing task only fails its own caller
//! - each task is bounded by `task_timeout`, so one hung call cannot stall
//!   the whole queue
//! - once dispatched, a call runs to completion even if its caller is dropped;
//!   the result is simply discarded
//!
//! When the queue drains the limiter is simply idle; the next `enqueue`
//! re-arms it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct RateLimiter {
    /// Start time of the last dispatch; the lock itself is the queue
    last_dispatch: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    task_timeout: Duration,
    dispatched: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, task_timeout: Duration) -> Self {
        Self {
            last_dispatch: Arc::new(Mutex::new(None)),
            min_interval,
            task_timeout,
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `operation` in its turn. The future is not polled before then.
    pub async fn enqueue<F, T>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.enqueue_unless(|| None, operation).await
    }

    /// Like `enqueue`, but `settled` is consulted once the turn comes. If it
    /// yields a value, `operation` is dropped without taking a dispatch slot.
    ///
    /// The dispatched operation runs on its own task and keeps the queue
    /// until it finishes, even if the caller stops waiting for it.
    pub async fn enqueue_unless<S, F, T>(&self, settled: S, operation: F) -> AppResult<T>
    where
        S: FnOnce() -> Option<T>,
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut last = self.last_dispatch.clone().lock_owned().await;

        if let Some(value) = settled() {
            return Ok(value);
        }

        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
        let seq = self.dispatched.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("🚦 dispatch #{}", seq);

        let task_timeout = self.task_timeout;
        let dispatch = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(task_timeout, operation).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "⏱️ dispatch #{} exceeded {}ms, releasing queue",
                        seq,
                        task_timeout.as_millis()
                    );
                    Err(AppError::queue_timeout(task_timeout.as_millis()))
                }
            };
            drop(last);
            outcome
        });

        dispatch.await.map_err(|e| {
            AppError::new(ErrorCode::Unknown, format!("dispatch #{} task failed: {}", seq, e))
        })?
    }

    /// Total tasks dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex as StdMutex;

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_spacing_and_order() {
        let limiter = RateLimiter::new(Duration::from_millis(500), Duration::from_secs(30));
        let starts: Arc<StdMutex<Vec<(usize, Instant)>>> = Arc::new(StdMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5 {
            let limiter = limiter.clone();
            let starts = starts.clone();
            handles.push(tokio::spawn(async move {
                limiter
                    .enqueue(async move {
                        starts.lock().unwrap().push((i, Instant::now()));
                        Ok::<_, AppError>(i)
                    })
                    .await
            }));
            // deterministic submission order
            tokio::task::yield_now().await;
        }
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.await.unwrap().unwrap(), i);
        }

        let starts = starts.lock().unwrap();
        let order: Vec<usize> = starts.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        for pair in starts.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_task_does_not_add_extra_gap() {
        let limiter = RateLimiter::new(Duration::from_millis(500), Duration::from_secs(30));
        let t0 = Instant::now();

        limiter
            .enqueue(async {
                tokio::time::sleep(Duration::from_millis(800)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap();

        let second_start = limiter
            .enqueue(async { Ok::<_, AppError>(Instant::now()) })
            .await
            .unwrap();
        // interval already elapsed during the slow call
        assert_eq!(second_start - t0, Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_isolated() {
        let limiter = RateLimiter::new(Duration::from_millis(10), Duration::from_secs(30));
        let failed: AppResult<()> = limiter
            .enqueue(async { Err(AppError::upstream(500, "boom")) })
            .await;
        assert!(failed.is_err());

        let ok = limiter.enqueue(async { Ok::<_, AppError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);
        assert_eq!(limiter.dispatched(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_task_times_out_and_queue_moves_on() {
        let limiter = RateLimiter::new(Duration::from_millis(10), Duration::from_secs(2));
        let hung: AppResult<()> = limiter
            .enqueue(async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await;
        assert_eq!(hung.unwrap_err().code_str(), "QUEUE_TIMEOUT");

        let next = limiter.enqueue(async { Ok::<_, AppError>("next") }).await;
        assert_eq!(next.unwrap(), "next");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_lets_dispatch_finish() {
        let limiter = RateLimiter::new(Duration::from_millis(10), Duration::from_secs(30));
        let finished = Arc::new(AtomicBool::new(false));

        let caller = {
            let limiter = limiter.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                limiter
                    .enqueue(async move {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        finished.store(true, Ordering::SeqCst);
                        Ok::<_, AppError>(())
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(finished.load(Ordering::SeqCst));

        let next = limiter.enqueue(async { Ok::<_, AppError>(1) }).await;
        assert_eq!(next.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_turn_skips_dispatch() {
        let limiter = RateLimiter::new(Duration::from_millis(500), Duration::from_secs(30));
        limiter.enqueue(async { Ok::<_, AppError>(0) }).await.unwrap();

        let t0 = Instant::now();
        let value = limiter
            .enqueue_unless(|| Some(42), async { Ok::<_, AppError>(0) })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(limiter.dispatched(), 1);
        // no spacing wait for a turn that never reaches the network
        assert_eq!(Instant::now(), t0);
    }
}
