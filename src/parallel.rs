//! Ordered parallel mapping over work items.
//!
//! Forest training farms one task per tree out to a fixed-size worker pool.
//! Results come back in item order, and a worker failure is captured in that
//! task's result slot rather than tearing down the pool: every task still
//! runs to completion, then the first error is surfaced.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;

/// Error captured from a failed worker task.
#[derive(Debug, Clone, thiserror::Error)]
#[error("worker task failed: {message}")]
pub struct WorkerError {
    /// Panic payload rendered as text.
    pub message: String,
}

impl WorkerError {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "opaque panic payload".to_string()
        };
        Self { message }
    }
}

/// Number of workers to actually run.
///
/// `requested = 0` means use the hardware parallelism; the result is also
/// capped by the number of work items (idle workers are pointless) and the
/// hardware parallelism.
pub fn effective_num_threads(requested: usize, num_items: usize) -> usize {
    let hardware = rayon::current_num_threads().max(1);
    let requested = if requested == 0 { hardware } else { requested };
    requested.min(hardware).min(num_items).max(1)
}

/// Map `f` over `items` on a pool of `num_threads` workers.
///
/// Results are returned in item order. A panicking task is recorded in its
/// result slot; no sibling task is cancelled, and after every task has
/// finished the first recorded error is returned.
pub fn try_map<I, R, F>(items: Vec<I>, num_threads: usize, f: F) -> Result<Vec<R>, WorkerError>
where
    I: Send,
    R: Send,
    F: Fn(I) -> R + Sync + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .build()
        .expect("failed to build worker pool");

    let results: Vec<Result<R, WorkerError>> = pool.install(|| {
        items
            .into_par_iter()
            .map(|item| {
                catch_unwind(AssertUnwindSafe(|| f(item))).map_err(WorkerError::from_panic)
            })
            .collect()
    });

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_threads_semantics() {
        let hardware = rayon::current_num_threads().max(1);
        assert_eq!(effective_num_threads(0, 64), hardware.min(64));
        assert_eq!(effective_num_threads(1, 64), 1);
        assert_eq!(effective_num_threads(4, 2), 2.min(hardware));
        assert_eq!(effective_num_threads(4, 0), 1);
    }

    #[test]
    fn try_map_preserves_order() {
        let items: Vec<usize> = (0..64).collect();
        let doubled = try_map(items, 4, |i| i * 2).unwrap();
        assert_eq!(doubled, (0..64).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn try_map_single_thread() {
        let items: Vec<usize> = (0..8).collect();
        let result = try_map(items, 1, |i| i + 1).unwrap();
        assert_eq!(result, (1..9).collect::<Vec<_>>());
    }

    #[test]
    fn try_map_surfaces_first_error_after_join() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let completed = AtomicUsize::new(0);
        let items: Vec<usize> = (0..16).collect();

        let result = try_map(items, 2, |i| {
            if i == 3 || i == 11 {
                panic!("task {} failed", i);
            }
            completed.fetch_add(1, Ordering::Relaxed);
            i
        });

        let err = result.unwrap_err();
        assert_eq!(err.message, "task 3 failed");
        // Every non-failing task ran to completion.
        assert_eq!(completed.load(Ordering::Relaxed), 14);
    }
}
