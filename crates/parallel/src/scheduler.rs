//! Bounded row scheduler
//!
//! Every row-parallel pass in cavescan runs through [`RowScheduler`]: one
//! row of per-cell work is one task, at most `workers` tasks run at once,
//! and the call returns only after every dispatched row has finished.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use cavescan_core::{Error, Result, RowFailure};
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::strategy::ProcessingMode;

enum RowOutcome<T> {
    Done(T),
    Failed(RowFailure),
    Skipped,
}

/// Fixed-size worker pool that runs one task per grid row.
///
/// Rows complete in no particular order. Failures (returned errors and
/// panics alike) are collected per row while sibling rows run to
/// completion, then reported together as [`Error::WorkerFailure`].
pub struct RowScheduler {
    mode: ProcessingMode,
    workers: usize,
    pool: Option<rayon::ThreadPool>,
    cancel: CancelToken,
}

impl RowScheduler {
    /// Build a scheduler for the given mode
    pub fn new(mode: ProcessingMode) -> Result<Self> {
        let workers = mode.workers()?;
        let pool = match mode {
            ProcessingMode::Sequential => None,
            ProcessingMode::Parallel | ProcessingMode::ParallelWith(_) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("cavescan-row-{}", i))
                    .build()
                    .map_err(|e| Error::invalid_parameter("workers", workers, e.to_string()))?,
            ),
        };

        Ok(Self {
            mode,
            workers,
            pool,
            cancel: CancelToken::new(),
        })
    }

    /// A scheduler that runs every row on the calling thread
    pub fn sequential() -> Self {
        Self {
            mode: ProcessingMode::Sequential,
            workers: 1,
            pool: None,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops this scheduler from dispatching further rows
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Processing mode this scheduler was built with
    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Maximum number of rows running at once
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f` for every row in `rows` and return the results in row order.
    ///
    /// Blocks until all rows have finished. If any row fails the whole
    /// call fails with every failure listed; if the cancel token was set
    /// before some rows started, the call fails with [`Error::Cancelled`].
    pub fn map_rows<T, F>(&self, rows: Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        let total = rows.len();
        let cancel = &self.cancel;
        let f = &f;

        let run_row = move |row: usize| -> RowOutcome<T> {
            if cancel.is_cancelled() {
                return RowOutcome::Skipped;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| f(row))) {
                Ok(Ok(value)) => RowOutcome::Done(value),
                Ok(Err(err)) => RowOutcome::Failed(RowFailure {
                    row,
                    message: err.to_string(),
                }),
                Err(payload) => RowOutcome::Failed(RowFailure {
                    row,
                    message: panic_message(payload.as_ref()),
                }),
            }
        };

        let outcomes: Vec<RowOutcome<T>> = match &self.pool {
            Some(pool) => pool.install(|| rows.into_par_iter().map(run_row).collect()),
            None => rows.map(run_row).collect(),
        };

        let mut values = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut skipped = 0;
        for outcome in outcomes {
            match outcome {
                RowOutcome::Done(value) => values.push(value),
                RowOutcome::Failed(failure) => failures.push(failure),
                RowOutcome::Skipped => skipped += 1,
            }
        }

        if !failures.is_empty() {
            failures.sort_by_key(|failure| failure.row);
            return Err(Error::WorkerFailure { failures });
        }
        if skipped > 0 {
            return Err(Error::Cancelled {
                completed: total - skipped,
                total,
            });
        }

        Ok(values)
    }

    /// Run `f` for every row in `rows`, for passes that write their
    /// results into shared output themselves
    pub fn for_each_row<F>(&self, rows: Range<usize>, f: F) -> Result<()>
    where
        F: Fn(usize) -> Result<()> + Sync + Send,
    {
        self.map_rows(rows, f).map(|_| ())
    }
}

impl std::fmt::Debug for RowScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowScheduler")
            .field("mode", &self.mode)
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown payload")
    };
    format!("panicked: {}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_results_in_row_order() {
        for mode in [
            ProcessingMode::Sequential,
            ProcessingMode::Parallel,
            ProcessingMode::ParallelWith(3),
        ] {
            let scheduler = RowScheduler::new(mode).unwrap();
            let rows = scheduler.map_rows(0..50, |row| Ok(row * 2)).unwrap();
            assert_eq!(rows, (0..50).map(|r| r * 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_empty_range() {
        let scheduler = RowScheduler::new(ProcessingMode::Parallel).unwrap();
        let rows: Vec<usize> = scheduler.map_rows(0..0, Ok).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let scheduler = RowScheduler::new(ProcessingMode::ParallelWith(2)).unwrap();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        scheduler
            .for_each_row(0..16, |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_failures_are_collected_while_siblings_finish() {
        let scheduler = RowScheduler::new(ProcessingMode::ParallelWith(4)).unwrap();
        let finished = AtomicUsize::new(0);

        let err = scheduler
            .for_each_row(0..20, |row| {
                finished.fetch_add(1, Ordering::SeqCst);
                if row == 7 || row == 3 {
                    return Err(Error::Format(format!("bad row {}", row)));
                }
                Ok(())
            })
            .unwrap_err();

        assert_eq!(finished.load(Ordering::SeqCst), 20);
        match err {
            Error::WorkerFailure { failures } => {
                let rows: Vec<usize> = failures.iter().map(|f| f.row).collect();
                assert_eq!(rows, vec![3, 7]);
                assert!(failures[0].message.contains("bad row 3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_panics_become_failures() {
        let scheduler = RowScheduler::new(ProcessingMode::ParallelWith(2)).unwrap();
        let err = scheduler
            .map_rows(0..6, |row| {
                if row == 4 {
                    panic!("boom");
                }
                Ok(row)
            })
            .unwrap_err();

        match err {
            Error::WorkerFailure { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].row, 4);
                assert_eq!(failures[0].message, "panicked: boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cancel_before_dispatch() {
        let scheduler = RowScheduler::new(ProcessingMode::Parallel).unwrap();
        scheduler.cancel_token().cancel();

        let err = scheduler.for_each_row(0..10, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed: 0, total: 10 }));
    }

    #[test]
    fn test_cancel_between_rows() {
        let token = CancelToken::new();
        let scheduler = RowScheduler::sequential().with_cancel_token(token.clone());

        let err = scheduler
            .for_each_row(0..5, |row| {
                if row == 1 {
                    token.cancel();
                }
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled { completed: 2, total: 5 }));
    }
}
