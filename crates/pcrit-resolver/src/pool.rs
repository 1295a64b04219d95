//! Bounded worker pool for batches of independent toolchain queries
//!
//! Each batch runs on a dedicated rayon pool whose thread count is the
//! concurrency bound, and the caller blocks until every item in the batch
//! has finished.

use pcrit_core::{AnalysisError, Result};
use rayon::prelude::*;

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("workers", &self.workers).finish()
    }
}

impl WorkerPool {
    /// Create a pool with the specified number of worker threads (at least 1).
    pub fn new(num_workers: usize) -> Result<Self> {
        let workers = num_workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pcrit-worker-{i}"))
            .build()
            .map_err(|e| AnalysisError::internal(format!("worker pool: {e}")))?;
        tracing::debug!("worker pool started with {} threads", workers);
        Ok(WorkerPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` on every item, ignoring results. Returns once all are done.
    pub fn run_batch<T, F>(&self, items: &[T], task: F)
    where
        T: Sync,
        F: Fn(&T) + Sync + Send,
    {
        self.pool.install(|| items.par_iter().for_each(|item| task(item)));
    }

    /// Run `task` on every item. The first error stops the batch and is
    /// returned after tasks already running have finished.
    pub fn try_run_batch<T, F>(&self, items: &[T], task: F) -> Result<()>
    where
        T: Sync,
        F: Fn(&T) -> Result<()> + Sync + Send,
    {
        self.pool.install(|| items.par_iter().try_for_each(|item| task(item)))
    }
}
