use divsim_core::errors::ErrorInfo;
use divsim_core::DivError;
use rayon::prelude::*;

use crate::worker::{ReplicationOutcome, ReplicationTask, ReplicationWorker};

/// Executes a batch of independent tasks.
///
/// Outcomes may come back in any order; callers key them by `rep_id`. The
/// first worker error aborts the batch.
pub trait TaskPool: Send + Sync {
    /// Runs every task through `worker`.
    fn map(
        &self,
        tasks: &[ReplicationTask],
        worker: &dyn ReplicationWorker,
    ) -> Result<Vec<ReplicationOutcome>, DivError>;
}

/// Runs tasks one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialPool;

impl TaskPool for SequentialPool {
    fn map(
        &self,
        tasks: &[ReplicationTask],
        worker: &dyn ReplicationWorker,
    ) -> Result<Vec<ReplicationOutcome>, DivError> {
        tasks.iter().map(|task| worker.run(task)).collect()
    }
}

/// Fans tasks out over a dedicated rayon pool.
#[derive(Debug)]
pub struct ThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool {
    /// Builds a pool with `threads` workers; zero picks rayon's default.
    pub fn new(threads: usize) -> Result<Self, DivError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("divsim-worker-{index}"))
            .build()
            .map_err(|err| {
                DivError::Io(
                    ErrorInfo::new("thread_pool", err.to_string())
                        .with_context("threads", threads.to_string()),
                )
            })?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl TaskPool for ThreadPool {
    fn map(
        &self,
        tasks: &[ReplicationTask],
        worker: &dyn ReplicationWorker,
    ) -> Result<Vec<ReplicationOutcome>, DivError> {
        self.pool
            .install(|| tasks.par_iter().map(|task| worker.run(task)).collect())
    }
}
