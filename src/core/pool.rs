//! Fixed-size worker pool shared by the package fetcher and the tree mirror.

use crate::error::{RestageError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("restage-worker-{i}"))
            .build()
            .map_err(|e| RestageError::WorkerPool {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` over every item on the pool and wait for all of them.
    /// Results come back in input order.
    pub fn run<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.into_par_iter().map(task).collect())
    }
}
