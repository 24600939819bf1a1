//! Fixed-size pool of tokio worker tasks with a single drain point.
//!
//! Jobs go through one shared queue; every worker pulls the next job, runs it
//! to completion and reports back on the result channel. Nothing else is
//! shared between workers.

use crate::error::{Result, ScanError};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub type TaskId = usize;

type Job<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[derive(Debug)]
pub struct TaskOutcome<T> {
    pub id: TaskId,
    pub result: Result<T>,
}

pub struct WorkerPool<T> {
    jobs: Option<mpsc::UnboundedSender<(TaskId, Job<T>)>>,
    results: mpsc::UnboundedReceiver<TaskOutcome<T>>,
    workers: Vec<JoinHandle<()>>,
    submitted: usize,
}

/// Number of processing units on this host, never less than one.
pub fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Starts `size` workers (at least one). Must be called inside a tokio
    /// runtime.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (job_tx, job_rx) = mpsc::unbounded_channel::<(TaskId, Job<T>)>();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers = (0..size)
            .map(|worker_id| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                tokio::spawn(async move {
                    debug!("Worker {} started", worker_id);
                    loop {
                        let next = { job_rx.lock().await.recv().await };
                        let Some((id, job)) = next else {
                            break;
                        };

                        let result = AssertUnwindSafe(job)
                            .catch_unwind()
                            .await
                            .map_err(|panic| ScanError::TaskFailed(panic_message(&*panic)));

                        if result_tx.send(TaskOutcome { id, result }).is_err() {
                            break;
                        }
                    }
                    debug!("Worker {} finished", worker_id);
                })
            })
            .collect();

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            workers,
            submitted: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `task` without waiting for a free worker.
    pub fn submit<F>(&mut self, task: F) -> Result<TaskId>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let jobs = self.jobs.as_ref().ok_or(ScanError::PoolClosed)?;
        let id = self.submitted;
        jobs.send((id, Box::pin(task)))
            .map_err(|_| ScanError::PoolClosed)?;
        self.submitted += 1;
        Ok(id)
    }

    /// Closes the queue and waits for every submitted task. Outcomes come back
    /// in completion order.
    pub async fn drain_all(&mut self) -> Vec<TaskOutcome<T>> {
        self.jobs = None;

        let mut outcomes = Vec::with_capacity(self.submitted);
        while outcomes.len() < self.submitted {
            match self.results.recv().await {
                Some(outcome) => outcomes.push(outcome),
                None => {
                    warn!(
                        "Worker pool stopped with {} of {} tasks unreported",
                        self.submitted - outcomes.len(),
                        self.submitted
                    );
                    break;
                }
            }
        }

        outcomes
    }

    /// Waits for the workers to exit. Call after [`WorkerPool::drain_all`].
    pub async fn shutdown(mut self) -> Result<()> {
        self.jobs = None;
        for worker in self.workers.drain(..) {
            worker.await?;
        }
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
