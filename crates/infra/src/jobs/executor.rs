//! Job executor: polls the store and runs handlers with retry/dead-letter
//! bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::store::JobStore;
use super::types::{Job, JobKind, JobResult, JobStatus};

/// Executes one kind of job. Handlers own the asynchronous work (reads,
/// rendering, sending); retries and dead-lettering stay in the executor.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, job: &Job) -> JobResult;
}

pub type DynJobHandler = Arc<dyn JobHandler>;

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct JobExecutorConfig {
    /// How often to poll when the queue is empty.
    pub poll_interval: Duration,
    /// Name for logging.
    pub name: String,
}

impl Default for JobExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            name: "job-executor".to_string(),
        }
    }
}

impl JobExecutorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Handle to a spawned executor. Dropping the handle stops the executor at
/// its next poll; [`JobExecutorHandle::shutdown`] stops it and waits.
#[derive(Debug)]
pub struct JobExecutorHandle {
    shutdown: mpsc::Sender<()>,
    join: tokio::task::JoinHandle<()>,
}

impl JobExecutorHandle {
    /// Request shutdown and wait for the executor task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        let _ = self.join.await;
    }
}

/// Background job executor.
///
/// Jobs are claimed one at a time in FIFO order; a failing job is retried
/// with backoff and dead-lettered once its policy is exhausted, so one bad
/// recipient never blocks the rest of the queue.
pub struct JobExecutor<S: JobStore> {
    store: S,
    handlers: HashMap<&'static str, DynJobHandler>,
}

impl<S: JobStore + 'static> JobExecutor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    pub fn register_handler(&mut self, kind: JobKind, handler: DynJobHandler) {
        self.handlers.insert(kind.name(), handler);
    }

    /// Execute a job that has already been claimed (status `Running`).
    ///
    /// Records the outcome in the store; returns the error message on
    /// failure so callers driving the executor directly can observe it.
    pub async fn execute_claimed(&self, job: &mut Job) -> Result<(), String> {
        let Some(handler) = self.handlers.get(job.kind.name()) else {
            let msg = format!("no handler registered for job kind {}", job.kind);
            warn!(job_id = %job.id, kind = %job.kind, "{msg}");
            job.mark_failed(msg.clone(), Utc::now());
            self.store.update(job).map_err(|e| e.to_string())?;
            return Err(msg);
        };

        let started = Utc::now();
        match handler.run(job).await {
            JobResult::Success => {
                job.mark_completed(started);
                self.store.update(job).map_err(|e| e.to_string())?;
                debug!(job_id = %job.id, kind = %job.kind, "job completed");
                Ok(())
            }
            JobResult::Failure(msg) => {
                job.mark_failed(msg.clone(), started);
                self.store.update(job).map_err(|e| e.to_string())?;

                if matches!(job.status, JobStatus::DeadLettered { .. }) {
                    warn!(job_id = %job.id, kind = %job.kind, error = %msg, "job dead-lettered");
                    self.store
                        .dead_letter(job.clone(), msg.clone())
                        .map_err(|e| e.to_string())?;
                } else {
                    debug!(job_id = %job.id, kind = %job.kind, error = %msg, "job failed, will retry");
                }

                Err(msg)
            }
        }
    }

    /// Drain everything currently claimable, for tests and one-shot runs.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;
        while let Ok(Some(mut job)) = self.store.claim_next() {
            let _ = self.execute_claimed(&mut job).await;
            processed += 1;
        }
        processed
    }

    /// Spawn the polling loop on the current runtime.
    pub fn spawn(self, config: JobExecutorConfig) -> JobExecutorHandle
    where
        S: Send + Sync,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let join = tokio::spawn(executor_loop(self, config, shutdown_rx));

        JobExecutorHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

async fn executor_loop<S: JobStore + 'static>(
    executor: JobExecutor<S>,
    config: JobExecutorConfig,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    info!(executor = %config.name, "job executor started");

    loop {
        match executor.store.claim_next() {
            Ok(Some(mut job)) => {
                debug!(executor = %config.name, job_id = %job.id, kind = %job.kind, "claimed job");
                // Outcome is already recorded in the store and logged.
                let _ = executor.execute_claimed(&mut job).await;
            }
            Ok(None) => {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(config.poll_interval) => {}
                }
            }
            Err(e) => {
                error!(executor = %config.name, error = %e, "failed to claim job");
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(config.poll_interval) => {}
                }
            }
        }

        if shutdown_rx.try_recv().is_ok() {
            break;
        }
    }

    info!(executor = %config.name, "job executor stopped");
}
