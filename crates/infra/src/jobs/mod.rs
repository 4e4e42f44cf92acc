//! Background job queue with retry, backoff, and dead-letter handling.
//!
//! Report dispatch is fire-and-forget: enqueue returns immediately and the
//! executor runs the aggregation-and-send later, decoupled from the request
//! that triggered it. Each recipient is its own job, so one failing
//! delivery is retried and dead-lettered in isolation.

pub mod executor;
pub mod store;
pub mod types;

pub use executor::{DynJobHandler, JobExecutor, JobExecutorConfig, JobExecutorHandle, JobHandler};
pub use store::{InMemoryJobStore, JobStats, JobStore, JobStoreError};
pub use types::{
    BackoffStrategy, DeadLetterEntry, Job, JobKind, JobResult, JobStatus, RetryPolicy,
};
