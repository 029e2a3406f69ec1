//! Resilience primitives for store-facing operations
//!
//! Two patterns, both applied at the storage boundary:
//! - **Deadline**: every operation runs under a caller-supplied time budget
//!   and aborts the in-flight store call when the budget elapses.
//! - **Read retry**: exponential backoff with jitter, restricted by
//!   construction to idempotent reads. Mutations are never wrapped here;
//!   retrying a non-idempotent insert risks duplicate side effects.

pub mod deadline;
pub mod retry;

pub use deadline::{with_deadline, with_deadline_result, DeadlineConfig, DeadlineExceeded};
pub use retry::{with_read_retry, ReadRetryConfig, RetryError};
