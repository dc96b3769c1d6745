mod mem;
pub use mem::*;

use crate::key::CounterKey;
use core::future::Future;
use std::sync::Arc;

/// Outcome of a single store round-trip.
pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// A transient failure reported by an [`IncrementStore`].
///
/// Never surfaced to allocator callers: the reservation routine absorbs it
/// with retry and backoff.
#[derive(Clone, Debug, thiserror::Error)]
#[error("counter store error: {reason}")]
pub struct StoreError {
    reason: String,
}

impl StoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The consumed interface of the backing consistent store: one atomic
/// increment primitive, nothing else.
///
/// `increment` must be linearizable relative to all other increments on the
/// same key. A key that was never written behaves as an implicit zero, and
/// counter values may be negative; the allocator compensates for counters
/// below its floor, so implementations need no special handling.
pub trait IncrementStore: Send + Sync + 'static {
    /// Atomically adds `delta` to the counter at `key`, returning the value
    /// after the addition.
    fn increment(
        &self,
        key: &CounterKey,
        delta: i64,
    ) -> impl Future<Output = StoreResult<i64>> + Send;
}

impl<S: IncrementStore> IncrementStore for Arc<S> {
    fn increment(
        &self,
        key: &CounterKey,
        delta: i64,
    ) -> impl Future<Output = StoreResult<i64>> + Send {
        self.as_ref().increment(key, delta)
    }
}
