use super::{IncrementStore, StoreResult};
use crate::key::CounterKey;
use core::future::Future;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process [`IncrementStore`] over a hash map.
///
/// Suitable for tests and single-process embedding. Each increment runs
/// under a mutex, which makes it atomic relative to the others, matching the
/// linearizability the trait asks of real stores.
#[derive(Debug, Default)]
pub struct MemStore {
    counters: Mutex<HashMap<CounterKey, i64>>,
    increments: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (or overwrites) the counter at `key`.
    pub fn set(&self, key: CounterKey, value: i64) {
        self.counters.lock().insert(key, value);
    }

    /// Current value of the counter at `key`, if it was ever written.
    pub fn get(&self, key: &CounterKey) -> Option<i64> {
        self.counters.lock().get(key).copied()
    }

    /// Number of increment round-trips served so far.
    pub fn increments(&self) -> u64 {
        self.increments.load(Ordering::Relaxed)
    }
}

impl IncrementStore for MemStore {
    fn increment(
        &self,
        key: &CounterKey,
        delta: i64,
    ) -> impl Future<Output = StoreResult<i64>> + Send {
        self.increments.fetch_add(1, Ordering::Relaxed);
        let value = {
            let mut counters = self.counters.lock();
            let counter = counters.entry(key.clone()).or_insert(0);
            *counter += delta;
            *counter
        };
        async move { Ok(value) }
    }
}
