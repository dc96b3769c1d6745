//! Block-reserving allocator for globally-unique, monotonically-increasing
//! integer IDs.
//!
//! The allocator owns a bounded buffer of pre-reserved IDs and a single
//! long-lived reservation task. The task reserves a contiguous block per
//! atomic increment against the backing store and feeds the buffer; callers
//! pop buffered IDs without touching the store. The buffer holds roughly
//! half a block, so its backpressure doubles as the refill trigger: the task
//! starts the next reservation once consumers have drained about half of the
//! previous block, keeping warm steady-state callers from ever blocking.

mod retry;

use crate::error::{Error, Result};
use crate::key::CounterKey;
use crate::stopper::Stopper;
use crate::store::IncrementStore;
use core::ops::RangeInclusive;
use parking_lot::RwLock;
use retry::Backoff;
use std::sync::{Arc, Once};
use tokio::sync::{Mutex, mpsc};
use tokio::time::sleep;

/// Hands out globally-unique integer IDs from one ID class.
///
/// One long-lived instance serves any number of concurrent callers. IDs are
/// reserved in blocks of `block_size` via a single atomic increment against
/// an [`IncrementStore`], which bounds store load to one outstanding
/// round-trip per allocator regardless of caller fan-in.
///
/// Guarantees, for the lifetime of the allocator:
/// - no two [`allocate`](Self::allocate) calls ever return the same ID;
/// - every returned ID is `>= min_id`, even if the backing counter was
///   seeded negative or corrupted below the floor;
/// - IDs are delivered in reservation order, ascending within a block.
///
/// IDs are never reclaimed, and the unconsumed remainder of a block is lost
/// across a restart; the sequence stays unique but not contiguous.
///
/// # Example
///
/// ```
/// use idalloc::{CounterKey, IdAllocator, MemStore, Stopper};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> idalloc::Result<()> {
/// let stopper = Stopper::new();
/// let store = Arc::new(MemStore::new());
/// let alloc = IdAllocator::new(
///     CounterKey::new("group-id-generator"),
///     store,
///     1,  // min_id
///     16, // block_size
///     stopper.clone(),
/// )?;
///
/// assert_eq!(alloc.allocate().await?, 1);
/// assert_eq!(alloc.allocate().await?, 2);
/// stopper.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct IdAllocator<S> {
    shared: Arc<Shared<S>>,
    /// Consumer side of the ID buffer. The mutex is fair, so callers that
    /// block on an empty buffer are released in arrival order.
    ids: Mutex<mpsc::Receiver<i64>>,
    /// Spawns the reservation task on the first call to `allocate`.
    start: Once,
}

/// State shared between the public API and the reservation task.
struct Shared<S> {
    key: RwLock<CounterKey>,
    store: S,
    min_id: i64,
    block_size: i64,
    buffer: mpsc::Sender<i64>,
    stopper: Stopper,
}

impl<S: IncrementStore> IdAllocator<S> {
    /// Creates an allocator for the counter at `key`.
    ///
    /// The buffer starts empty and no reservation is in flight; the first
    /// call to [`allocate`](Self::allocate) triggers the first block
    /// reservation. Larger `block_size` values reduce store round-trips at
    /// the cost of wasting more of a block across a restart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `min_id <= 0`, `block_size < 1`,
    /// or `stopper` has already been stopped.
    pub fn new(
        key: CounterKey,
        store: S,
        min_id: i64,
        block_size: i64,
        stopper: Stopper,
    ) -> Result<Self> {
        if min_id <= 0 {
            return Err(Error::InvalidArgument {
                reason: format!("min_id must be positive; got {min_id}"),
            });
        }
        if block_size < 1 {
            return Err(Error::InvalidArgument {
                reason: format!("block_size must be at least 1; got {block_size}"),
            });
        }
        if stopper.is_stopped() {
            return Err(Error::InvalidArgument {
                reason: "stopper has already been stopped".to_string(),
            });
        }

        // Half a block of headroom: the reservation task's blocking send
        // stalls until consumers drain about half of the previous block,
        // which is exactly when the proactive refill should start.
        let capacity = (block_size / 2 + 1) as usize;
        let (buffer, ids) = mpsc::channel(capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                key: RwLock::new(key),
                store,
                min_id,
                block_size,
                buffer,
                stopper,
            }),
            ids: Mutex::new(ids),
            start: Once::new(),
        })
    }

    /// Returns one unique ID.
    ///
    /// Serves from the in-memory buffer when it is non-empty; otherwise
    /// suspends until a block reservation deposits IDs. Backing-store
    /// outages are invisible here beyond added latency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] once shutdown has been signalled; calls
    /// arriving after shutdown fail immediately. No other error is possible.
    pub async fn allocate(&self) -> Result<i64> {
        if self.shared.stopper.is_stopped() {
            return Err(Error::Cancelled);
        }
        self.start.call_once(|| {
            let shared = Arc::clone(&self.shared);
            self.shared.stopper.spawn(fill_buffer(shared));
        });

        let mut ids = tokio::select! {
            guard = self.ids.lock() => guard,
            _ = self.shared.stopper.cancelled() => return Err(Error::Cancelled),
        };
        tokio::select! {
            id = ids.recv() => id.ok_or(Error::Cancelled),
            _ = self.shared.stopper.cancelled() => Err(Error::Cancelled),
        }
    }

    /// Current counter key.
    pub fn counter_key(&self) -> CounterKey {
        self.shared.key.read().clone()
    }

    /// Swaps the counter key at runtime.
    ///
    /// Setting [`CounterKey::invalid`] marks the backing counter as
    /// temporarily unusable: buffered IDs keep being served, and block
    /// reservations pause until a valid key is restored. This is an
    /// operational and failure-injection hook, not part of the allocation
    /// contract.
    pub fn set_counter_key(&self, key: CounterKey) {
        *self.shared.key.write() = key;
    }
}

/// Reservation task: reserves blocks and feeds the buffer until shutdown is
/// signalled or the allocator is dropped.
async fn fill_buffer<S: IncrementStore>(shared: Arc<Shared<S>>) {
    loop {
        let block = match shared.reserve_block().await {
            Ok(block) => block,
            // Only cancellation escapes `reserve_block`.
            Err(_) => return,
        };
        tracing::debug!(
            first = *block.start(),
            last = *block.end(),
            "reserved id block"
        );
        for id in block {
            tokio::select! {
                sent = shared.buffer.send(id) => {
                    if sent.is_err() {
                        // Allocator dropped; nobody is left to serve.
                        return;
                    }
                }
                _ = shared.stopper.cancelled() => return,
            }
        }
    }
}

impl<S: IncrementStore> Shared<S> {
    /// Runs increment rounds until a block clearing the ID floor has been
    /// reserved, and returns it.
    ///
    /// A counter sitting at or below `min_id` (pre-seeded negative, or
    /// corrupted) yields an unusable block: another increment round is
    /// issued immediately to push the counter forward, and nothing from the
    /// unusable range is ever handed out. The first usable block is clamped
    /// to start at `min_id`.
    async fn reserve_block(&self) -> Result<RangeInclusive<i64>> {
        let mut new_value;
        loop {
            new_value = self.increment_with_retry().await?;
            if new_value > self.min_id {
                break;
            }
            tracing::warn!(
                new_value,
                min_id = self.min_id,
                "counter below id floor; reserving another block to compensate"
            );
        }
        let first = (new_value - self.block_size + 1).max(self.min_id);
        Ok(first..=new_value)
    }

    /// One successful atomic increment, however many attempts that takes.
    ///
    /// Retries are unbounded in count with bounded backoff. An invalid
    /// counter key and a store error are both treated as transient: the key
    /// may be restored and the store may recover at any time. Cancellation
    /// is checked before each attempt and during each pause.
    async fn increment_with_retry(&self) -> Result<i64> {
        let mut backoff = Backoff::default();
        loop {
            if self.stopper.is_stopped() {
                return Err(Error::Cancelled);
            }
            // Snapshot the key once per attempt; it may be swapped while we
            // sleep.
            let key = self.key.read().clone();
            if !key.is_valid() {
                tracing::debug!("counter key is invalid; waiting for it to be restored");
                self.pause(&mut backoff).await?;
                continue;
            }
            match self.store.increment(&key, self.block_size).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(%err, "counter increment failed; retrying");
                    self.pause(&mut backoff).await?;
                }
            }
        }
    }

    async fn pause(&self, backoff: &mut Backoff) -> Result<()> {
        tokio::select! {
            _ = sleep(backoff.pause()) => Ok(()),
            _ = self.stopper.cancelled() => Err(Error::Cancelled),
        }
    }
}
