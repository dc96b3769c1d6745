//! Distributed allocation of globally-unique, monotonically-increasing
//! integer IDs.
//!
//! [`IdAllocator`] reserves contiguous blocks of the ID space from a remote
//! atomic counter (any [`IncrementStore`]) and buffers them in memory, so
//! most calls to [`IdAllocator::allocate`] complete without a store
//! round-trip. Uniqueness holds across any number of concurrent callers, and
//! every returned ID is at least the configured floor, even when the backing
//! counter starts out negative or corrupted.
//!
//! Backing-store outages never surface as allocation failures: reservations
//! retry with bounded backoff while callers drain the buffer, then block
//! until the store recovers. Shutdown is cooperative via [`Stopper`], so
//! blocked callers and background reservations unwind promptly instead of
//! leaking.

mod allocator;
mod error;
mod key;
mod stopper;
mod store;

pub use crate::allocator::*;
pub use crate::error::*;
pub use crate::key::*;
pub use crate::stopper::*;
pub use crate::store::*;
