use core::future::Future;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tokio_util::task::TaskTracker;

/// Cooperative shutdown authority shared by an allocator and its background
/// reservation task.
///
/// Couples a [`CancellationToken`] (the readable "shutting down" signal)
/// with a [`TaskTracker`], so background work spawned through the stopper is
/// awaited during [`Stopper::stop`]. Once stopped, a stopper stays stopped:
/// the signal never de-asserts.
#[derive(Clone, Default)]
pub struct Stopper {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Stopper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future` on the tokio runtime and tracks it for shutdown.
    ///
    /// Tracked tasks are expected to observe [`Stopper::cancelled`] at every
    /// suspension point; [`Stopper::stop`] waits for all of them to finish.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(future);
    }

    /// Resolves once shutdown has been signalled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Whether shutdown has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signals shutdown and waits for every tracked task to finish.
    ///
    /// Safe to call more than once; later calls return as soon as the
    /// remaining tracked tasks (if any) are done.
    pub async fn stop(&self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
