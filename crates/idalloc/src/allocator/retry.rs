use core::time::Duration;

const INITIAL_PAUSE: Duration = Duration::from_millis(50);
const MAX_PAUSE: Duration = Duration::from_secs(2);

/// Exponential pause schedule for reservation retries.
///
/// A fresh `Backoff` is taken per reservation round, so the pause resets
/// once a round-trip succeeds.
#[derive(Debug)]
pub(crate) struct Backoff {
    next: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            next: INITIAL_PAUSE,
        }
    }
}

impl Backoff {
    /// Returns how long to pause before the next attempt, doubling up to the
    /// cap for the one after.
    pub(crate) fn pause(&mut self) -> Duration {
        let current = self.next;
        self.next = (current * 2).min(MAX_PAUSE);
        current
    }
}
