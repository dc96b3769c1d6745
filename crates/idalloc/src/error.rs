/// Convenience alias for allocator results.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the allocator's public API.
///
/// Transient backing-store failures are deliberately absent: the reservation
/// routine absorbs them with retry and backoff, so callers experience
/// latency during an outage, never failure. The only error a successfully
/// constructed allocator can return is [`Error::Cancelled`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Construction was handed an unusable configuration.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Shutdown was signalled before an ID could be handed out.
    #[error("allocation cancelled: system is shutting down")]
    Cancelled,
}
