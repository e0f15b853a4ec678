use thiserror::Error;

/// Errors reported when building a [`Barrier`](crate::Barrier) or parsing a
/// [`Strategy`](crate::Strategy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The participant count does not fit the 32-bit futex words the
    /// barrier counts with.
    #[error("a barrier cannot synchronize more than {max} threads ({requested} requested)")]
    TooManyParticipants { requested: usize, max: usize },
    /// The name does not match any strategy.
    #[error("unknown barrier strategy `{0}` (expected `native`, `turnstile` or `condvar`)")]
    UnknownStrategy(String),
}
