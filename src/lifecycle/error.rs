//! Errors surfaced by the ephemeral message lifecycle.

use thiserror::Error;

/// Failure modes of [`Lifecycle::open_at`](super::Lifecycle::open_at).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum OpenError {
    /// The transfer window expired before the message was ever opened.
    ///
    /// Terminal by design: there is no retry.
    #[error("transfer window expired before the message was opened")]
    WindowLocked,
    /// The message has vanished or been destroyed.
    #[error("message content has been destroyed")]
    Destroyed,
}

/// Failure modes of [`Lifecycle::save_at`](super::Lifecycle::save_at).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    /// The transfer window expired; the content was never reachable.
    #[error("transfer window expired; content is not reachable")]
    WindowLocked,
    /// Destruction has begun; the save request came too late.
    #[error("message content has been destroyed")]
    Destroyed,
}
