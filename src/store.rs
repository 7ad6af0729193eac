//! Persistence collaborator seam.
//!
//! The lifecycle hands fully reconstructed payloads to a [`MessageStore`]
//! on permanent open and on explicit save requests; destruction paths never
//! call it. Real storage engines live in the embedding application — this
//! crate only defines the seam plus two in-process implementations.

use std::sync::{Mutex, PoisonError};

use crate::payload::LogicalPayload;

/// Sink for messages the viewer keeps.
pub trait MessageStore: Send + Sync {
    /// Persist one reconstructed message.
    fn persist(&self, message: &LogicalPayload);
}

/// Store that keeps nothing; for sessions without persistence.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardStore;

impl MessageStore for DiscardStore {
    fn persist(&self, _message: &LogicalPayload) {}
}

/// In-memory store used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<LogicalPayload>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogicalPayload>> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a copy of everything persisted so far, in order.
    #[must_use]
    pub fn saved(&self) -> Vec<LogicalPayload> { self.lock().clone() }

    /// Number of persisted messages.
    #[must_use]
    pub fn len(&self) -> usize { self.lock().len() }

    /// Report whether nothing has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.lock().is_empty() }
}

impl MessageStore for MemoryStore {
    fn persist(&self, message: &LogicalPayload) { self.lock().push(message.clone()); }
}
