//! Contact directory collaborator seam.
//!
//! The surrounding application keeps a registry of known contacts; this
//! crate models it as an injected dependency with explicit read and write
//! operations rather than ambient global state. Attribution records embed a
//! fallback display name, so resolution degrades gracefully for unknown
//! senders.

use dashmap::DashMap;

use crate::payload::Attribution;

/// A known sender, keyed by numeric identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    author_id: u64,
    display_name: String,
}

impl Contact {
    /// Create a contact record.
    #[must_use]
    pub fn new(author_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            author_id,
            display_name: display_name.into(),
        }
    }

    /// Return the contact's numeric identifier.
    #[must_use]
    pub const fn author_id(&self) -> u64 { self.author_id }

    /// Return the locally chosen display name.
    #[must_use]
    pub fn display_name(&self) -> &str { self.display_name.as_str() }
}

/// Read/write access to the receiver's contact registry.
pub trait ContactDirectory: Send + Sync {
    /// Look up a contact by identifier.
    fn lookup(&self, author_id: u64) -> Option<Contact>;

    /// Insert or replace a contact record.
    fn upsert(&self, contact: Contact);

    /// Remove a contact; returns whether one was present.
    fn remove(&self, author_id: u64) -> bool;

    /// Resolve the display name for a payload's attribution.
    ///
    /// Prefers the locally chosen contact name, falling back to the name
    /// the sender embedded in the payload.
    fn display_name_for(&self, attribution: &Attribution) -> String {
        self.lookup(attribution.author_id())
            .map_or_else(|| attribution.author().to_owned(), |contact| contact.display_name)
    }
}

/// Concurrent in-memory directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory(DashMap<u64, Contact>);

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of known contacts.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Report whether no contacts are known.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl ContactDirectory for InMemoryDirectory {
    fn lookup(&self, author_id: u64) -> Option<Contact> {
        self.0.get(&author_id).map(|entry| entry.value().clone())
    }

    fn upsert(&self, contact: Contact) { self.0.insert(contact.author_id(), contact); }

    fn remove(&self, author_id: u64) -> bool { self.0.remove(&author_id).is_some() }
}
