//! The logical payload transferred across the optical channel.

use super::{Expiration, TransferWindow, expiration::unix_now_ms};

/// Sender identity attached to a payload.
///
/// The embedded `author` name is a fallback for receivers that have never
/// met the sender; receivers that know the sender resolve the display name
/// through their contact directory instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribution {
    author_id: u64,
    author: String,
}

impl Attribution {
    /// Create an attribution record.
    #[must_use]
    pub fn new(author_id: u64, author: impl Into<String>) -> Self {
        Self {
            author_id,
            author: author.into(),
        }
    }

    /// Return the sender's numeric identifier.
    #[must_use]
    pub const fn author_id(&self) -> u64 { self.author_id }

    /// Return the sender's self-declared display name.
    #[must_use]
    pub fn author(&self) -> &str { self.author.as_str() }
}

/// A complete logical message: text plus optional media, attribution, and
/// expiry semantics.
///
/// The payload is the unit of transfer: it serialises to one byte sequence
/// via [`encode`](super::encode), travels as a cycle of fragments, and is
/// reconstructed on the receiving device before being handed to the
/// lifecycle state machine.
///
/// # Examples
///
/// ```
/// use opticast::payload::{Expiration, LogicalPayload};
///
/// let payload = LogicalPayload::new("meet at noon", Expiration::ReadOnce)
///     .with_image(vec![0xFF, 0xD8, 0xFF]);
/// assert_eq!(payload.text(), "meet at noon");
/// assert!(payload.image().is_some());
/// assert!(payload.audio().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalPayload {
    text: String,
    image: Option<Vec<u8>>,
    audio: Option<Vec<u8>>,
    attribution: Option<Attribution>,
    created_at_ms: i64,
    expiration: Expiration,
    window: Option<TransferWindow>,
}

impl LogicalPayload {
    /// Create a payload stamped with the current wall-clock time.
    #[must_use]
    pub fn new(text: impl Into<String>, expiration: Expiration) -> Self {
        Self {
            text: text.into(),
            image: None,
            audio: None,
            attribution: None,
            created_at_ms: unix_now_ms(),
            expiration,
            window: None,
        }
    }

    /// Attach raw image bytes.
    #[must_use]
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Attach raw audio bytes.
    #[must_use]
    pub fn with_audio(mut self, audio: Vec<u8>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attach a sender attribution record.
    #[must_use]
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Bound the transfer's scannability with an absolute deadline.
    #[must_use]
    pub const fn with_window(mut self, window: TransferWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Override the creation timestamp (unix epoch milliseconds).
    #[must_use]
    pub const fn with_created_at_ms(mut self, created_at_ms: i64) -> Self {
        self.created_at_ms = created_at_ms;
        self
    }

    /// Return the message text.
    #[must_use]
    pub fn text(&self) -> &str { self.text.as_str() }

    /// Return the raw image bytes, if any.
    #[must_use]
    pub fn image(&self) -> Option<&[u8]> { self.image.as_deref() }

    /// Return the raw audio bytes, if any.
    #[must_use]
    pub fn audio(&self) -> Option<&[u8]> { self.audio.as_deref() }

    /// Return the sender attribution, if any.
    #[must_use]
    pub const fn attribution(&self) -> Option<&Attribution> { self.attribution.as_ref() }

    /// Return the creation timestamp in unix epoch milliseconds.
    #[must_use]
    pub const fn created_at_ms(&self) -> i64 { self.created_at_ms }

    /// Return the sender-chosen expiration mode.
    #[must_use]
    pub const fn expiration(&self) -> Expiration { self.expiration }

    /// Return the transfer window, if the sender set one.
    #[must_use]
    pub const fn window(&self) -> Option<TransferWindow> { self.window }
}
