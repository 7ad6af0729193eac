//! Expiry semantics attached to a logical payload.
//!
//! Every message carries exactly one [`Expiration`] mode chosen by the
//! sender, and may additionally carry a [`TransferWindow`] bounding how long
//! the optical codes themselves remain scannable. The two are independent:
//! the window gates fragment ingestion before the message is ever opened,
//! while the expiration mode governs what happens after the receiver opens
//! the reconstructed message.

use std::{
    num::NonZeroU32,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Self-destruct policy for a reconstructed message.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU32;
///
/// use opticast::payload::Expiration;
///
/// let timed = Expiration::Countdown(NonZeroU32::new(30).expect("non-zero"));
/// assert_eq!(timed.countdown(), Some(NonZeroU32::new(30).expect("non-zero")));
/// assert_eq!(Expiration::Permanent.countdown(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Destroy the message a fixed number of seconds after it is opened.
    Countdown(NonZeroU32),
    /// Destroy the message when the viewer explicitly dismisses it.
    ReadOnce,
    /// Never destroy; the message is persisted as soon as it is opened.
    Permanent,
}

impl Expiration {
    /// Return the countdown length, if this is the countdown mode.
    #[must_use]
    pub const fn countdown(self) -> Option<NonZeroU32> {
        match self {
            Self::Countdown(seconds) => Some(seconds),
            Self::ReadOnce | Self::Permanent => None,
        }
    }

    /// Return the countdown as a [`Duration`], if this is the countdown mode.
    #[must_use]
    pub fn countdown_duration(self) -> Option<Duration> {
        self.countdown()
            .map(|seconds| Duration::from_secs(u64::from(seconds.get())))
    }
}

/// Absolute deadline after which a transfer's optical codes are invalid.
///
/// The deadline is wall-clock time (unix epoch milliseconds) because sender
/// and receiver are distinct devices with no shared monotonic clock. Once the
/// deadline passes, no further fragment of the transfer may be accepted and
/// an already assembled message must present as permanently inaccessible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransferWindow {
    deadline_ms: i64,
}

impl TransferWindow {
    /// Create a window closing at `deadline_ms` (unix epoch milliseconds).
    #[must_use]
    pub const fn new(deadline_ms: i64) -> Self { Self { deadline_ms } }

    /// Create a window closing `open_for` after the current wall clock.
    #[must_use]
    pub fn from_now(open_for: Duration) -> Self {
        let millis = i64::try_from(open_for.as_millis()).unwrap_or(i64::MAX);
        Self::new(unix_now_ms().saturating_add(millis))
    }

    /// Return the deadline in unix epoch milliseconds.
    #[must_use]
    pub const fn deadline_ms(self) -> i64 { self.deadline_ms }

    /// Report whether the window has closed at the supplied wall-clock time.
    #[must_use]
    pub const fn is_expired_at(self, now_ms: i64) -> bool { now_ms > self.deadline_ms }

    /// Report whether the window has closed at the current wall-clock time.
    #[must_use]
    pub fn is_expired(self) -> bool { self.is_expired_at(unix_now_ms()) }
}

/// Current wall-clock time as unix epoch milliseconds.
///
/// Clamps instead of failing: a clock before the epoch reads as `0`, and a
/// clock beyond the representable range saturates.
#[must_use]
pub fn unix_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    #[test]
    fn countdown_accessor_distinguishes_modes() {
        let seconds = NonZeroU32::new(5).expect("non-zero");
        assert_eq!(Expiration::Countdown(seconds).countdown(), Some(seconds));
        assert_eq!(Expiration::ReadOnce.countdown(), None);
        assert_eq!(Expiration::Permanent.countdown(), None);
    }

    #[test]
    fn window_expires_strictly_after_deadline() {
        let window = TransferWindow::new(1_000);
        assert!(!window.is_expired_at(999));
        assert!(!window.is_expired_at(1_000));
        assert!(window.is_expired_at(1_001));
    }

    #[test]
    fn window_from_now_lands_in_the_future() {
        let window = TransferWindow::from_now(Duration::from_secs(60));
        assert!(!window.is_expired_at(unix_now_ms()));
    }
}
