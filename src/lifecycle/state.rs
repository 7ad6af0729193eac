//! State machine governing a reconstructed message's viewing and destruction.
//!
//! A [`Lifecycle`] owns one reconstructed [`LogicalPayload`] from hand-off
//! until destruction. Time-derived transitions are computed from explicit
//! clock readings, so a suspended session that wakes up late observes the
//! same stages it would have seen live, and tests drive the machine
//! deterministically. The convenience methods without a clock parameter
//! read the real clocks.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::debug;

use super::{OpenError, SaveError};
use crate::{
    payload::{Expiration, LogicalPayload, unix_now_ms},
    store::MessageStore,
};

/// Externally observable stage of a message's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleStage {
    /// The transfer window passed before the first open. Terminal.
    WindowLocked,
    /// Assembled and waiting for the viewer's first open.
    AwaitingOpen,
    /// Opened under a countdown; destruction approaches.
    CountingDown {
        /// Time left until the vanish transition.
        remaining: Duration,
    },
    /// Opened read-once; destroyed only on explicit dismissal.
    OpenReadOnce,
    /// Opened permanent; no destructive transition exists.
    OpenPermanent,
    /// Pre-destruction grace period for the vanish animation.
    Vanishing,
    /// Content discarded and unreachable. Terminal.
    Destroyed,
}

impl LifecycleStage {
    /// Report whether no transition leads out of this stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::WindowLocked | Self::Destroyed)
    }
}

/// Internal phase; time-dependent data lives here, derived data does not.
#[derive(Clone, Copy, Debug)]
enum Phase {
    Locked,
    Awaiting,
    Counting { deadline: Instant },
    ReadOnce,
    Permanent,
    Vanishing { since: Instant },
    Destroyed,
}

/// Lifecycle driver for one reconstructed message.
///
/// # Examples
///
/// ```
/// use std::{sync::Arc, time::{Duration, Instant}};
///
/// use opticast::{
///     lifecycle::{Lifecycle, LifecycleStage},
///     payload::{Expiration, LogicalPayload},
///     store::DiscardStore,
/// };
///
/// let payload = LogicalPayload::new("fleeting", Expiration::ReadOnce);
/// let mut lifecycle = Lifecycle::on_assembled(payload, Arc::new(DiscardStore), Duration::ZERO);
///
/// let now = Instant::now();
/// lifecycle.open_at(now).expect("openable");
/// assert_eq!(lifecycle.poll_at(now), LifecycleStage::OpenReadOnce);
/// // Read-once messages never time out; only dismissal destroys them.
/// assert_eq!(
///     lifecycle.poll_at(now + Duration::from_secs(3600)),
///     LifecycleStage::OpenReadOnce,
/// );
/// ```
pub struct Lifecycle {
    phase: Phase,
    payload: Option<LogicalPayload>,
    vanish_grace: Duration,
    store: Arc<dyn MessageStore>,
    saved: bool,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("phase", &self.phase)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    /// Accept a reconstructed payload using the current wall clock for the
    /// window check.
    #[must_use]
    pub fn on_assembled(
        payload: LogicalPayload,
        store: Arc<dyn MessageStore>,
        vanish_grace: Duration,
    ) -> Self {
        Self::on_assembled_at(payload, store, vanish_grace, unix_now_ms())
    }

    /// Accept a reconstructed payload with an explicit wall-clock reading.
    ///
    /// A payload whose transfer window already closed enters
    /// [`LifecycleStage::WindowLocked`] directly, bypassing every other
    /// stage, and its content is discarded immediately.
    #[must_use]
    pub fn on_assembled_at(
        payload: LogicalPayload,
        store: Arc<dyn MessageStore>,
        vanish_grace: Duration,
        now_ms: i64,
    ) -> Self {
        let locked = payload
            .window()
            .is_some_and(|window| window.is_expired_at(now_ms));
        if locked {
            debug!("assembled message arrived after its transfer window");
        }
        Self {
            phase: if locked { Phase::Locked } else { Phase::Awaiting },
            payload: if locked { None } else { Some(payload) },
            vanish_grace,
            store,
            saved: false,
        }
    }

    /// Open the message, starting its expiration semantics.
    pub fn open(&mut self) -> Result<&LogicalPayload, OpenError> { self.open_at(Instant::now()) }

    /// Open the message with an explicit clock reading.
    ///
    /// The first open branches on the payload's [`Expiration`]: a countdown
    /// is anchored to `now` (not the creation timestamp), read-once starts
    /// no timer, and permanent triggers the one-time persistence side
    /// effect. Re-opening an already open message returns the payload
    /// without re-running side effects or re-anchoring the countdown.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::WindowLocked`] for a window-locked message and
    /// [`OpenError::Destroyed`] once destruction has begun.
    pub fn open_at(&mut self, now: Instant) -> Result<&LogicalPayload, OpenError> {
        self.advance(now);
        match self.phase {
            Phase::Locked => Err(OpenError::WindowLocked),
            Phase::Vanishing { .. } | Phase::Destroyed => Err(OpenError::Destroyed),
            Phase::Awaiting => {
                let expiration = self
                    .payload
                    .as_ref()
                    .map(LogicalPayload::expiration)
                    .ok_or(OpenError::Destroyed)?;
                match expiration {
                    Expiration::Countdown(seconds) => {
                        let deadline = now + Duration::from_secs(u64::from(seconds.get()));
                        self.phase = Phase::Counting { deadline };
                    }
                    Expiration::ReadOnce => self.phase = Phase::ReadOnce,
                    Expiration::Permanent => {
                        self.phase = Phase::Permanent;
                        // There is no later destruction event to hang the
                        // save on, so it happens at the open.
                        self.persist_once();
                    }
                }
                self.payload.as_ref().ok_or(OpenError::Destroyed)
            }
            Phase::Counting { .. } | Phase::ReadOnce | Phase::Permanent => {
                self.payload.as_ref().ok_or(OpenError::Destroyed)
            }
        }
    }

    /// Advance time-derived transitions and report the current stage.
    pub fn poll(&mut self) -> LifecycleStage { self.poll_at(Instant::now()) }

    /// Advance time-derived transitions with an explicit clock reading.
    ///
    /// Monotone: a later poll never reports an earlier stage. The vanish
    /// grace is anchored at the countdown deadline itself, so a late poll
    /// cannot extend the message's life.
    pub fn poll_at(&mut self, now: Instant) -> LifecycleStage {
        self.advance(now);
        self.stage_at(now)
    }

    /// Dismiss the viewing session.
    pub fn dismiss(&mut self) -> LifecycleStage { self.dismiss_at(Instant::now()) }

    /// Dismiss the viewing session with an explicit clock reading.
    ///
    /// Read-once messages begin vanishing; every other stage ends the
    /// viewing session without a destructive transition (a countdown keeps
    /// running against its original anchor).
    pub fn dismiss_at(&mut self, now: Instant) -> LifecycleStage {
        self.advance(now);
        if matches!(self.phase, Phase::ReadOnce) {
            debug!("read-once message dismissed");
            self.phase = Phase::Vanishing { since: now };
        }
        self.stage_at(now)
    }

    /// Persist the message at the viewer's explicit request.
    pub fn save(&mut self) -> Result<(), SaveError> { self.save_at(Instant::now()) }

    /// Persist the message at the viewer's explicit request, with an
    /// explicit clock reading.
    ///
    /// Permitted any time before destruction begins; repeated saves are
    /// no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::WindowLocked`] for a window-locked message and
    /// [`SaveError::Destroyed`] once vanishing or destruction has begun.
    pub fn save_at(&mut self, now: Instant) -> Result<(), SaveError> {
        self.advance(now);
        match self.phase {
            Phase::Locked => Err(SaveError::WindowLocked),
            Phase::Vanishing { .. } | Phase::Destroyed => Err(SaveError::Destroyed),
            Phase::Awaiting | Phase::Counting { .. } | Phase::ReadOnce | Phase::Permanent => {
                self.persist_once();
                Ok(())
            }
        }
    }

    /// Return the payload while it is still reachable.
    #[must_use]
    pub const fn payload(&self) -> Option<&LogicalPayload> { self.payload.as_ref() }

    /// Instant of the next time-derived transition, if one is pending.
    #[must_use]
    pub fn next_transition_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Counting { deadline } => Some(deadline),
            Phase::Vanishing { since } => Some(since + self.vanish_grace),
            Phase::Locked
            | Phase::Awaiting
            | Phase::ReadOnce
            | Phase::Permanent
            | Phase::Destroyed => None,
        }
    }

    fn stage_at(&self, now: Instant) -> LifecycleStage {
        match self.phase {
            Phase::Locked => LifecycleStage::WindowLocked,
            Phase::Awaiting => LifecycleStage::AwaitingOpen,
            Phase::Counting { deadline } => LifecycleStage::CountingDown {
                remaining: deadline.saturating_duration_since(now),
            },
            Phase::ReadOnce => LifecycleStage::OpenReadOnce,
            Phase::Permanent => LifecycleStage::OpenPermanent,
            Phase::Vanishing { .. } => LifecycleStage::Vanishing,
            Phase::Destroyed => LifecycleStage::Destroyed,
        }
    }

    fn advance(&mut self, now: Instant) {
        if let Phase::Counting { deadline } = self.phase {
            if now >= deadline {
                debug!("countdown reached zero");
                self.phase = Phase::Vanishing { since: deadline };
            }
        }
        if let Phase::Vanishing { since } = self.phase {
            if now.saturating_duration_since(since) >= self.vanish_grace {
                self.destroy();
            }
        }
    }

    fn destroy(&mut self) {
        debug!("message destroyed");
        self.phase = Phase::Destroyed;
        self.payload = None;
        crate::metrics::inc_messages_destroyed();
    }

    fn persist_once(&mut self) {
        if self.saved {
            return;
        }
        if let Some(payload) = self.payload.as_ref() {
            self.store.persist(payload);
            self.saved = true;
        }
    }
}
