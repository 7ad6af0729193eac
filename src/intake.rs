//! Capture feed wiring between the camera collaborator and the assembler.
//!
//! Presentation cycles on the sending device and camera capture on the
//! receiving device run at unrelated cadences, so the two sides meet as
//! producer and consumer: the capture pipeline yields raw decoded optical
//! payloads at whatever rate frames decode, and [`run_intake`] drains them
//! into a [`SharedAssembler`]. Non-fragment and malformed captures are
//! dropped at this boundary; a single garbled frame must not abort an
//! otherwise-healthy transfer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    fragment::{Assembler, FinalizeError, FragmentHeader, IngestOutcome, decode_fragment},
    payload::{LogicalPayload, PartialPayload},
};

/// Snapshot-consistent concurrent handle over one transfer's assembler.
///
/// Each method locks for the duration of one call, so an ingest is atomic
/// and reads observe a consistent snapshot without blocking ingestion for
/// long.
#[derive(Clone, Debug)]
pub struct SharedAssembler(Arc<Mutex<Assembler>>);

impl SharedAssembler {
    /// Wrap an assembler for shared access.
    #[must_use]
    pub fn new(assembler: Assembler) -> Self { Self(Arc::new(Mutex::new(assembler))) }

    fn lock(&self) -> MutexGuard<'_, Assembler> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ingest one fragment using the current wall clock for window checks.
    pub fn ingest(&self, header: FragmentHeader, bytes: impl AsRef<[u8]>) -> IngestOutcome {
        self.lock().ingest(header, bytes)
    }

    /// Ingest one fragment with an explicit wall-clock reading.
    pub fn ingest_at(
        &self,
        header: FragmentHeader,
        bytes: impl AsRef<[u8]>,
        now_ms: i64,
    ) -> IngestOutcome {
        self.lock().ingest_at(header, bytes, now_ms)
    }

    /// Fraction of distinct fragments received, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 { self.lock().progress() }

    /// Report whether every fragment has been received.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.lock().is_complete() }

    /// Concatenate and decode the completed transfer.
    ///
    /// # Errors
    ///
    /// Propagates [`FinalizeError`] from [`Assembler::finalize`].
    pub fn finalize(&self) -> Result<LogicalPayload, FinalizeError> { self.lock().finalize() }

    /// Best-effort reconstruction from the contiguous leading fragments.
    #[must_use]
    pub fn partial_reconstruct(&self) -> Option<PartialPayload> {
        self.lock().partial_reconstruct()
    }

    /// Discard all transfer state, beginning a fresh transfer.
    pub fn reset(&self) { self.lock().reset(); }
}

/// Progress notifications published while an intake loop runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntakeEvent {
    /// Reception progress after the latest accepted capture.
    Progress(f64),
    /// Every fragment has been received; the assembler can finalize.
    Completed,
}

/// Create the watch channel an intake loop publishes on.
#[must_use]
pub fn intake_events() -> (watch::Sender<IntakeEvent>, watch::Receiver<IntakeEvent>) {
    watch::channel(IntakeEvent::Progress(0.0))
}

/// Drain a stream of raw optical captures into the assembler.
///
/// Runs until the stream ends or the transfer completes, publishing
/// [`IntakeEvent`]s along the way. Captures without the fragment marker and
/// captures whose header fails to decode are dropped with a debug log;
/// ingest-level rejections are handled (and logged) by the assembler
/// itself.
pub async fn run_intake<S>(
    captures: S,
    assembler: SharedAssembler,
    events: watch::Sender<IntakeEvent>,
) where
    S: Stream<Item = Vec<u8>>,
{
    tokio::pin!(captures);
    while let Some(raw) = captures.next().await {
        match decode_fragment(&raw) {
            Ok(Some((header, payload))) => {
                let outcome = assembler.ingest(header, payload);
                let _ = events.send(IntakeEvent::Progress(assembler.progress()));
                if outcome.is_completed() {
                    let _ = events.send(IntakeEvent::Completed);
                    return;
                }
            }
            Ok(None) => debug!(len = raw.len(), "capture without fragment marker dropped"),
            Err(err) => debug!(error = %err, "malformed fragment capture dropped"),
        }
    }
}
