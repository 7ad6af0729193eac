//! Receiver-side accumulator that rebuilds a payload from camera captures.
//!
//! [`Assembler`] mirrors the outbound [`Splitter`](super::Splitter) but under
//! the capture channel's conditions: fragments arrive in arbitrary order,
//! repeatedly, or not at all. The first fragment seen fixes the transfer's
//! tag and total; later fragments that disagree are dropped as foreign
//! captures without disturbing accepted state. One assembler owns exactly
//! one transfer.

use std::num::NonZeroUsize;

use tracing::{debug, warn};

use super::{
    FinalizeError,
    FragmentCount,
    FragmentHeader,
    IngestOutcome,
    RejectReason,
    TransferTag,
};
use crate::payload::{
    self,
    LogicalPayload,
    PartialPayload,
    TransferWindow,
    unix_now_ms,
};

#[derive(Debug)]
struct ActiveTransfer {
    tag: TransferTag,
    total: FragmentCount,
    slots: Vec<Option<Vec<u8>>>,
    received: usize,
    accepted_bytes: usize,
}

impl ActiveTransfer {
    fn new(tag: TransferTag, total: FragmentCount) -> Self {
        Self {
            tag,
            total,
            slots: vec![None; total.as_usize()],
            received: 0,
            accepted_bytes: 0,
        }
    }

    fn is_complete(&self) -> bool { self.received == self.total.as_usize() }

    /// Concatenation of the longest run of filled slots starting at index 0.
    fn contiguous_prefix(&self) -> Vec<u8> {
        let mut prefix = Vec::new();
        for slot in &self.slots {
            let Some(bytes) = slot else { break };
            prefix.extend_from_slice(bytes);
        }
        prefix
    }
}

/// Stateful accumulator for the fragments of a single transfer.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use opticast::{
///     fragment::{Assembler, Splitter, TransferTag},
///     payload::{Expiration, LogicalPayload, encode},
/// };
///
/// let payload = LogicalPayload::new("hi", Expiration::ReadOnce).with_created_at_ms(0);
/// let bytes = encode(&payload).expect("encode payload");
/// let splitter = Splitter::new(NonZeroUsize::new(8).expect("non-zero"));
/// let batch = splitter.split(TransferTag::Direct, &bytes).expect("split");
///
/// let mut assembler = Assembler::new(NonZeroUsize::new(1024).expect("non-zero"));
/// // Captures arrive out of order and repeatedly; the assembler does not mind.
/// for frame in batch.fragments().iter().rev().chain(batch.fragments()) {
///     assembler.ingest(*frame.header(), frame.payload());
/// }
/// assert!(assembler.is_complete());
/// assert_eq!(assembler.finalize().expect("decode payload"), payload);
/// ```
#[derive(Debug)]
pub struct Assembler {
    max_payload_bytes: NonZeroUsize,
    configured_window: Option<TransferWindow>,
    window: Option<TransferWindow>,
    transfer: Option<ActiveTransfer>,
}

impl Assembler {
    /// Create an assembler that caps the reconstructed payload size.
    #[must_use]
    pub const fn new(max_payload_bytes: NonZeroUsize) -> Self {
        Self {
            max_payload_bytes,
            configured_window: None,
            window: None,
            transfer: None,
        }
    }

    /// Create an assembler whose ingestion is gated by a known window.
    #[must_use]
    pub const fn with_window(max_payload_bytes: NonZeroUsize, window: TransferWindow) -> Self {
        Self {
            max_payload_bytes,
            configured_window: Some(window),
            window: Some(window),
            transfer: None,
        }
    }

    /// Return the window currently gating ingestion, if any.
    ///
    /// This is either the window supplied at construction or one adopted
    /// from the payload's leading descriptor once fragment 0 arrived.
    #[must_use]
    pub const fn window(&self) -> Option<TransferWindow> { self.window }

    /// Gate ingestion with a window learned out of band.
    pub fn set_window(&mut self, window: TransferWindow) { self.window = Some(window); }

    /// Ingest one fragment using the current wall clock for window checks.
    pub fn ingest(&mut self, header: FragmentHeader, bytes: impl AsRef<[u8]>) -> IngestOutcome {
        self.ingest_at(header, bytes, unix_now_ms())
    }

    /// Ingest one fragment with an explicit wall-clock reading.
    ///
    /// The first fragment of a transfer fixes its tag and total. Fragments
    /// that disagree, address an out-of-range slot, close an expired window,
    /// or overflow the payload cap are dropped; re-insertion at a filled
    /// slot is a silent no-op. No outcome disturbs previously accepted
    /// slots.
    pub fn ingest_at(
        &mut self,
        header: FragmentHeader,
        bytes: impl AsRef<[u8]>,
        now_ms: i64,
    ) -> IngestOutcome {
        let outcome = self.ingest_inner(header, bytes.as_ref(), now_ms);
        match outcome {
            IngestOutcome::Rejected(reason) => {
                debug!(%reason, index = %header.index(), "fragment dropped");
                crate::metrics::inc_fragments_rejected();
            }
            IngestOutcome::Completed => {
                crate::metrics::inc_fragments_ingested();
                crate::metrics::inc_transfers_completed();
            }
            IngestOutcome::Started | IngestOutcome::Accepted | IngestOutcome::Duplicate => {
                crate::metrics::inc_fragments_ingested();
            }
        }
        outcome
    }

    fn ingest_inner(&mut self, header: FragmentHeader, bytes: &[u8], now_ms: i64) -> IngestOutcome {
        if let Some(window) = self.window {
            if window.is_expired_at(now_ms) {
                return IngestOutcome::Rejected(RejectReason::WindowExpired);
            }
        }

        if !header.total().contains(header.index()) {
            return IngestOutcome::Rejected(RejectReason::IndexOutOfRange {
                index: header.index(),
                total: header.total(),
            });
        }

        let outcome = match &mut self.transfer {
            None => {
                if bytes.len() > self.max_payload_bytes.get() {
                    return IngestOutcome::Rejected(RejectReason::PayloadTooLarge {
                        attempted: bytes.len(),
                        limit: self.max_payload_bytes,
                    });
                }
                let mut active = ActiveTransfer::new(header.tag(), header.total());
                active.slots[header.index().as_usize()] = Some(bytes.to_vec());
                active.received = 1;
                active.accepted_bytes = bytes.len();
                let complete = active.is_complete();
                self.transfer = Some(active);
                if complete {
                    IngestOutcome::Completed
                } else {
                    IngestOutcome::Started
                }
            }
            Some(active) => {
                if header.tag() != active.tag {
                    return IngestOutcome::Rejected(RejectReason::TagMismatch {
                        expected: active.tag,
                        found: header.tag(),
                    });
                }
                if header.total() != active.total {
                    return IngestOutcome::Rejected(RejectReason::TotalMismatch {
                        expected: active.total,
                        found: header.total(),
                    });
                }
                let slot = header.index().as_usize();
                if active.slots[slot].is_some() {
                    return IngestOutcome::Duplicate;
                }
                let attempted = active.accepted_bytes.saturating_add(bytes.len());
                if attempted > self.max_payload_bytes.get() {
                    return IngestOutcome::Rejected(RejectReason::PayloadTooLarge {
                        attempted,
                        limit: self.max_payload_bytes,
                    });
                }
                active.slots[slot] = Some(bytes.to_vec());
                active.received += 1;
                active.accepted_bytes = attempted;
                if active.is_complete() {
                    IngestOutcome::Completed
                } else {
                    IngestOutcome::Accepted
                }
            }
        };

        self.adopt_window_from_descriptor();
        outcome
    }

    /// Learn the transfer window from the payload's leading descriptor.
    ///
    /// The descriptor sits at the head of fragment 0, so the window becomes
    /// enforceable as soon as that fragment lands even though the payload is
    /// far from complete.
    fn adopt_window_from_descriptor(&mut self) {
        if self.window.is_some() {
            return;
        }
        let Some(active) = &self.transfer else { return };
        if active.slots.first().is_none_or(Option::is_none) {
            return;
        }
        let prefix = active.contiguous_prefix();
        if let Some(partial) = payload::decode_prefix(&prefix) {
            if let Some(window) = partial.window() {
                debug!(deadline_ms = window.deadline_ms(), "adopted transfer window");
                self.window = Some(window);
            }
        }
    }

    /// Fraction of distinct fragments received, in `[0, 1]`.
    ///
    /// Exact (an integer ratio, not an accumulated float) and monotonically
    /// non-decreasing over the life of one transfer.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let Some(active) = self.transfer.as_ref() else {
            return 0.0;
        };
        // Both counts fit in u32, so the ratio is exact within f64.
        let received = u32::try_from(active.received).unwrap_or(u32::MAX);
        f64::from(received) / f64::from(active.total.get())
    }

    /// Number of distinct fragments received so far.
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.transfer.as_ref().map_or(0, |active| active.received)
    }

    /// Total announced by the transfer, once a first fragment has been seen.
    #[must_use]
    pub fn expected_count(&self) -> Option<FragmentCount> {
        self.transfer.as_ref().map(|active| active.total)
    }

    /// Payload kind of the in-progress transfer, if one has started.
    #[must_use]
    pub fn tag(&self) -> Option<TransferTag> {
        self.transfer.as_ref().map(|active| active.tag)
    }

    /// Report whether every slot in `[0, N)` has been received.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.transfer.as_ref().is_some_and(ActiveTransfer::is_complete)
    }

    /// Concatenate all slots in index order and decode the payload.
    ///
    /// Idempotent and repeatable once complete.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::Empty`] before any fragment arrives,
    /// [`FinalizeError::Incomplete`] while slots are missing, and
    /// [`FinalizeError::Decode`] when coverage is complete but the
    /// concatenated bytes are corrupt — surfaced, never swallowed.
    pub fn finalize(&self) -> Result<LogicalPayload, FinalizeError> {
        let Some(active) = &self.transfer else {
            return Err(FinalizeError::Empty);
        };
        if !active.is_complete() {
            return Err(FinalizeError::Incomplete {
                received: active.received,
                expected: active.total.get(),
            });
        }
        let mut bytes = Vec::with_capacity(active.accepted_bytes);
        for slot in active.slots.iter().flatten() {
            bytes.extend_from_slice(slot);
        }
        payload::decode(&bytes).map_err(|err| {
            warn!(error = %err, "complete fragment set failed to decode");
            FinalizeError::Decode(err)
        })
    }

    /// Raw bytes of the longest contiguous run of fragments from index 0.
    ///
    /// A single gap anywhere halts the run; fragments beyond the gap are
    /// never included regardless of how many have arrived.
    #[must_use]
    pub fn received_prefix(&self) -> Vec<u8> {
        self.transfer
            .as_ref()
            .map_or_else(Vec::new, ActiveTransfer::contiguous_prefix)
    }

    /// Best-effort reconstruction from the contiguous leading fragments.
    ///
    /// Uses only the longest run of filled slots starting at index 0; a
    /// single gap halts the run regardless of what lies beyond it. Returns
    /// `None` when even the payload's leading descriptor cannot be parsed
    /// from that prefix. Never a hard failure: gaps are routine mid-transfer.
    #[must_use]
    pub fn partial_reconstruct(&self) -> Option<PartialPayload> {
        let active = self.transfer.as_ref()?;
        payload::decode_prefix(&active.contiguous_prefix())
    }

    /// Discard all transfer state, beginning a fresh transfer.
    ///
    /// A window adopted from the discarded payload is forgotten; a window
    /// supplied at construction keeps gating the next transfer.
    pub fn reset(&mut self) {
        self.transfer = None;
        self.window = self.configured_window;
    }
}
