//! Error, status, and rejection types emitted by the fragment layer.
//!
//! Rejections are deliberately not `Err` values: a garbled or foreign
//! capture is a routine event on a camera-fed channel and must not abort an
//! otherwise-healthy transfer. Ingestion reports an [`IngestOutcome`] and
//! only the terminal reconstruction step surfaces hard errors.

use std::num::NonZeroUsize;

use thiserror::Error;

use super::{FragmentCount, FragmentIndex, TransferTag};
use crate::payload::PayloadError;

/// Result of feeding one fragment into an [`Assembler`](super::Assembler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The fragment began a new transfer.
    Started,
    /// The fragment filled a previously empty slot.
    Accepted,
    /// The slot was already filled; state is unchanged.
    Duplicate,
    /// The fragment filled the last empty slot; the transfer is complete.
    Completed,
    /// The fragment was dropped without touching accepted state.
    Rejected(RejectReason),
}

impl IngestOutcome {
    /// Report whether the fragment was dropped.
    #[must_use]
    pub const fn is_rejected(self) -> bool { matches!(self, Self::Rejected(_)) }

    /// Report whether this fragment completed the transfer.
    #[must_use]
    pub const fn is_completed(self) -> bool { matches!(self, Self::Completed) }
}

/// Why an ingested fragment was dropped.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    /// The fragment's payload kind disagrees with the in-progress transfer.
    #[error("transfer tag mismatch: expected {expected}, found {found}")]
    TagMismatch {
        /// Tag fixed by the first fragment of the transfer.
        expected: TransferTag,
        /// Tag carried by the dropped fragment.
        found: TransferTag,
    },
    /// The fragment announces a different total than the in-progress transfer.
    #[error("fragment total mismatch: expected {expected}, found {found}")]
    TotalMismatch {
        /// Total fixed by the first fragment of the transfer.
        expected: FragmentCount,
        /// Total carried by the dropped fragment.
        found: FragmentCount,
    },
    /// The fragment index does not address a slot under the announced total.
    #[error("fragment index {index} out of range for total {total}")]
    IndexOutOfRange {
        /// Index carried by the dropped fragment.
        index: FragmentIndex,
        /// Total the index was checked against.
        total: FragmentCount,
    },
    /// Accepting the fragment would push the payload past the configured cap.
    #[error("payload would reach {attempted} bytes, exceeding the {limit} byte cap")]
    PayloadTooLarge {
        /// Cumulative size the fragment would have produced.
        attempted: usize,
        /// Configured payload ceiling.
        limit: NonZeroUsize,
    },
    /// The transfer window closed; no further fragment may be accepted.
    #[error("transfer window expired")]
    WindowExpired,
}

/// Errors produced while splitting a payload into fragments.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    /// The payload needs more fragments than the index space can address.
    #[error("payload requires {required} fragments, exceeding the u32 index space")]
    TooManyFragments {
        /// Fragment count the payload would have needed.
        required: usize,
    },
}

/// Errors produced by [`Assembler::finalize`](super::Assembler::finalize).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FinalizeError {
    /// No fragment has been ingested yet.
    #[error("no fragments received")]
    Empty,
    /// Some slots are still unfilled.
    #[error("transfer incomplete: {received} of {expected} fragments received")]
    Incomplete {
        /// Distinct fragments received so far.
        received: usize,
        /// Total announced by the transfer.
        expected: u32,
    },
    /// Every slot is filled but the concatenated bytes do not decode.
    #[error("reconstructed payload is corrupted: {0}")]
    Decode(#[from] PayloadError),
}
