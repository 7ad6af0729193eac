//! Sender-side helper that slices a serialized payload into fragments.
//!
//! [`Splitter`] is a pure, one-shot computation: it has no notion of time,
//! repetition, or identity. Re-invoke it only when the sender edits the
//! source content. The repeating presentation of the resulting batch is the
//! rendering collaborator's concern, served by
//! [`FragmentCycle`](super::FragmentCycle).

use std::num::NonZeroUsize;

use super::{FragmentCount, FragmentHeader, FragmentIndex, SplitError, TransferTag};

/// Splits serialized payloads into capacity-bounded fragments.
#[derive(Clone, Copy, Debug)]
pub struct Splitter {
    capacity: NonZeroUsize,
}

impl Splitter {
    /// Create a splitter that caps fragment payloads at `capacity` bytes.
    #[must_use]
    pub const fn new(capacity: NonZeroUsize) -> Self { Self { capacity } }

    /// Return the maximum fragment payload size in bytes.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Split `payload` into exactly `ceil(len / capacity)` fragments.
    ///
    /// Fragment `i` carries the slice `[i * capacity, min((i + 1) * capacity,
    /// len))`; concatenating all slices in index order reproduces `payload`
    /// byte for byte. An empty payload yields a single empty fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::TooManyFragments`] if the payload would need
    /// more than `u32::MAX` fragments.
    pub fn split(
        &self,
        tag: TransferTag,
        payload: impl AsRef<[u8]>,
    ) -> Result<FragmentBatch, SplitError> {
        let payload = payload.as_ref();
        let capacity = self.capacity.get();

        if payload.is_empty() {
            let header = FragmentHeader::new(tag, FragmentIndex::zero(), FragmentCount::ONE);
            return Ok(FragmentBatch::new(tag, vec![FragmentFrame::new(header, Vec::new())]));
        }

        let required = payload.len().div_ceil(capacity);
        let total = FragmentCount::from_len(required)
            .ok_or(SplitError::TooManyFragments { required })?;

        let mut fragments = Vec::with_capacity(required);
        for (position, chunk) in payload.chunks(capacity).enumerate() {
            let index = FragmentIndex::try_from(position)
                .map_err(|_| SplitError::TooManyFragments { required })?;
            fragments.push(FragmentFrame::new(
                FragmentHeader::new(tag, index, total),
                chunk.to_vec(),
            ));
        }

        Ok(FragmentBatch::new(tag, fragments))
    }
}

/// Metadata and payload slice for a single outbound fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentFrame {
    header: FragmentHeader,
    payload: Vec<u8>,
}

impl FragmentFrame {
    /// Construct a new fragment frame.
    #[must_use]
    pub fn new(header: FragmentHeader, payload: Vec<u8>) -> Self { Self { header, payload } }

    /// Return the fragment header.
    #[must_use]
    pub const fn header(&self) -> &FragmentHeader { &self.header }

    /// Return the fragment payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.payload.as_slice() }

    /// Consume the frame, returning its components.
    #[must_use]
    pub fn into_parts(self) -> (FragmentHeader, Vec<u8>) { (self.header, self.payload) }
}

/// Ordered collection of fragments produced for a single transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    tag: TransferTag,
    fragments: Vec<FragmentFrame>,
}

impl FragmentBatch {
    fn new(tag: TransferTag, fragments: Vec<FragmentFrame>) -> Self {
        debug_assert!(!fragments.is_empty(), "fragment batches must not be empty");
        Self { tag, fragments }
    }

    /// Return the payload kind shared by all fragments.
    #[must_use]
    pub const fn tag(&self) -> TransferTag { self.tag }

    /// Return the fragments as a slice, in index order.
    #[must_use]
    pub fn fragments(&self) -> &[FragmentFrame] { self.fragments.as_slice() }

    /// Number of fragments in the batch.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches are guaranteed non-empty"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.fragments.len() }

    /// Whether the payload required more than one fragment.
    #[must_use]
    pub fn is_fragmented(&self) -> bool { self.len() > 1 }

    /// Return the endlessly repeating presentation order for this batch.
    #[must_use]
    pub fn cycle(&self) -> super::FragmentCycle { super::FragmentCycle::new(self.fragments.clone()) }

    /// Consume the batch, returning all fragments.
    #[must_use]
    pub fn into_fragments(self) -> Vec<FragmentFrame> { self.fragments }
}

impl IntoIterator for FragmentBatch {
    type Item = FragmentFrame;
    type IntoIter = std::vec::IntoIter<FragmentFrame>;

    fn into_iter(self) -> Self::IntoIter { self.fragments.into_iter() }
}
