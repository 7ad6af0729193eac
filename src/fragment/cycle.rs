//! Repeating presentation order for a fragment batch.

use super::FragmentFrame;

/// Endless iterator over a batch in index order: `0, 1, …, N−1, 0, 1, …`.
///
/// The cycle has no notion of cadence; the rendering collaborator decides
/// how long each optical code stays on screen and when to stop. The
/// iterator never returns `None`.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use opticast::fragment::{Splitter, TransferTag};
///
/// let splitter = Splitter::new(NonZeroUsize::new(2).expect("non-zero"));
/// let batch = splitter.split(TransferTag::Direct, [1_u8, 2, 3]).expect("split");
/// let indices: Vec<u32> = batch
///     .cycle()
///     .take(5)
///     .map(|frame| frame.header().index().get())
///     .collect();
/// assert_eq!(indices, [0, 1, 0, 1, 0]);
/// ```
#[derive(Clone, Debug)]
pub struct FragmentCycle {
    frames: Vec<FragmentFrame>,
    position: usize,
}

impl FragmentCycle {
    pub(super) fn new(frames: Vec<FragmentFrame>) -> Self {
        debug_assert!(!frames.is_empty(), "fragment cycles must not be empty");
        Self { frames, position: 0 }
    }

    /// Number of distinct fragments in one revolution of the cycle.
    #[expect(
        clippy::len_without_is_empty,
        reason = "cycles are guaranteed non-empty"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }
}

impl Iterator for FragmentCycle {
    type Item = FragmentFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.get(self.position)?.clone();
        self.position = (self.position + 1) % self.frames.len();
        Some(frame)
    }
}
