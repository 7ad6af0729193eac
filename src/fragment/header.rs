use bincode::{Decode, Encode};

use super::{FragmentCount, FragmentIndex, TransferTag};

/// Header describing a single fragment.
///
/// The header carries everything the receiver needs to place a fragment
/// without ordering guarantees: the transfer's payload kind, the fragment's
/// position, and the total fixed for the life of the transfer. It stays
/// small enough to copy by value.
///
/// # Examples
///
/// ```
/// use opticast::fragment::{FragmentCount, FragmentHeader, FragmentIndex, TransferTag};
///
/// let header = FragmentHeader::new(
///     TransferTag::Direct,
///     FragmentIndex::zero(),
///     FragmentCount::from_len(4).expect("positive total"),
/// );
/// assert_eq!(header.index().get(), 0);
/// assert_eq!(header.total().get(), 4);
/// assert!(header.total().contains(header.index()));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub struct FragmentHeader {
    tag: TransferTag,
    index: FragmentIndex,
    total: FragmentCount,
}

impl FragmentHeader {
    /// Create a new fragment header.
    #[must_use]
    pub const fn new(tag: TransferTag, index: FragmentIndex, total: FragmentCount) -> Self {
        Self { tag, index, total }
    }

    /// Return the transfer's payload kind.
    #[must_use]
    pub const fn tag(&self) -> TransferTag { self.tag }

    /// Return the fragment position relative to the transfer.
    #[must_use]
    pub const fn index(&self) -> FragmentIndex { self.index }

    /// Return the fragment total announced for the transfer.
    #[must_use]
    pub const fn total(&self) -> FragmentCount { self.total }
}
