//! Zero-based fragment positioning and fixed fragment totals.
//!
//! Provides [`FragmentIndex`], a type-safe wrapper around `u32`, and
//! [`FragmentCount`], the always-positive total a transfer announces in
//! every fragment header.

use std::num::{NonZeroU32, TryFromIntError};

use bincode::{Decode, Encode};
use derive_more::{Display, From};

/// Zero-based ordinal describing a fragment's position within its transfer.
///
/// # Examples
///
/// ```
/// use opticast::fragment::FragmentIndex;
///
/// let index = FragmentIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert_eq!(index.as_usize(), 3);
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode, Display, From,
)]
#[display("{_0}")]
pub struct FragmentIndex(u32);

impl FragmentIndex {
    /// Construct an index from a `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the first valid fragment index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Return the index widened for slot addressing.
    #[must_use]
    pub const fn as_usize(self) -> usize { self.0 as usize }
}

impl TryFrom<usize> for FragmentIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u32::try_from(value).map(Self) }
}

/// Total number of fragments in a transfer, fixed by the first fragment seen.
///
/// Always positive: even an empty payload travels as one fragment, so the
/// transfer is representable and terminable.
///
/// # Examples
///
/// ```
/// use opticast::fragment::FragmentCount;
///
/// let total = FragmentCount::from_len(4).expect("within u32 range");
/// assert_eq!(total.get(), 4);
/// assert!(FragmentCount::from_len(0).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode, Display, From)]
#[display("{_0}")]
pub struct FragmentCount(NonZeroU32);

impl FragmentCount {
    /// The single-fragment total.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Construct a total from a positive `u32`.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Construct a total from a fragment count, rejecting zero and overflow.
    #[must_use]
    pub fn from_len(len: usize) -> Option<Self> {
        u32::try_from(len).ok().and_then(NonZeroU32::new).map(Self)
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0.get() }

    /// Return the total widened for slot allocation.
    #[must_use]
    pub const fn as_usize(self) -> usize { self.0.get() as usize }

    /// Report whether `index` addresses a valid slot under this total.
    #[must_use]
    pub const fn contains(self, index: FragmentIndex) -> bool { index.get() < self.get() }
}
