//! Fragment protocol primitives for optical payload transfer.
//!
//! This module collects the domain types of the transfer protocol: the
//! sender-side [`Splitter`] and its repeating [`FragmentCycle`], the wire
//! form of a single optical code, and the receiver-side [`Assembler`]. Each
//! sub-module focuses on a single concept to keep the code small and easy to
//! audit while still providing a cohesive API at the crate root.

pub mod assembler;
pub mod cycle;
pub mod error;
pub mod header;
pub mod index;
pub mod splitter;
pub mod tag;
pub mod wire;

pub use assembler::Assembler;
pub use cycle::FragmentCycle;
pub use error::{FinalizeError, IngestOutcome, RejectReason, SplitError};
pub use header::FragmentHeader;
pub use index::{FragmentCount, FragmentIndex};
pub use splitter::{FragmentBatch, FragmentFrame, Splitter};
pub use tag::TransferTag;
pub use wire::{FRAGMENT_MAGIC, decode_fragment, encode_fragment, fragment_overhead};

#[cfg(test)]
mod tests;
